//! Codec module: encode/decode driven by case-selected substitution tables
//!
//! The codec owns two tables, one per case mode, picked once per call by a
//! whole-string case test. Encode walks the message character by character;
//! decode inverts the selected table and scans the token string
//! longest-match-first.

use crate::table::{ReverseTable, SubstitutionTable};
use std::path::Path;

/// Which of the two tables governs a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Upper,
    Lower,
}

/// Table selection for decode.
///
/// `Auto` applies the same whole-string case test encode uses, to the token
/// string itself. Token strings rarely test as all-uppercase, so `Auto`
/// usually lands on the lower table regardless of how the text was encoded;
/// this mirrors the behavior this codec was built to reproduce. `Upper` and
/// `Lower` pin the table explicitly for callers that know better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableChoice {
    #[default]
    Auto,
    Upper,
    Lower,
}

/// Whole-string case test: true only when the text has at least one
/// uppercase character and no lowercase character.
///
/// Matches the semantics of Python's `str.isupper`: every cased character
/// must be uppercase and at least one cased character must exist. Digits,
/// punctuation and whitespace are not cased, so a string without letters
/// tests false.
pub fn is_all_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

/// The substitution codec: two immutable tables plus pure encode/decode.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    upper: SubstitutionTable,
    lower: SubstitutionTable,
}

impl Codec {
    /// Build a codec from two in-memory tables.
    pub fn new(upper: SubstitutionTable, lower: SubstitutionTable) -> Self {
        Self { upper, lower }
    }

    /// Build a codec by loading both tables from definition directories.
    ///
    /// Missing directories yield empty tables; construction never fails.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(upper_dir: P, lower_dir: Q) -> Self {
        Self {
            upper: SubstitutionTable::load(upper_dir),
            lower: SubstitutionTable::load(lower_dir),
        }
    }

    /// The table-selection policy: one decision for the whole string.
    ///
    /// All-uppercase text selects the upper table; everything else (mixed
    /// case, lowercase, text with no cased characters at all) selects the
    /// lower table.
    pub fn select(&self, text: &str) -> CaseMode {
        if is_all_upper(text) {
            CaseMode::Upper
        } else {
            CaseMode::Lower
        }
    }

    /// Get the table for a case mode.
    pub fn table(&self, mode: CaseMode) -> &SubstitutionTable {
        match mode {
            CaseMode::Upper => &self.upper,
            CaseMode::Lower => &self.lower,
        }
    }

    /// Encode a message into a token string.
    ///
    /// Picks a table once from the whole message, then replaces each mapped
    /// character with its token and passes everything else through verbatim.
    /// Total: never fails, `encode("") == ""`.
    pub fn encode(&self, message: &str) -> String {
        let table = self.table(self.select(message));
        let mut out = String::with_capacity(message.len());
        for ch in message.chars() {
            match table.token(ch) {
                Some(token) => out.push_str(token),
                None => out.push(ch),
            }
        }
        out
    }

    /// Decode a token string back into a message.
    ///
    /// Equivalent to `decode_with(tokens, TableChoice::Auto)`: the table is
    /// picked by applying the case test to the token string itself. See
    /// [`TableChoice`] for why that usually means the lower table.
    pub fn decode(&self, tokens: &str) -> String {
        self.decode_with(tokens, TableChoice::Auto)
    }

    /// Decode a token string using an explicit table choice.
    ///
    /// The selected table is inverted fresh for this call, then the input
    /// is scanned left to right: at each position the longest token that
    /// prefixes the remaining input is consumed and its source character
    /// emitted; when nothing matches, one character passes through
    /// verbatim. Total: always terminates, `decode("") == ""`.
    pub fn decode_with(&self, tokens: &str, choice: TableChoice) -> String {
        let mode = match choice {
            TableChoice::Auto => self.select(tokens),
            TableChoice::Upper => CaseMode::Upper,
            TableChoice::Lower => CaseMode::Lower,
        };
        let reverse: ReverseTable = self.table(mode).reverse();

        let mut out = String::with_capacity(tokens.len());
        let mut rest = tokens;
        while !rest.is_empty() {
            if let Some((token, key)) = reverse.longest_prefix_of(rest) {
                out.push(key);
                rest = &rest[token.len()..];
            } else {
                let mut chars = rest.chars();
                if let Some(ch) = chars.next() {
                    out.push(ch);
                }
                rest = chars.as_str();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_codec() -> Codec {
        Codec::new(
            SubstitutionTable::from_entries([('A', "01"), ('B', "10")]),
            SubstitutionTable::from_entries([('a', "0-1")]),
        )
    }

    #[test]
    fn test_is_all_upper() {
        assert!(is_all_upper("ABC"));
        assert!(is_all_upper("A1 B2!"));
        assert!(!is_all_upper("abc"));
        assert!(!is_all_upper("AbC"));
        assert!(!is_all_upper(""));
        assert!(!is_all_upper("123 !?"));
    }

    #[test]
    fn test_select_table() {
        let codec = sample_codec();
        assert_eq!(codec.select("ABC"), CaseMode::Upper);
        assert_eq!(codec.select("abc"), CaseMode::Lower);
        assert_eq!(codec.select("AbC"), CaseMode::Lower);
        assert_eq!(codec.select("0110"), CaseMode::Lower);
    }

    #[test]
    fn test_encode_uses_upper_table_for_upper_message() {
        let codec = sample_codec();
        assert_eq!(codec.encode("AB"), "0110");
    }

    #[test]
    fn test_encode_uses_lower_table_for_lower_message() {
        let codec = sample_codec();
        assert_eq!(codec.encode("a"), "0-1");
        // 'A' is not in the lower table, so mixed case passes 'A' through
        assert_eq!(codec.encode("Aa"), "A0-1");
    }

    #[test]
    fn test_encode_unmapped_chars_pass_through() {
        let codec = sample_codec();
        assert_eq!(codec.encode("C3, D!"), "C3, D!");
    }

    #[test]
    fn test_empty_string() {
        let codec = sample_codec();
        assert_eq!(codec.encode(""), "");
        assert_eq!(codec.decode(""), "");
    }

    #[test]
    fn test_decode_auto_of_digit_string_uses_lower_table() {
        // "0110" has no cased characters, the case test is false, and the
        // lower table has no token matching anywhere in it: the string
        // passes through unchanged even though the upper table produced it.
        let codec = sample_codec();
        assert_eq!(codec.decode("0110"), "0110");
    }

    #[test]
    fn test_decode_with_pinned_upper_table_recovers_message() {
        let codec = sample_codec();
        assert_eq!(codec.decode_with("0110", TableChoice::Upper), "AB");
    }

    #[test]
    fn test_decode_unmatched_chars_pass_through() {
        let codec = sample_codec();
        assert_eq!(codec.decode_with("01x10", TableChoice::Upper), "AxB");
    }

    #[test]
    fn test_decode_collision_is_deterministic() {
        let codec = Codec::new(
            SubstitutionTable::from_entries([('X', "z"), ('Y', "z")]),
            SubstitutionTable::default(),
        );
        // ascending-char iteration means 'Y' overwrites 'X' in the reverse
        // table, every time
        assert_eq!(codec.decode_with("zz", TableChoice::Upper), "YY");
    }

    #[test]
    fn test_round_trip_with_case_preserving_tokens() {
        // Tokens are themselves all-uppercase/all-lowercase, so the case
        // test agrees before and after encoding, and no token is a prefix
        // of another: round trips hold.
        let codec = Codec::new(
            SubstitutionTable::from_entries([('A', "QX"), ('B', "ZK"), ('C', "WM")]),
            SubstitutionTable::from_entries([('a', "qx"), ('b', "zk"), ('c', "wm")]),
        );

        for message in ["ABC", "CAB B", "abc", "b ca", "", "123", "A1C"] {
            let encoded = codec.encode(message);
            assert_eq!(codec.decode(&encoded), message, "message {:?}", message);
        }
    }

    #[test]
    fn test_encode_with_empty_tables_is_identity() {
        let codec = Codec::default();
        assert_eq!(codec.encode("Hello, World!"), "Hello, World!");
        assert_eq!(codec.decode("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn test_multibyte_passthrough() {
        let codec = sample_codec();
        // 'ñ' is cased and lowercase, so the lower table governs; neither
        // 'ñ' nor 'B' is mapped there
        assert_eq!(codec.encode("ñB"), "ñB");
        assert_eq!(codec.decode_with("ñ01", TableChoice::Upper), "ñA");
    }
}
