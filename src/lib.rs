//! char-lockr: reversible per-character substitution codec
//!
//! Maps single characters to multi-character replacement tokens and back,
//! using two directory-defined tables (one for all-uppercase text, one for
//! everything else).
//!
//! ## How it works
//!
//! 1. **Tables**: Each `.txt` file in a definition directory maps one
//!    character (the file name's first character) to a token (the trimmed
//!    file content)
//! 2. **Selection**: A single whole-string case test picks which table
//!    governs a call
//! 3. **Encode**: Mapped characters become tokens, everything else passes
//!    through verbatim
//! 4. **Decode**: The table is inverted and the token string is scanned
//!    longest-match-first
//!
//! This is a transliteration cipher, not a secure one: there is no key, no
//! secrecy guarantee, and round trips only hold for curated tables (see
//! [`SubstitutionTable::validate`]).

pub mod codec;
pub mod table;

pub use codec::{is_all_upper, CaseMode, Codec, TableChoice};
pub use table::{ReverseTable, SubstitutionTable, TableIssue};
