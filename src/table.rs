//! Table module: character-to-token substitution tables
//!
//! A table maps single source characters to replacement tokens. Tables are
//! built once (from a definition directory or from in-memory entries) and
//! are immutable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Substitution table: maps a source character to its replacement token.
///
/// Backed by a `BTreeMap` so iteration is always in ascending code-point
/// order, which makes reverse-table collision handling deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionTable {
    entries: BTreeMap<char, String>,
}

impl SubstitutionTable {
    /// Load a table from a definition directory.
    ///
    /// Each `.txt` file contributes one entry: the first character of the
    /// file name is the source character, the trimmed file content is the
    /// replacement token. Everything degrades rather than fails: a missing
    /// or unreadable directory yields an empty table, unreadable files and
    /// files that trim to nothing are skipped. Files are processed in
    /// ascending file-name order, so if two files claim the same source
    /// character the lexicographically last file name wins.
    pub fn load<P: AsRef<Path>>(dir: P) -> Self {
        let mut names: Vec<String> = match fs::read_dir(dir.as_ref()) {
            Ok(rd) => rd
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .filter_map(|entry| entry.file_name().to_str().map(String::from))
                .collect(),
            Err(_) => return Self::default(),
        };
        names.sort();

        let mut entries = BTreeMap::new();
        for name in names {
            if !name.ends_with(".txt") {
                continue;
            }
            let key = match name.chars().next() {
                Some(c) => c,
                None => continue,
            };
            let content = match fs::read_to_string(dir.as_ref().join(&name)) {
                Ok(c) => c,
                Err(_) => continue,
            };
            let token = content.trim();
            if token.is_empty() {
                continue;
            }
            entries.insert(key, token.to_string());
        }

        Self { entries }
    }

    /// Build a table from in-memory entries (for tests and embedding).
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, token)| (key, token.into()))
                .collect(),
        }
    }

    /// Get the replacement token for a source character.
    pub fn token(&self, key: char) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in ascending source-character order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Invert the table for decoding.
    ///
    /// When two source characters share a token, the entry written last
    /// under ascending-character iteration survives: the highest source
    /// character wins.
    pub fn reverse(&self) -> ReverseTable {
        ReverseTable::from_table(self)
    }

    /// Check the table for properties decode correctness depends on.
    ///
    /// Reports tokens that are prefixes of other keys' tokens (the scan can
    /// mis-split encoded text), tokens shared by several keys (the reverse
    /// table drops all but one), and empty tokens. The encode/decode path
    /// never calls this; it is an offline curation check.
    pub fn validate(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();

        for (key, token) in self.iter() {
            if token.is_empty() {
                issues.push(TableIssue::EmptyToken { key });
            }
        }

        let mut by_token: BTreeMap<&str, Vec<char>> = BTreeMap::new();
        for (key, token) in self.iter() {
            by_token.entry(token).or_default().push(key);
        }
        for (token, keys) in &by_token {
            if keys.len() > 1 {
                issues.push(TableIssue::DuplicateToken {
                    token: token.to_string(),
                    keys: keys.clone(),
                });
            }
        }

        for (key, token) in self.iter() {
            for (other_key, other_token) in self.iter() {
                if token != other_token
                    && !token.is_empty()
                    && other_token.starts_with(token)
                {
                    issues.push(TableIssue::PrefixCollision {
                        key,
                        token: token.to_string(),
                        shadows_key: other_key,
                        shadows_token: other_token.to_string(),
                    });
                }
            }
        }

        issues
    }
}

/// Decode-time inversion of a substitution table: token -> source character.
///
/// Entries are held sorted by descending token byte length, then ascending
/// lexicographic order, so prefix lookup is longest-match-first and fully
/// deterministic.
#[derive(Debug, Clone)]
pub struct ReverseTable {
    entries: Vec<(String, char)>,
}

impl ReverseTable {
    fn from_table(table: &SubstitutionTable) -> Self {
        let mut inverted: BTreeMap<&str, char> = BTreeMap::new();
        for (key, token) in table.iter() {
            // last write wins; table iteration is ascending by source char
            inverted.insert(token, key);
        }

        let mut entries: Vec<(String, char)> = inverted
            .into_iter()
            .map(|(token, key)| (token.to_string(), key))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self { entries }
    }

    /// Find the longest token that is a prefix of `rest`.
    pub fn longest_prefix_of<'a>(&'a self, rest: &str) -> Option<(&'a str, char)> {
        self.entries
            .iter()
            .find(|(token, _)| rest.starts_with(token.as_str()))
            .map(|(token, key)| (token.as_str(), *key))
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the reverse table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A curation problem found by [`SubstitutionTable::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableIssue {
    /// `key`'s token is a prefix of `shadows_key`'s token, so a scan can
    /// consume it out from under the longer token.
    PrefixCollision {
        key: char,
        token: String,
        shadows_key: char,
        shadows_token: String,
    },
    /// Several keys map to the same token; decode keeps only one of them.
    DuplicateToken { token: String, keys: Vec<char> },
    /// A key maps to an empty token and would vanish from encoded output.
    EmptyToken { key: char },
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::PrefixCollision {
                key,
                token,
                shadows_key,
                shadows_token,
            } => write!(
                f,
                "token {:?} (for {:?}) is a prefix of token {:?} (for {:?})",
                token, key, shadows_token, shadows_key
            ),
            TableIssue::DuplicateToken { token, keys } => write!(
                f,
                "token {:?} is shared by {} keys: {:?}",
                token,
                keys.len(),
                keys
            ),
            TableIssue::EmptyToken { key } => {
                write!(f, "key {:?} maps to an empty token", key)
            }
        }
    }
}
