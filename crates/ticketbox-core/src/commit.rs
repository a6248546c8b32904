use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Number of leading hash characters shown to humans and searched for in
/// issue text.
pub const SHORT_HASH_LEN: usize = 8;

/// Titles longer than this many characters are cut and suffixed with `...`.
pub const TITLE_MAX_CHARS: usize = 72;

/// A commit seen in `git log` output.
///
/// Identity is the full hash; two values with the same hash are equal even
/// if only one of them has picked up a title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub title: Option<String>,
}

impl Commit {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            title: None,
        }
    }

    pub fn with_title(hash: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            title: Some(title.into()),
        }
    }

    /// First eight characters of the hash (or the whole hash if shorter).
    pub fn short_hash(&self) -> &str {
        self.hash.get(..SHORT_HASH_LEN).unwrap_or(&self.hash)
    }

    /// Set the title from an unindented message line unless one is already set.
    /// Blank lines never become titles.
    pub fn set_title_once(&mut self, message_line: &str) {
        if self.title.is_some() || message_line.trim().is_empty() {
            return;
        }
        self.title = Some(truncate_title(message_line));
    }
}

/// Cut a message line to [`TITLE_MAX_CHARS`] characters plus `...`.
pub fn truncate_title(line: &str) -> String {
    if line.chars().count() > TITLE_MAX_CHARS {
        let head: String = line.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        line.to_string()
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} {}", self.short_hash(), title),
            None => f.write_str(self.short_hash()),
        }
    }
}
