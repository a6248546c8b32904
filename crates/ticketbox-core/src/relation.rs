use std::fmt;

use serde::{Deserialize, Serialize};

/// Work-item relation types the sync path can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    DuplicateForward,
    Successor,
    Related,
}

impl RelationType {
    /// Map a source link's forward verb to a relation type.
    /// Unknown verbs map to [`RelationType::Related`].
    pub fn from_link_verb(outward: &str) -> Self {
        match outward {
            "clones" | "duplicates" => RelationType::DuplicateForward,
            "blocks" => RelationType::Successor,
            _ => RelationType::Related,
        }
    }

    /// Reference name as used in work-item relation payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::DuplicateForward => "System.LinkTypes.Duplicate-Forward",
            RelationType::Successor => "System.LinkTypes.Successor",
            RelationType::Related => "System.LinkTypes.Related",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
