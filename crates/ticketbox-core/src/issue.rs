use serde::{Deserialize, Serialize};

use crate::commit::Commit;

/// Verb pair describing a directed issue link, e.g. "blocks" / "is blocked by".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType {
    pub outward: String,
    pub inward: String,
}

impl LinkType {
    pub fn new(outward: impl Into<String>, inward: impl Into<String>) -> Self {
        Self {
            outward: outward.into(),
            inward: inward.into(),
        }
    }
}

/// A link from one source-tracker issue to another, by key only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    pub link_type: LinkType,
    pub target_key: String,
}

/// An issue as fetched from the source tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub comments: Vec<String>,
    pub outward_links: Vec<IssueLink>,
}

/// Result of checking candidate commits against an issue's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionFilter {
    pub already_mentioned: Vec<Commit>,
    pub to_mention: Vec<Commit>,
}

impl MentionFilter {
    pub fn is_empty(&self) -> bool {
        self.to_mention.is_empty()
    }
}

impl Issue {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Description (if any) followed by every comment body.
    pub fn all_text(&self) -> impl Iterator<Item = &str> {
        self.description
            .as_deref()
            .into_iter()
            .chain(self.comments.iter().map(String::as_str))
    }

    /// Whether the commit's short hash occurs anywhere in the issue text.
    ///
    /// Each fragment is searched on its own. A hex short hash cannot straddle
    /// two fragments, so this is the same as searching their concatenation.
    /// Known limitation: any text that happens to contain the same eight
    /// characters counts as a mention.
    pub fn mentions_commit(&self, commit: &Commit) -> bool {
        let needle = commit.short_hash();
        self.all_text().any(|text| text.contains(needle))
    }

    /// Split candidates into already-mentioned and to-mention, keeping order.
    pub fn filter_commits<'a, I>(&self, commits: I) -> MentionFilter
    where
        I: IntoIterator<Item = &'a Commit>,
    {
        let mut filter = MentionFilter::default();
        for commit in commits {
            if self.mentions_commit(commit) {
                filter.already_mentioned.push(commit.clone());
            } else {
                filter.to_mention.push(commit.clone());
            }
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits() -> Vec<Commit> {
        vec![
            Commit::with_title("aaaa1111ffff", "first"),
            Commit::with_title("bbbb2222ffff", "second"),
            Commit::with_title("cccc3333ffff", "third"),
        ]
    }

    #[test]
    fn all_text_is_description_then_comments() {
        let issue = Issue {
            description: Some("desc".into()),
            comments: vec!["one".into(), "two".into()],
            ..Issue::new("ABC-1")
        };
        let text: Vec<&str> = issue.all_text().collect();
        assert_eq!(text, ["desc", "one", "two"]);
    }

    #[test]
    fn all_text_without_description() {
        let issue = Issue {
            comments: vec!["only".into()],
            ..Issue::new("ABC-1")
        };
        assert_eq!(issue.all_text().collect::<Vec<_>>(), ["only"]);
    }

    #[test]
    fn commits_found_in_comments_are_already_mentioned() {
        let issue = Issue {
            description: Some("see bbbb2222 for details".into()),
            comments: vec!["Related commits:\n * [cccc3333 - third|x]".into()],
            ..Issue::new("ABC-1")
        };
        let filter = issue.filter_commits(&commits());
        assert_eq!(filter.to_mention, vec![commits()[0].clone()]);
        assert_eq!(
            filter.already_mentioned,
            vec![commits()[1].clone(), commits()[2].clone()]
        );
    }

    #[test]
    fn empty_issue_mentions_nothing() {
        let issue = Issue::new("ABC-1");
        let filter = issue.filter_commits(&commits());
        assert_eq!(filter.to_mention, commits());
        assert!(filter.already_mentioned.is_empty());
        assert!(!filter.is_empty());
    }

    #[test]
    fn full_hash_match_is_not_required() {
        let issue = Issue {
            comments: vec!["aaaa1111".into()],
            ..Issue::new("ABC-1")
        };
        assert!(issue.mentions_commit(&commits()[0]));
    }
}
