use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::commit::Commit;

/// An issue key found in a commit message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub commit: Commit,
    pub issue_key: String,
}

impl Mention {
    pub fn new(commit: Commit, issue_key: impl Into<String>) -> Self {
        Self {
            commit,
            issue_key: issue_key.into(),
        }
    }
}

/// All distinct commits that mention one issue key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueGroup {
    pub issue_key: String,
    pub commits: Vec<Commit>,
}

/// Group mentions by exact issue key.
///
/// Groups come out in the order their key was first seen. Inside a group a
/// commit appears once, at the position of its first mention.
pub fn group_mentions<I>(mentions: I) -> Vec<IssueGroup>
where
    I: IntoIterator<Item = Mention>,
{
    let mut groups: Vec<IssueGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen: Vec<HashSet<String>> = Vec::new();

    for mention in mentions {
        let slot = match index.get(&mention.issue_key) {
            Some(&slot) => slot,
            None => {
                let slot = groups.len();
                index.insert(mention.issue_key.clone(), slot);
                groups.push(IssueGroup {
                    issue_key: mention.issue_key,
                    commits: Vec::new(),
                });
                seen.push(HashSet::new());
                slot
            }
        };

        if seen[slot].insert(mention.commit.hash.clone()) {
            groups[slot].commits.push(mention.commit);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(hash: &str, key: &str) -> Mention {
        Mention::new(Commit::with_title(hash, format!("commit {hash}")), key)
    }

    #[test]
    fn groups_keep_first_seen_key_order() {
        let groups = group_mentions(vec![
            mention("aaaa1111", "ABC-1"),
            mention("bbbb2222", "XYZ-2"),
            mention("cccc3333", "ABC-1"),
        ]);

        let keys: Vec<&str> = groups.iter().map(|g| g.issue_key.as_str()).collect();
        assert_eq!(keys, ["ABC-1", "XYZ-2"]);

        let abc: Vec<&str> = groups[0].commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(abc, ["aaaa1111", "cccc3333"]);
    }

    #[test]
    fn commit_mentioned_twice_for_same_key_appears_once() {
        let groups = group_mentions(vec![
            mention("aaaa1111", "ABC-1"),
            mention("bbbb2222", "ABC-1"),
            mention("aaaa1111", "ABC-1"),
        ]);

        assert_eq!(groups.len(), 1);
        let hashes: Vec<&str> = groups[0].commits.iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(hashes, ["aaaa1111", "bbbb2222"]);
    }

    #[test]
    fn keys_are_case_sensitive() {
        let groups = group_mentions(vec![
            mention("aaaa1111", "ABC-1"),
            mention("aaaa1111", "abc-1"),
        ]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn same_commit_can_appear_in_several_groups() {
        let groups = group_mentions(vec![
            mention("aaaa1111", "ABC-1"),
            mention("aaaa1111", "ABC-2"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].commits, groups[1].commits);
    }

    #[test]
    fn no_mentions_no_groups() {
        assert!(group_mentions(Vec::new()).is_empty());
    }
}
