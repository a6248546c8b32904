use serde::{Deserialize, Serialize};

/// An existing relation on a work item: reference name plus target URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub rel: String,
    pub url: String,
}

impl Relation {
    pub fn new(rel: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            url: url.into(),
        }
    }
}

/// A work item in the target tracker.
///
/// `url` is the item's canonical API URL; relations on other items point at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub relations: Vec<Relation>,
}

impl WorkItem {
    pub fn has_relation(&self, rel: &str, url: &str) -> bool {
        self.relations.iter().any(|r| r.rel == rel && r.url == url)
    }
}

/// Every work item of the target tracker, held in memory for repeated lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkItemCatalog {
    items: Vec<WorkItem>,
}

impl WorkItemCatalog {
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First work item whose title contains `issue_key`.
    ///
    /// Titles only embed the key as free text, so several items can match
    /// (e.g. "ABC-1" inside "ABC-12"). The first one in load order wins.
    pub fn find_by_issue_key(&self, issue_key: &str) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.title.contains(issue_key))
    }
}
