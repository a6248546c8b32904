use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ticketbox_core::{Issue, WorkItem};

use crate::{IssueTracker, SearchPage, TrackerError, WorkItemTracker};

/// In-memory issue tracker that records posted comments.
///
/// A posted comment is appended to the stored issue, so a second run over the
/// same commits sees them as already mentioned.
pub struct MockIssueTracker {
    issues: Mutex<Vec<Issue>>,
    posted: Mutex<Vec<(String, String)>>,
    search_calls: AtomicUsize,
    post_fail: bool,
}

impl Default for MockIssueTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIssueTracker {
    pub fn new() -> Self {
        Self {
            issues: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            search_calls: AtomicUsize::new(0),
            post_fail: false,
        }
    }

    pub fn with_issue(self, issue: Issue) -> Self {
        self.insert_issue(issue);
        self
    }

    pub fn with_post_fail(mut self) -> Self {
        self.post_fail = true;
        self
    }

    pub fn insert_issue(&self, issue: Issue) {
        let mut issues = self.issues.lock().unwrap();
        issues.retain(|i| i.key != issue.key);
        issues.push(issue);
    }

    /// `(issue key, body)` for every accepted comment, in order.
    pub fn posted_comments(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueTracker for MockIssueTracker {
    async fn get_issue(&self, key: &str) -> Result<Option<Issue>, TrackerError> {
        let issues = self.issues.lock().unwrap();
        Ok(issues.iter().find(|i| i.key == key).cloned())
    }

    async fn post_comment(&self, key: &str, body: &str) -> Result<(), TrackerError> {
        if self.post_fail {
            return Err(TrackerError::Transport {
                context: format!("Failed to post comment on {key}"),
                status: 500,
                body: "mock post failure".into(),
            });
        }
        let mut issues = self.issues.lock().unwrap();
        let Some(issue) = issues.iter_mut().find(|i| i.key == key) else {
            return Err(TrackerError::Transport {
                context: format!("Failed to post comment on {key}"),
                status: 404,
                body: String::new(),
            });
        };
        issue.comments.push(body.to_string());
        self.posted
            .lock()
            .unwrap()
            .push((key.to_string(), body.to_string()));
        Ok(())
    }

    async fn search_issues(
        &self,
        _jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage, TrackerError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let issues = self.issues.lock().unwrap();
        Ok(SearchPage {
            total: issues.len(),
            issues: issues
                .iter()
                .skip(start_at)
                .take(max_results)
                .cloned()
                .collect(),
        })
    }
}

/// In-memory work-item tracker; every query returns all items.
pub struct MockWorkItemTracker {
    items: Vec<WorkItem>,
    batches: Mutex<Vec<Vec<u64>>>,
}

impl MockWorkItemTracker {
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Id lists passed to `get_work_items`, in call order.
    pub fn requested_batches(&self) -> Vec<Vec<u64>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkItemTracker for MockWorkItemTracker {
    async fn query_ids(&self, _query: &str) -> Result<Vec<u64>, TrackerError> {
        Ok(self.items.iter().map(|w| w.id).collect())
    }

    async fn get_work_items(&self, ids: &[u64]) -> Result<Vec<WorkItem>, TrackerError> {
        self.batches.lock().unwrap().push(ids.to_vec());
        Ok(self
            .items
            .iter()
            .filter(|w| ids.contains(&w.id))
            .cloned()
            .collect())
    }
}
