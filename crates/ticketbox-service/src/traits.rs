use async_trait::async_trait;
use thiserror::Error;
use ticketbox_core::{Issue, WorkItem};

#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker answered with a non-success status.
    #[error("{context} (HTTP {status})")]
    Transport {
        context: String,
        status: u16,
        body: String,
    },

    #[error("request failed: {0}")]
    Request(String),

    #[error("json decode: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// One page of an offset-paginated issue search.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub total: usize,
    pub issues: Vec<Issue>,
}

/// The issue tracker commits are linked to (Jira).
///
/// `JiraService` talks to a real instance; `mock::MockIssueTracker` keeps
/// everything in memory for tests.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch summary, description and comments. `Ok(None)` when the key does
    /// not exist.
    async fn get_issue(&self, key: &str) -> Result<Option<Issue>, TrackerError>;

    async fn post_comment(&self, key: &str, body: &str) -> Result<(), TrackerError>;

    /// One page of issues with their outward links.
    async fn search_issues(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage, TrackerError>;
}

/// The tracker issue links are mirrored into (Azure DevOps). Read-only.
#[async_trait]
pub trait WorkItemTracker: Send + Sync {
    /// Run a work-item query and return the matching ids.
    async fn query_ids(&self, query: &str) -> Result<Vec<u64>, TrackerError>;

    /// Full records, relations included, for at most one batch of ids.
    async fn get_work_items(&self, ids: &[u64]) -> Result<Vec<WorkItem>, TrackerError>;
}
