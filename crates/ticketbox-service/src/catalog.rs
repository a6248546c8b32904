use std::collections::VecDeque;

use ticketbox_core::{Issue, WorkItemCatalog};
use tracing::debug;

use crate::{IssueTracker, TrackerError, WorkItemTracker};

/// Upper bound on ids per work-item fetch.
pub const WORK_ITEM_BATCH_SIZE: usize = 100;

pub const ALL_WORK_ITEMS_QUERY: &str = "select [Id] from WorkItems";

pub const SEARCH_PAGE_SIZE: usize = 50;

/// Load every work item, relations included, into memory.
pub async fn load_work_item_catalog(
    tracker: &dyn WorkItemTracker,
    verbose: bool,
) -> Result<WorkItemCatalog, TrackerError> {
    if verbose {
        println!("ADO: get ticket IDs");
    }
    let ids = tracker.query_ids(ALL_WORK_ITEMS_QUERY).await?;
    debug!(count = ids.len(), "work item ids");

    let mut items = Vec::with_capacity(ids.len());
    for (i, batch) in ids.chunks(WORK_ITEM_BATCH_SIZE).enumerate() {
        if verbose {
            println!("ADO: get ticket batch {i}");
        }
        items.extend(tracker.get_work_items(batch).await?);
    }

    Ok(WorkItemCatalog::new(items))
}

/// Lazily pages through an issue search.
///
/// The total reported by the first page bounds the walk; an empty page ends
/// it early so a shrinking result set cannot loop forever.
pub struct IssueSearch<'a> {
    tracker: &'a dyn IssueTracker,
    jql: String,
    page_size: usize,
    start_at: usize,
    total: Option<usize>,
    buffered: VecDeque<Issue>,
    exhausted: bool,
}

impl<'a> IssueSearch<'a> {
    pub fn new(tracker: &'a dyn IssueTracker, jql: impl Into<String>) -> Self {
        Self {
            tracker,
            jql: jql.into(),
            page_size: SEARCH_PAGE_SIZE,
            start_at: 0,
            total: None,
            buffered: VecDeque::new(),
            exhausted: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn next(&mut self) -> Result<Option<Issue>, TrackerError> {
        loop {
            if let Some(issue) = self.buffered.pop_front() {
                return Ok(Some(issue));
            }
            if self.exhausted {
                return Ok(None);
            }
            if matches!(self.total, Some(total) if self.start_at >= total) {
                self.exhausted = true;
                return Ok(None);
            }

            let page = self
                .tracker
                .search_issues(&self.jql, self.start_at, self.page_size)
                .await?;
            debug!(
                start_at = self.start_at,
                returned = page.issues.len(),
                total = page.total,
                "issue search page"
            );

            if self.total.is_none() {
                self.total = Some(page.total);
            }
            if page.issues.is_empty() {
                self.exhausted = true;
                return Ok(None);
            }
            self.start_at += page.issues.len();
            self.buffered.extend(page.issues);
        }
    }
}
