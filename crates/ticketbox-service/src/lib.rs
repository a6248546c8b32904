mod ado;
pub mod catalog;
mod http;
mod jira;
pub mod mock;
mod traits;

pub use ado::AdoService;
pub use catalog::{load_work_item_catalog, IssueSearch};
pub use jira::JiraService;
pub use traits::{IssueTracker, SearchPage, TrackerError, WorkItemTracker};
