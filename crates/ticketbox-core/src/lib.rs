pub mod comment;
pub mod commit;
pub mod error;
pub mod issue;
pub mod log_parser;
pub mod mention;
pub mod reconcile;
pub mod relation;
pub mod work_item;

pub use comment::{compose_comment, CommitLinkTemplate};
pub use commit::Commit;
pub use error::CoreError;
pub use issue::{Issue, IssueLink, LinkType, MentionFilter};
pub use log_parser::{LogParser, Mentions};
pub use mention::{group_mentions, IssueGroup, Mention};
pub use reconcile::{reconcile_issue, LinkOutcome, PlannedRelation, Reconciliation, SyncAction};
pub use relation::RelationType;
pub use work_item::{Relation, WorkItem, WorkItemCatalog};
