use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::issue::Issue;
use crate::relation::RelationType;
use crate::work_item::WorkItemCatalog;

/// Verdict for one desired relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Relation already exists on the source work item.
    Keep,
    /// Relation is missing.
    Add,
}

impl SyncAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncAction::Keep => "keep",
            SyncAction::Add => "add",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relation the target tracker should carry, with its classification.
///
/// Nothing in this crate writes `Add` relations; callers that want to create
/// them have everything they need here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedRelation {
    pub source_id: u64,
    pub relation: RelationType,
    pub target_id: u64,
    pub target_url: String,
    pub action: SyncAction,
}

/// What happened to one outward link of a source issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkOutcome {
    /// The linked issue has no work-item counterpart; the link is skipped.
    Unresolved { verb: String, target_key: String },
    Classified {
        verb: String,
        target_key: String,
        planned: PlannedRelation,
    },
}

/// Reconciliation result for one source issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconciliation {
    /// No work item carries this issue's key; the issue is skipped.
    Unmatched { issue_key: String },
    Matched {
        issue_key: String,
        work_item_id: u64,
        links: Vec<LinkOutcome>,
    },
}

impl Reconciliation {
    /// Relations that were classified, in link order.
    pub fn planned(&self) -> impl Iterator<Item = &PlannedRelation> {
        let links: &[LinkOutcome] = match self {
            Reconciliation::Unmatched { .. } => &[],
            Reconciliation::Matched { links, .. } => links.as_slice(),
        };
        links.iter().filter_map(|outcome| match outcome {
            LinkOutcome::Classified { planned, .. } => Some(planned),
            LinkOutcome::Unresolved { .. } => None,
        })
    }
}

/// Classify the outward links of `issue` against the target catalog.
///
/// Returns `None` when the issue is out of scope: its key does not match
/// `issue_pattern` or it has no outward links.
pub fn reconcile_issue(
    issue: &Issue,
    issue_pattern: &Regex,
    catalog: &WorkItemCatalog,
) -> Option<Reconciliation> {
    if !issue_pattern.is_match(&issue.key) || issue.outward_links.is_empty() {
        return None;
    }

    let Some(source) = catalog.find_by_issue_key(&issue.key) else {
        return Some(Reconciliation::Unmatched {
            issue_key: issue.key.clone(),
        });
    };

    let links = issue
        .outward_links
        .iter()
        .map(|link| {
            let verb = link.link_type.outward.clone();
            let target_key = link.target_key.clone();

            let Some(target) = catalog.find_by_issue_key(&link.target_key) else {
                return LinkOutcome::Unresolved { verb, target_key };
            };

            let relation = RelationType::from_link_verb(&verb);
            let action = if source.has_relation(relation.as_str(), &target.url) {
                SyncAction::Keep
            } else {
                SyncAction::Add
            };

            LinkOutcome::Classified {
                verb,
                target_key,
                planned: PlannedRelation {
                    source_id: source.id,
                    relation,
                    target_id: target.id,
                    target_url: target.url.clone(),
                    action,
                },
            }
        })
        .collect();

    Some(Reconciliation::Matched {
        issue_key: issue.key.clone(),
        work_item_id: source.id,
        links,
    })
}
