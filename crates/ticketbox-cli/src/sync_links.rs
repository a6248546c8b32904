use std::io::Write;

use ticketbox_core::{reconcile_issue, LinkOutcome, Reconciliation, SyncAction};
use ticketbox_service::{load_work_item_catalog, IssueSearch, IssueTracker, WorkItemTracker};
use tracing::info;

use crate::error::ToolError;
use crate::secrets::Prompt;
use crate::settings::{Settings, SyncSettings};
use crate::RunOptions;

/// `sync-links`: compare Jira issue links with the relations on ADO work items.
pub async fn run(
    settings: &Settings,
    options: RunOptions,
    prompt: &mut dyn Prompt,
) -> Result<Vec<Reconciliation>, ToolError> {
    let sync = settings.for_syncing()?;
    settings.check_jira_access()?;
    settings.check_ado_access()?;

    let jira = settings.jira_service(prompt, options.verbose).await?;
    let ado = settings.ado_service(prompt, options.verbose).await?;

    sync_links(
        &jira,
        &ado,
        &sync,
        options,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await
}

/// Classify every outward link of every in-scope issue.
///
/// Nothing is written to either tracker. Classified relations are reported on
/// `out` and returned; issues and links without a work-item counterpart are
/// reported on `err` and skipped.
pub async fn sync_links<W: Write, E: Write>(
    issues: &dyn IssueTracker,
    work_items: &dyn WorkItemTracker,
    sync: &SyncSettings,
    options: RunOptions,
    out: &mut W,
    err: &mut E,
) -> Result<Vec<Reconciliation>, ToolError> {
    let catalog = load_work_item_catalog(work_items, options.verbose).await?;
    writeln!(out, "{} ADO tickets", catalog.len())?;

    let mut results = Vec::new();
    let mut search = IssueSearch::new(issues, sync.jql.as_str());
    while let Some(issue) = search.next().await? {
        let Some(result) = reconcile_issue(&issue, &sync.issue_pattern, &catalog) else {
            continue;
        };
        report(&result, out, err)?;
        results.push(result);
    }

    let planned = results.iter().flat_map(Reconciliation::planned);
    let (keep, add) = planned.fold((0, 0), |(keep, add), p| match p.action {
        SyncAction::Keep => (keep + 1, add),
        SyncAction::Add => (keep, add + 1),
    });
    info!(issues = results.len(), keep, add, "sync-links done");

    Ok(results)
}

fn report<W: Write, E: Write>(
    result: &Reconciliation,
    out: &mut W,
    err: &mut E,
) -> std::io::Result<()> {
    match result {
        Reconciliation::Unmatched { issue_key } => {
            writeln!(out, "{issue_key}")?;
            writeln!(err, "ticket-toolbox: no ADO match for {issue_key}")?;
        }
        Reconciliation::Matched {
            issue_key,
            work_item_id,
            links,
        } => {
            writeln!(out, "{issue_key} (#{work_item_id})")?;
            for link in links {
                match link {
                    LinkOutcome::Unresolved { verb, target_key } => {
                        writeln!(err, "ticket-toolbox: no ADO match for {target_key} ({verb})")?;
                    }
                    LinkOutcome::Classified {
                        verb,
                        target_key,
                        planned,
                    } => {
                        let desc = format!(
                            "{} #{} ({verb} {target_key})",
                            planned.relation, planned.target_id
                        );
                        match planned.action {
                            SyncAction::Keep => writeln!(out, "  keep:  {desc}")?,
                            SyncAction::Add => writeln!(out, "  add:  {desc}")?,
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use ticketbox_core::{Issue, IssueLink, LinkType, Relation, RelationType, WorkItem};
    use ticketbox_service::mock::{MockIssueTracker, MockWorkItemTracker};

    fn url(id: u64) -> String {
        format!("https://ado.example/_apis/wit/workItems/{id}")
    }

    fn item(id: u64, title: &str, relations: Vec<Relation>) -> WorkItem {
        WorkItem {
            id,
            title: title.into(),
            url: url(id),
            relations,
        }
    }

    fn linked(key: &str, links: &[(&str, &str)]) -> Issue {
        Issue {
            outward_links: links
                .iter()
                .map(|(verb, target)| IssueLink {
                    link_type: LinkType::new(*verb, "inverse"),
                    target_key: (*target).into(),
                })
                .collect(),
            ..Issue::new(key)
        }
    }

    fn sync_settings() -> SyncSettings {
        SyncSettings {
            issue_pattern: Regex::new(r"ABC-\d+").unwrap(),
            jql: "ORDER BY key ASC".into(),
        }
    }

    async fn run_sync(
        issues: &MockIssueTracker,
        items: &MockWorkItemTracker,
    ) -> (Vec<Reconciliation>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let results = sync_links(
            issues,
            items,
            &sync_settings(),
            RunOptions::default(),
            &mut out,
            &mut err,
        )
        .await
        .unwrap();
        (
            results,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn unresolved_link_is_reported_but_issue_matches() {
        let issues = MockIssueTracker::new().with_issue(linked("ABC-1", &[("blocks", "ABC-2")]));
        let items = MockWorkItemTracker::new(vec![item(1, "ABC-1 login", vec![])]);

        let (results, out, err) = run_sync(&issues, &items).await;

        assert_eq!(out, "1 ADO tickets\nABC-1 (#1)\n");
        assert_eq!(err, "ticket-toolbox: no ADO match for ABC-2 (blocks)\n");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].planned().count(), 0);
    }

    #[tokio::test]
    async fn keep_and_add_are_reported() {
        let issues = MockIssueTracker::new()
            .with_issue(linked("ABC-1", &[("blocks", "ABC-2"), ("relates to", "ABC-3")]))
            .with_issue(linked("ABC-2", &[]))
            .with_issue(linked("XYZ-1", &[("blocks", "ABC-1")]));
        let items = MockWorkItemTracker::new(vec![
            item(17, "ABC-1 parent", vec![Relation::new("System.LinkTypes.Successor", url(18))]),
            item(18, "ABC-2 child", vec![]),
            item(19, "ABC-3 related", vec![]),
        ]);

        let (results, out, err) = run_sync(&issues, &items).await;

        assert_eq!(
            out,
            "3 ADO tickets\n\
             ABC-1 (#17)\n\
             \x20 keep:  System.LinkTypes.Successor #18 (blocks ABC-2)\n\
             \x20 add:  System.LinkTypes.Related #19 (relates to ABC-3)\n"
        );
        assert!(err.is_empty());

        let planned: Vec<_> = results[0].planned().map(|p| (p.relation, p.action)).collect();
        assert_eq!(
            planned,
            [
                (RelationType::Successor, SyncAction::Keep),
                (RelationType::Related, SyncAction::Add),
            ]
        );
    }

    #[tokio::test]
    async fn unmatched_issue_goes_to_both_streams() {
        let issues = MockIssueTracker::new().with_issue(linked("ABC-5", &[("clones", "ABC-1")]));
        let items = MockWorkItemTracker::new(vec![item(1, "ABC-1", vec![])]);

        let (results, out, err) = run_sync(&issues, &items).await;

        assert_eq!(out, "1 ADO tickets\nABC-5\n");
        assert_eq!(err, "ticket-toolbox: no ADO match for ABC-5\n");
        assert!(matches!(results[0], Reconciliation::Unmatched { .. }));
    }
}
