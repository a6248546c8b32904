use std::io::Write;

use ticketbox_core::{compose_comment, group_mentions, CommitLinkTemplate, IssueGroup};
use ticketbox_service::IssueTracker;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::git::Git;
use crate::secrets::Prompt;
use crate::settings::Settings;
use crate::RunOptions;

/// Counts for one linking run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSummary {
    pub issues: usize,
    pub not_found: usize,
    pub up_to_date: usize,
    pub comments: usize,
}

/// `link-commits [refs...]`: read the log, then comment on each mentioned issue.
pub async fn run(
    git: &Git,
    settings: &Settings,
    refs: &[String],
    options: RunOptions,
    prompt: &mut dyn Prompt,
) -> Result<LinkSummary, ToolError> {
    if let Some(bad) = refs.iter().find(|r| r.starts_with('-')) {
        return Err(ToolError::usage(format!("bad ref name: {bad}")));
    }

    let linking = settings.for_linking()?;
    settings.check_jira_access()?;
    let repo_name = git.origin_repo_name().await?;
    let jira = settings.jira_service(prompt, options.verbose).await?;

    let mentions = git
        .log_mentions(refs, linking.issue_pattern)?
        .collect_all()
        .await?;
    let groups = group_mentions(mentions);
    debug!(issues = groups.len(), "grouped mentions");

    let summary = link_groups(
        &jira,
        &groups,
        &repo_name,
        &linking.link_template,
        options,
        &mut std::io::stdout(),
    )
    .await?;
    info!(?summary, "link-commits done");
    Ok(summary)
}

/// Comment on every issue in `groups` with the commits it does not mention yet.
///
/// Issues are handled in group order. The report goes to `out`; posting is
/// skipped on a dry run but everything else, reporting included, still happens.
pub async fn link_groups<W: Write>(
    tracker: &dyn IssueTracker,
    groups: &[IssueGroup],
    repo_name: &str,
    template: &CommitLinkTemplate,
    options: RunOptions,
    out: &mut W,
) -> Result<LinkSummary, ToolError> {
    let mut summary = LinkSummary::default();

    for group in groups {
        summary.issues += 1;

        let Some(issue) = tracker.get_issue(&group.issue_key).await? else {
            writeln!(out, "{} (not found)", group.issue_key)?;
            summary.not_found += 1;
            continue;
        };

        writeln!(
            out,
            "{} {}",
            group.issue_key,
            issue.summary.as_deref().unwrap_or("(no title)")
        )?;

        let filter = issue.filter_commits(&group.commits);
        for commit in &filter.already_mentioned {
            writeln!(out, "  already mentioned: {commit}")?;
        }

        if filter.is_empty() {
            writeln!(out, "  nothing to do for issue")?;
            summary.up_to_date += 1;
            continue;
        }

        for commit in &filter.to_mention {
            writeln!(out, "  {commit}")?;
        }

        let body = compose_comment(repo_name, &filter.to_mention, template);
        if options.verbose {
            writeln!(out)?;
            writeln!(out, "{body}")?;
        }

        if options.dry_run {
            continue;
        }

        tracker.post_comment(&group.issue_key, &body).await?;
        summary.comments += 1;
    }

    Ok(summary)
}
