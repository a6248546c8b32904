use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "ticket-toolbox",
    version,
    about = "Link git commits to Jira issues and mirror Jira links into Azure DevOps"
)]
pub struct Cli {
    /// Echo outbound calls and composed comments
    #[arg(short = 'v', long = "interactive", global = true)]
    pub verbose: bool,

    /// Report what would be done without posting anything
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    #[command(flatten)]
    pub credentials: Credentials,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tracker credentials. Secrets left unset are resolved through
/// `{VAR}_COMMAND` or an interactive prompt.
#[derive(Debug, Clone, Default, Args)]
pub struct Credentials {
    /// Jira user name
    #[arg(long, env = "JIRA_USER", global = true, hide_env_values = true)]
    pub jira_user: Option<String>,

    /// Jira API token or password
    #[arg(long, env = "JIRA_SECRET", global = true, hide_env_values = true)]
    pub jira_secret: Option<String>,

    /// Azure DevOps personal access token
    #[arg(long, env = "ADO_PAT", global = true, hide_env_values = true)]
    pub ado_pat: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Comment on every Jira issue mentioned in the git log with links to its commits
    LinkCommits {
        /// Revisions passed to `git log` (defaults to HEAD)
        refs: Vec<String>,
    },
    /// Compare Jira issue links with Azure DevOps work item relations
    SyncLinks,
}
