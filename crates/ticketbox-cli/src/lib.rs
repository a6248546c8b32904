pub mod config;
pub mod error;
pub mod git;
pub mod link_commits;
pub mod secrets;
pub mod settings;
pub mod sync_links;

use config::{Cli, Commands};
use error::ToolError;
use git::Git;
use secrets::StdinPrompt;
use settings::Settings;

/// Switches shared by every tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Echo outbound calls, git invocations and composed comments to stdout.
    pub verbose: bool,
    /// Do everything except write to a tracker.
    pub dry_run: bool,
}

/// Run the selected tool against the repository in the current directory.
pub async fn run(cli: Cli) -> Result<(), ToolError> {
    let options = RunOptions {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    };
    let git = Git::new().with_verbose(options.verbose);
    let settings = Settings::load(&git, &cli.credentials).await?;
    let mut prompt = StdinPrompt::new();

    match cli.command {
        Commands::LinkCommits { refs } => {
            link_commits::run(&git, &settings, &refs, options, &mut prompt).await?;
        }
        Commands::SyncLinks => {
            sync_links::run(&settings, options, &mut prompt).await?;
        }
    }
    Ok(())
}
