use std::process::ExitCode;

use clap::Parser;
use ticketbox_cli::config::Cli;
use ticketbox_cli::error::{report_error, EX_USAGE};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too and are not failures
            let code = if e.use_stderr() { EX_USAGE } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let verbose = cli.verbose;
    match ticketbox_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = report_error(&mut std::io::stderr(), &e, verbose);
            ExitCode::from(e.exit_code())
        }
    }
}
