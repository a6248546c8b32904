use std::io::{self, Write};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::process::Command;
use tracing::warn;

use crate::error::ToolError;

/// A secret read from the environment, with a human-readable name for prompts.
#[derive(Debug, Clone, Copy)]
pub struct SecretSpec {
    pub env_name: &'static str,
    pub friendly_name: &'static str,
}

pub const JIRA_SECRET: SecretSpec = SecretSpec {
    env_name: "JIRA_SECRET",
    friendly_name: "Jira client secret",
};

pub const ADO_PAT: SecretSpec = SecretSpec {
    env_name: "ADO_PAT",
    friendly_name: "ADO PAT",
};

impl SecretSpec {
    /// Name of the variable holding a command that prints the secret.
    pub fn command_var(&self) -> String {
        format!("{}_COMMAND", self.env_name)
    }

    pub fn command_from_env(&self) -> Option<String> {
        std::env::var(self.command_var()).ok()
    }
}

/// Source of interactive answers.
#[async_trait]
pub trait Prompt: Send {
    /// Show `label` and read one line. `Ok(None)` at end of input.
    async fn ask(&mut self, label: &str) -> io::Result<Option<String>>;
}

/// Prompts on stdout and reads answers from stdin.
pub struct StdinPrompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for StdinPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl Prompt for StdinPrompt {
    async fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        print!("{label}: ");
        io::stdout().flush()?;
        self.lines.next_line().await
    }
}

/// Resolve a secret: the configured value, else the first line printed by
/// `command`, else whatever the user types.
///
/// A failing or silent command is reported on stderr and falls through to
/// the prompt. Blank answers are asked again; end of input is a usage error.
pub async fn resolve_secret(
    secret: SecretSpec,
    value: Option<String>,
    command: Option<String>,
    prompt: &mut dyn Prompt,
    verbose: bool,
) -> Result<String, ToolError> {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(value);
    }

    if let Some(command) = command {
        if let Some(found) = run_secret_command(&command, verbose).await {
            return Ok(found);
        }
    }

    loop {
        match prompt.ask(secret.friendly_name).await? {
            Some(answer) if !answer.trim().is_empty() => return Ok(answer),
            Some(_) => continue,
            None => return Err(ToolError::usage(format!("{} must be set", secret.env_name))),
        }
    }
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/c", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

async fn run_secret_command(command: &str, verbose: bool) -> Option<String> {
    if verbose {
        println!("+ {command}");
    }

    let output = shell(command)
        .stdin(Stdio::inherit())
        .stderr(Stdio::inherit())
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            warn!(%command, "secret command failed to start: {e}");
            eprintln!("ticket-toolbox: '{command}' could not be run: {e}");
            return None;
        }
    };

    if !output.status.success() {
        let status = match output.status.code() {
            Some(code) => code.to_string(),
            None => output.status.to_string(),
        };
        warn!(%command, %status, "secret command failed");
        eprintln!("ticket-toolbox: '{command}' returned non-zero exit code {status}");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.lines().next().map(str::trim_end) {
        Some(line) if !line.trim().is_empty() => Some(line.to_string()),
        _ => {
            warn!(%command, "secret command printed nothing");
            eprintln!("ticket-toolbox: '{command}' returned no data");
            None
        }
    }
}
