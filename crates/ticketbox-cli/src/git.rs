use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::anyhow;
use regex::Regex;
use ticketbox_core::{LogParser, Mention};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

use crate::error::ToolError;

/// Runs `git` in a fixed working directory.
#[derive(Debug, Clone, Default)]
pub struct Git {
    work_dir: Option<PathBuf>,
    verbose: bool,
}

impl Git {
    /// Git in the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(path: impl AsRef<Path>) -> Self {
        Self {
            work_dir: Some(path.as_ref().to_path_buf()),
            verbose: false,
        }
    }

    /// Echo each git invocation to stdout.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        if self.verbose {
            println!("+ git {}", args.join(" "));
        }
        debug!(?args, "git");

        let mut cmd = Command::new("git");
        cmd.args(args).stdin(Stdio::null());
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// `git config --get <key>`; `None` when unset or blank.
    pub async fn config(&self, key: &str) -> Result<Option<String>, ToolError> {
        let output = self
            .command(&["config", "--get", key])
            .stderr(Stdio::inherit())
            .output()
            .await?;

        match output.status.code() {
            Some(0) => {}
            // exit status 1: key not set
            Some(1) => return Ok(None),
            _ => return Err(ToolError::subprocess("git", output.status)),
        }

        let value = String::from_utf8_lossy(&output.stdout);
        Ok(value
            .lines()
            .next()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    /// Repository name derived from the `origin` remote URL.
    pub async fn origin_repo_name(&self) -> Result<String, ToolError> {
        let output = self
            .command(&["remote", "get-url", "origin"])
            .output()
            .await?;

        let url = String::from_utf8_lossy(&output.stdout);
        let url = url.lines().next().map(str::trim).unwrap_or_default();
        if !output.status.success() || url.is_empty() {
            return Err(anyhow!("can't get 'origin' remote").into());
        }
        Ok(repo_name_from_url(url).to_string())
    }

    /// Start `git log <refs>` and stream the issue mentions it contains.
    pub fn log_mentions(&self, refs: &[String], pattern: Regex) -> Result<MentionStream, ToolError> {
        let mut args = vec!["log"];
        args.extend(refs.iter().map(String::as_str));

        let mut child = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("git log stdout was not captured"))?;

        Ok(MentionStream {
            child,
            lines: BufReader::new(stdout).lines(),
            parser: LogParser::new(pattern),
            finished: false,
        })
    }
}

/// `https://host/org/repo.git` -> `repo`.
pub fn repo_name_from_url(url: &str) -> &str {
    let url = url.trim();
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.rsplit('/').next().unwrap_or(url)
}

/// Mentions read lazily from a running `git log`.
///
/// The exit status is checked only once stdout is exhausted, so a failing
/// git still yields every mention it printed before the error surfaces.
/// `ticketbox_core::Mentions` is the synchronous counterpart over in-memory
/// lines; both queue mentions through the same [`LogParser`].
pub struct MentionStream {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    parser: LogParser,
    finished: bool,
}

impl MentionStream {
    pub async fn next(&mut self) -> Result<Option<Mention>, ToolError> {
        loop {
            if let Some(mention) = self.parser.pop() {
                return Ok(Some(mention));
            }
            if self.finished {
                return Ok(None);
            }

            match self.lines.next_line().await? {
                Some(line) => self.parser.feed(&line),
                None => {
                    self.finished = true;
                    let status = self.child.wait().await?;
                    if !status.success() {
                        return Err(ToolError::subprocess("git", status));
                    }
                }
            }
        }
    }

    /// Drain the stream.
    pub async fn collect_all(mut self) -> Result<Vec<Mention>, ToolError> {
        let mut mentions = Vec::new();
        while let Some(mention) = self.next().await? {
            mentions.push(mention);
        }
        Ok(mentions)
    }
}
