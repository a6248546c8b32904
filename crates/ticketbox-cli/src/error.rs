use std::io::{self, Write};

use thiserror::Error;
use ticketbox_service::TrackerError;

/// EX_USAGE from sysexits.h.
pub const EX_USAGE: u8 = 64;
/// Exit status xargs uses for a failed child.
pub const EX_SUBPROCESS: u8 = 123;

pub const USAGE: &str = "Usage: ticket-toolbox [-v] [-n] link-commits [refs] | sync-links";

#[derive(Debug, Error)]
pub enum ToolError {
    /// Bad arguments or missing configuration.
    #[error("{0}")]
    Usage(String),

    #[error("{program} exited with status {status}")]
    Subprocess { program: String, status: String },

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    pub fn usage(msg: impl Into<String>) -> Self {
        ToolError::Usage(msg.into())
    }

    pub fn subprocess(program: &str, status: std::process::ExitStatus) -> Self {
        let status = match status.code() {
            Some(code) => code.to_string(),
            None => status.to_string(),
        };
        ToolError::Subprocess {
            program: program.to_string(),
            status,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Usage(_) => EX_USAGE,
            ToolError::Subprocess { .. } => EX_SUBPROCESS,
            _ => 1,
        }
    }
}

/// Print `err` the way the tool reports failures on stderr.
///
/// Tracker status errors are preceded by the HTTP status and, when verbose,
/// the response body.
pub fn report_error<W: Write>(out: &mut W, err: &ToolError, verbose: bool) -> io::Result<()> {
    if let ToolError::Tracker(TrackerError::Transport { status, body, .. }) = err {
        writeln!(out, "< HTTP {status}")?;
        writeln!(out, "<")?;
        if verbose {
            for line in body.split('\n') {
                writeln!(out, "< {line}")?;
            }
        }
    }

    writeln!(out, "ticket-toolbox: {err}")?;
    if matches!(err, ToolError::Usage(_)) {
        writeln!(out, "{USAGE}")?;
    }
    Ok(())
}
