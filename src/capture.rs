//! Acquiring raw help text from a tool.

use std::io;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Seconds to wait for `<tool> --help` before giving up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const HELP_FLAG: &str = "--help";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to launch `{tool}`: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read help output from `{tool}`: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("`{tool} --help` did not finish within {secs}s")]
    Timeout { tool: String, secs: u64 },
}

/// Something that can produce the help text for a tool.
pub trait HelpSource {
    /// Returns the help output for `tool`, with `args` placed before `--help`.
    async fn capture(&self, tool: &str, args: &[String]) -> Result<String, CaptureError>;
}

/// Runs the tool as a child process and returns stdout followed by stderr.
///
/// The child's exit status is ignored; plenty of tools exit non-zero after printing help.
#[derive(Debug, Clone)]
pub struct ProcessHelp {
    timeout: Duration,
}

impl ProcessHelp {
    pub fn new(timeout: Duration) -> Self {
        ProcessHelp { timeout }
    }
}

impl Default for ProcessHelp {
    fn default() -> Self {
        ProcessHelp::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl HelpSource for ProcessHelp {
    async fn capture(&self, tool: &str, args: &[String]) -> Result<String, CaptureError> {
        let mut command = Command::new(tool);
        command
            .args(args)
            .arg(HELP_FLAG)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(tool, ?args, "Capturing help output");
        let child = command.spawn().map_err(|source| CaptureError::Launch {
            tool: tool.to_string(),
            source,
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| CaptureError::Io {
                tool: tool.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(CaptureError::Timeout {
                    tool: tool.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        debug!(
            tool,
            status = ?output.status.code(),
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "Help command finished"
        );

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
