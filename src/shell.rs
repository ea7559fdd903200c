//! Process execution capability
//!
//! Every external query (osascript, tmux) and the audio player go through
//! [`CommandRunner`] so probes can be exercised against canned output in tests.
//! No timeout is applied: a hung query is treated as a slow success.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::errors::{FocusbellError, Result};

/// Runs an external program and returns its trimmed stdout.
///
/// A non-zero exit status is an error.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

#[async_trait]
impl<'a, T: CommandRunner + ?Sized> CommandRunner for &'a T {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        (**self).run(program, args).await
    }
}

/// Real runner backed by `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| FocusbellError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(FocusbellError::CommandFailed {
                program: program.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::trace!(program = %program, ?args, stdout = %stdout, "Command finished");
        Ok(stdout)
    }
}
