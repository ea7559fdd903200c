//! Frontmost application probe
//!
//! Asks System Events for the frontmost process and checks whether it is the
//! terminal we are running in. A single sample per call, no polling.

use crate::shell::CommandRunner;

use super::app_name::{is_alias, normalize};

const OSASCRIPT: &str = "osascript";

const FRONTMOST_SCRIPT: &str =
    r#"tell application "System Events" to get name of first application process whose frontmost is true"#;

pub struct FrontmostProbe<R> {
    runner: R,
}

impl<R: CommandRunner> FrontmostProbe<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Name of the frontmost application as reported by the OS
    pub async fn frontmost_app(&self) -> crate::errors::Result<String> {
        self.runner
            .run(OSASCRIPT, &["-e".to_string(), FRONTMOST_SCRIPT.to_string()])
            .await
    }

    /// Whether the terminal identified by `terminal_program` is the frontmost
    /// application.
    ///
    /// Unknown terminal identity or a failed OS query both yield `false`,
    /// so callers fall through to notifying.
    pub async fn is_current_terminal_frontmost(&self, terminal_program: Option<&str>) -> bool {
        let terminal = normalize(terminal_program);
        if terminal.is_empty() {
            tracing::debug!("No terminal identity, cannot be frontmost");
            return false;
        }

        match self.frontmost_app().await {
            Ok(name) => is_frontmost(&terminal, &name),
            Err(e) => {
                tracing::debug!(error = %e, "Frontmost app query failed");
                false
            }
        }
    }
}

/// Match a frontmost application name against a canonical terminal key
pub fn is_frontmost(terminal_key: &str, frontmost_app: &str) -> bool {
    if terminal_key.is_empty() {
        return false;
    }
    let frontmost = normalize(Some(frontmost_app));
    let matched = is_alias(terminal_key, &frontmost);
    tracing::debug!(
        terminal = %terminal_key,
        frontmost = %frontmost,
        matched,
        "Frontmost check"
    );
    matched
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::{FocusbellError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runner that answers the frontmost query with a fixed result
    pub(crate) struct FrontmostRunner {
        pub answer: Option<&'static str>,
        pub calls: AtomicUsize,
    }

    impl FrontmostRunner {
        pub fn answering(answer: &'static str) -> Self {
            Self {
                answer: Some(answer),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                answer: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for FrontmostRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<String> {
            assert_eq!(program, OSASCRIPT);
            assert_eq!(args[1], FRONTMOST_SCRIPT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map(str::to_string)
                .ok_or_else(|| FocusbellError::CommandFailed {
                    program: program.to_string(),
                    code: 1,
                    stderr: "not authorized to send Apple events".to_string(),
                })
        }
    }

    #[tokio::test]
    async fn test_empty_identity_skips_query() {
        let runner = FrontmostRunner::answering("iTerm2");
        let probe = FrontmostProbe::new(&runner);
        assert!(!probe.is_current_terminal_frontmost(None).await);
        assert!(!probe.is_current_terminal_frontmost(Some("..")).await);

        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_failure_is_not_frontmost() {
        let runner = FrontmostRunner::failing();
        let probe = FrontmostProbe::new(&runner);
        assert!(!probe.is_current_terminal_frontmost(Some("iTerm.app")).await);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_alias_match_is_frontmost() {
        let runner = FrontmostRunner::answering("iTerm2");
        let probe = FrontmostProbe::new(&runner);
        assert!(probe.is_current_terminal_frontmost(Some("iTerm.app")).await);

        let runner = FrontmostRunner::answering("Code");
        let probe = FrontmostProbe::new(&runner);
        assert!(probe.is_current_terminal_frontmost(Some("vscode")).await);
    }

    #[tokio::test]
    async fn test_other_app_is_not_frontmost() {
        let runner = FrontmostRunner::answering("Safari");
        let probe = FrontmostProbe::new(&runner);
        assert!(!probe.is_current_terminal_frontmost(Some("WezTerm")).await);
    }

    #[test]
    fn test_is_frontmost_needs_identity() {
        assert!(is_frontmost("iterm", "iTerm2"));
        assert!(!is_frontmost("", ""));
        assert!(!is_frontmost("", "iTerm2"));
    }

    #[tokio::test]
    async fn test_unknown_terminal_falls_back_to_exact_match() {
        let runner = FrontmostRunner::answering("Foot");
        let probe = FrontmostProbe::new(&runner);
        assert!(probe.is_current_terminal_frontmost(Some("foot")).await);
    }
}
