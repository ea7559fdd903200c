//! Tmux pane focus probe
//!
//! A pane counts as focused only when it is the active pane of its window
//! *and* that window is the active window of the session. Both are read with
//! `display-message -p` which prints "1" or "0".

use crate::shell::CommandRunner;

/// Result of asking tmux about a pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneFocus {
    Focused,
    Unfocused,
    /// tmux could not answer (server gone, pane closed)
    Unknown,
}

impl PaneFocus {
    pub fn is_focused(self) -> bool {
        self == Self::Focused
    }
}

/// Asks a tmux server whether a pane is focused
pub struct TmuxProbe<R> {
    runner: R,
    tmux_bin: String,
}

impl<R: CommandRunner> TmuxProbe<R> {
    pub fn new(runner: R, tmux_bin: impl Into<String>) -> Self {
        Self {
            runner,
            tmux_bin: tmux_bin.into(),
        }
    }

    /// Read a single boolean tmux format for a pane
    async fn query_flag(&self, pane: &str, format: &str) -> crate::errors::Result<bool> {
        let args = [
            "display-message".to_string(),
            "-p".to_string(),
            "-t".to_string(),
            pane.to_string(),
            format.to_string(),
        ];
        let out = self.runner.run(&self.tmux_bin, &args).await?;
        Ok(out == "1")
    }

    pub async fn pane_focus(&self, pane: &str) -> PaneFocus {
        let (pane_active, window_active) = tokio::join!(
            self.query_flag(pane, "#{pane_active}"),
            self.query_flag(pane, "#{window_active}"),
        );

        match (pane_active, window_active) {
            (Ok(true), Ok(true)) => PaneFocus::Focused,
            (Ok(_), Ok(_)) => PaneFocus::Unfocused,
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!(pane = %pane, error = %e, "tmux focus query failed");
                PaneFocus::Unknown
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::{FocusbellError, Result};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Runner answering `#{pane_active}` / `#{window_active}`; `None` fails the query
    pub(crate) struct TmuxRunner {
        pub pane_active: Option<&'static str>,
        pub window_active: Option<&'static str>,
    }

    #[async_trait]
    impl CommandRunner for TmuxRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<String> {
            assert_eq!(program, "tmux");
            assert_eq!(args[..4], ["display-message", "-p", "-t", "%7"]);
            let answer = match args[4].as_str() {
                "#{pane_active}" => self.pane_active,
                "#{window_active}" => self.window_active,
                other => panic!("unexpected format {other}"),
            };
            answer
                .map(str::to_string)
                .ok_or_else(|| FocusbellError::CommandFailed {
                    program: program.to_string(),
                    code: 1,
                    stderr: "can't find pane: %7".to_string(),
                })
        }
    }

    async fn focus(pane_active: Option<&'static str>, window_active: Option<&'static str>) -> PaneFocus {
        let runner = TmuxRunner {
            pane_active,
            window_active,
        };
        TmuxProbe::new(&runner, "tmux").pane_focus("%7").await
    }

    /// Runner where only `focused` is the active pane of the active window.
    /// Records every pane it was asked about.
    #[derive(Clone)]
    pub(crate) struct PaneRunner {
        pub focused: &'static str,
        pub targets: Arc<Mutex<Vec<String>>>,
    }

    impl PaneRunner {
        pub fn focused(pane: &'static str) -> Self {
            Self {
                focused: pane,
                targets: Arc::default(),
            }
        }

        pub fn targets(&self) -> Vec<String> {
            self.targets.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for PaneRunner {
        async fn run(&self, _program: &str, args: &[String]) -> Result<String> {
            assert_eq!(args[..3], ["display-message", "-p", "-t"]);
            let target = args[3].clone();
            let active = if target == self.focused { "1" } else { "0" };
            self.targets.lock().unwrap().push(target);
            Ok(active.to_string())
        }
    }

    #[tokio::test]
    async fn test_queries_target_the_given_pane() {
        let runner = PaneRunner::focused("%1");
        let probe = TmuxProbe::new(runner.clone(), "tmux");
        assert_eq!(probe.pane_focus("%1").await, PaneFocus::Focused);
        assert_eq!(probe.pane_focus("%7").await, PaneFocus::Unfocused);
        assert_eq!(runner.targets(), ["%1", "%1", "%7", "%7"]);
    }

    #[tokio::test]
    async fn test_both_active_is_focused() {
        assert_eq!(focus(Some("1"), Some("1")).await, PaneFocus::Focused);
    }

    #[tokio::test]
    async fn test_either_inactive_is_unfocused() {
        assert_eq!(focus(Some("0"), Some("1")).await, PaneFocus::Unfocused);
        assert_eq!(focus(Some("1"), Some("0")).await, PaneFocus::Unfocused);
        assert_eq!(focus(Some("0"), Some("0")).await, PaneFocus::Unfocused);
    }

    #[tokio::test]
    async fn test_non_literal_one_is_not_active() {
        assert_eq!(focus(Some("true"), Some("1")).await, PaneFocus::Unfocused);
    }

    #[tokio::test]
    async fn test_query_failure_is_unknown() {
        assert_eq!(focus(None, Some("1")).await, PaneFocus::Unknown);
        assert_eq!(focus(Some("1"), None).await, PaneFocus::Unknown);
        assert_eq!(focus(None, None).await, PaneFocus::Unknown);
    }
}
