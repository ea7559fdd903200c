//! Terminal context the process is running in
//!
//! Sourced from the environment the host spawned us with:
//! - `TERM_PROGRAM`: terminal identity (e.g. "iTerm.app", "WezTerm", "vscode")
//! - `TMUX_PANE`: tmux pane reference (e.g. "%3"), present only inside tmux

use serde::{Deserialize, Serialize};

/// Environment variable naming the terminal program
pub const TERM_PROGRAM_VAR: &str = "TERM_PROGRAM";

/// Environment variable holding the tmux pane id
pub const TMUX_PANE_VAR: &str = "TMUX_PANE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalContext {
    /// Raw terminal identity, not yet normalized
    pub terminal_program: Option<String>,
    /// tmux pane reference; `None` outside tmux
    pub tmux_pane: Option<String>,
}

impl TerminalContext {
    /// Read the context from the process environment
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(TERM_PROGRAM_VAR).ok(),
            std::env::var(TMUX_PANE_VAR).ok(),
        )
    }

    pub fn new(terminal_program: Option<String>, tmux_pane: Option<String>) -> Self {
        Self {
            terminal_program,
            tmux_pane: tmux_pane.filter(|p| !p.trim().is_empty()),
        }
    }

    /// Replace the terminal identity (config `focus.terminal`)
    #[must_use]
    pub fn with_terminal_override(mut self, terminal: Option<&str>) -> Self {
        if let Some(terminal) = terminal {
            self.terminal_program = Some(terminal.to_string());
        }
        self
    }

    /// tmux pane reference, only when running inside tmux
    pub fn pane(&self) -> Option<&str> {
        self.tmux_pane.as_deref()
    }

    pub fn terminal_program(&self) -> Option<&str> {
        self.terminal_program.as_deref()
    }
}
