//! Focus gating
//!
//! Decides whether the user is already looking at the session that raised an
//! event. Inside tmux the pane/window focus is authoritative (several panes
//! share one frontmost terminal window); outside tmux the OS frontmost
//! application decides.
//!
//! The terminal judged is the event's origin when one is known (a hook
//! process forwarding to the event bus), otherwise the gate's own.
//!
//! Both failure paths end in "notify":
//! - frontmost query fails => not frontmost => notify
//! - tmux query fails => focus unknown => notify

pub mod app_name;
pub mod frontmost;
pub mod tmux;

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::shell::CommandRunner;
use crate::terminal::TerminalContext;

pub use frontmost::FrontmostProbe;
pub use tmux::{PaneFocus, TmuxProbe};

/// Focus half of the notification decision
#[async_trait]
pub trait FocusPolicy: Send + Sync {
    /// `true` when an alert should fire given the current focus.
    ///
    /// `origin` is the terminal the event came from; `None` means the
    /// policy's own terminal.
    async fn should_notify(&self, origin: Option<&TerminalContext>) -> bool;
}

pub struct FocusGate<R> {
    context: TerminalContext,
    frontmost: FrontmostProbe<R>,
    tmux: TmuxProbe<R>,
}

impl<R: CommandRunner + Clone> FocusGate<R> {
    pub fn new(runner: R, context: TerminalContext, tmux_bin: &str) -> Self {
        Self {
            frontmost: FrontmostProbe::new(runner.clone()),
            tmux: TmuxProbe::new(runner, tmux_bin),
            context,
        }
    }
}

impl<R: CommandRunner> FocusGate<R> {
    pub fn context(&self) -> &TerminalContext {
        &self.context
    }

    /// Run every probe for the gate's own terminal, for `focusbell check`
    ///
    /// The frontmost application is sampled once and both the reported name
    /// and the match come from that sample.
    pub async fn diagnose(&self) -> FocusReport {
        let terminal_key = app_name::normalize(self.context.terminal_program());
        let aliases = app_name::aliases_of(&terminal_key);
        let frontmost_app = match self.frontmost.frontmost_app().await {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!(error = %e, "Frontmost app query failed");
                None
            }
        };
        let frontmost = frontmost_app
            .as_deref()
            .is_some_and(|app| frontmost::is_frontmost(&terminal_key, app));
        let pane_focus = match self.context.pane() {
            Some(pane) => Some(self.tmux.pane_focus(pane).await),
            None => None,
        };
        let should_notify = match pane_focus {
            Some(focus) => !focus.is_focused(),
            None => !frontmost,
        };

        FocusReport {
            terminal_key,
            aliases,
            frontmost_app,
            frontmost,
            pane_focus,
            should_notify,
        }
    }
}

#[async_trait]
impl<R: CommandRunner> FocusPolicy for FocusGate<R> {
    async fn should_notify(&self, origin: Option<&TerminalContext>) -> bool {
        let context = origin.unwrap_or(&self.context);

        if let Some(pane) = context.pane() {
            let focus = self.tmux.pane_focus(pane).await;
            tracing::debug!(pane = %pane, ?focus, "tmux focus");
            // Unknown counts as not focused
            return !focus.is_focused();
        }

        !self
            .frontmost
            .is_current_terminal_frontmost(context.terminal_program())
            .await
    }
}

/// Focus gating as a capability: full probing, or none at all
pub enum FocusStrategy<R> {
    Gate(FocusGate<R>),
    /// Every event passes focus gating
    Disabled,
}

#[async_trait]
impl<R: CommandRunner> FocusPolicy for FocusStrategy<R> {
    async fn should_notify(&self, origin: Option<&TerminalContext>) -> bool {
        match self {
            Self::Gate(gate) => gate.should_notify(origin).await,
            Self::Disabled => true,
        }
    }
}

/// Snapshot of all focus probes
#[derive(Debug, Clone)]
pub struct FocusReport {
    pub terminal_key: String,
    pub aliases: BTreeSet<String>,
    pub frontmost_app: Option<String>,
    pub frontmost: bool,
    pub pane_focus: Option<PaneFocus>,
    pub should_notify: bool,
}
