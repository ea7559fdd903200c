//! Notification dispatcher
//!
//! Gates each host event and rings at most one alert at a time:
//!
//! ```text
//! session.idle      → main session? ∧ not focused? → play
//! permission.asked  →                 not focused? → play
//! anything else     → ignored
//! ```
//!
//! Playback is guarded by a single lock flag. An event arriving while a sound
//! is still playing is dropped, not queued. Nothing here returns an error to
//! the caller; every failure is folded into an [`Outcome`].

use std::sync::atomic::{AtomicBool, Ordering};

use crate::event::HostEvent;
use crate::focus::FocusPolicy;
use crate::session::{SessionRelevanceGate, SessionStore};
use crate::sound::SoundPlayer;
use crate::terminal::TerminalContext;

/// What happened to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Played,
    /// Player ran but failed; lock was still released
    PlaybackFailed,
    /// Another alert was already playing
    Busy,
    NotMainSession,
    /// User is already looking at this session
    Focused,
    /// `session.idle` without a session id
    MissingSession,
    /// Event type that never alerts
    Ignored,
}

/// Held while a sound plays; releases the lock on drop
struct PlaybackGuard<'a>(&'a AtomicBool);

impl Drop for PlaybackGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct NotificationDispatcher<F, S, P> {
    focus: F,
    sessions: SessionRelevanceGate<S>,
    player: P,
    playing: AtomicBool,
}

impl<F, S, P> NotificationDispatcher<F, S, P>
where
    F: FocusPolicy,
    S: SessionStore,
    P: SoundPlayer,
{
    pub fn new(focus: F, sessions: SessionRelevanceGate<S>, player: P) -> Self {
        Self {
            focus,
            sessions,
            player,
            playing: AtomicBool::new(false),
        }
    }

    /// Handle one host event raised from `origin` (`None` for the focus
    /// policy's own terminal). Safe to call concurrently.
    pub async fn handle(&self, event: &HostEvent, origin: Option<&TerminalContext>) -> Outcome {
        let outcome = match event {
            HostEvent::SessionIdle { session_id: None } => Outcome::MissingSession,
            HostEvent::SessionIdle {
                session_id: Some(session_id),
            } => {
                let (main, notify) = tokio::join!(
                    self.sessions.is_main_session(session_id),
                    self.focus.should_notify(origin),
                );
                if !main {
                    Outcome::NotMainSession
                } else if !notify {
                    Outcome::Focused
                } else {
                    self.play().await
                }
            }
            HostEvent::PermissionAsked => {
                if self.focus.should_notify(origin).await {
                    self.play().await
                } else {
                    Outcome::Focused
                }
            }
            HostEvent::Other(_) => Outcome::Ignored,
        };

        tracing::debug!(event = %event.kind(), ?outcome, "Event handled");
        outcome
    }

    /// Claim the playback lock, or `None` if a sound is already playing
    fn try_lock(&self) -> Option<PlaybackGuard<'_>> {
        self.playing
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| PlaybackGuard(&self.playing))
    }

    async fn play(&self) -> Outcome {
        let Some(_guard) = self.try_lock() else {
            tracing::debug!("Alert already playing, dropping");
            return Outcome::Busy;
        };

        match self.player.play().await {
            Ok(()) => Outcome::Played,
            Err(e) => {
                tracing::warn!(error = %e, "Alert playback failed");
                Outcome::PlaybackFailed
            }
        }
    }

    /// Whether an alert is currently playing
    #[cfg(test)]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }
}
