//! `focusbell hook`: one host event in, at most one alert out
//!
//! A running event bus owns the playback lock for every hook process, so the
//! event goes there first, wrapped with the terminal this hook runs in. Only
//! when no bus accepts it is the event handled in-process.

use serde_json::Value;
use std::path::Path;

use crate::dispatch::{NotificationDispatcher, Outcome};
use crate::event::{socket, BusMessage, HostEvent};
use crate::focus::FocusPolicy;
use crate::session::SessionStore;
use crate::sound::SoundPlayer;
use crate::terminal::TerminalContext;

/// Where a hook event ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// Empty, malformed, or an event type that never alerts
    Dropped,
    /// Handed to the event bus
    Forwarded,
    /// No bus was listening; handled here
    Handled(Outcome),
}

/// Route one raw hook payload
///
/// `dispatcher` is only built when the event has to be handled in-process.
pub async fn route<F, S, P>(
    input: &str,
    origin: &TerminalContext,
    socket_path: &Path,
    dispatcher: impl FnOnce() -> NotificationDispatcher<F, S, P>,
) -> HookOutcome
where
    F: FocusPolicy,
    S: SessionStore,
    P: SoundPlayer,
{
    if input.trim().is_empty() {
        return HookOutcome::Dropped; // Silent exit - no input
    }

    let value: Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                error = %e,
                input_len = input.len(),
                "Invalid event JSON (check hook configuration)"
            );
            return HookOutcome::Dropped;
        }
    };

    let event = match HostEvent::from_value(value.clone()) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Unrecognized event shape");
            return HookOutcome::Dropped;
        }
    };

    if let HostEvent::Other(kind) = &event {
        tracing::trace!(event = %kind, "Ignoring event");
        return HookOutcome::Dropped;
    }

    if socket::forward(socket_path, &BusMessage::encode(&value, origin)).await {
        tracing::debug!(event = %event.kind(), ?origin, "Forwarded event to bus");
        return HookOutcome::Forwarded;
    }

    tracing::debug!(event = %event.kind(), "No event bus, handling in-process");
    HookOutcome::Handled(dispatcher().handle(&event, Some(origin)).await)
}
