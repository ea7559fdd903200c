pub mod socket;

use serde::Deserialize;
use serde_json::Value;

use crate::terminal::TerminalContext;

/// Lifecycle event emitted by the host tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A session finished its turn and is waiting for the user
    SessionIdle {
        /// Missing when the payload carried no usable `sessionID`
        session_id: Option<String>,
    },
    /// A permission prompt is waiting for approval
    PermissionAsked,
    /// Anything we don't alert on (original type name kept for logging)
    Other(String),
}

/// Event as it arrives on the wire
///
/// Two shapes are accepted:
/// - opencode bus events: `{"type": "session.idle", "properties": {"sessionID": "..."}}`
/// - Claude Code hook input: `{"hook_event_name": "Stop", "session_id": "..."}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireEvent {
    Bus {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        properties: Option<Value>,
    },
    Hook(ClaudeHookInput),
}

/// Raw input from Claude Code hooks (stdin JSON)
///
/// Only includes fields we actively use. Serde ignores unknown fields by default.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeHookInput {
    /// Hook type that triggered this event
    pub hook_event_name: String,
    /// Unique session identifier
    #[serde(default)]
    pub session_id: Option<String>,
}

impl HostEvent {
    pub const SESSION_IDLE: &'static str = "session.idle";
    pub const PERMISSION_ASKED: &'static str = "permission.asked";

    /// Decode one JSON event (either wire shape)
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let wire: WireEvent = serde_json::from_value(value)?;
        Ok(match wire {
            WireEvent::Bus { kind, properties } => Self::from_bus(kind, properties.as_ref()),
            WireEvent::Hook(hook) => Self::from_hook(hook),
        })
    }

    fn from_bus(kind: String, properties: Option<&Value>) -> Self {
        match kind.as_str() {
            Self::SESSION_IDLE => Self::SessionIdle {
                session_id: properties
                    .and_then(|p| p.get("sessionID"))
                    .and_then(Value::as_str)
                    .and_then(non_empty),
            },
            Self::PERMISSION_ASKED => Self::PermissionAsked,
            _ => Self::Other(kind),
        }
    }

    fn from_hook(hook: ClaudeHookInput) -> Self {
        match hook.hook_event_name.as_str() {
            // Main agent finished responding; SubagentStop is deliberately not idle
            "Stop" => Self::SessionIdle {
                session_id: hook.session_id.as_deref().and_then(non_empty),
            },
            "PermissionRequest" => Self::PermissionAsked,
            _ => Self::Other(hook.hook_event_name),
        }
    }

    /// Event type name for logging
    pub fn kind(&self) -> &str {
        match self {
            Self::SessionIdle { .. } => Self::SESSION_IDLE,
            Self::PermissionAsked => Self::PERMISSION_ASKED,
            Self::Other(kind) => kind,
        }
    }
}

/// One line on the event bus
///
/// `focusbell hook` wraps the host's event with the terminal it was raised in:
/// `{"event": {...}, "context": {"terminal_program": "...", "tmux_pane": "%3"}}`.
/// A bare host event (no envelope) is also accepted and carries no origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub event: HostEvent,
    /// Terminal that raised the event, when the sender knew it
    pub origin: Option<TerminalContext>,
}

impl BusMessage {
    /// Wrap a raw host event with its origin, as a single line
    pub fn encode(event: &Value, origin: &TerminalContext) -> String {
        serde_json::json!({ "event": event, "context": origin }).to_string()
    }

    pub fn decode(line: &str) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_str(line)?;

        if !value.get("event").is_some_and(Value::is_object) {
            return Ok(Self {
                event: HostEvent::from_value(value)?,
                origin: None,
            });
        }

        let origin = match value.get_mut("context").map(Value::take) {
            None | Some(Value::Null) => None,
            Some(context) => {
                let context: TerminalContext = serde_json::from_value(context)?;
                Some(TerminalContext::new(context.terminal_program, context.tmux_pane))
            }
        };
        let event = value.get_mut("event").map(Value::take).unwrap_or_default();

        Ok(Self {
            event: HostEvent::from_value(event)?,
            origin,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
