//! Structured error types for focusbell
//!
//! Uses thiserror for ergonomic error definitions with automatic Display
//! and Error trait implementations. None of these ever reach the host:
//! the dispatcher folds them into fail-safe defaults.

use thiserror::Error;

/// All possible errors in focusbell
#[derive(Error, Debug)]
pub enum FocusbellError {
    /// External command could not be spawned or awaited
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External command ran but exited unsuccessfully
    #[error("'{program}' exited with code {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    /// Session store has no record for this id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Session id cannot be used as a store key
    #[error("Invalid session id '{0}'")]
    InvalidSessionId(String),

    /// Session record exists but could not be decoded
    #[error("Malformed session record: {0}")]
    MalformedSession(#[from] serde_json::Error),

    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using FocusbellError
pub type Result<T> = std::result::Result<T, FocusbellError>;
