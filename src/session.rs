//! Session relevance
//!
//! Idle events fire for subagent sessions too. Only top-level ("main")
//! sessions, the ones without a parent, deserve an alert. The session record
//! lives in the host's store and is consumed read-only.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

use crate::errors::{FocusbellError, Result};

/// The part of a host session record we care about
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    #[serde(rename = "parentID", default)]
    pub parent_id: Option<String>,
}

impl SessionRecord {
    /// No parent (or an empty one) means a top-level session
    pub fn is_main(&self) -> bool {
        self.parent_id.as_deref().map_or(true, str::is_empty)
    }
}

/// Read-only lookup into the host's session store
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<SessionRecord>;
}

#[async_trait]
impl<'a, T: SessionStore + ?Sized> SessionStore for &'a T {
    async fn get(&self, session_id: &str) -> Result<SessionRecord> {
        (**self).get(session_id).await
    }
}

/// Session store backed by one JSON file per session
///
/// Looks for `<root>/<id>.json`, then `<root>/<project>/<id>.json` for each
/// project directory directly under the root.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn validate_id(session_id: &str) -> Result<()> {
        if session_id.is_empty()
            || session_id.contains('/')
            || session_id.contains('\\')
            || session_id.contains("..")
        {
            return Err(FocusbellError::InvalidSessionId(session_id.to_string()));
        }
        Ok(())
    }

    async fn locate(&self, file_name: &str) -> Result<Option<PathBuf>> {
        let direct = self.root.join(file_name);
        if tokio::fs::try_exists(&direct).await? {
            return Ok(Some(direct));
        }

        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let candidate = entry.path().join(file_name);
            if tokio::fs::try_exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, session_id: &str) -> Result<SessionRecord> {
        Self::validate_id(session_id)?;

        let file_name = format!("{session_id}.json");
        let path = self
            .locate(&file_name)
            .await?
            .ok_or_else(|| FocusbellError::SessionNotFound(session_id.to_string()))?;

        let content = tokio::fs::read_to_string(&path).await?;
        let record = serde_json::from_str(&content)?;
        Ok(record)
    }
}

/// Decides whether an event's session is a main session
pub struct SessionRelevanceGate<S> {
    store: Option<S>,
}

impl<S: SessionStore> SessionRelevanceGate<S> {
    pub fn new(store: S) -> Self {
        Self { store: Some(store) }
    }

    /// Treat every session as main without any lookup
    pub fn disabled() -> Self {
        Self { store: None }
    }

    /// `true` for parentless sessions and whenever the lookup fails
    pub async fn is_main_session(&self, session_id: &str) -> bool {
        let Some(store) = &self.store else {
            return true;
        };

        match store.get(session_id).await {
            Ok(record) => {
                let main = record.is_main();
                if !main {
                    tracing::debug!(
                        session = %session_id,
                        parent = ?record.parent_id,
                        "Subagent session"
                    );
                }
                main
            }
            Err(e) => {
                tracing::debug!(session = %session_id, error = %e, "Session lookup failed, assuming main");
                true
            }
        }
    }
}
