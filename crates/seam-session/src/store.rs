//! Store contract for session persistence.

use crate::session::Session;
use async_trait::async_trait;
use thiserror::Error;

/// Monotonically increasing storage version, bumped on every save.
pub type Version = u64;

/// Acknowledgement returned after a successful write.
#[derive(Debug, Clone, Copy)]
pub struct Committed {
    pub version: Version,
}

/// A session together with its current storage version.
#[derive(Debug, Clone)]
pub struct SessionHead {
    pub session: Session,
    pub version: Version,
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Session not found.
    #[error("session not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid thread id (path traversal, control chars, etc.).
    #[error("invalid thread id: {0}")]
    InvalidId(String),
}

/// Read operations for session persistence.
#[async_trait]
pub trait SessionReader: Send + Sync {
    /// Load a session and its current version.
    async fn load(&self, thread_id: &str) -> Result<Option<SessionHead>, SessionStoreError>;

    /// Load a session without version info. Convenience wrapper.
    async fn load_session(&self, thread_id: &str) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.load(thread_id).await?.map(|head| head.session))
    }

    /// The session for `thread_id`, or a fresh empty one when none is stored.
    ///
    /// First access to a thread never fails with `NotFound`; the empty
    /// session is not persisted until the caller saves it.
    async fn get_or_empty(&self, thread_id: &str) -> Result<Session, SessionStoreError> {
        Ok(self
            .load(thread_id)
            .await?
            .map(|head| head.session)
            .unwrap_or_else(|| Session::new(thread_id)))
    }

    /// All stored thread ids, sorted.
    async fn list(&self) -> Result<Vec<String>, SessionStoreError>;

    /// Total message count for a thread. Convenience wrapper.
    async fn message_count(&self, thread_id: &str) -> Result<usize, SessionStoreError> {
        let head = self
            .load(thread_id)
            .await?
            .ok_or_else(|| SessionStoreError::NotFound(thread_id.to_string()))?;
        Ok(head.session.messages.len())
    }
}

/// Write operations for session persistence.
#[async_trait]
pub trait SessionWriter: SessionReader {
    /// Persist the session, replacing any stored copy and bumping the
    /// version. Callers invoke this once per run, after the run's event
    /// stream has fully drained.
    async fn save(&self, session: &Session) -> Result<Committed, SessionStoreError>;

    /// Delete a session.
    async fn delete(&self, thread_id: &str) -> Result<(), SessionStoreError>;
}

/// Full session store capability (read + write).
pub trait SessionStore: SessionWriter {}

impl<T: SessionWriter + ?Sized> SessionStore for T {}
