use crate::session::Session;
use crate::store::{Committed, SessionHead, SessionReader, SessionStoreError, SessionWriter, Version};
use async_trait::async_trait;
use std::collections::HashMap;

struct MemoryEntry {
    session: Session,
    version: Version,
}

/// In-memory storage for testing and local development.
#[derive(Default)]
pub struct MemoryStore {
    entries: tokio::sync::RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    /// Create a new in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionReader for MemoryStore {
    async fn load(&self, thread_id: &str) -> Result<Option<SessionHead>, SessionStoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(thread_id).map(|entry| SessionHead {
            session: entry.session.clone(),
            version: entry.version,
        }))
    }

    async fn list(&self) -> Result<Vec<String>, SessionStoreError> {
        let entries = self.entries.read().await;
        let mut ids: Vec<String> = entries.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl SessionWriter for MemoryStore {
    async fn save(&self, session: &Session) -> Result<Committed, SessionStoreError> {
        let mut entries = self.entries.write().await;
        let version = entries.get(&session.id).map_or(0, |e| e.version + 1);
        entries.insert(
            session.id.clone(),
            MemoryEntry {
                session: session.clone(),
                version,
            },
        );
        Ok(Committed { version })
    }

    async fn delete(&self, thread_id: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.write().await;
        entries.remove(thread_id);
        Ok(())
    }
}
