use crate::session::Session;
use crate::store::{Committed, SessionHead, SessionReader, SessionStoreError, SessionWriter, Version};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// One-file-per-thread storage under a base directory.
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file storage with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn session_path(&self, thread_id: &str) -> Result<PathBuf, SessionStoreError> {
        Self::validate_thread_id(thread_id)?;
        Ok(self.base_path.join(format!("{thread_id}.json")))
    }

    /// Validate that a thread id is safe for use as a filename.
    /// Rejects path separators, `..`, and control characters.
    fn validate_thread_id(thread_id: &str) -> Result<(), SessionStoreError> {
        if thread_id.is_empty() {
            return Err(SessionStoreError::InvalidId(
                "thread id cannot be empty".to_string(),
            ));
        }
        if thread_id.contains('/')
            || thread_id.contains('\\')
            || thread_id.contains("..")
            || thread_id.contains('\0')
        {
            return Err(SessionStoreError::InvalidId(format!(
                "thread id contains invalid characters: {thread_id:?}"
            )));
        }
        if thread_id.chars().any(|c| c.is_control()) {
            return Err(SessionStoreError::InvalidId(format!(
                "thread id contains control characters: {thread_id:?}"
            )));
        }
        Ok(())
    }

    async fn load_head(&self, thread_id: &str) -> Result<Option<SessionHead>, SessionStoreError> {
        let path = self.session_path(thread_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        let session: Session = serde_json::from_str(&content)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;
        let version = serde_json::from_str::<VersionedSession>(&content)
            .ok()
            .and_then(|v| v._version)
            .unwrap_or(0);
        Ok(Some(SessionHead { session, version }))
    }

    /// Save a session head to file atomically: write to a unique temp file,
    /// sync, then rename over the destination.
    async fn save_head(&self, head: &SessionHead) -> Result<(), SessionStoreError> {
        if !self.base_path.exists() {
            tokio::fs::create_dir_all(&self.base_path).await?;
        }
        let path = self.session_path(&head.session.id)?;

        // Embed the version into the JSON document.
        let mut value = serde_json::to_value(&head.session)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("_version".to_string(), serde_json::json!(head.version));
        }
        let content = serde_json::to_string_pretty(&value)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        let tmp_path = self.base_path.join(format!(
            ".{}.{}.tmp",
            head.session.id,
            uuid::Uuid::new_v4().simple()
        ));

        let write_result = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            match tokio::fs::rename(&tmp_path, &path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    tokio::fs::remove_file(&path).await?;
                    tokio::fs::rename(&tmp_path, &path).await?;
                }
                Err(e) => return Err(e),
            }
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = write_result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(SessionStoreError::Io(e));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionReader for FileStore {
    async fn load(&self, thread_id: &str) -> Result<Option<SessionHead>, SessionStoreError> {
        self.load_head(thread_id).await
    }

    async fn list(&self) -> Result<Vec<String>, SessionStoreError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let mut entries = tokio::fs::read_dir(&self.base_path).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl SessionWriter for FileStore {
    async fn save(&self, session: &Session) -> Result<Committed, SessionStoreError> {
        let version = self
            .load_head(&session.id)
            .await?
            .map_or(0, |head| head.version.saturating_add(1));
        self.save_head(&SessionHead {
            session: session.clone(),
            version,
        })
        .await?;
        Ok(Committed { version })
    }

    async fn delete(&self, thread_id: &str) -> Result<(), SessionStoreError> {
        let path = self.session_path(thread_id)?;
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }
}

/// Helper for extracting the `_version` field from serialized session JSON.
#[derive(Deserialize)]
struct VersionedSession {
    #[serde(default)]
    _version: Option<Version>,
}
