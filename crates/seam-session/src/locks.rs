use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Grants at most one in-flight run per thread id.
///
/// A second run for the same thread waits until the first run releases its
/// guard, which happens after that run's save. Runs on different thread ids
/// never contend.
#[derive(Debug, Default)]
pub struct ThreadLocks {
    registry: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `thread_id`.
    ///
    /// The returned guard is owned, so it can cross await points and travel
    /// into the task driving the run.
    pub async fn acquire(&self, thread_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.registry.lock().await;
            Arc::clone(registry.entry(thread_id.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}
