use chrono::{DateTime, Duration, Utc};
use std::{collections::HashMap, fmt::Display, sync::Arc};
use tokio::{
    sync::{mpsc, RwLock},
    task::JoinHandle,
};

use crate::error::{AppError, AppResult};

mod macros;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    MovieDetails(i64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieDetails(movie_id) => write!(f, "details:{}", movie_id),
        }
    }
}

/// Stored value with its expiry
struct CacheEntry {
    json: String,
    expires_at: DateTime<Utc>,
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

type Entries = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// In-process cache for provider responses
///
/// Values are stored as JSON and expire after their TTL. Writes go through a
/// background task so a cache store never delays a response.
#[derive(Clone)]
pub struct DetailCache {
    entries: Entries,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Stops the writer after applying every queued write
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl DetailCache {
    /// Creates an empty cache and spawns its writer task
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> (Self, CacheWriterHandle) {
        let entries: Entries = Arc::new(RwLock::new(HashMap::new()));
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::cache_writer_task(
            Arc::clone(&entries),
            write_rx,
            shutdown_rx,
        ));

        let cache = Self { entries, write_tx };
        let handle = CacheWriterHandle { shutdown_tx, task };

        (cache, handle)
    }

    async fn cache_writer_task(
        entries: Entries,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    Self::store(&entries, msg).await;
                }
                _ = shutdown_rx.recv() => {
                    let mut flushed = 0;
                    while let Ok(msg) = write_rx.try_recv() {
                        Self::store(&entries, msg).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Cache writer shutting down");
                    break;
                }
            }
        }
    }

    async fn store(entries: &Entries, msg: CacheWriteMessage) {
        let ttl = i64::try_from(msg.ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        entries.write().await.insert(
            msg.key,
            CacheEntry {
                json: msg.value,
                expires_at,
            },
        );
    }

    /// Retrieves a live value by key
    ///
    /// Returns `None` for missing or expired entries.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let entries = self.entries.read().await;

        match entries.get(&key.to_string()) {
            Some(entry) if entry.expires_at > Utc::now() => {
                let data = serde_json::from_str(&entry.json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            _ => Ok(None),
        }
    }

    /// Queues a value for storage without waiting for the write
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::MovieDetails(19995).to_string(), "details:19995");
    }

    #[tokio::test]
    async fn test_miss_on_empty_cache() {
        let (cache, handle) = DetailCache::new();
        let value: Option<String> = cache.get_from_cache(&CacheKey::MovieDetails(1)).await.unwrap();
        assert!(value.is_none());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_writes_are_visible_after_flush() {
        let (cache, handle) = DetailCache::new();
        let key = CacheKey::MovieDetails(42);

        cache.set_in_background(&key, &vec![1, 2, 3], 60);
        handle.shutdown().await;

        let value: Option<Vec<i32>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let (cache, handle) = DetailCache::new();
        let key = CacheKey::MovieDetails(7);

        cache.set_in_background(&key, &"stale", 0);
        handle.shutdown().await;

        let value: Option<String> = cache.get_from_cache(&key).await.unwrap();
        assert!(value.is_none());
        assert!(!cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_internal_error() {
        let (cache, handle) = DetailCache::new();
        let key = CacheKey::MovieDetails(8);

        cache.set_in_background(&key, &"text", 60);
        handle.shutdown().await;

        let result: AppResult<Option<u32>> = cache.get_from_cache(&key).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
