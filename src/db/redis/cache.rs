use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Genres,
    Actors { scan_limit: i64, result_limit: usize },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Genres => write!(f, "vocab:genres"),
            CacheKey::Actors {
                scan_limit,
                result_limit,
            } => write!(f, "vocab:actors:{}:{}", scan_limit, result_limit),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache for the catalog vocabulary listings (genres, actors)
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<usize>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and waits for it to stop
    ///
    /// Returns how many queued writes the task processed over its lifetime.
    pub async fn shutdown(self) -> usize {
        if let Err(e) = self.shutdown_tx.send(()).await {
            tracing::warn!(error = %e, "Cache writer already stopped before shutdown signal");
        }

        match self.task.await {
            Ok(processed) => processed,
            Err(e) => {
                tracing::error!(error = %e, "Cache writer task failed");
                0
            }
        }
    }
}

impl Cache {
    /// Creates a cache and spawns its background writer task
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        let task = tokio::spawn(Self::cache_writer_task(client, write_rx, shutdown_rx));

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    /// Writes queued messages to Redis until shutdown, then drains the queue
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> usize {
        tracing::info!("Cache writer task started");
        let mut processed = 0;

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    processed += 1;
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0;
                    while let Some(msg) = write_rx.recv().await {
                        processed += 1;
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, processed, "Cache writer task stopped");
                    return processed;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves and deserializes a cached value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for writing without waiting for Redis
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_genres() {
        assert_eq!(CacheKey::Genres.to_string(), "vocab:genres");
    }

    #[test]
    fn test_cache_key_display_actors_includes_limits() {
        let key = CacheKey::Actors {
            scan_limit: 2000,
            result_limit: 200,
        };
        assert_eq!(key.to_string(), "vocab:actors:2000:200");
    }

    #[test]
    fn test_cache_keys_differ_by_limits() {
        let a = CacheKey::Actors {
            scan_limit: 2000,
            result_limit: 200,
        };
        let b = CacheKey::Actors {
            scan_limit: 500,
            result_limit: 200,
        };
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_queued_writes() {
        // Nothing listens on port 1, so every write fails fast but is still processed.
        let client = create_redis_client("redis://127.0.0.1:1/").unwrap();
        let (cache, handle) = Cache::new(client).await;

        cache.set_in_background(&CacheKey::Genres, &vec!["Drama"], 60);
        cache.set_in_background(&CacheKey::Genres, &vec!["Comedy"], 60);
        cache.set_in_background(&CacheKey::Genres, &vec!["Action"], 60);

        assert_eq!(handle.shutdown().await, 3);
    }

    #[tokio::test]
    async fn test_shutdown_with_empty_queue() {
        let client = create_redis_client("redis://127.0.0.1:1/").unwrap();
        let (_cache, handle) = Cache::new(client).await;

        assert_eq!(handle.shutdown().await, 0);
    }
}
