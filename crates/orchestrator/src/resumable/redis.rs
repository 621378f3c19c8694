//! Redis-backed stream context.
//!
//! Each stream is a list of chunks plus a state key (`live` or `done`),
//! both expiring after a day. Resuming readers poll the list.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis;
use bb8_redis::RedisConnectionManager;
use futures::{stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use super::{ChunkStream, StreamContext};
use crate::error::Result;

/// Lifetime of a stream's keys.
const STREAM_TTL_SECS: u64 = 24 * 60 * 60;

/// Delay between polls of a live stream.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const STATE_LIVE: &str = "live";
const STATE_DONE: &str = "done";

fn chunks_key(stream_id: &str) -> String {
    format!("resumable-stream:{}:chunks", stream_id)
}

fn state_key(stream_id: &str) -> String {
    format!("resumable-stream:{}:state", stream_id)
}

/// Stream context shared by every server instance through Redis.
#[derive(Clone)]
pub struct RedisStreamContext {
    pool: Pool<RedisConnectionManager>,
}

impl RedisStreamContext {
    /// Connect to the Redis server at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = Pool::builder().build(manager).await?;
        info!("Resumable streams backed by Redis");
        Ok(Self { pool })
    }

    async fn set_state(&self, stream_id: &str, state: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _: () = redis::cmd("SET")
            .arg(state_key(stream_id))
            .arg(state)
            .arg("EX")
            .arg(STREAM_TTL_SECS)
            .query_async(&mut *conn)
            .await?;
        Ok(())
    }

    async fn state(&self, stream_id: &str) -> Result<Option<String>> {
        let mut conn = self.pool.get().await?;
        let state: Option<String> = redis::cmd("GET")
            .arg(state_key(stream_id))
            .query_async(&mut *conn)
            .await?;
        Ok(state)
    }

    async fn append(&self, stream_id: &str, chunk: &str) -> Result<()> {
        let key = chunks_key(stream_id);
        let mut conn = self.pool.get().await?;
        let _: () = redis::cmd("RPUSH")
            .arg(&key)
            .arg(chunk)
            .query_async(&mut *conn)
            .await?;
        let _: () = redis::cmd("EXPIRE")
            .arg(&key)
            .arg(STREAM_TTL_SECS)
            .query_async(&mut *conn)
            .await?;
        Ok(())
    }

    async fn range(&self, stream_id: &str, start: usize) -> Result<Vec<String>> {
        let mut conn = self.pool.get().await?;
        let chunks: Vec<String> = redis::cmd("LRANGE")
            .arg(chunks_key(stream_id))
            .arg(start)
            .arg(-1)
            .query_async(&mut *conn)
            .await?;
        Ok(chunks)
    }
}

struct Poller {
    context: RedisStreamContext,
    stream_id: String,
    next_index: usize,
    pending: VecDeque<String>,
    finished: bool,
}

impl Poller {
    /// Fetch new chunks. The state is read first so a `done` seen here means
    /// the following range holds every chunk.
    async fn fetch(&mut self) -> Result<()> {
        let done = self.context.state(&self.stream_id).await?.as_deref() != Some(STATE_LIVE);
        let chunks = self.context.range(&self.stream_id, self.next_index).await?;
        self.next_index += chunks.len();
        self.pending.extend(chunks);
        self.finished = done;
        Ok(())
    }
}

async fn next_chunk(mut poller: Poller) -> Option<(String, Poller)> {
    loop {
        if let Some(chunk) = poller.pending.pop_front() {
            return Some((chunk, poller));
        }
        if poller.finished {
            return None;
        }
        if let Err(e) = poller.fetch().await {
            warn!("Polling stream {} failed: {}", poller.stream_id, e);
            return None;
        }
        if poller.pending.is_empty() && !poller.finished {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl StreamContext for RedisStreamContext {
    async fn resumable_stream(&self, stream_id: &str, mut source: ChunkStream) -> Result<ChunkStream> {
        self.set_state(stream_id, STATE_LIVE).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let context = self.clone();
        let id = stream_id.to_string();

        tokio::spawn(async move {
            while let Some(chunk) = source.next().await {
                if let Err(e) = context.append(&id, &chunk).await {
                    warn!("Failed to store chunk of stream {}: {}", id, e);
                }
                let _ = tx.send(chunk);
            }
            if let Err(e) = context.set_state(&id, STATE_DONE).await {
                warn!("Failed to mark stream {} done: {}", id, e);
            }
            debug!("Stream {} drained", id);
        });

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn resume_existing_stream(&self, stream_id: &str) -> Result<Option<ChunkStream>> {
        if self.state(stream_id).await?.as_deref() != Some(STATE_LIVE) {
            return Ok(None);
        }

        let poller = Poller {
            context: self.clone(),
            stream_id: stream_id.to_string(),
            next_index: 0,
            pending: VecDeque::new(),
            finished: false,
        };
        Ok(Some(stream::unfold(poller, next_chunk).boxed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(chunks_key("s1"), "resumable-stream:s1:chunks");
        assert_eq!(state_key("s1"), "resumable-stream:s1:state");
    }

    // Requires a running Redis server
    #[tokio::test]
    #[ignore] // Run with: REDIS_URL=redis://127.0.0.1 cargo test -- --ignored
    async fn test_redis_resume() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1".to_string());
        let context = RedisStreamContext::connect(&url).await.unwrap();
        let id = uuid::Uuid::new_v4().to_string();

        let (tx, rx) = mpsc::unbounded_channel();
        let mut first = context
            .resumable_stream(&id, UnboundedReceiverStream::new(rx).boxed())
            .await
            .unwrap();
        tx.send("a".to_string()).unwrap();
        assert_eq!(first.next().await.as_deref(), Some("a"));

        let resumed = context.resume_existing_stream(&id).await.unwrap().unwrap();
        tx.send("b".to_string()).unwrap();
        drop(tx);

        let chunks: Vec<String> = resumed.collect().await;
        assert_eq!(chunks, vec!["a", "b"]);
        assert!(context.resume_existing_stream(&id).await.unwrap().is_none());
    }
}
