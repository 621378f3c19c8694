//! Resumable streams.
//!
//! A stream context takes ownership of a turn's serialized chunks, drains
//! them in the background and lets later readers replay the stream from the
//! start while it is still live.

mod memory;
mod redis;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;

pub use memory::MemoryStreamContext;
pub use redis::RedisStreamContext;

/// Serialized chunks of one stream.
pub type ChunkStream = BoxStream<'static, String>;

/// Backend that keeps streams readable after the first reader disconnects.
#[async_trait]
pub trait StreamContext: Send + Sync {
    /// Register `source` under `stream_id` and return a reader from the start.
    ///
    /// The source is drained even if the returned reader is dropped.
    async fn resumable_stream(&self, stream_id: &str, source: ChunkStream) -> Result<ChunkStream>;

    /// Reader for a stream that is still live, from its first chunk.
    ///
    /// `None` when the stream is unknown or has already finished.
    async fn resume_existing_stream(&self, stream_id: &str) -> Result<Option<ChunkStream>>;
}
