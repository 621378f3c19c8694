//! In-process stream context.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{stream, StreamExt};
use tokio::sync::watch;
use tracing::debug;

use super::{ChunkStream, StreamContext};
use crate::error::Result;

#[derive(Debug, Default)]
struct Buffer {
    chunks: Vec<String>,
    done: bool,
}

type Streams = Arc<Mutex<HashMap<String, watch::Sender<Buffer>>>>;

/// Keeps live streams in memory; finished streams are forgotten.
#[derive(Debug, Clone, Default)]
pub struct MemoryStreamContext {
    streams: Streams,
}

impl MemoryStreamContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams still being drained.
    pub fn live_streams(&self) -> usize {
        self.streams.lock().map(|s| s.len()).unwrap_or_default()
    }
}

fn reader(rx: watch::Receiver<Buffer>) -> ChunkStream {
    stream::unfold((rx, 0usize), |(mut rx, index)| async move {
        loop {
            let next = {
                let buffer = rx.borrow_and_update();
                match buffer.chunks.get(index) {
                    Some(chunk) => Some(Some(chunk.clone())),
                    None if buffer.done => Some(None),
                    None => None,
                }
            };
            match next {
                Some(Some(chunk)) => return Some((chunk, (rx, index + 1))),
                Some(None) => return None,
                None => {
                    if rx.changed().await.is_err() {
                        return None;
                    }
                }
            }
        }
    })
    .boxed()
}

#[async_trait]
impl StreamContext for MemoryStreamContext {
    async fn resumable_stream(&self, stream_id: &str, mut source: ChunkStream) -> Result<ChunkStream> {
        let (tx, rx) = watch::channel(Buffer::default());
        if let Ok(mut streams) = self.streams.lock() {
            streams.insert(stream_id.to_string(), tx.clone());
        }

        let streams = self.streams.clone();
        let id = stream_id.to_string();
        tokio::spawn(async move {
            while let Some(chunk) = source.next().await {
                tx.send_modify(|buffer| buffer.chunks.push(chunk));
            }
            tx.send_modify(|buffer| buffer.done = true);
            if let Ok(mut streams) = streams.lock() {
                streams.remove(&id);
            }
            debug!("Stream {} drained", id);
        });

        Ok(reader(rx))
    }

    async fn resume_existing_stream(&self, stream_id: &str) -> Result<Option<ChunkStream>> {
        let rx = self
            .streams
            .lock()
            .ok()
            .and_then(|streams| streams.get(stream_id).map(|tx| tx.subscribe()));

        Ok(rx.map(reader))
    }
}
