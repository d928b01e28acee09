use bytes::{Bytes, BytesMut};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::backend::MediaChunk;
use crate::error::CaptureError;
use crate::session::MediaPayload;

/// Accumulates recorded time slices until the recording is assembled
#[derive(Debug)]
pub struct ChunkBuffer {
    mime_type: String,
    slices: Vec<Bytes>,
    total_bytes: usize,
    first_ms: Option<u64>,
    last_ms: u64,
}

impl ChunkBuffer {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            slices: Vec::new(),
            total_bytes: 0,
            first_ms: None,
            last_ms: 0,
        }
    }

    /// Keep a slice. Empty slices are dropped.
    pub fn push(&mut self, chunk: MediaChunk) {
        if chunk.data.is_empty() {
            debug!("Skipping empty slice at {}ms", chunk.timestamp_ms);
            return;
        }

        self.first_ms.get_or_insert(chunk.timestamp_ms);
        self.last_ms = chunk.timestamp_ms;
        self.total_bytes += chunk.data.len();
        self.slices.push(chunk.data);
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Recorded span between the first and last slice
    pub fn span_ms(&self) -> u64 {
        self.first_ms
            .map(|first| self.last_ms.saturating_sub(first))
            .unwrap_or(0)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Concatenate every slice into one payload of the recording's type
    pub fn assemble(&self) -> Result<MediaPayload, CaptureError> {
        if self.total_bytes == 0 {
            return Err(CaptureError::NoDataCaptured);
        }

        let mut joined = BytesMut::with_capacity(self.total_bytes);
        for slice in &self.slices {
            joined.extend_from_slice(slice);
        }

        Ok(MediaPayload::new(joined.freeze(), self.mime_type.clone()))
    }
}

/// Drain a recorder channel into a shared buffer until the channel closes
///
/// The buffer is shared so whatever arrived is still usable if the caller
/// gives up waiting for the final slice.
pub async fn collect_chunks(buffer: Arc<Mutex<ChunkBuffer>>, mut chunk_rx: mpsc::Receiver<MediaChunk>) {
    let mut received = 0usize;

    while let Some(chunk) = chunk_rx.recv().await {
        received += 1;
        match buffer.lock() {
            Ok(mut buffer) => buffer.push(chunk),
            Err(_) => break,
        }
    }

    info!("Recorder channel closed after {} slices", received);
}
