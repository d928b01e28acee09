// Generated-media capture provider
//
// Produces deterministic byte slices on a timer so the session flow can be
// driven without a camera (CLI practice runs, HTTP demos).

use async_trait::async_trait;
use bytes::Bytes;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::backend::{CaptureDevice, MediaChunk, MediaCaptureProvider};
use crate::error::CaptureError;

/// Provider whose devices emit generated slices
#[derive(Debug, Clone)]
pub struct SyntheticCaptureProvider {
    supported: Vec<String>,
    bytes_per_slice: usize,
    permission_granted: bool,
}

impl SyntheticCaptureProvider {
    pub fn new() -> Self {
        Self {
            supported: vec!["video/webm".to_string(), "video/mp4".to_string()],
            bytes_per_slice: 4096,
            permission_granted: true,
        }
    }

    pub fn with_supported(mut self, supported: Vec<String>) -> Self {
        self.supported = supported;
        self
    }

    pub fn with_bytes_per_slice(mut self, bytes_per_slice: usize) -> Self {
        self.bytes_per_slice = bytes_per_slice;
        self
    }

    /// Simulate the user refusing camera access
    pub fn deny_permission(mut self) -> Self {
        self.permission_granted = false;
        self
    }
}

impl Default for SyntheticCaptureProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaCaptureProvider for SyntheticCaptureProvider {
    async fn acquire(&self) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        if !self.permission_granted {
            return Err(CaptureError::PermissionDenied);
        }

        Ok(Box::new(SyntheticDevice {
            bytes_per_slice: self.bytes_per_slice,
            stop_tx: None,
            released: false,
        }))
    }

    fn supports_mime_type(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|s| s == mime_type)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticDevice {
    bytes_per_slice: usize,
    stop_tx: Option<oneshot::Sender<()>>,
    released: bool,
}

#[async_trait]
impl CaptureDevice for SyntheticDevice {
    async fn start(
        &mut self,
        mime_type: &str,
        timeslice: Duration,
    ) -> Result<mpsc::Receiver<MediaChunk>, CaptureError> {
        if self.released {
            return Err(CaptureError::AlreadyReleased);
        }
        if timeslice.is_zero() {
            return Err(CaptureError::Device("slice period must be positive".to_string()));
        }
        if self.stop_tx.is_some() {
            return Err(CaptureError::Device("already recording".to_string()));
        }

        let (chunk_tx, chunk_rx) = mpsc::channel(64);
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let bytes_per_slice = self.bytes_per_slice;

        info!("Synthetic recorder started ({})", mime_type);

        tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(timeslice);
            ticker.tick().await;
            let mut sequence: u64 = 0;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let chunk = synthetic_chunk(sequence, bytes_per_slice, started);
                        if chunk_tx.send(chunk).await.is_err() {
                            break;
                        }
                        sequence += 1;
                    }
                    _ = &mut stop_rx => {
                        // final partial slice
                        let chunk = synthetic_chunk(sequence, bytes_per_slice / 2, started);
                        let _ = chunk_tx.send(chunk).await;
                        break;
                    }
                }
            }

            debug!("Synthetic recorder finished after {} slices", sequence + 1);
        });

        self.stop_tx = Some(stop_tx);
        Ok(chunk_rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        match self.stop_tx.take() {
            Some(tx) => {
                let _ = tx.send(());
                Ok(())
            }
            None => Err(CaptureError::Device("not recording".to_string())),
        }
    }

    fn release(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        self.released = true;
    }

    fn is_recording(&self) -> bool {
        self.stop_tx.is_some()
    }

    fn name(&self) -> &str {
        "synthetic-camera"
    }
}

fn synthetic_chunk(sequence: u64, len: usize, started: Instant) -> MediaChunk {
    MediaChunk {
        data: Bytes::from(vec![(sequence % 251) as u8; len]),
        timestamp_ms: started.elapsed().as_millis() as u64,
    }
}
