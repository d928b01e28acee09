use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::backend::{select_mime_type, CaptureConfig, CaptureDevice, MediaCaptureProvider};
use super::chunk::{collect_chunks, ChunkBuffer};
use crate::error::CaptureError;
use crate::session::{ArtifactSource, PreviewRegistry, ResponseArtifact};

/// Granted device, released exactly once
///
/// Dropping an unreleased handle releases the device so the camera never
/// stays on after its owner is gone.
pub struct DeviceHandle {
    device: Option<Box<dyn CaptureDevice>>,
    name: String,
    acquired_at: Instant,
}

impl DeviceHandle {
    fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            name: device.name().to_string(),
            device: Some(device),
            acquired_at: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_released(&self) -> bool {
        self.device.is_none()
    }

    /// Stop all tracks. Returns false if already released.
    pub fn release(&mut self) -> bool {
        match self.device.take() {
            Some(mut device) => {
                device.release();
                info!(
                    "Released capture device {} after {:.1}s",
                    self.name,
                    self.acquired_at.elapsed().as_secs_f64()
                );
                true
            }
            None => false,
        }
    }

    fn device_mut(&mut self) -> Result<&mut Box<dyn CaptureDevice>, CaptureError> {
        self.device.as_mut().ok_or(CaptureError::AlreadyReleased)
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        if self.device.is_some() {
            warn!("Capture device {} dropped while live, releasing", self.name);
            self.release();
        }
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("name", &self.name)
            .field("released", &self.is_released())
            .finish()
    }
}

/// A recording in progress: the live device plus its slice collector
pub struct RecordingHandle {
    device: DeviceHandle,
    mime_type: String,
    buffer: Arc<Mutex<ChunkBuffer>>,
    collector: JoinHandle<()>,
    started_at: Instant,
}

impl RecordingHandle {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Slices received so far
    pub fn slices_received(&self) -> usize {
        self.buffer.lock().map(|b| b.slice_count()).unwrap_or(0)
    }

    /// Drop the recording: stop collecting and release the device now
    pub fn abandon(mut self) {
        info!(
            "Abandoning recording on {} after {:.1}s",
            self.device.name(),
            self.elapsed_secs()
        );
        self.collector.abort();
        self.device.release();
    }
}

impl std::fmt::Debug for RecordingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingHandle")
            .field("device", &self.device)
            .field("mime_type", &self.mime_type)
            .field("slices", &self.slices_received())
            .finish()
    }
}

/// Camera acquisition and chunked recording into response artifacts
#[derive(Clone)]
pub struct MediaCapture {
    provider: Arc<dyn MediaCaptureProvider>,
    registry: Arc<dyn PreviewRegistry>,
    config: CaptureConfig,
}

impl MediaCapture {
    pub fn new(
        provider: Arc<dyn MediaCaptureProvider>,
        registry: Arc<dyn PreviewRegistry>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Registry that issues previews for captured artifacts
    pub fn registry(&self) -> &Arc<dyn PreviewRegistry> {
        &self.registry
    }

    /// Ask for camera + microphone access
    pub async fn request_device(&self) -> Result<DeviceHandle, CaptureError> {
        info!("Requesting capture device from {}", self.provider.name());

        match self.provider.acquire().await {
            Ok(device) => {
                info!("Capture device granted: {}", device.name());
                Ok(DeviceHandle::new(device))
            }
            Err(e) => {
                warn!("Capture device unavailable: {}", e);
                Err(e)
            }
        }
    }

    /// Start recording in the background and return immediately
    ///
    /// On failure the device is released.
    pub async fn start_recording(&self, mut device: DeviceHandle) -> Result<RecordingHandle, CaptureError> {
        let mime_type = select_mime_type(&self.config.mime_preferences, self.provider.as_ref())?;

        let chunk_rx = device
            .device_mut()?
            .start(&mime_type, self.config.timeslice)
            .await?;

        let buffer = Arc::new(Mutex::new(ChunkBuffer::new(mime_type.clone())));
        let collector = tokio::spawn(collect_chunks(Arc::clone(&buffer), chunk_rx));

        info!(
            "Recording started on {} ({}, {}ms slices)",
            device.name(),
            mime_type,
            self.config.timeslice.as_millis()
        );

        Ok(RecordingHandle {
            device,
            mime_type,
            buffer,
            collector,
            started_at: Instant::now(),
        })
    }

    /// Stop recording, wait briefly for the final slice, and build the artifact
    ///
    /// The device is released whether or not any data arrived.
    pub async fn stop_recording(&self, handle: RecordingHandle) -> Result<ResponseArtifact, CaptureError> {
        let RecordingHandle {
            mut device,
            mime_type,
            buffer,
            mut collector,
            started_at,
        } = handle;

        info!(
            "Stopping recording on {} after {:.1}s",
            device.name(),
            started_at.elapsed().as_secs_f64()
        );

        let stopped = match device.device_mut() {
            Ok(d) => d.stop().await,
            Err(e) => Err(e),
        };
        if let Err(e) = stopped {
            warn!("Recorder stop failed, assembling slices received so far: {}", e);
        }

        match tokio::time::timeout(self.config.flush_timeout, &mut collector).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Slice collector failed: {}", e),
            Err(_) => {
                warn!(
                    "Final slice not delivered within {}ms, using slices received so far",
                    self.config.flush_timeout.as_millis()
                );
                collector.abort();
            }
        }

        device.release();

        let (payload, slices) = {
            let buffer = buffer
                .lock()
                .map_err(|_| CaptureError::Device("slice buffer poisoned".to_string()))?;
            info!(
                "Assembling {} slices ({} bytes, {}ms) as {}",
                buffer.slice_count(),
                buffer.total_bytes(),
                buffer.span_ms(),
                mime_type
            );
            (buffer.assemble()?, buffer.slice_count())
        };

        ResponseArtifact::new(payload, ArtifactSource::Recorded { slices }, &self.registry)
    }
}
