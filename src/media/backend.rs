use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::CaptureError;

/// One time slice of encoded media delivered while recording
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Encoded bytes for this slice (may be empty)
    pub data: Bytes,
    /// Milliseconds since recording started
    pub timestamp_ms: u64,
}

/// Capture tuning
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Encoding formats in order of preference
    pub mime_preferences: Vec<String>,
    /// Length of each delivered time slice
    pub timeslice: Duration,
    /// How long `stop` waits for the final slice
    pub flush_timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mime_preferences: default_mime_preferences(),
            timeslice: Duration::from_millis(1000),
            flush_timeout: Duration::from_millis(500),
        }
    }
}

pub fn default_mime_preferences() -> Vec<String> {
    [
        "video/webm;codecs=vp9,opus",
        "video/webm;codecs=vp8,opus",
        "video/webm",
        "video/mp4",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// A granted camera + microphone stream
///
/// Implementations deliver slices on the returned channel every `timeslice`
/// and close the channel after the final slice once `stop` is called.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Begin recording with the given encoding
    async fn start(
        &mut self,
        mime_type: &str,
        timeslice: Duration,
    ) -> Result<mpsc::Receiver<MediaChunk>, CaptureError>;

    /// Ask the recorder to flush its final slice and close the channel
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Stop all hardware tracks (camera indicator off)
    fn release(&mut self);

    fn is_recording(&self) -> bool;

    /// Device name for logging
    fn name(&self) -> &str;
}

/// Platform capture API
///
/// Implementations:
/// - [`super::SyntheticCaptureProvider`]: generated slices for demos
/// - test providers with scripted behavior
#[async_trait]
pub trait MediaCaptureProvider: Send + Sync {
    /// Request camera and microphone access
    async fn acquire(&self) -> Result<Box<dyn CaptureDevice>, CaptureError>;

    /// Whether the runtime can record in `mime_type`
    fn supports_mime_type(&self, mime_type: &str) -> bool;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Pick the first preferred encoding the provider supports
pub fn select_mime_type(
    preferences: &[String],
    provider: &dyn MediaCaptureProvider,
) -> Result<String, CaptureError> {
    for mime_type in preferences {
        if provider.supports_mime_type(mime_type) {
            debug!("Selected recording format {} on {}", mime_type, provider.name());
            return Ok(mime_type.clone());
        }
        debug!("Recording format {} unsupported on {}", mime_type, provider.name());
    }

    warn!("No supported recording format on {}", provider.name());
    Err(CaptureError::Unsupported(format!(
        "none of [{}] is supported by {}",
        preferences.join(", "),
        provider.name()
    )))
}
