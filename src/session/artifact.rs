use anyhow::{Context, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::CaptureError;

/// Binary video payload plus its declared container/codec type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    /// Raw bytes (cloning shares the buffer)
    pub bytes: Bytes,
    /// MIME type, e.g. `video/webm;codecs=vp8,opus`
    pub mime_type: String,
}

impl MediaPayload {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Issues and revokes playable references to payloads
///
/// Implementations:
/// - [`InMemoryPreviewRegistry`]: `preview://<uuid>` URLs served by the HTTP API
/// - test registries that count revoke calls
pub trait PreviewRegistry: Send + Sync {
    /// Register a payload and return a URL the UI can play
    fn register(&self, payload: &MediaPayload) -> String;

    /// Invalidate a URL. Revoking an unknown or already-revoked URL is a no-op.
    fn revoke(&self, url: &str);

    /// Look up the payload behind a live URL
    fn resolve(&self, url: &str) -> Option<MediaPayload>;
}

/// Process-local preview registry
#[derive(Default)]
pub struct InMemoryPreviewRegistry {
    entries: Mutex<HashMap<String, MediaPayload>>,
}

impl InMemoryPreviewRegistry {
    pub const SCHEME: &'static str = "preview://";

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unrevoked) previews
    pub fn live_count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

impl PreviewRegistry for InMemoryPreviewRegistry {
    fn register(&self, payload: &MediaPayload) -> String {
        let url = format!("{}{}", Self::SCHEME, uuid::Uuid::new_v4());
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(url.clone(), payload.clone());
            }
            Err(e) => warn!("Preview registry poisoned, preview will not resolve: {}", e),
        }
        url
    }

    fn revoke(&self, url: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(url).is_some() {
                debug!("Revoked preview {}", url);
            }
        }
    }

    fn resolve(&self, url: &str) -> Option<MediaPayload> {
        self.entries.lock().ok()?.get(url).cloned()
    }
}

/// Revocable view of an artifact's payload
pub struct PreviewHandle {
    url: String,
    registry: Arc<dyn PreviewRegistry>,
    revoked: AtomicBool,
}

impl PreviewHandle {
    fn issue(payload: &MediaPayload, registry: &Arc<dyn PreviewRegistry>) -> Self {
        Self {
            url: registry.register(payload),
            registry: Arc::clone(registry),
            revoked: AtomicBool::new(false),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::SeqCst)
    }

    /// Revoke once; later calls do nothing
    pub fn revoke(&self) {
        if !self.revoked.swap(true, Ordering::SeqCst) {
            self.registry.revoke(&self.url);
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle")
            .field("url", &self.url)
            .field("revoked", &self.is_revoked())
            .finish()
    }
}

/// Where an artifact's bytes came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactSource {
    /// Live camera recording assembled from time slices
    Recorded { slices: usize },
    /// User-selected file
    Uploaded { file_name: Option<String> },
}

/// One captured or uploaded answer, bound to a question slot
#[derive(Debug)]
pub struct ResponseArtifact {
    payload: MediaPayload,
    preview: PreviewHandle,
    source: ArtifactSource,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl ResponseArtifact {
    /// Build an artifact and register its preview
    pub fn new(
        payload: MediaPayload,
        source: ArtifactSource,
        registry: &Arc<dyn PreviewRegistry>,
    ) -> Result<Self, CaptureError> {
        if payload.is_empty() {
            return Err(CaptureError::NoDataCaptured);
        }

        let preview = PreviewHandle::issue(&payload, registry);

        Ok(Self {
            payload,
            preview,
            source,
            created_at: chrono::Utc::now(),
        })
    }

    /// Artifact for a user-selected video file
    pub async fn from_file(
        path: impl AsRef<Path>,
        registry: &Arc<dyn PreviewRegistry>,
    ) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening response video: {}", path.display());

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read video file: {}", path.display()))?;

        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let payload = MediaPayload::new(bytes, mime_type_for_path(path));

        info!(
            "Response video loaded: {} bytes ({})",
            payload.len(),
            payload.mime_type
        );

        Ok(Self::new(payload, ArtifactSource::Uploaded { file_name }, registry)?)
    }

    pub fn payload(&self) -> &MediaPayload {
        &self.payload
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    /// Revoke the preview. Safe to call more than once.
    pub fn release(&self) {
        self.preview.revoke();
    }
}

/// Guess a video MIME type from a file extension
pub fn mime_type_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "webm" => "video/webm",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "ogv" | "ogg" => "video/ogg",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
    .to_string()
}
