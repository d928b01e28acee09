// Shared test doubles for capture, previews and the AI services

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use bytes::Bytes;
use podium_interview::ai::{
    QuestionService, ReviewRequest, ReviewService, SummaryRequest, SummaryResponse, SummaryService,
};
use podium_interview::error::CaptureError;
use podium_interview::media::{CaptureConfig, CaptureDevice, MediaCapture, MediaCaptureProvider, MediaChunk};
use podium_interview::session::{
    ArtifactSource, InMemoryPreviewRegistry, MediaPayload, PreviewRegistry, ResponseArtifact, SetupMetadata,
};
use podium_interview::submission::ReviewFeedback;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Previews
// ============================================================================

/// In-memory registry that counts revoke calls per URL
#[derive(Default)]
pub struct CountingRegistry {
    inner: InMemoryPreviewRegistry,
    revokes: Mutex<HashMap<String, usize>>,
}

impl CountingRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn revoke_count(&self, url: &str) -> usize {
        self.revokes.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_revokes(&self) -> usize {
        self.revokes.lock().unwrap().values().sum()
    }

    pub fn live_count(&self) -> usize {
        self.inner.live_count()
    }
}

impl PreviewRegistry for CountingRegistry {
    fn register(&self, payload: &MediaPayload) -> String {
        self.inner.register(payload)
    }

    fn revoke(&self, url: &str) {
        *self.revokes.lock().unwrap().entry(url.to_string()).or_default() += 1;
        self.inner.revoke(url);
    }

    fn resolve(&self, url: &str) -> Option<MediaPayload> {
        self.inner.resolve(url)
    }
}

pub fn as_registry(registry: &Arc<CountingRegistry>) -> Arc<dyn PreviewRegistry> {
    registry.clone()
}

pub fn uploaded(registry: &Arc<dyn PreviewRegistry>, bytes: &[u8]) -> ResponseArtifact {
    ResponseArtifact::new(
        MediaPayload::new(bytes.to_vec(), "video/webm"),
        ArtifactSource::Uploaded { file_name: None },
        registry,
    )
    .unwrap()
}

// ============================================================================
// Capture
// ============================================================================

/// What a scripted device does when recording
#[derive(Clone)]
pub struct DeviceScript {
    /// Slices delivered right after `start`
    pub slices: Vec<Vec<u8>>,
    /// Slice delivered when `stop` is called
    pub final_slice: Option<Vec<u8>>,
    /// Keep the channel open after `stop` (final slice never arrives)
    pub hang_on_stop: bool,
}

impl Default for DeviceScript {
    fn default() -> Self {
        Self {
            slices: vec![vec![1u8; 16], vec![2u8; 16]],
            final_slice: Some(vec![3u8; 8]),
            hang_on_stop: false,
        }
    }
}

/// Provider with scripted devices and counters
pub struct ScriptedProvider {
    pub supported: Vec<String>,
    pub script: DeviceScript,
    pub deny: bool,
    pub acquired: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
    pub started_with: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(script: DeviceScript) -> Self {
        Self {
            supported: vec!["video/webm".to_string(), "video/mp4".to_string()],
            script,
            deny: false,
            acquired: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
            started_with: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCaptureProvider for ScriptedProvider {
    async fn acquire(&self) -> Result<Box<dyn CaptureDevice>, CaptureError> {
        if self.deny {
            return Err(CaptureError::PermissionDenied);
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ScriptedDevice {
            script: self.script.clone(),
            releases: Arc::clone(&self.releases),
            started_with: Arc::clone(&self.started_with),
            tx: None,
        }))
    }

    fn supports_mime_type(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|s| s == mime_type)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedDevice {
    script: DeviceScript,
    releases: Arc<AtomicUsize>,
    started_with: Arc<Mutex<Vec<String>>>,
    tx: Option<mpsc::Sender<MediaChunk>>,
}

#[async_trait]
impl CaptureDevice for ScriptedDevice {
    async fn start(
        &mut self,
        mime_type: &str,
        _timeslice: Duration,
    ) -> Result<mpsc::Receiver<MediaChunk>, CaptureError> {
        self.started_with.lock().unwrap().push(mime_type.to_string());

        let (tx, rx) = mpsc::channel(64);
        for (i, slice) in self.script.slices.iter().enumerate() {
            tx.try_send(MediaChunk {
                data: Bytes::from(slice.clone()),
                timestamp_ms: i as u64 * 1000,
            })
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        }

        self.tx = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if let (Some(tx), Some(slice)) = (&self.tx, &self.script.final_slice) {
            let _ = tx
                .send(MediaChunk {
                    data: Bytes::from(slice.clone()),
                    timestamp_ms: self.script.slices.len() as u64 * 1000,
                })
                .await;
        }
        if !self.script.hang_on_stop {
            self.tx = None;
        }
        Ok(())
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.tx = None;
    }

    fn is_recording(&self) -> bool {
        self.tx.is_some()
    }

    fn name(&self) -> &str {
        "scripted-camera"
    }
}

pub fn fast_capture_config() -> CaptureConfig {
    CaptureConfig {
        flush_timeout: Duration::from_millis(50),
        ..CaptureConfig::default()
    }
}

pub fn capture_with(provider: &Arc<ScriptedProvider>, registry: &Arc<CountingRegistry>) -> MediaCapture {
    let provider: Arc<dyn MediaCaptureProvider> = provider.clone();
    MediaCapture::new(provider, as_registry(registry), fast_capture_config())
}

// ============================================================================
// AI services
// ============================================================================

/// Reviewer with a scripted outcome per question index
pub struct ScriptedReviewer {
    scores: HashMap<usize, u8>,
    failures: HashMap<usize, String>,
    default_score: u8,
    summary: Option<String>,
    tips: Option<Vec<String>>,
    delay: Option<Duration>,
    delays: HashMap<usize, Duration>,
    pub calls: AtomicUsize,
    pub finished: AtomicUsize,
}

impl ScriptedReviewer {
    pub fn new(default_score: u8) -> Self {
        Self {
            scores: HashMap::new(),
            failures: HashMap::new(),
            default_score,
            summary: None,
            tips: None,
            delay: None,
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn score(mut self, index: usize, score: u8) -> Self {
        self.scores.insert(index, score);
        self
    }

    pub fn fail(mut self, index: usize, reason: &str) -> Self {
        self.failures.insert(index, reason.to_string());
        self
    }

    pub fn with_summary(mut self, summary: &str, tips: &[&str]) -> Self {
        self.summary = Some(summary.to_string());
        self.tips = Some(tips.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay for one question, overriding `with_delay`
    pub fn delay_for(mut self, index: usize, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reviews that ran to the end, successful or not
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewService for ScriptedReviewer {
    async fn review(&self, request: &ReviewRequest) -> Result<ReviewFeedback> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.get(&request.question_index).copied().or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.failures.get(&request.question_index) {
            bail!("{}", reason);
        }

        let score = self
            .scores
            .get(&request.question_index)
            .copied()
            .unwrap_or(self.default_score);

        Ok(ReviewFeedback {
            score,
            strengths: vec!["Clear structure".to_string()],
            weaknesses: vec!["Few metrics".to_string()],
            overall_feedback: format!("Answer {} was solid", request.question_index),
            summary: self.summary.clone(),
            tips: self.tips.clone(),
        })
    }
}

pub struct FixedSummarizer {
    pub calls: AtomicUsize,
}

impl FixedSummarizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SummaryService for FixedSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SummaryResponse {
            summary: format!("Summary of {} answers", request.feedback.len()),
            tips: vec!["Practice out loud".to_string()],
            score: None,
        })
    }
}

pub struct FixedQuestions(pub Vec<String>);

#[async_trait]
impl QuestionService for FixedQuestions {
    async fn generate_questions(&self, setup: &SetupMetadata) -> Result<Vec<String>> {
        Ok(self.0.iter().take(setup.question_count).cloned().collect())
    }
}

pub fn questions(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Tell me about challenge number {}?", i)).collect()
}

pub fn setup() -> SetupMetadata {
    SetupMetadata::new("Acme", "Backend Developer", "Senior", 3).with_user_id("user-test")
}
