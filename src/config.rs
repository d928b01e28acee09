use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::ai::ScoreRange;
use crate::media::{default_mime_preferences, CaptureConfig};

/// Shortest recorder slice period accepted from config
pub const MIN_TIMESLICE_MS: u64 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub ai: AiConfig,
    pub capture: CaptureSettings,
    pub submission: SubmissionSettings,
    pub results: ResultsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "podium-interview".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

/// Question generation, review and summary endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub generate_path: String,
    pub review_path: String,
    /// Summary endpoint; summaries fall back to generic text when unset
    pub summary_path: Option<String>,
    pub request_timeout_secs: u64,
    pub fields: AiFieldNames,
    pub score: ScoreRange,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000/api/app".to_string(),
            generate_path: "/generate-questions".to_string(),
            review_path: "/review-answer".to_string(),
            summary_path: None,
            request_timeout_secs: 60,
            fields: AiFieldNames::default(),
            score: ScoreRange::default(),
        }
    }
}

impl AiConfig {
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Wire names that differ between service versions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiFieldNames {
    /// `positionTitle` in current deployments, `position` in older ones
    pub position: String,
}

impl Default for AiFieldNames {
    fn default() -> Self {
        Self {
            position: "positionTitle".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub mime_preferences: Vec<String>,
    pub timeslice_ms: u64,
    pub flush_timeout_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            mime_preferences: default_mime_preferences(),
            timeslice_ms: 1000,
            flush_timeout_ms: 500,
        }
    }
}

impl CaptureSettings {
    pub fn to_capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            mime_preferences: self.mime_preferences.clone(),
            // a zero period cannot drive the slice timer
            timeslice: Duration::from_millis(self.timeslice_ms.max(MIN_TIMESLICE_MS)),
            flush_timeout: Duration::from_millis(self.flush_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
    /// Deadline for each review upload
    pub review_timeout_secs: u64,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self { review_timeout_secs: 120 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Publish reviews and summaries to NATS when set
    pub nats_url: Option<String>,
}

impl Config {
    /// Load `path` (any extension the config crate knows) plus `PODIUM__*` overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("PODIUM").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
