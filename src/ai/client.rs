use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{info, warn};

use super::schema::{parse_questions, parse_review, SummaryResponse};
use super::service::{QuestionService, ReviewRequest, ReviewService, SummaryRequest, SummaryService};
use crate::config::AiConfig;
use crate::session::SetupMetadata;
use crate::submission::ReviewFeedback;

/// Longest response body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the hosted question/review/summary services
#[derive(Debug, Clone)]
pub struct HttpAiClient {
    http: reqwest::Client,
    config: AiConfig,
}

impl HttpAiClient {
    pub fn new(config: AiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// JSON body carrying the setup under the configured field names
    fn setup_body(&self, setup: &SetupMetadata) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("company".to_string(), json!(setup.company));
        body.insert(self.config.fields.position.clone(), json!(setup.position));
        body.insert("experience".to_string(), json!(setup.experience));
        body
    }

    async fn read_body(response: reqwest::Response, what: &str) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response", what))?;

        if !status.is_success() {
            bail!("{} service returned {}: {}", what, status, truncate(&body));
        }

        Ok(body)
    }
}

#[async_trait]
impl QuestionService for HttpAiClient {
    async fn generate_questions(&self, setup: &SetupMetadata) -> Result<Vec<String>> {
        let url = self.config.url(&self.config.generate_path);
        let mut body = self.setup_body(setup);
        body.insert("count".to_string(), json!(setup.question_count));

        info!(
            "Requesting {} questions for {} at {} ({})",
            setup.question_count, setup.position, setup.company, setup.experience
        );

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Question request to {} failed", url))?;

        let text = Self::read_body(response, "Question").await?;
        let value: Value = serde_json::from_str(&text).context("Question response is not JSON")?;
        let questions = parse_questions(&value, setup.question_count);

        if questions.is_empty() {
            bail!("Question service returned no questions");
        }
        if questions.len() < setup.question_count {
            warn!(
                "Question service returned {} of {} requested questions",
                questions.len(),
                setup.question_count
            );
        }

        info!("Generated {} questions", questions.len());
        Ok(questions)
    }
}

#[async_trait]
impl ReviewService for HttpAiClient {
    async fn review(&self, request: &ReviewRequest) -> Result<ReviewFeedback> {
        let url = self.config.url(&self.config.review_path);

        // multipart wants the bare type, without codec parameters
        let essence = request
            .video
            .mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        let extension = essence.rsplit('/').next().unwrap_or("bin").to_string();

        let video = Part::bytes(request.video.bytes.to_vec())
            .file_name(format!("response-{}.{}", request.question_index, extension))
            .mime_str(&essence)
            .with_context(|| format!("Invalid video type: {}", request.video.mime_type))?;

        let form = Form::new()
            .text("question", request.question.clone())
            .text("company", request.setup.company.clone())
            .text(self.config.fields.position.clone(), request.setup.position.clone())
            .text("experience", request.setup.experience.clone())
            .part("video", video);

        info!(
            "Uploading answer {} ({} bytes) for review",
            request.question_index,
            request.video.len()
        );

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Review upload for question {} failed", request.question_index))?;

        let text = Self::read_body(response, "Review").await?;
        let feedback = parse_review(&text, self.config.score)?;

        info!(
            "Question {} scored {}/{}",
            request.question_index, feedback.score, self.config.score.max
        );
        Ok(feedback)
    }
}

#[async_trait]
impl SummaryService for HttpAiClient {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse> {
        let Some(path) = self.config.summary_path.as_deref() else {
            bail!("No summary service configured");
        };
        let url = self.config.url(path);

        let mut body = self.setup_body(&request.setup);
        body.insert("feedback".to_string(), json!(request.feedback));

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Summary request to {} failed", url))?;

        let text = Self::read_body(response, "Summary").await?;
        serde_json::from_str(&text).context("Summary response is malformed")
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{}...", head)
    }
}
