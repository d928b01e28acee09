use anyhow::{Context, Result};
use async_nats::Client;
use async_trait::async_trait;
use tracing::info;

use super::messages::{ReviewMessage, SummaryMessage};
use crate::results::ResultStore;
use crate::submission::{InterviewReport, ReviewFeedback};

/// Publishes reviews and summaries to NATS for downstream storage
pub struct NatsResultPublisher {
    client: Client,
}

impl NatsResultPublisher {
    /// Connect to NATS server
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client })
    }

    pub fn review_subject(user_id: &str, question_index: usize) -> String {
        format!("interview.review.{}.{}", user_id, question_index)
    }

    pub fn summary_subject(user_id: &str) -> String {
        format!("interview.summary.{}", user_id)
    }

    async fn publish(&self, subject: String, payload: Vec<u8>) -> Result<()> {
        let bytes = payload.len();
        self.client
            .publish(subject.clone(), payload.into())
            .await
            .with_context(|| format!("Failed to publish to {}", subject))?;

        info!("Published {} bytes to {}", bytes, subject);
        Ok(())
    }
}

#[async_trait]
impl ResultStore for NatsResultPublisher {
    async fn save_review(&self, user_id: &str, question_index: usize, review: &ReviewFeedback) -> Result<()> {
        let message = ReviewMessage {
            user_id: user_id.to_string(),
            question_index,
            review: review.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;
        self.publish(Self::review_subject(user_id, question_index), payload)
            .await
    }

    async fn save_summary(&self, user_id: &str, report: &InterviewReport) -> Result<()> {
        let message = SummaryMessage {
            user_id: user_id.to_string(),
            session_id: report.session_id.clone(),
            score: report.score,
            summary: report.summary.clone(),
            tips: report.tips.clone(),
            report: report.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;
        self.publish(Self::summary_subject(user_id), payload).await
    }
}
