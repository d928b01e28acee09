use anyhow::Result;
use async_trait::async_trait;

use super::schema::SummaryResponse;
use crate::session::{MediaPayload, SetupMetadata};
use crate::submission::ReviewFeedback;

/// One question's answer sent for scoring
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub question_index: usize,
    pub question: String,
    pub setup: SetupMetadata,
    pub video: MediaPayload,
}

/// Accumulated feedback sent for an interview-level summary
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub setup: SetupMetadata,
    pub feedback: Vec<String>,
}

/// Generates interview questions for a setup
#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Ordered questions, best-effort `setup.question_count` of them
    async fn generate_questions(&self, setup: &SetupMetadata) -> Result<Vec<String>>;
}

/// Scores a single recorded answer
#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn review(&self, request: &ReviewRequest) -> Result<ReviewFeedback>;
}

/// Turns per-question feedback into a summary and tips
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<SummaryResponse>;
}
