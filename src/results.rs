//! Optional persistence of reviews and interview summaries
//!
//! Reviews are keyed by `(user_id, question_index)` and summaries by
//! `user_id`; saving the same key twice overwrites.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::submission::{InterviewReport, ReviewFeedback};

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn save_review(&self, user_id: &str, question_index: usize, review: &ReviewFeedback) -> Result<()>;

    async fn save_summary(&self, user_id: &str, report: &InterviewReport) -> Result<()>;
}

/// Keyed in-process store
#[derive(Default)]
pub struct InMemoryResultStore {
    reviews: RwLock<HashMap<(String, usize), ReviewFeedback>>,
    summaries: RwLock<HashMap<String, InterviewReport>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn review(&self, user_id: &str, question_index: usize) -> Option<ReviewFeedback> {
        let reviews = self.reviews.read().await;
        reviews.get(&(user_id.to_string(), question_index)).cloned()
    }

    pub async fn summary(&self, user_id: &str) -> Option<InterviewReport> {
        let summaries = self.summaries.read().await;
        summaries.get(user_id).cloned()
    }

    pub async fn review_count(&self) -> usize {
        self.reviews.read().await.len()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn save_review(&self, user_id: &str, question_index: usize, review: &ReviewFeedback) -> Result<()> {
        let mut reviews = self.reviews.write().await;
        reviews.insert((user_id.to_string(), question_index), review.clone());
        Ok(())
    }

    async fn save_summary(&self, user_id: &str, report: &InterviewReport) -> Result<()> {
        let mut summaries = self.summaries.write().await;
        summaries.insert(user_id.to_string(), report.clone());
        Ok(())
    }
}
