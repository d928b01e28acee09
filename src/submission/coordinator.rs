use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::report::{
    aggregate_score, fallback_tips, InterviewDetails, InterviewReport, QuestionFeedback, ReviewFeedback,
    ScoreCategory, SubmissionResult, FALLBACK_SUMMARY, NO_RESPONSE_REASON, REVIEW_TIMEOUT_REASON,
};
use crate::ai::{ReviewRequest, ReviewService, ScoreRange, SummaryRequest, SummaryService};
use crate::results::ResultStore;
use crate::session::{MediaPayload, SetupMetadata};

/// One question slot to submit
#[derive(Debug, Clone)]
pub struct SubmissionItem {
    pub question_index: usize,
    pub question: String,
    /// `None` when the question was never answered
    pub video: Option<MediaPayload>,
}

/// Everything the submission phase needs, detached from the session store
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub session_id: String,
    pub setup: SetupMetadata,
    pub items: Vec<SubmissionItem>,
    pub started_at: Option<DateTime<Utc>>,
}

impl SubmissionRequest {
    pub fn questions(&self) -> Vec<String> {
        self.items.iter().map(|i| i.question.clone()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    /// Deadline for each review upload; a late upload counts as failed
    pub review_timeout: Duration,
    pub score_range: ScoreRange,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            review_timeout: Duration::from_secs(120),
            score_range: ScoreRange::default(),
        }
    }
}

/// Fans out one review upload per question and assembles the report
pub struct SubmissionCoordinator {
    reviewer: Arc<dyn ReviewService>,
    summarizer: Option<Arc<dyn SummaryService>>,
    results: Option<Arc<dyn ResultStore>>,
    config: SubmissionConfig,
}

impl SubmissionCoordinator {
    pub fn new(reviewer: Arc<dyn ReviewService>, config: SubmissionConfig) -> Self {
        Self {
            reviewer,
            summarizer: None,
            results: None,
            config,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn SummaryService>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_result_store(mut self, results: Arc<dyn ResultStore>) -> Self {
        self.results = Some(results);
        self
    }

    /// Submit every answer and build the report. Never fails.
    ///
    /// Uploads run on the caller's task, so dropping the returned future
    /// cancels every review still in flight.
    pub async fn submit(&self, request: SubmissionRequest) -> InterviewReport {
        let session_id = request.session_id.clone();
        let questions = request.questions();
        let details = InterviewDetails::new(&request.setup, questions.len(), request.started_at);

        match self.run(request).await {
            Ok(report) => report,
            Err(e) => {
                error!("Submission for session {} failed: {:#}", session_id, e);
                InterviewReport::degraded(
                    session_id,
                    &questions,
                    details,
                    self.config.score_range.min,
                    &e.to_string(),
                )
            }
        }
    }

    async fn review_one(&self, review: ReviewRequest) -> SubmissionResult {
        let question_index = review.question_index;

        match tokio::time::timeout(self.config.review_timeout, self.reviewer.review(&review)).await {
            Ok(Ok(mut feedback)) => {
                feedback.score = self.config.score_range.clamp(feedback.score);
                SubmissionResult::Success(feedback)
            }
            Ok(Err(e)) => {
                warn!("Review of question {} failed: {:#}", question_index, e);
                SubmissionResult::failure(format!("{:#}", e))
            }
            Err(_) => {
                warn!(
                    "Review of question {} exceeded {}ms",
                    question_index,
                    self.config.review_timeout.as_millis()
                );
                SubmissionResult::failure(REVIEW_TIMEOUT_REASON)
            }
        }
    }

    async fn run(&self, request: SubmissionRequest) -> Result<InterviewReport> {
        let expected = request.items.len();
        let range = self.config.score_range;
        info!(
            "Submitting {} answers for session {}",
            expected, request.session_id
        );

        let setup = &request.setup;

        // settle every upload; no single failure aborts the others
        let uploads = request.items.iter().map(|item| async move {
            let result = match &item.video {
                None => {
                    warn!("Question {} has no response", item.question_index);
                    SubmissionResult::failure(NO_RESPONSE_REASON)
                }
                Some(video) => {
                    self.review_one(ReviewRequest {
                        question_index: item.question_index,
                        question: item.question.clone(),
                        setup: setup.clone(),
                        video: video.clone(),
                    })
                    .await
                }
            };

            QuestionFeedback {
                question_index: item.question_index,
                question: item.question.clone(),
                result,
            }
        });
        let feedbacks: Vec<QuestionFeedback> = join_all(uploads).await;

        if feedbacks.len() != expected {
            bail!("expected {} results, got {}", expected, feedbacks.len());
        }

        let successes = feedbacks.iter().filter(|f| f.result.is_success()).count();
        info!(
            "Session {}: {} of {} answers scored",
            request.session_id, successes, expected
        );

        self.persist_reviews(&request.setup.user_id, &feedbacks).await;

        let score = aggregate_score(&feedbacks, range.min);
        let (summary, tips) = self.summarize(&request.setup, &feedbacks).await;

        let report = InterviewReport {
            session_id: request.session_id.clone(),
            feedbacks,
            score,
            category: ScoreCategory::from_score(score),
            summary,
            tips,
            interview_details: InterviewDetails::new(&request.setup, expected, request.started_at),
            degraded: false,
            generated_at: Utc::now(),
        };

        if let Some(results) = &self.results {
            if let Err(e) = results.save_summary(&request.setup.user_id, &report).await {
                warn!("Failed to save interview summary: {:#}", e);
            }
        }

        info!(
            "Report ready for session {}: {}/{} ({})",
            report.session_id, report.score, range.max, report.category
        );

        Ok(report)
    }

    async fn persist_reviews(&self, user_id: &str, feedbacks: &[QuestionFeedback]) {
        let Some(results) = &self.results else {
            return;
        };

        for feedback in feedbacks {
            if let Some(review) = feedback.result.feedback() {
                if let Err(e) = results.save_review(user_id, feedback.question_index, review).await {
                    warn!("Failed to save review {}: {:#}", feedback.question_index, e);
                }
            }
        }
    }

    /// Summary and tips: first reviewer-provided, then the summary service,
    /// then generic text. Neither is ever empty.
    async fn summarize(&self, setup: &SetupMetadata, feedbacks: &[QuestionFeedback]) -> (String, Vec<String>) {
        let successes: Vec<&ReviewFeedback> = feedbacks.iter().filter_map(|f| f.result.feedback()).collect();

        let mut summary = successes.first().and_then(|f| f.summary.clone());
        let mut tips = successes.first().and_then(|f| f.tips.clone());

        if summary.is_none() || tips.is_none() {
            if let Some(summarizer) = self.summarizer.as_ref().filter(|_| !successes.is_empty()) {
                let request = SummaryRequest {
                    setup: setup.clone(),
                    feedback: successes.iter().map(|f| f.overall_feedback.clone()).collect(),
                };
                match summarizer.summarize(&request).await {
                    Ok(response) => {
                        if summary.is_none() && !response.summary.trim().is_empty() {
                            summary = Some(response.summary);
                        }
                        if tips.is_none() && !response.tips.is_empty() {
                            tips = Some(response.tips);
                        }
                    }
                    Err(e) => warn!("Summary service failed, using generic summary: {:#}", e),
                }
            }
        }

        (
            summary.unwrap_or_else(|| FALLBACK_SUMMARY.to_string()),
            tips.filter(|t| !t.is_empty()).unwrap_or_else(fallback_tips),
        )
    }
}
