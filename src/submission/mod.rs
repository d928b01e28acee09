//! Submission phase: one review upload per question, then the report

mod coordinator;
mod report;

pub use coordinator::{SubmissionConfig, SubmissionCoordinator, SubmissionItem, SubmissionRequest};
pub use report::{
    aggregate_score, fallback_tips, InterviewDetails, InterviewReport, QuestionFeedback, ReviewFeedback,
    ScoreCategory, SubmissionResult, DEGRADED_SUMMARY, FALLBACK_SUMMARY, FALLBACK_TIPS, NO_RESPONSE_REASON,
    REVIEW_TIMEOUT_REASON,
};
