use serde::{Deserialize, Serialize};

use crate::submission::{InterviewReport, ReviewFeedback};

/// Review published to `interview.review.<user>.<index>`
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewMessage {
    pub user_id: String,
    pub question_index: usize,
    pub review: ReviewFeedback,
    pub timestamp: String, // RFC3339 timestamp
}

/// Summary published to `interview.summary.<user>`
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryMessage {
    pub user_id: String,
    pub session_id: String,
    pub score: u8,
    pub summary: String,
    pub tips: Vec<String>,
    pub report: InterviewReport,
    pub timestamp: String,
}
