use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SetupMetadata;

/// Failure reason for a question the candidate never answered
pub const NO_RESPONSE_REASON: &str = "no response provided";

/// Failure reason for an upload that outlived its deadline
pub const REVIEW_TIMEOUT_REASON: &str = "review timed out";

pub const FALLBACK_SUMMARY: &str =
    "Your interview was recorded, but detailed feedback could not be generated for every answer. \
     Review the per-question results below and try another practice round.";

pub const DEGRADED_SUMMARY: &str =
    "Analysis is unavailable right now. Your answers were not scored; please try again later.";

pub const FALLBACK_TIPS: [&str; 4] = [
    "Structure answers with the STAR method: situation, task, action, result.",
    "Keep each answer focused and aim for two to three minutes.",
    "Back up claims with concrete examples and measurable outcomes.",
    "Look at the camera and speak clearly at a steady pace.",
];

pub fn fallback_tips() -> Vec<String> {
    FALLBACK_TIPS.iter().map(|t| t.to_string()).collect()
}

/// Scored feedback for a single answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFeedback {
    /// 1-10 unless the scoring range is configured otherwise
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub overall_feedback: String,

    /// Interview-level summary, when the reviewer includes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Interview-level tips, when the reviewer includes them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}

/// Outcome of one question's upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionResult {
    Success(ReviewFeedback),
    Failure { reason: String },
}

impl SubmissionResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn feedback(&self) -> Option<&ReviewFeedback> {
        match self {
            Self::Success(feedback) => Some(feedback),
            Self::Failure { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

/// Per-question entry of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionFeedback {
    pub question_index: usize,
    pub question: String,
    pub result: SubmissionResult,
}

impl QuestionFeedback {
    pub fn score(&self) -> Option<u8> {
        self.result.feedback().map(|f| f.score)
    }

    pub fn category(&self) -> Option<ScoreCategory> {
        self.score().map(ScoreCategory::from_score)
    }
}

/// Display band for a 1-10 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
    Poor,
}

impl ScoreCategory {
    pub fn from_score(score: u8) -> Self {
        match score {
            9..=u8::MAX => Self::Excellent,
            7..=8 => Self::Good,
            5..=6 => Self::Average,
            3..=4 => Self::NeedsImprovement,
            _ => Self::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Average => "Average",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Interview setup echoed back on the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewDetails {
    pub company: String,
    pub position: String,
    pub experience: String,
    pub questions_count: usize,

    /// Seconds from session start to report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl InterviewDetails {
    pub fn new(setup: &SetupMetadata, questions_count: usize, started_at: Option<DateTime<Utc>>) -> Self {
        Self {
            company: setup.company.clone(),
            position: setup.position.clone(),
            experience: setup.experience.clone(),
            questions_count,
            duration_secs: started_at
                .map(|s| Utc::now().signed_duration_since(s).num_milliseconds() as f64 / 1000.0),
        }
    }
}

/// Final, read-only result of an interview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewReport {
    pub session_id: String,
    pub feedbacks: Vec<QuestionFeedback>,
    pub score: u8,
    pub category: ScoreCategory,
    pub summary: String,
    pub tips: Vec<String>,
    pub interview_details: InterviewDetails,

    /// Built without any per-question results (orchestration failed)
    pub degraded: bool,

    pub generated_at: DateTime<Utc>,
}

impl InterviewReport {
    /// Report with every question failed and a synthetic summary
    ///
    /// `default_score` is the bottom of the review score range, the same
    /// score an all-failed submission aggregates to.
    pub fn degraded(
        session_id: impl Into<String>,
        questions: &[String],
        details: InterviewDetails,
        default_score: u8,
        reason: &str,
    ) -> Self {
        let feedbacks = questions
            .iter()
            .enumerate()
            .map(|(question_index, question)| QuestionFeedback {
                question_index,
                question: question.clone(),
                result: SubmissionResult::failure(format!("analysis unavailable: {}", reason)),
            })
            .collect();

        Self {
            session_id: session_id.into(),
            feedbacks,
            score: default_score,
            category: ScoreCategory::from_score(default_score),
            summary: DEGRADED_SUMMARY.to_string(),
            tips: fallback_tips(),
            interview_details: details,
            degraded: true,
            generated_at: Utc::now(),
        }
    }

    pub fn success_count(&self) -> usize {
        self.feedbacks.iter().filter(|f| f.result.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.feedbacks.len() - self.success_count()
    }
}

/// Rounded mean of the successful scores, or `fallback` if there are none
pub fn aggregate_score(feedbacks: &[QuestionFeedback], fallback: u8) -> u8 {
    let scores: Vec<f64> = feedbacks
        .iter()
        .filter_map(|f| f.score())
        .map(f64::from)
        .collect();

    if scores.is_empty() {
        return fallback;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round() as u8
}
