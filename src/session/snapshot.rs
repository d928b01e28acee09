use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No interview started yet
    Idle,
    /// Questions are being answered
    Answering,
    /// Answers are uploading; the session is read-only
    Submitting,
    /// Report delivered, responses released
    Completed,
    /// Left without completing
    Exited,
}

/// Camera state for the active question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CaptureStatus {
    Idle,
    /// Device granted, live preview showing
    Previewing,
    /// Recording the answer for `question_index`
    Recording { question_index: usize },
}

/// Point-in-time view of the session for UI layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Active session, if any
    pub session_id: Option<String>,

    /// Bumped on every start and exit
    pub epoch: u64,

    pub phase: SessionPhase,

    pub questions: Vec<String>,

    pub current_index: usize,

    pub max_unlocked_index: usize,

    /// Per question: has a response
    pub answered: Vec<bool>,

    /// Per question: playable preview URL
    pub previews: Vec<Option<String>>,

    pub capture: CaptureStatus,

    /// The complete action is available
    pub can_complete: bool,

    pub started_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    pub fn idle(phase: SessionPhase, epoch: u64) -> Self {
        Self {
            session_id: None,
            epoch,
            phase,
            questions: Vec::new(),
            current_index: 0,
            max_unlocked_index: 0,
            answered: Vec::new(),
            previews: Vec::new(),
            capture: CaptureStatus::Idle,
            can_complete: false,
            started_at: None,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answered.iter().filter(|a| **a).count()
    }
}
