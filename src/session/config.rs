use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Smallest and largest question counts a setup may request
pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 8;

/// Setup parameters chosen before an interview starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupMetadata {
    /// Target company (e.g., "Google")
    pub company: String,

    /// Position title (e.g., "Backend Developer")
    pub position: String,

    /// Experience level (e.g., "Senior")
    pub experience: String,

    /// Number of questions to generate, clamped to 1..=8
    pub question_count: usize,

    /// Owner of persisted reviews and summaries
    pub user_id: String,
}

impl Default for SetupMetadata {
    fn default() -> Self {
        Self {
            company: String::new(),
            position: String::new(),
            experience: String::new(),
            question_count: 5,
            user_id: format!("user-{}", uuid::Uuid::new_v4()),
        }
    }
}

impl SetupMetadata {
    pub fn new(
        company: impl Into<String>,
        position: impl Into<String>,
        experience: impl Into<String>,
        question_count: usize,
    ) -> Self {
        Self {
            company: company.into(),
            position: position.into(),
            experience: experience.into(),
            question_count,
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Trim the text fields and clamp the question count
    pub fn validated(mut self) -> Result<Self, SessionError> {
        self.company = self.company.trim().to_string();
        self.position = self.position.trim().to_string();
        self.experience = self.experience.trim().to_string();

        for (name, value) in [
            ("company", &self.company),
            ("position", &self.position),
            ("experience", &self.experience),
        ] {
            if value.is_empty() {
                return Err(SessionError::InvalidSetup(format!("{} is required", name)));
            }
        }

        self.question_count = clamp_question_count(self.question_count);
        Ok(self)
    }
}

pub fn clamp_question_count(count: usize) -> usize {
    count.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
}
