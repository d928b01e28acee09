use chrono::{DateTime, Utc};

use super::config::SetupMetadata;
use super::navigator::SessionNavigator;
use super::store::ResponseStore;
use crate::submission::{SubmissionItem, SubmissionRequest};

/// Everything owned by one running interview
#[derive(Debug)]
pub struct SessionState {
    id: String,
    questions: Vec<String>,
    setup: SetupMetadata,
    pub(crate) responses: ResponseStore,
    pub(crate) navigator: SessionNavigator,
    started_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(questions: Vec<String>, setup: SetupMetadata) -> Self {
        let navigator = SessionNavigator::new(questions.len());
        Self {
            id: format!("interview-{}", uuid::Uuid::new_v4()),
            questions,
            setup,
            responses: ResponseStore::new(),
            navigator,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    pub fn setup(&self) -> &SetupMetadata {
        &self.setup
    }

    pub fn responses(&self) -> &ResponseStore {
        &self.responses
    }

    pub fn navigator(&self) -> &SessionNavigator {
        &self.navigator
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn current_index(&self) -> usize {
        self.navigator.current_index()
    }

    pub fn highest_answered_index(&self) -> Option<usize> {
        self.responses.highest_answered_index()
    }

    pub fn max_unlocked_index(&self) -> usize {
        self.navigator.max_unlocked_index()
    }

    /// The last question has an answer
    pub fn can_complete(&self) -> bool {
        self.responses.contains(self.navigator.last_index())
    }

    pub(crate) fn recompute_unlock(&mut self) {
        let highest = self.responses.highest_answered_index();
        self.navigator.recompute_unlock(highest);
    }

    /// Detach the answers for upload (payload clones share their buffers)
    pub fn submission_request(&self) -> SubmissionRequest {
        let items = self
            .questions
            .iter()
            .enumerate()
            .map(|(question_index, question)| SubmissionItem {
                question_index,
                question: question.clone(),
                video: self.responses.get(question_index).map(|a| a.payload().clone()),
            })
            .collect();

        SubmissionRequest {
            session_id: self.id.clone(),
            setup: self.setup.clone(),
            items,
            started_at: Some(self.started_at),
        }
    }
}
