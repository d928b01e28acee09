use crate::ai::QuestionService;
use crate::media::MediaCapture;
use crate::session::{InterviewSessionController, PreviewRegistry};
use crate::submission::SubmissionCoordinator;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Collaborators shared by every interview
pub struct Services {
    pub questions: Arc<dyn QuestionService>,
    pub capture: MediaCapture,
    pub coordinator: Arc<SubmissionCoordinator>,
}

impl Services {
    pub fn registry(&self) -> &Arc<dyn PreviewRegistry> {
        self.capture.registry()
    }

    /// Fresh controller bound to the shared collaborators
    pub fn controller(&self) -> InterviewSessionController {
        InterviewSessionController::new(self.capture.clone(), Arc::clone(&self.coordinator))
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Interviews (session_id → controller)
    pub sessions: Arc<RwLock<HashMap<String, Arc<Mutex<InterviewSessionController>>>>>,

    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            services: Arc::new(services),
        }
    }
}
