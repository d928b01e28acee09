//! Interview session state
//!
//! - `artifact`: captured answers and their revocable previews
//! - `store`: one response slot per question
//! - `navigator`: current question and the unlocked frontier
//! - `controller`: lifecycle from start to report or exit

mod artifact;
mod config;
mod controller;
mod navigator;
mod snapshot;
mod state;
mod store;

pub use artifact::{
    mime_type_for_path, ArtifactSource, InMemoryPreviewRegistry, MediaPayload, PreviewHandle,
    PreviewRegistry, ResponseArtifact,
};
pub use config::{clamp_question_count, SetupMetadata, MAX_QUESTIONS, MIN_QUESTIONS};
pub use controller::{InterviewSessionController, PendingSubmission};
pub use navigator::SessionNavigator;
pub use snapshot::{CaptureStatus, SessionPhase, SessionSnapshot};
pub use state::SessionState;
pub use store::ResponseStore;
