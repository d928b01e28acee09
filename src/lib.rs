pub mod ai;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod nats;
pub mod results;
pub mod session;
pub mod submission;

pub use ai::{HttpAiClient, QuestionService, ReviewService, ScoreRange, SummaryService};
pub use config::Config;
pub use error::{CaptureError, NavigationError, SessionError};
pub use http::{create_router, AppState, Services};
pub use media::{CaptureConfig, MediaCapture, MediaCaptureProvider, SyntheticCaptureProvider};
pub use nats::{NatsResultPublisher, ReviewMessage, SummaryMessage};
pub use results::{InMemoryResultStore, ResultStore};
pub use session::{
    InMemoryPreviewRegistry, InterviewSessionController, MediaPayload, PreviewRegistry, ResponseArtifact,
    SessionPhase, SessionSnapshot, SetupMetadata,
};
pub use submission::{InterviewReport, SubmissionConfig, SubmissionCoordinator, SubmissionResult};
