//! Error types for the interview session state machine
//!
//! Capture, navigation and session errors are typed so the UI layer can
//! match on them. Collaborator glue (HTTP, config, NATS) uses `anyhow`.

use thiserror::Error;

/// Errors raised while acquiring a device or producing a recorded artifact
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The user (or the OS) refused camera/microphone access
    #[error("Camera or microphone permission denied")]
    PermissionDenied,

    /// No capture API, or no encoding format the runtime supports
    #[error("Media capture unsupported: {0}")]
    Unsupported(String),

    /// Recording stopped without producing any bytes
    #[error("No data captured")]
    NoDataCaptured,

    /// The device was already released
    #[error("Capture device already released")]
    AlreadyReleased,

    /// Device-level failure reported by the provider
    #[error("Capture device error: {0}")]
    Device(String),
}

/// Navigation rejected by the progressive unlock rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Question {requested} is locked (unlocked up to {max_unlocked})")]
    Locked { requested: usize, max_unlocked: usize },
}

/// Errors surfaced by [`crate::session::InterviewSessionController`]
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No interview session is active")]
    NoActiveSession,

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// `complete()` invoked before the last question has a response
    #[error("Interview incomplete: question {missing} has no response")]
    Incomplete { missing: usize },

    /// `exit()` would discard in-progress work without confirmation
    #[error("Exiting would discard in-progress answers; confirmation required")]
    ConfirmationRequired,

    #[error("A camera capture is already in progress")]
    CaptureInProgress,

    #[error("No camera capture is in progress")]
    NoActiveCapture,

    #[error("Answers are being submitted; the session is read-only")]
    SubmissionInProgress,

    /// A submission finished after the session it belonged to was torn down
    #[error("Session epoch {epoch} ended before its submission finished")]
    Stale { epoch: u64 },

    #[error("Invalid interview setup: {0}")]
    InvalidSetup(String),
}
