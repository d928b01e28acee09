//! HTTP API for driving interviews from a browser UI
//!
//! - POST /interviews - Generate questions and start an interview
//! - GET /interviews/:id - Current session snapshot
//! - PUT /interviews/:id/response - Upload an answer for the current question
//! - DELETE /interviews/:id/response - Reset the current answer
//! - POST /interviews/:id/navigate - Next, previous or jump
//! - POST /interviews/:id/recording/start - Record the current question
//! - POST /interviews/:id/recording/stop - Stop and keep the recording
//! - POST /interviews/:id/complete - Submit and return the report
//! - DELETE /interviews/:id?confirm=true - Exit the interview
//! - GET /previews/:id - Play back a stored answer
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use state::{AppState, Services};
