//! External AI collaborators
//!
//! Question generation, per-answer review, and interview summaries are
//! hosted services. The session core only sees the traits in [`service`];
//! [`HttpAiClient`] is the production implementation.

pub mod client;
pub mod schema;
pub mod service;

pub use client::HttpAiClient;
pub use schema::{parse_questions, parse_review, ReviewParseError, ScoreRange, SummaryResponse};
pub use service::{QuestionService, ReviewRequest, ReviewService, SummaryRequest, SummaryService};
