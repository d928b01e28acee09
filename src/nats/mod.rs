pub mod client;
pub mod messages;

pub use client::NatsResultPublisher;
pub use messages::{ReviewMessage, SummaryMessage};
