//! AI-generated queue insights.
//!
//! The model's output is untrusted. `client` fetches it, `validate` decides
//! whether any of it may be shown. A rejected payload is never partially
//! displayed; the caller gets `InsightsOutcome::Unavailable` instead.

pub mod client;
pub mod model;
pub mod prompt;
pub mod validate;

pub use client::{InsightSource, QueueInsightsClient};
pub use model::{
    InsightSeverity, InsightsOutcome, QueueInsight, QueueInsightsResponse, UnavailableReason,
};
pub use validate::validate_queue_insights_response;
