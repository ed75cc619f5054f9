//! Support Triage — rule-based support message triage with guarded AI insights.

pub mod config;
pub mod error;
pub mod insights;
pub mod pipeline;
pub mod queue;
pub mod server;
pub mod source;
