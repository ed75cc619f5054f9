//! Attaches category and priority to raw messages.

use tracing::{debug, info};

use crate::pipeline::rules::{categorise, prioritise};
use crate::pipeline::types::{RawMessage, TriagedMessage};

/// Triage a single message. Always succeeds; an empty body falls through
/// to General / Medium.
pub fn triage_one(message: RawMessage) -> TriagedMessage {
    let category = categorise(&message.body);
    let priority = prioritise(&message.body);
    debug!(
        id = %message.id,
        category = %category,
        priority = %priority,
        "Triaged message"
    );
    TriagedMessage {
        message,
        category,
        priority,
        resolved: false,
    }
}

/// Triage a batch. Output has the same length and order as the input.
pub fn triage(messages: Vec<RawMessage>) -> Vec<TriagedMessage> {
    let count = messages.len();
    let triaged: Vec<TriagedMessage> = messages.into_iter().map(triage_one).collect();
    info!(count, "Triage batch complete");
    triaged
}
