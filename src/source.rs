//! Loads raw support messages from a JSON file.
//!
//! The file holds a JSON array of `RawMessage` objects (`id`, `body`,
//! optional `customerName` and `date`).

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::SourceError;
use crate::pipeline::types::RawMessage;

/// Load and sanity-check a batch of raw messages.
///
/// Ids must be unique. A `date` that is not RFC 3339 is kept verbatim and
/// only logged.
pub fn load_messages(path: &Path) -> Result<Vec<RawMessage>, SourceError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let messages: Vec<RawMessage> =
        serde_json::from_str(&raw).map_err(|source| SourceError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    check_messages(&messages)?;
    info!(path = %path.display(), count = messages.len(), "Loaded raw messages");
    Ok(messages)
}

fn check_messages(messages: &[RawMessage]) -> Result<(), SourceError> {
    let mut seen = HashSet::with_capacity(messages.len());
    for msg in messages {
        if !seen.insert(msg.id.as_str()) {
            return Err(SourceError::DuplicateId { id: msg.id.clone() });
        }
        if msg.date.is_some() && msg.received_at().is_none() {
            warn!(id = %msg.id, date = ?msg.date, "Message date is not RFC 3339");
        }
    }
    Ok(())
}
