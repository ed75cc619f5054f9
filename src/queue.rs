//! Triage queue — in-memory triaged messages with broadcast to WebSocket clients.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};

use crate::pipeline::types::{Category, Priority, TriagedMessage};

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Events pushed to queue subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// Full queue contents (sent on connect and after lag).
    QueueSync { messages: Vec<TriagedMessage> },
    /// A message's resolved flag changed.
    MessageUpdate { id: String, resolved: bool },
}

/// Optional category/priority filter. `None` means "All".
///
/// On the wire, an absent value, an empty value and the literal `All` all
/// deserialize to `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct QueueFilter {
    #[serde(default, deserialize_with = "all_as_none")]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "all_as_none")]
    pub priority: Option<Priority>,
}

fn all_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr<Err = String>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") | Some("All") => Ok(None),
        Some(label) => label.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl QueueFilter {
    pub fn matches(&self, message: &TriagedMessage) -> bool {
        self.category.is_none_or(|c| c == message.category)
            && self.priority.is_none_or(|p| p == message.priority)
    }
}

/// Unresolved message counts. Every category and priority is present, in
/// declaration order, even when its count is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    pub total: usize,
    pub unresolved: usize,
    pub by_category: Vec<(Category, usize)>,
    pub by_priority: Vec<(Priority, usize)>,
}

impl QueueSummary {
    pub fn from_messages(messages: &[TriagedMessage]) -> Self {
        let active: Vec<&TriagedMessage> = messages.iter().filter(|m| !m.resolved).collect();
        let by_category = Category::ALL
            .into_iter()
            .map(|c| (c, active.iter().filter(|m| m.category == c).count()))
            .collect();
        let by_priority = Priority::ALL
            .into_iter()
            .map(|p| (p, active.iter().filter(|m| m.priority == p).count()))
            .collect();
        Self {
            total: messages.len(),
            unresolved: active.len(),
            by_category,
            by_priority,
        }
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.by_category
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, n)| *n)
    }

    pub fn priority_count(&self, priority: Priority) -> usize {
        self.by_priority
            .iter()
            .find(|(p, _)| *p == priority)
            .map_or(0, |(_, n)| *n)
    }
}

/// In-memory triage queue backed by a broadcast channel for fan-out.
pub struct TriageQueue {
    messages: RwLock<Vec<TriagedMessage>>,
    tx: broadcast::Sender<QueueEvent>,
}

impl TriageQueue {
    /// Create a queue holding already-triaged messages.
    pub fn new(messages: Vec<TriagedMessage>) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        info!(count = messages.len(), "Triage queue initialised");
        Arc::new(Self {
            messages: RwLock::new(messages),
            tx,
        })
    }

    /// Subscribe to real-time queue events. Each WS client calls this.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }

    /// All messages in triage order.
    pub async fn snapshot(&self) -> Vec<TriagedMessage> {
        self.messages.read().await.clone()
    }

    /// Messages matching `filter`, in triage order.
    pub async fn filter(&self, filter: &QueueFilter) -> Vec<TriagedMessage> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect()
    }

    /// Counts of unresolved messages.
    pub async fn summary(&self) -> QueueSummary {
        QueueSummary::from_messages(&self.messages.read().await)
    }

    /// Flip a message's resolved flag. Returns the new value, or `None` if
    /// no message has that id.
    pub async fn toggle_resolved(&self, id: &str) -> Option<bool> {
        let resolved = {
            let mut messages = self.messages.write().await;
            let message = messages.iter_mut().find(|m| m.id() == id)?;
            message.resolved = !message.resolved;
            message.resolved
        };

        debug!(id = %id, resolved, "Toggled resolved state");

        // No receivers is fine.
        let _ = self.tx.send(QueueEvent::MessageUpdate {
            id: id.to_string(),
            resolved,
        });

        Some(resolved)
    }
}
