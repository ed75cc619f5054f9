//! Shared types for the triage pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Raw message ─────────────────────────────────────────────────────

/// An inbound support message as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Stable unique identifier.
    pub id: String,
    /// Free-text message body.
    pub body: String,
    /// Display name of the customer (if known).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// ISO 8601 timestamp string, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl RawMessage {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            customer_name: None,
            date: None,
        }
    }

    /// Parse `date` as RFC 3339. `None` when absent or malformed.
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Message category. Declaration order is the display order, not the
/// rule precedence (see `rules::categorise`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Bug,
    Billing,
    #[serde(rename = "Feature Request")]
    FeatureRequest,
    General,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Bug,
        Category::Billing,
        Category::FeatureRequest,
        Category::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bug => "Bug",
            Self::Billing => "Billing",
            Self::FeatureRequest => "Feature Request",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// Message priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == s)
            .ok_or_else(|| format!("Unknown priority: {}", s))
    }
}

// ── Triaged message ─────────────────────────────────────────────────

/// A raw message with its triage decision attached.
///
/// `category` and `priority` are assigned once at triage time. `resolved`
/// starts `false` and only changes through `TriageQueue::toggle_resolved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriagedMessage {
    #[serde(flatten)]
    pub message: RawMessage,
    pub category: Category,
    pub priority: Priority,
    pub resolved: bool,
}

impl TriagedMessage {
    pub fn id(&self) -> &str {
        &self.message.id
    }

    pub fn body(&self) -> &str {
        &self.message.body
    }
}
