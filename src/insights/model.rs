//! Queue insight data model and outcome types.

use serde::{Deserialize, Serialize};

/// How much attention an insight needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Info,
    Warning,
    Critical,
}

impl InsightSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    /// Parse the exact wire value. No case folding.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for InsightSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validated, trimmed insight about the current queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInsight {
    pub title: String,
    pub body: String,
    pub severity: InsightSeverity,
    pub actions: Vec<String>,
}

/// A validated insight set. Only `validate::validate_queue_insights_response`
/// produces these from untrusted input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInsightsResponse {
    pub insights: Vec<QueueInsight>,
}

// ── Outcome ─────────────────────────────────────────────────────────

/// Why insights could not be produced.
///
/// Rendered as an opaque reason code (`not_configured`, `http_502`, ...)
/// for the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnavailableReason {
    /// No API key configured.
    NotConfigured,
    /// Non-success HTTP status from an upstream we don't interpret further.
    Http(u16),
    /// The model API answered with an error status.
    ModelError,
    /// The model returned text that is not JSON.
    ModelInvalidJson,
    /// The model returned neither a tool call nor text.
    ModelNoOutput,
    /// Connection, timeout or body-read failure.
    NetworkError,
    /// The payload failed structural or content guardrails.
    InvalidOutput,
}

impl UnavailableReason {
    pub fn code(&self) -> String {
        match self {
            Self::NotConfigured => "not_configured".into(),
            Self::Http(status) => format!("http_{status}"),
            Self::ModelError => "model_error".into(),
            Self::ModelInvalidJson => "model_invalid_json".into(),
            Self::ModelNoOutput => "model_no_output".into(),
            Self::NetworkError => "network_error".into(),
            Self::InvalidOutput => "invalid_output".into(),
        }
    }

    /// Short explanation suitable for showing next to the insights panel.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Http(404) => "Insights unavailable (insights API not running).",
            Self::NotConfigured | Self::Http(503) => {
                "Insights unavailable (missing ANTHROPIC_API_KEY)."
            }
            Self::ModelError => "Insights unavailable (model error). Check ANTHROPIC_MODEL / API key.",
            _ => "Insights unavailable (not configured or invalid output).",
        }
    }
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code())
    }
}

impl Serialize for UnavailableReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

/// Result of asking for queue insights. Never an error: every failure
/// degrades to `Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsightsOutcome {
    Ok { insights: Vec<QueueInsight> },
    Unavailable { reason: UnavailableReason },
}

impl InsightsOutcome {
    pub fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "ok",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}
