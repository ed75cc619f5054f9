//! Guardrails for model-generated queue insights.
//!
//! The payload comes from a language model and is treated as untrusted: it
//! is only inspected, never interpreted. Validation is fail-fast and
//! all-or-nothing. The first violated constraint rejects the whole response
//! with a reason naming the field, e.g. `insights[2].actions[0] too long`.
//!
//! Content guardrails apply to every title, body and action:
//! - email-shaped substrings (a heuristic, not an RFC 5322 matcher)
//! - comparative/historical vocabulary, matched as whole words with ASCII
//!   word boundaries, since the model only ever sees the current queue
//!   snapshot

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::insights::model::{InsightSeverity, QueueInsight, QueueInsightsResponse};

pub const MAX_INSIGHTS: usize = 4;
pub const MAX_TITLE_CHARS: usize = 96;
pub const MAX_BODY_CHARS: usize = 320;
pub const MAX_ACTIONS: usize = 3;
pub const MAX_ACTION_CHARS: usize = 96;

/// `local@domain.tld`, case-insensitive.
pub static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email pattern compiles")
});

static DISALLOWED_HISTORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?-u:\b)(2x|baseline|normal|usual|histor(?:y|ical)|week over week|yesterday|last week|average)(?-u:\b)",
    )
    .expect("history pattern compiles")
});

/// True if `text` trips either content guardrail.
pub fn has_disallowed_content(text: &str) -> bool {
    EMAIL_RE.is_match(text) || DISALLOWED_HISTORY_RE.is_match(text)
}

/// Validate an untrusted insights payload.
///
/// On success every string field is trimmed. Length limits count Unicode
/// scalar values of the string as received.
pub fn validate_queue_insights_response(
    input: &Value,
) -> Result<QueueInsightsResponse, ValidationError> {
    let Value::Object(root) = input else {
        return Err(ValidationError::new("response must be an object"));
    };
    let Some(Value::Array(items)) = root.get("insights") else {
        return Err(ValidationError::new("response.insights must be an array"));
    };
    if items.len() > MAX_INSIGHTS {
        return Err(ValidationError::new("too many insights"));
    }

    let insights = items
        .iter()
        .enumerate()
        .map(|(idx, raw)| validate_insight(idx, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueueInsightsResponse { insights })
}

fn validate_insight(idx: usize, raw: &Value) -> Result<QueueInsight, ValidationError> {
    let Value::Object(fields) = raw else {
        return Err(ValidationError::new(format!("insights[{idx}] must be an object")));
    };

    let title = non_empty_str(fields, "title")
        .ok_or_else(|| fail(idx, "title must be a non-empty string"))?;
    let body = non_empty_str(fields, "body")
        .ok_or_else(|| fail(idx, "body must be a non-empty string"))?;
    if char_len(title) > MAX_TITLE_CHARS {
        return Err(fail(idx, "title too long"));
    }
    if char_len(body) > MAX_BODY_CHARS {
        return Err(fail(idx, "body too long"));
    }
    if has_disallowed_content(title) || has_disallowed_content(body) {
        return Err(ValidationError::new(format!(
            "insights[{idx}] contains disallowed content"
        )));
    }

    let severity = fields
        .get("severity")
        .and_then(Value::as_str)
        .and_then(InsightSeverity::parse)
        .ok_or_else(|| fail(idx, "severity must be info|warning|critical"))?;

    let Some(Value::Array(raw_actions)) = fields.get("actions") else {
        return Err(fail(idx, "actions must be an array"));
    };
    if raw_actions.len() > MAX_ACTIONS {
        return Err(fail(idx, "actions too long"));
    }

    let mut actions = Vec::with_capacity(raw_actions.len());
    for (i, action) in raw_actions.iter().enumerate() {
        let text = action
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| fail(idx, &format!("actions[{i}] must be a non-empty string")))?;
        if char_len(text) > MAX_ACTION_CHARS {
            return Err(fail(idx, &format!("actions[{i}] too long")));
        }
        if has_disallowed_content(text) {
            return Err(fail(idx, &format!("actions[{i}] contains disallowed content")));
        }
        actions.push(text.trim().to_string());
    }

    Ok(QueueInsight {
        title: title.trim().to_string(),
        body: body.trim().to_string(),
        severity,
        actions,
    })
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn fail(idx: usize, what: &str) -> ValidationError {
    ValidationError::new(format!("insights[{idx}].{what}"))
}
