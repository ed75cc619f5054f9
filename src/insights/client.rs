//! Asks the Anthropic Messages API for insights.
//!
//! Flow:
//! 1. Scrub and truncate message bodies, build the queue payload
//! 2. Call the model with the `queue_insights` tool definition
//! 3. Pull the tool input (or a plain-text JSON fallback) out of the reply
//! 4. Run the guardrails in `validate`
//!
//! Nothing here returns an error to the caller. Every failure becomes
//! `InsightsOutcome::Unavailable` with a reason code. No retries; callers
//! cancel by dropping the future.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::InsightsConfig;
use crate::error::InsightsError;
use crate::insights::model::{InsightsOutcome, UnavailableReason};
use crate::insights::prompt::{TOOL_NAME, USER_INSTRUCTION, build_system_prompt, tool_definition};
use crate::insights::validate::{EMAIL_RE, validate_queue_insights_response};
use crate::pipeline::types::TriagedMessage;

/// Placeholder substituted for email addresses before anything leaves the process.
pub const REDACTED_EMAIL: &str = "[redacted-email]";

/// Anything that can produce insights for a queue snapshot.
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn queue_insights(&self, messages: &[TriagedMessage]) -> InsightsOutcome;
}

/// Replace every email-shaped substring with [`REDACTED_EMAIL`].
pub fn scrub_likely_pii(text: &str) -> String {
    EMAIL_RE.replace_all(text, REDACTED_EMAIL).into_owned()
}

/// Build the queue snapshot sent to the model.
pub fn build_queue_payload(messages: &[TriagedMessage], max_body_chars: usize) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| {
            let body: String = scrub_likely_pii(m.body()).chars().take(max_body_chars).collect();
            json!({
                "id": m.id(),
                "body": body,
                "category": m.category,
                "priority": m.priority,
                "resolved": m.resolved,
                "date": m.message.date,
            })
        })
        .collect();
    json!({ "messages": messages })
}

/// Extract the insights payload from a Messages API response body.
///
/// Prefers the `queue_insights` tool call; falls back to the first text
/// block parsed as JSON.
pub fn extract_insights_payload(response: &Value) -> Result<Value, UnavailableReason> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let tool_input = blocks
        .iter()
        .find(|b| {
            b.get("type").and_then(Value::as_str) == Some("tool_use")
                && b.get("name").and_then(Value::as_str) == Some(TOOL_NAME)
        })
        .and_then(|b| b.get("input"))
        .filter(|input| !input.is_null());
    if let Some(input) = tool_input {
        return Ok(input.clone());
    }

    let text = blocks
        .iter()
        .find(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .and_then(|b| b.get("text"))
        .and_then(Value::as_str);
    match text {
        Some(text) => {
            serde_json::from_str(text.trim()).map_err(|_| UnavailableReason::ModelInvalidJson)
        }
        None => Err(UnavailableReason::ModelNoOutput),
    }
}

/// HTTP client for the Anthropic Messages API.
pub struct QueueInsightsClient {
    http: reqwest::Client,
    config: InsightsConfig,
}

impl QueueInsightsClient {
    pub fn new(config: InsightsConfig) -> Result<Self, InsightsError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Full request body for `POST /v1/messages`.
    pub fn build_request_body(&self, messages: &[TriagedMessage]) -> Value {
        let payload = build_queue_payload(messages, self.config.max_body_chars);
        json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": build_system_prompt(),
            "tools": [tool_definition()],
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": USER_INSTRUCTION },
                    { "type": "text", "text": payload.to_string() },
                ],
            }],
        })
    }

    async fn fetch(&self, messages: &[TriagedMessage]) -> Result<Value, UnavailableReason> {
        let Some(api_key) = self.config.api_key.as_ref() else {
            return Err(UnavailableReason::NotConfigured);
        };

        let url = format!("{}/v1/messages", self.config.base_url);
        let body = self.build_request_body(messages);
        debug!(url = %url, model = %self.config.model, count = messages.len(), "Requesting queue insights");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", &self.config.anthropic_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Insights request failed");
                UnavailableReason::NetworkError
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_error_status(status.as_u16(), response).await);
        }

        let data: Value = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to read insights response body");
            if e.is_decode() {
                UnavailableReason::ModelError
            } else {
                UnavailableReason::NetworkError
            }
        })?;

        extract_insights_payload(&data)
    }
}

/// An API error object means the model endpoint itself refused; anything
/// else (proxy pages, empty bodies) is reported by bare status.
async fn classify_error_status(status: u16, response: reqwest::Response) -> UnavailableReason {
    let body = response.json::<Value>().await.ok();
    let is_api_error = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .is_some_and(|e| !e.is_null());
    warn!(status, is_api_error, "Insights request returned error status");
    if is_api_error {
        UnavailableReason::ModelError
    } else {
        UnavailableReason::Http(status)
    }
}

#[async_trait]
impl InsightSource for QueueInsightsClient {
    async fn queue_insights(&self, messages: &[TriagedMessage]) -> InsightsOutcome {
        let payload = match self.fetch(messages).await {
            Ok(payload) => payload,
            Err(reason) => {
                warn!(reason = %reason, "Queue insights unavailable");
                return InsightsOutcome::unavailable(reason);
            }
        };

        match validate_queue_insights_response(&payload) {
            Ok(validated) => {
                info!(count = validated.insights.len(), "Queue insights validated");
                InsightsOutcome::Ok {
                    insights: validated.insights,
                }
            }
            Err(e) => {
                warn!(reason = %e, "Queue insights rejected by guardrails");
                InsightsOutcome::unavailable(UnavailableReason::InvalidOutput)
            }
        }
    }
}
