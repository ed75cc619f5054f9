//! Prompt and tool definition for the queue insights request.

use serde_json::{Value, json};

use crate::insights::validate::{
    MAX_ACTION_CHARS, MAX_ACTIONS, MAX_BODY_CHARS, MAX_INSIGHTS, MAX_TITLE_CHARS,
};

/// Name of the tool the model must call.
pub const TOOL_NAME: &str = "queue_insights";

/// Instruction attached to the user turn.
pub const USER_INSTRUCTION: &str =
    "Generate queue insights for this queue. Use the queue_insights tool.";

/// Build the system prompt describing the insight contract.
///
/// Mirrors the limits enforced by `validate`, so a compliant model never
/// trips a guardrail.
pub fn build_system_prompt() -> String {
    format!(
        r#"You review a snapshot of a customer support queue and return short, actionable insights for the support lead.
You MUST call the `{TOOL_NAME}` tool to return structured output. Do not answer in free text.

## Input
A JSON object with a `messages` array. Each message has `id`, `body`, `category` (Bug, Billing, Feature Request, General), `priority` (High, Medium, Low), `resolved`, and optionally `date`.

## Output
Return between 2 and {MAX_INSIGHTS} insights. Each insight has:
- `title`: at most {MAX_TITLE_CHARS} characters
- `body`: at most {MAX_BODY_CHARS} characters
- `severity`: one of `info`, `warning`, `critical`
- `actions`: up to {MAX_ACTIONS} concrete next steps, each at most {MAX_ACTION_CHARS} characters

## Rules
- Only describe what is present in this snapshot. Do not compare with earlier periods or claim trends, baselines, averages or "normal" levels; you have no history.
- Never include email addresses, names or other customer contact details.
- Prefer unresolved High priority items and clusters of similar messages.
- Be concise. No greetings, no markdown."#
    )
}

/// JSON schema for the `queue_insights` tool input.
pub fn tool_definition() -> Value {
    json!({
        "name": TOOL_NAME,
        "description": "Return 2–4 actionable support queue insights as structured data.",
        "input_schema": {
            "type": "object",
            "properties": {
                "insights": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "body": { "type": "string" },
                            "severity": { "type": "string", "enum": ["info", "warning", "critical"] },
                            "actions": { "type": "array", "items": { "type": "string" } }
                        },
                        "required": ["title", "body", "severity", "actions"]
                    }
                }
            },
            "required": ["insights"]
        }
    })
}
