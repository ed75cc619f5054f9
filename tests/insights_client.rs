//! Integration tests for the queue insights client.
//!
//! A stub Messages API runs on a random port; the client is pointed at it
//! through `InsightsConfig::base_url`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use support_triage::config::InsightsConfig;
use support_triage::insights::{
    InsightSeverity, InsightSource, InsightsOutcome, QueueInsightsClient, UnavailableReason,
};
use support_triage::pipeline::processor::triage;
use support_triage::pipeline::types::{RawMessage, TriagedMessage};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What the stub API answers, plus the last request it saw.
#[derive(Clone)]
struct StubApi {
    status: StatusCode,
    reply: Value,
    last_request: Arc<Mutex<Option<(HeaderMap, Value)>>>,
}

async fn messages_handler(
    State(stub): State<StubApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    *stub.last_request.lock().unwrap() = Some((headers, body));
    (stub.status, Json(stub.reply.clone()))
}

/// Start a stub Messages API, return (base_url, stub).
async fn start_stub(status: StatusCode, reply: Value) -> (String, StubApi) {
    let stub = StubApi {
        status,
        reply,
        last_request: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route("/v1/messages", post(messages_handler))
        .with_state(stub.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), stub)
}

fn client_for(base_url: String) -> QueueInsightsClient {
    QueueInsightsClient::new(InsightsConfig {
        api_key: Some(secrecy::SecretString::from("sk-ant-test")),
        base_url,
        request_timeout: Duration::from_secs(2),
        ..InsightsConfig::default()
    })
    .unwrap()
}

fn queue() -> Vec<TriagedMessage> {
    triage(vec![
        RawMessage::new("m-001", "Refund please, reply to aisha@example.com — charged twice."),
        RawMessage::new("m-002", "The app keeps crashing when I try to upload a file."),
    ])
}

fn tool_reply(input: Value) -> Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [
            { "type": "tool_use", "id": "toolu_1", "name": "queue_insights", "input": input }
        ],
        "stop_reason": "tool_use"
    })
}

fn valid_insights() -> Value {
    json!({
        "insights": [
            {
                "title": "  Crash reports in upload flow ",
                "body": "One unresolved High priority Bug mentions crashes during file upload.",
                "severity": "critical",
                "actions": ["Check recent deploys ", "Reproduce the upload crash"]
            },
            {
                "title": "Duplicate charge complaint",
                "body": "A Billing message reports being charged twice and asks for a refund.",
                "severity": "warning",
                "actions": []
            }
        ]
    })
}

#[tokio::test]
async fn returns_validated_trimmed_insights() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, stub) = start_stub(StatusCode::OK, tool_reply(valid_insights())).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;

        let insights = match outcome {
            InsightsOutcome::Ok { insights } => insights,
            other => panic!("expected ok outcome, got {other:?}"),
        };
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].title, "Crash reports in upload flow");
        assert_eq!(insights[0].severity, InsightSeverity::Critical);
        assert_eq!(insights[0].actions[0], "Check recent deploys");
        assert_eq!(insights[1].severity, InsightSeverity::Warning);

        let (headers, body) = stub.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(headers["x-api-key"], "sk-ant-test");
        assert_eq!(headers["anthropic-version"], "2023-06-01");
        assert_eq!(body["tools"][0]["name"], "queue_insights");
        let snapshot = body["messages"][0]["content"][1]["text"].as_str().unwrap();
        assert!(!snapshot.contains("aisha@example.com"));
        assert!(snapshot.contains("[redacted-email]"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn accepts_plain_text_json_fallback() {
    timeout(TEST_TIMEOUT, async {
        let reply = json!({
            "content": [{ "type": "text", "text": valid_insights().to_string() }]
        });
        let (base_url, _stub) = start_stub(StatusCode::OK, reply).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;
        assert!(matches!(outcome, InsightsOutcome::Ok { ref insights } if insights.len() == 2));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn guardrail_failure_is_invalid_output() {
    timeout(TEST_TIMEOUT, async {
        let input = json!({
            "insights": [{
                "title": "Bug volume is 2x normal",
                "body": "Bug reports are higher than usual.",
                "severity": "critical",
                "actions": ["Escalate"]
            }]
        });
        let (base_url, _stub) = start_stub(StatusCode::OK, tool_reply(input)).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;
        assert_eq!(
            outcome,
            InsightsOutcome::unavailable(UnavailableReason::InvalidOutput)
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn too_many_insights_is_invalid_output() {
    timeout(TEST_TIMEOUT, async {
        let items: Vec<Value> = (1..=5)
            .map(|i| json!({"title": format!("Insight {i}"), "body": "Ok.", "severity": "info", "actions": []}))
            .collect();
        let (base_url, _stub) =
            start_stub(StatusCode::OK, tool_reply(json!({ "insights": items }))).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;
        assert_eq!(
            outcome,
            InsightsOutcome::unavailable(UnavailableReason::InvalidOutput)
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn api_error_is_model_error() {
    timeout(TEST_TIMEOUT, async {
        let reply = json!({
            "type": "error",
            "error": { "type": "authentication_error", "message": "invalid x-api-key" }
        });
        let (base_url, _stub) = start_stub(StatusCode::UNAUTHORIZED, reply).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;
        assert_eq!(
            outcome,
            InsightsOutcome::unavailable(UnavailableReason::ModelError)
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn bare_error_status_is_http_code() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, _stub) = start_stub(StatusCode::BAD_GATEWAY, json!({})).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;
        assert_eq!(
            outcome,
            InsightsOutcome::unavailable(UnavailableReason::Http(502))
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn text_that_is_not_json() {
    timeout(TEST_TIMEOUT, async {
        let reply = json!({ "content": [{ "type": "text", "text": "I cannot help with that." }] });
        let (base_url, _stub) = start_stub(StatusCode::OK, reply).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;
        assert_eq!(
            outcome,
            InsightsOutcome::unavailable(UnavailableReason::ModelInvalidJson)
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_content_is_no_output() {
    timeout(TEST_TIMEOUT, async {
        let (base_url, _stub) = start_stub(StatusCode::OK, json!({ "content": [] })).await;
        let outcome = client_for(base_url).queue_insights(&queue()).await;
        assert_eq!(
            outcome,
            InsightsOutcome::unavailable(UnavailableReason::ModelNoOutput)
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_api_is_network_error() {
    timeout(TEST_TIMEOUT, async {
        // Bind then drop to get a port nobody is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = client_for(format!("http://127.0.0.1:{port}"))
            .queue_insights(&queue())
            .await;
        assert_eq!(
            outcome,
            InsightsOutcome::unavailable(UnavailableReason::NetworkError)
        );
    })
    .await
    .expect("test timed out");
}
