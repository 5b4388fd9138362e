//! End-to-end tests for the chat completion relay.
//!
//! Each test serves the full application on an ephemeral port and points it at
//! a wiremock upstream, then drives it with a plain reqwest client.

use std::time::{Duration, Instant};

use ccrelay_lib::config::{ProxyConfig, RelayConfig};
use ccrelay_lib::http::server::build_app;
use futures_util::StreamExt;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH: &str = "Bearer relay-test-key";
const TEST_USER_AGENT: &str = "ccrelay-test/1.0";

// ============================================================================
// Helpers
// ============================================================================

fn relay_config(upstream_url: &str, stream_delay_ms: u64) -> RelayConfig {
    RelayConfig {
        proxy: ProxyConfig {
            authorization_key: AUTH.to_string(),
            upstream_url: upstream_url.to_string(),
            user_agent: TEST_USER_AGENT.to_string(),
            stream_delay_ms,
            timeout_secs: 5,
            log_to_file: false,
        },
        ..RelayConfig::default()
    }
}

/// Serves the relay on 127.0.0.1 and returns its base URL.
async fn spawn_relay(config: RelayConfig) -> String {
    let app = build_app(&config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn upstream_replying(body: Value) -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/groq/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&upstream)
        .await;
    upstream
}

fn upstream_url(upstream: &MockServer) -> String {
    format!("{}/groq/v1/chat", upstream.uri())
}

async fn post_chat(base: &str, route: &str, auth: Option<&str>, body: &str) -> reqwest::Response {
    let mut request = reqwest::Client::new()
        .post(format!("{}{}", base, route))
        .header("content-type", "application/json")
        .body(body.to_string());
    if let Some(auth) = auth {
        request = request.header("authorization", auth);
    }
    request.send().await.unwrap()
}

/// Splits an SSE body into the payload of each `data:` event.
fn sse_payloads(body: &str) -> Vec<String> {
    body.split("\n\n")
        .filter(|event| !event.is_empty())
        .map(|event| event.trim_start_matches("data: ").to_string())
        .collect()
}

// ============================================================================
// Request validation
// ============================================================================

#[tokio::test]
async fn test_other_methods_are_rejected_with_405() {
    let base = spawn_relay(relay_config("http://127.0.0.1:1/unused", 0)).await;
    let client = reqwest::Client::new();

    for request in [
        client.get(format!("{}/api/chat", base)),
        client.put(format!("{}/v1/chat/completions", base)),
        client.delete(format!("{}/api/chat", base)),
    ] {
        let response = request.header("authorization", AUTH).send().await.unwrap();
        assert_eq!(response.status(), 405);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Method Not Allowed" }));
    }
}

#[tokio::test]
async fn test_missing_or_wrong_authorization_is_rejected_with_401() {
    let upstream = MockServer::start().await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), 0)).await;

    for auth in [None, Some("relay-test-key"), Some("Bearer other"), Some("bearer relay-test-key")] {
        let response = post_chat(&base, "/api/chat", auth, r#"{"model":"m"}"#).await;
        assert_eq!(response.status(), 401, "auth {:?}", auth);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "未授权的请求" }));
    }

    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_bodies_are_rejected_with_400() {
    let upstream = MockServer::start().await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), 0)).await;

    for body in ["not json", r#"{"messages":[]}"#, r#"{"model":""}"#, "[]"] {
        let response = post_chat(&base, "/api/chat", Some(AUTH), body).await;
        assert_eq!(response.status(), 400, "body {:?}", body);
        let json_body: Value = response.json().await.unwrap();
        assert_eq!(json_body, json!({ "error": "Invalid request body" }));
    }

    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_options_is_answered_without_auth() {
    let base = spawn_relay(relay_config("http://127.0.0.1:1/unused", 0)).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/chat", base))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_options_preflight_headers_from_chat_routes() {
    let config = relay_config("http://127.0.0.1:1/unused", 0);
    let app = ccrelay_lib::ccproxy::routes(config.proxy).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{}/v1/chat/completions", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let headers = response.headers().clone();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST");
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type, Authorization"
    );
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_liveness_route() {
    let base = spawn_relay(relay_config("http://127.0.0.1:1/unused", 0)).await;
    let response = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ccrelay is running.");
}

// ============================================================================
// Non-stream completions
// ============================================================================

#[tokio::test]
async fn test_non_stream_completion() {
    let upstream = upstream_replying(json!({ "content": "hello" })).await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), 0)).await;

    let request_body = r#"{"model":"gpt-x","messages":[{"role":"user","content":"hi"}]}"#;
    let response = post_chat(&base, "/v1/chat/completions", Some(AUTH), request_body).await;
    assert_eq!(response.status(), 200);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let body: Value = response.json().await.unwrap();
    assert!(body["id"].as_str().unwrap().starts_with("chatcmpl-"));
    assert_eq!(body["object"], "chat.completion");
    assert!(body["created"].as_u64().unwrap() > 0);
    assert_eq!(body["model"], "gpt-x");
    assert_eq!(body["choices"].as_array().unwrap().len(), 1);
    assert_eq!(body["choices"][0]["index"], 0);
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(body["choices"][0]["message"]["content"], "hello");
    assert_eq!(body["choices"][0]["finish_reason"], "stop");

    let usage = &body["usage"];
    assert_eq!(usage["prompt_tokens"], request_body.len() as u64);
    assert_eq!(usage["completion_tokens"], 5);
    assert_eq!(
        usage["total_tokens"].as_u64().unwrap(),
        usage["prompt_tokens"].as_u64().unwrap() + usage["completion_tokens"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn test_request_is_forwarded_with_headers_and_exact_body() {
    let upstream = upstream_replying(json!({ "content": "ok" })).await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), 0)).await;

    let request_body = r#"{ "temperature": 0.2, "model": "gpt-x", "messages": [] }"#;
    let response = post_chat(&base, "/api/chat", Some(AUTH), request_body).await;
    assert_eq!(response.status(), 200);

    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let forwarded = &received[0];
    assert_eq!(forwarded.headers["authorization"], AUTH);
    assert_eq!(forwarded.headers["content-type"], "application/json");
    assert_eq!(forwarded.headers["user-agent"], TEST_USER_AGENT);
    assert_eq!(
        String::from_utf8(forwarded.body.clone()).unwrap(),
        r#"{"temperature":0.2,"model":"gpt-x","messages":[]}"#
    );
}

#[tokio::test]
async fn test_missing_upstream_content_becomes_empty_string() {
    let upstream = upstream_replying(json!({ "detail": "no content here" })).await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), 0)).await;

    let response = post_chat(&base, "/api/chat", Some(AUTH), r#"{"model":"m"}"#).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["choices"][0]["message"]["content"], "");
    assert_eq!(body["usage"]["completion_tokens"], 0);
}

#[tokio::test]
async fn test_non_2xx_upstream_reply_is_still_relayed() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "content": "busy" })))
        .mount(&upstream)
        .await;
    let base = spawn_relay(relay_config(&upstream.uri(), 0)).await;

    let response = post_chat(&base, "/api/chat", Some(AUTH), r#"{"model":"m"}"#).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["choices"][0]["message"]["content"], "busy");
}

// ============================================================================
// Upstream failures
// ============================================================================

#[tokio::test]
async fn test_unreachable_upstream_is_a_500() {
    let base = spawn_relay(relay_config("http://127.0.0.1:1/groq/v1/chat", 0)).await;

    let response = post_chat(&base, "/api/chat", Some(AUTH), r#"{"model":"m"}"#).await;
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_non_json_upstream_reply_is_a_500() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&upstream)
        .await;
    let base = spawn_relay(relay_config(&upstream.uri(), 0)).await;

    let response = post_chat(&base, "/api/chat", Some(AUTH), r#"{"model":"m","stream":true}"#).await;
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal Server Error");
}

#[tokio::test]
async fn test_null_upstream_reply_is_a_500() {
    let upstream = upstream_replying(Value::Null).await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), 0)).await;

    let response = post_chat(&base, "/api/chat", Some(AUTH), r#"{"model":"m"}"#).await;
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal Server Error");
}

// ============================================================================
// Pseudo-stream completions
// ============================================================================

#[tokio::test]
async fn test_stream_completion_events() {
    let upstream = upstream_replying(json!({ "content": "streamed reply" })).await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), 10)).await;

    let response = post_chat(
        &base,
        "/api/chat",
        Some(AUTH),
        r#"{"model":"gpt-x","stream":true}"#,
    )
    .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    assert_eq!(response.headers()["cache-control"], "no-cache");

    let body = response.text().await.unwrap();
    let payloads = sse_payloads(&body);
    assert_eq!(payloads.len(), 3, "unexpected stream body: {}", body);
    assert_eq!(payloads[2], "[DONE]");

    let opening: Value = serde_json::from_str(&payloads[0]).unwrap();
    let content: Value = serde_json::from_str(&payloads[1]).unwrap();
    assert_eq!(opening["object"], "chat.completion.chunk");
    assert_eq!(opening["model"], "gpt-x");
    assert_eq!(opening["choices"][0]["delta"], json!({}));
    assert!(opening["choices"][0]["finish_reason"].is_null());

    assert_eq!(content["id"], opening["id"]);
    assert_eq!(content["choices"][0]["delta"]["content"], "streamed reply");
    assert_eq!(content["choices"][0]["finish_reason"], "stop");
}

#[tokio::test]
async fn test_stream_content_arrives_after_delay() {
    let delay = Duration::from_millis(300);
    let upstream = upstream_replying(json!({ "content": "late" })).await;
    let base = spawn_relay(relay_config(&upstream_url(&upstream), delay.as_millis() as u64)).await;

    let response = post_chat(
        &base,
        "/api/chat",
        Some(AUTH),
        r#"{"model":"gpt-x","stream":true}"#,
    )
    .await;
    assert_eq!(response.status(), 200);

    let mut stream = response.bytes_stream();
    let mut received = String::new();
    let mut first_chunk_at = None;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        first_chunk_at.get_or_insert_with(Instant::now);
        received.push_str(&String::from_utf8_lossy(&chunk));
    }
    let finished_at = Instant::now();

    let first_chunk_at = first_chunk_at.unwrap();
    assert!(
        finished_at - first_chunk_at >= delay / 2,
        "content arrived too early: {:?}",
        finished_at - first_chunk_at
    );
    assert_eq!(sse_payloads(&received).len(), 3);
    assert!(received.ends_with("data: [DONE]\n\n"));
}
