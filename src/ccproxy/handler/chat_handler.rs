use axum::body::Body;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

use crate::ccproxy::{
    adapter::OpenAIOutputAdapter,
    auth::authenticate_request,
    errors::{CCProxyError, ProxyResult},
    helper::{extract_content, stream_handler::handle_pseudo_stream_response},
    router::SharedState,
};
use crate::constants::PROXY_LOG_TARGET;

/// The parts of an inbound chat request the relay looks at.
///
/// Everything else in the body is forwarded untouched.
#[derive(Debug)]
pub struct ProxyChatRequest {
    pub model: String,
    pub stream: bool,
    /// Compact serialization of the whole body, key order preserved.
    pub serialized: String,
}

impl ProxyChatRequest {
    pub fn from_body(body: &[u8]) -> ProxyResult<Self> {
        let payload: Value = serde_json::from_slice(body).map_err(|e| {
            log::error!(
                "Failed to deserialize chat request: {}, the request: {}",
                e,
                String::from_utf8_lossy(body)
            );
            CCProxyError::InvalidRequest(e.to_string())
        })?;

        let Some(fields) = payload.as_object() else {
            return Err(CCProxyError::InvalidRequest(
                "request body is not a JSON object".to_string(),
            ));
        };

        let model = fields
            .get("model")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| CCProxyError::InvalidRequest("missing `model`".to_string()))?
            .to_string();

        let stream = matches!(fields.get("stream"), Some(Value::Bool(true)));

        let serialized = serde_json::to_string(&payload)
            .map_err(|e| CCProxyError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            model,
            stream,
            serialized,
        })
    }
}

/// Entry point for `/api/chat` and `/v1/chat/completions`, all methods.
pub async fn handle_chat_completion(
    state: Arc<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight_response();
    }

    match proxy_chat_completion(state, method, headers, body).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn proxy_chat_completion(
    state: Arc<SharedState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyResult<Response> {
    if method != Method::POST {
        return Err(CCProxyError::MethodNotAllowed);
    }

    let authorization = authenticate_request(&headers, &state.config.authorization_key)?;
    let chat_request = ProxyChatRequest::from_body(&body)?;

    log::info!(
        "chat_completion_proxy: model={}, stream={}, upstream={}",
        &chat_request.model,
        chat_request.stream,
        state.upstream.url()
    );

    let reply = state
        .upstream
        .forward(authorization, chat_request.serialized.clone())
        .await?;
    let content = extract_content(&reply)?;

    let output_adapter = OpenAIOutputAdapter::new(chat_request.model);

    if chat_request.stream {
        handle_pseudo_stream_response(output_adapter, content, state.config.stream_delay())
    } else {
        let completion = output_adapter.adapt_response(content, &chat_request.serialized);
        if state.config.log_to_file {
            log::info!(
                target: PROXY_LOG_TARGET,
                "Response Body: {}",
                serde_json::to_string(&completion).unwrap_or_default()
            );
        }
        Ok((StatusCode::OK, Json(completion)).into_response())
    }
}

/// Bare 200 with permissive CORS headers for `OPTIONS`.
fn preflight_response() -> Response {
    let mut response = Response::new(Body::empty());
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}
