use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Custom error types for the ccproxy module.
#[derive(Error, Debug)]
pub enum CCProxyError {
    /// The request used a method other than POST or OPTIONS.
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    /// Authorization header is missing or does not match the configured key.
    #[error("未授权的请求")]
    Unauthorized,
    /// The request body is not valid JSON or lacks a `model`.
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),
    /// Contacting the upstream or decoding its reply failed.
    #[error("Upstream request failed: {0}")]
    UpstreamError(String),
    /// The outbound HTTP client could not be built.
    #[error("Failed to build upstream client: {0}")]
    ClientBuild(String),
    /// The reply to the caller could not be assembled.
    #[error("Failed to build response: {0}")]
    ResponseBuild(String),
}

impl IntoResponse for CCProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            CCProxyError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method Not Allowed" }),
            ),
            CCProxyError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "未授权的请求" }),
            ),
            CCProxyError::InvalidRequest(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request body" }),
            ),
            CCProxyError::UpstreamError(message)
            | CCProxyError::ClientBuild(message)
            | CCProxyError::ResponseBuild(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal Server Error", "message": message }),
            ),
        };

        if status.is_server_error() {
            log::error!("CCProxyError: status={}, error={}", status.as_u16(), &self);
        } else {
            log::warn!("CCProxyError: status={}, error={}", status.as_u16(), &self);
        }

        (status, Json(body)).into_response()
    }
}

pub type ProxyResult<T> = std::result::Result<T, CCProxyError>;
