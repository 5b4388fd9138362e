use crate::ccproxy::errors::{CCProxyError, ProxyResult};
use crate::config::ProxyConfig;
use crate::constants::PROXY_LOG_TARGET;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;

/// Client for the single upstream chat endpoint.
///
/// The underlying `reqwest::Client` is pooled and shared by every request.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    url: String,
    user_agent: Option<HeaderValue>,
    log_to_file: bool,
}

impl UpstreamClient {
    pub fn new(config: &ProxyConfig) -> ProxyResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| CCProxyError::ClientBuild(e.to_string()))?;

        let user_agent = config
            .user_agent()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| CCProxyError::ClientBuild(format!("Invalid user agent: {}", e)))?;

        Ok(Self {
            http_client,
            url: config.upstream_url.clone(),
            user_agent,
            log_to_file: config.log_to_file,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts `body` upstream and returns the decoded JSON reply.
    ///
    /// The reply is decoded even for non-2xx statuses; only transport and
    /// JSON errors fail the call.
    pub async fn forward(&self, authorization: &str, body: String) -> ProxyResult<Value> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(authorization).map_err(|e| {
                CCProxyError::UpstreamError(format!("Invalid authorization header: {}", e))
            })?,
        );
        if let Some(user_agent) = &self.user_agent {
            headers.insert(USER_AGENT, user_agent.clone());
        }

        if self.log_to_file {
            log::info!(target: PROXY_LOG_TARGET, "Upstream Request Body: {}", &body);
        }

        let response = self
            .http_client
            .post(&self.url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                CCProxyError::UpstreamError(format!("Request to upstream failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            CCProxyError::UpstreamError(format!("Failed to read upstream response: {}", e))
        })?;

        if self.log_to_file {
            log::info!(target: PROXY_LOG_TARGET, "Upstream Response Body: {}", &response_text);
        }

        if !status.is_success() {
            log::warn!(
                "Upstream {} answered with status {}, decoding the body anyway",
                &self.url,
                status
            );
        }

        serde_json::from_str(&response_text).map_err(|e| {
            CCProxyError::UpstreamError(format!("Failed to parse upstream response: {}", e))
        })
    }
}

/// Pulls the reply text out of an upstream JSON reply.
///
/// A `null` reply has no fields to read and fails the request. Anything else
/// without a string `content` field counts as empty.
pub fn extract_content(reply: &Value) -> ProxyResult<String> {
    if reply.is_null() {
        return Err(CCProxyError::UpstreamError(
            "Upstream replied with null".to_string(),
        ));
    }
    Ok(reply
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}
