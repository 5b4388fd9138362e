//! Routing for the `ccproxy` relay.
//!
//! # API Endpoints
//!
//! - `GET /`: liveness message, no authentication.
//! - `POST /api/chat`: relays a chat completion request upstream.
//! - `POST /v1/chat/completions`: same handler under the OpenAI path.
//!
//! Every method reaches the chat handler so that `OPTIONS` is answered as a
//! preflight and anything else but `POST` gets the JSON 405 body instead of
//! axum's empty default.

use crate::ccproxy::{
    errors::ProxyResult, handle_chat_completion, helper::UpstreamClient,
};
use crate::config::ProxyConfig;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
    routing::{any, get},
    Router,
};
use std::sync::Arc;

pub const CHAT_ROUTES: [&str; 2] = ["/api/chat", "/v1/chat/completions"];

// A struct to hold the shared state, which is passed to all route handlers.
pub struct SharedState {
    pub config: ProxyConfig,
    pub upstream: UpstreamClient,
}

/// Defines all routes for the ccproxy module.
pub fn routes(config: ProxyConfig) -> ProxyResult<Router> {
    let upstream = UpstreamClient::new(&config)?;
    let shared_state = Arc::new(SharedState { config, upstream });

    let chat_handler = any(
        |State(state): State<Arc<SharedState>>,
         method: Method,
         headers: HeaderMap,
         body: Bytes| async move {
            handle_chat_completion(state, method, headers, body).await
        },
    );

    let mut router = Router::new().route("/", get(|| async { "ccrelay is running." }));
    for path in CHAT_ROUTES {
        router = router.route(path, chat_handler.clone());
    }

    log_registered_routes(&shared_state);

    Ok(router.with_state(shared_state))
}

/// Logs the registered routes for discoverability.
fn log_registered_routes(state: &SharedState) {
    log::info!("--- ccproxy routes registered ---");
    log::info!("  - GET /");
    for path in CHAT_ROUTES {
        log::info!("  - POST {}", path);
    }
    log::info!(
        "  upstream: {}, stream delay: {}ms",
        state.upstream.url(),
        state.config.stream_delay_ms
    );
    log::info!("-------------------------------------");
}
