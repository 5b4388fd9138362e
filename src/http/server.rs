use axum::{extract::DefaultBodyLimit, Router};
use http::{header, Method};
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};

use crate::ccproxy;
use crate::config::RelayConfig;
use crate::error::Result;
use crate::http::error::{HttpError, HttpResult};

/// Builds the full application: ccproxy routes plus CORS and body limit layers.
pub fn build_app(config: &RelayConfig) -> Result<Router> {
    // define cors config, mirrors the preflight answer of the chat handler
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = ccproxy::routes(config.proxy.clone())?
        .layer(DefaultBodyLimit::max(
            config.server.body_limit_mb.saturating_mul(1024 * 1024),
        ))
        .layer(cors);
    Ok(app)
}

/// Starts the relay server and runs it until Ctrl-C.
pub async fn start_http_server(config: &RelayConfig) -> Result<()> {
    log::info!("start_http_server function entered.");

    let app = build_app(config)?;
    let listener = bind_listener(&config.server.host, config.server.port).await?;

    let addr = listener.local_addr().map_err(|e| {
        log::error!("Failed to get local address: {}", e);
        HttpError::from(e)
    })?;
    log::info!("Serving chat completion relay on http://{}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for ctrl_c: {}", e);
            // Without a signal handler keep serving until the process is killed.
            std::future::pending::<()>().await;
        }
        log::info!("HTTP server received shutdown signal");
    });

    match server.await {
        Ok(_) => {
            log::info!("HTTP server shut down gracefully");
            Ok(())
        }
        Err(e) => {
            log::error!("HTTP server failed: {}", e);
            Err(HttpError::StartUp(e.to_string()).into())
        }
    }
}

async fn bind_listener(host: &str, port: u16) -> HttpResult<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e: std::net::AddrParseError| HttpError::Address {
            addr: format!("{}:{}", host, port),
            error: e.to_string(),
        })?;

    TcpListener::bind(addr).await.map_err(|e| {
        log::error!("Failed to bind {}: {}", addr, e);
        HttpError::Bind {
            addr: addr.to_string(),
            error: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = bind_listener("127.0.0.1", 0).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_invalid_host_is_reported() {
        let result = bind_listener("not a host", 3000).await;
        assert!(matches!(result, Err(HttpError::Address { .. })));
    }

    #[test]
    fn test_build_app_with_default_proxy_config() {
        let mut config = RelayConfig::default();
        config.proxy.authorization_key = "Bearer test".to_string();
        assert!(build_app(&config).is_ok());
    }

    #[test]
    fn test_build_app_with_huge_body_limit() {
        let mut config = RelayConfig::default();
        config.proxy.authorization_key = "Bearer test".to_string();
        config.server.body_limit_mb = usize::MAX;
        assert!(build_app(&config).is_ok());
    }
}
