// modules
pub mod ccproxy;
pub mod config;
mod constants;
pub mod error;
pub mod http;
mod logger;

use config::RelayConfig;
use http::server::start_http_server;
use logger::setup_logger;

/// Loads the configuration, sets up logging and serves the relay until shutdown.
pub async fn run() -> error::Result<()> {
    let config = RelayConfig::load()?;
    setup_logger(&config.log)?;

    log::info!(
        "ccrelay {} starting, upstream: {}",
        env!("CARGO_PKG_VERSION"),
        &config.proxy.upstream_url
    );

    start_http_server(&config).await
}
