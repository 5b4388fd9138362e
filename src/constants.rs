// =================================================
// Proxy defaults
// =================================================
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.omidaziz.com/groq/v1/chat";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_7_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.2 Mobile/15E148 Safari/604.1";
/// Pause between the empty chunk and the content chunk of a pseudo-stream.
pub const DEFAULT_STREAM_DELAY_MS: u64 = 1000;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

// =================================================
// Server defaults
// =================================================
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BODY_LIMIT_MB: usize = 50;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =================================================
// Environment variables
// =================================================
pub const ENV_CONFIG_FILE: &str = "CCRELAY_CONFIG";
pub const ENV_AUTHORIZATION_KEY: &str = "AUTHORIZATION_KEY";
pub const ENV_HOST: &str = "CCRELAY_HOST";
pub const ENV_PORT: &str = "CCRELAY_PORT";
pub const ENV_UPSTREAM_URL: &str = "CCRELAY_UPSTREAM_URL";
pub const ENV_USER_AGENT: &str = "CCRELAY_USER_AGENT";
pub const ENV_STREAM_DELAY_MS: &str = "CCRELAY_STREAM_DELAY_MS";
pub const ENV_LOG_LEVEL: &str = "CCRELAY_LOG_LEVEL";

/// Log target for proxied request/response bodies.
pub const PROXY_LOG_TARGET: &str = "ccproxy_logger";
