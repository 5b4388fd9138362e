use thiserror::Error;

/// The single, unified error type for the relay binary.
///
/// Module errors are wrapped transparently so their messages reach the log
/// unchanged when startup fails.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Errors originating from the HTTP server module.
    #[error(transparent)]
    Http(#[from] crate::http::error::HttpError),

    /// Errors originating from the CCProxy module.
    #[error(transparent)]
    Ccproxy(#[from] crate::ccproxy::CCProxyError),
}

pub type Result<T> = std::result::Result<T, AppError>;
