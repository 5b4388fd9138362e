use thiserror::Error;

/// HTTP server error types
#[derive(Error, Debug)]
pub enum HttpError {
    /// The listen address could not be parsed
    #[error("Invalid listen address {addr}: {error}")]
    Address { addr: String, error: String },
    /// The listener could not be bound
    #[error("Failed to bind {addr}: {error}")]
    Bind { addr: String, error: String },
    /// IO error
    #[error("{0}")]
    Io(String),
    /// The server stopped with an error
    #[error("HTTP server failed to start: {0}")]
    StartUp(String),
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Io(err.to_string())
    }
}

pub type HttpResult<T> = Result<T, HttpError>;
