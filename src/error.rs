//! Error kinds shared across the server.
//!
//! None of these ever cross a connection boundary: the connection handler
//! turns each of them into a status code (or a log line) and closes the socket.
//! `NotFound`, `NotImplemented` and `BadRequest` outcomes of routing are not
//! errors at all, they are plain [`HttpStatus`](crate::http::status::HttpStatus)
//! values carried by the response.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for `{key}`: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("maxThreads must be at least 1")]
    NoWorkers,

    #[error("cannot resolve document root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Malformed or truncated request framing.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("connection closed before the request was complete")]
    UnexpectedEof,

    #[error("empty request")]
    EmptyRequest,

    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),

    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    #[error("invalid chunk size: {0:?}")]
    InvalidChunkSize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FramingError {
    /// Transport failures get a 500, everything else is the client's fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FramingError::Io(_))
    }
}

/// A request target that would escape the document root.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecurityError {
    #[error("directory traversal attempt: {0:?}")]
    Traversal(String),

    #[error("undecodable request target: {0:?}")]
    MalformedTarget(String),
}
