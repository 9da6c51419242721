//! Transport Trait
//!
//! Abstraction over the HTTP stack used to talk to the distribution service.
//! Timeouts, TLS and retries belong to the implementation; the update client
//! only sees requests, responses and downloaded files.

use std::fmt;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;
use url::Url;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the first header with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A response whose body was written to a transport-owned temporary file.
///
/// The file is deleted when this value is dropped, so callers that need the
/// payload afterwards must copy it out first.
#[derive(Debug)]
pub struct DownloadResponse {
    pub status: u16,
    file: NamedTempFile,
}

impl DownloadResponse {
    pub fn new(status: u16, file: NamedTempFile) -> Self {
        Self { status, file }
    }

    /// Location of the temporary body file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// HTTP transport used by the update client.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and buffers the whole response body.
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse>;

    /// Performs a plain GET and streams the body into a temporary file.
    async fn download(&self, url: &Url) -> TransportResult<DownloadResponse>;
}

/// Errors raised below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// Response could not be read.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Body exceeded the configured limit.
    #[error("response too large: {size} bytes (max {max})")]
    TooLarge {
        /// Bytes received so far
        size: u64,
        /// Maximum allowed size in bytes
        max: u64,
    },

    /// Local IO while buffering the body.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the HTTP client
    #[cfg(feature = "remote-updates")]
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}
