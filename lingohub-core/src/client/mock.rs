//! Mock Transport
//!
//! Scripted implementation of the HttpTransport trait for testing.

use std::collections::VecDeque;
use std::io::Write;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::NamedTempFile;
use url::Url;

use super::transport::{
    DownloadResponse, HttpRequest, HttpResponse, HttpTransport, TransportError, TransportResult,
};

enum MockDownload {
    Body { status: u16, body: Vec<u8> },
    Error(TransportError),
}

/// Mock transport for testing.
///
/// Responses are returned in the order they were queued. An empty queue
/// yields a network error.
///
/// # Example
///
/// ```ignore
/// use lingohub_core::client::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.queue_response(204, Vec::new());
/// transport.queue_download(200, archive_bytes);
///
/// // ... run an update ...
///
/// assert_eq!(transport.sent_requests().len(), 1);
/// ```
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<TransportResult<HttpResponse>>>,
    downloads: Mutex<VecDeque<MockDownload>>,
    sent: Mutex<Vec<HttpRequest>>,
    downloaded: Mutex<Vec<Url>>,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next `send` call.
    pub fn queue_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses.lock().push_back(Ok(HttpResponse {
            status,
            body: body.into(),
        }));
    }

    /// Queues a JSON response for the next `send` call.
    pub fn queue_json(&self, status: u16, body: &serde_json::Value) {
        self.queue_response(status, body.to_string());
    }

    /// Injects an error for the next `send` call.
    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Queues a body for the next `download` call.
    pub fn queue_download(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.downloads.lock().push_back(MockDownload::Body {
            status,
            body: body.into(),
        });
    }

    /// Injects an error for the next `download` call.
    pub fn queue_download_error(&self, error: TransportError) {
        self.downloads.lock().push_back(MockDownload::Error(error));
    }

    /// Returns all requests passed to `send`.
    pub fn sent_requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().clone()
    }

    /// Returns all URLs passed to `download`.
    pub fn downloaded_urls(&self) -> Vec<Url> {
        self.downloaded.lock().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        self.sent.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no response queued".into())))
    }

    async fn download(&self, url: &Url) -> TransportResult<DownloadResponse> {
        self.downloaded.lock().push(url.clone());
        let next = self.downloads.lock().pop_front();
        match next {
            Some(MockDownload::Body { status, body }) => {
                let mut file = NamedTempFile::new()?;
                file.write_all(&body)?;
                file.flush()?;
                Ok(DownloadResponse::new(status, file))
            }
            Some(MockDownload::Error(err)) => Err(err),
            None => Err(TransportError::Network("no download queued".into())),
        }
    }
}
