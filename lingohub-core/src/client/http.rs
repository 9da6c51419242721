//! reqwest-backed transport
//!
//! This module provides the production transport with:
//! - Timeout configuration
//! - Proxy support
//! - Size limits on downloads

use std::io::Write;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tempfile::NamedTempFile;
use url::Url;

use super::transport::{
    DownloadResponse, HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError,
    TransportResult,
};
use crate::config::SdkConfig;

/// Transport built on a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    max_download_size: u64,
}

impl ReqwestTransport {
    /// Create a new transport from config
    pub fn new(config: &SdkConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().timeout(config.timeout).user_agent(format!(
            "{}/{}",
            config.sdk_name,
            config.sdk_version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))
        ));

        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            max_download_size: config.max_download_size,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }

    async fn download(&self, url: &Url) -> TransportResult<DownloadResponse> {
        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();

        // Check content length before downloading
        if let Some(len) = response.content_length() {
            if len > self.max_download_size {
                return Err(TransportError::TooLarge {
                    size: len,
                    max: self.max_download_size,
                });
            }
        }

        let mut file = NamedTempFile::new()?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            // Content-length may be missing or wrong
            if written > self.max_download_size {
                return Err(TransportError::TooLarge {
                    size: written,
                    max: self.max_download_size,
                });
            }
            file.write_all(&chunk)?;
        }
        file.flush()?;

        Ok(DownloadResponse::new(status, file))
    }
}
