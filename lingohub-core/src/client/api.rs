//! Update client for the distribution service
//!
//! Asks the service whether a newer release exists for the running app
//! version and downloads release archives to a location the SDK owns.
//! There is no retry logic here; callers decide whether to try again.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use super::transport::{HttpMethod, HttpRequest, HttpTransport, TransportError};
use super::types::{ArtifactDescriptor, CheckRequestBody, ErrorResponse};
use crate::config::{Environment, SdkConfig};

/// Path of the check endpoint, relative to the base URL.
pub const CHECK_PATH: &str = "v1/distributions/check";

/// Inputs of a single remote check.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub api_key: String,
    pub app_version: String,
    pub sdk_version: String,
    /// Release currently installed, if any
    pub installed_artifact_id: Option<String>,
    pub environment: Environment,
    pub device_id: Option<String>,
    pub language: Option<String>,
}

/// Result of a remote check that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// The service offered a release
    Available(ArtifactDescriptor),
    /// Nothing newer than what is installed
    NoUpdate,
}

/// Talks to the distribution service
pub struct UpdateClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    download_dir: PathBuf,
    distribution_type: String,
    sdk_name: String,
}

impl UpdateClient {
    /// Create a client from config
    ///
    /// Downloads land in `<storage>/Lingohub/downloads`.
    pub fn new(transport: Arc<dyn HttpTransport>, config: &SdkConfig) -> Result<Self, ClientError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(TransportError::from)?;

        Ok(Self {
            transport,
            base_url,
            download_dir: config.sdk_dir().join("downloads"),
            distribution_type: config.distribution_type.clone(),
            sdk_name: config.sdk_name.clone(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Directory downloaded archives are copied into
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Ask the service for a release newer than the installed one.
    ///
    /// 200 yields the decoded descriptor, 204 yields [`CheckOutcome::NoUpdate`]
    /// and any other status an [`ClientError::Api`].
    pub async fn check_for_update(&self, request: &CheckRequest) -> Result<CheckOutcome, ClientError> {
        let url = self.base_url.join(CHECK_PATH).map_err(TransportError::from)?;

        let body = CheckRequestBody {
            distribution_type: self.distribution_type.clone(),
            distribution_environment: request.environment,
            client_version: request.app_version.clone(),
            client_user: request
                .device_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            client_agent: format!("{}/{}", self.sdk_name, request.sdk_version),
            client_release: request.installed_artifact_id.clone(),
            client_language: request.language.clone(),
        };
        let body = serde_json::to_vec(&body).map_err(|e| ClientError::Decoding {
            context: format!("could not encode check request: {e}"),
        })?;

        debug!(%url, environment = %request.environment, "checking for update");

        let response = self
            .transport
            .send(HttpRequest {
                method: HttpMethod::Post,
                url,
                headers: vec![
                    ("Content-Type".into(), "application/json".into()),
                    ("Accept".into(), "application/json".into()),
                    ("Authorization".into(), format!("Bearer {}", request.api_key)),
                ],
                body: Some(body),
            })
            .await?;

        debug!(status = response.status, size = response.body.len(), "check response received");

        match response.status {
            200 => {
                let descriptor = ArtifactDescriptor::from_json(&response.body).map_err(|e| {
                    ClientError::Decoding {
                        context: e.0,
                    }
                })?;
                info!(
                    release = %descriptor.id,
                    name = %descriptor.name,
                    "release available"
                );
                Ok(CheckOutcome::Available(descriptor))
            }
            204 => {
                debug!("no content, nothing to update");
                Ok(CheckOutcome::NoUpdate)
            }
            status_code => {
                let message = serde_json::from_slice::<ErrorResponse>(&response.body)
                    .ok()
                    .map(|e| e.message);
                warn!(status_code, message = ?message, "check rejected");
                Err(ClientError::Api {
                    status_code,
                    message,
                })
            }
        }
    }

    /// Download a release archive.
    ///
    /// The transport deletes its temporary file once the response is
    /// dropped, so the payload is copied into the download directory
    /// before returning. Zero-byte payloads are logged, not rejected.
    pub async fn download(&self, url: &Url) -> Result<PathBuf, ClientError> {
        debug!(%url, "downloading release archive");
        let response = self.transport.download(url).await?;

        if response.status != 200 {
            let message = tokio::fs::read(response.path())
                .await
                .ok()
                .and_then(|data| serde_json::from_slice::<serde_json::Value>(&data).ok())
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));
            warn!(status_code = response.status, message = ?message, "download rejected");
            return Err(ClientError::Api {
                status_code: response.status,
                message,
            });
        }

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let destination = self.download_dir.join(format!("{}.zip", Uuid::new_v4()));
        tokio::fs::copy(response.path(), &destination).await?;
        drop(response);

        let metadata = tokio::fs::metadata(&destination).await?;
        if metadata.len() == 0 {
            warn!(path = %destination.display(), "downloaded archive has zero size");
        } else {
            debug!(path = %destination.display(), size = metadata.len(), "archive copied");
        }

        Ok(destination)
    }
}

/// Errors that can occur while talking to the distribution service
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network/request error
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success HTTP status
    #[error("API error {status_code}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Server-provided message
        message: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("decoding error: {context}")]
    Decoding {
        /// Where and why decoding failed
        context: String,
    },

    /// Local file error while taking ownership of a download
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
