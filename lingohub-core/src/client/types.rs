//! Wire types for the distribution service
//!
//! These types represent the check request body, the release descriptor
//! returned by a successful check, and the error envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Environment;

/// A release returned by the distribution service.
///
/// Lives for a single check/download cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactDescriptor {
    /// Distribution release id, persisted after a successful install
    pub id: String,
    /// Archive location; `None` means there is nothing to download
    pub download_url: Option<Url>,
    /// Release creation time
    pub created_at: DateTime<Utc>,
    /// Release name
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RawArtifactDescriptor {
    #[serde(rename = "distributionReleaseId")]
    id: String,
    name: String,
    #[serde(rename = "filesUrl", default)]
    files_url: Option<String>,
    #[serde(rename = "createdAt", default)]
    created_at: Option<serde_json::Value>,
}

impl ArtifactDescriptor {
    /// Decodes a 200 response body.
    ///
    /// An unparseable `createdAt` falls back to the current time.
    pub fn from_json(body: &[u8]) -> Result<Self, DescriptorError> {
        let raw: RawArtifactDescriptor =
            serde_json::from_slice(body).map_err(|e| DescriptorError(describe_json_error(&e)))?;

        let download_url = match raw.files_url.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(
                Url::parse(s)
                    .map_err(|e| DescriptorError(format!("invalid URL at path 'filesUrl': {e}")))?,
            ),
        };

        let created_at = match raw.created_at {
            Some(serde_json::Value::String(s)) => parse_created_at(&s).unwrap_or_else(|| {
                tracing::debug!(value = %s, "could not parse createdAt, using current time");
                Utc::now()
            }),
            _ => {
                tracing::debug!("createdAt missing or not a string, using current time");
                Utc::now()
            }
        };

        Ok(Self {
            id: raw.id,
            download_url,
            created_at,
            name: raw.name,
        })
    }
}

/// ISO-8601 with optional fractional seconds and a timezone offset,
/// e.g. `2025-03-13T13:55:22.028+00:00`.
pub fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Human-readable decoding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError(pub String);

fn describe_json_error(err: &serde_json::Error) -> String {
    use serde_json::error::Category;

    let position = format!("line {} column {}", err.line(), err.column());
    match err.classify() {
        Category::Data => format!("invalid release descriptor: {err}"),
        Category::Syntax => format!("malformed JSON at {position}: {err}"),
        Category::Eof => format!("truncated JSON at {position}"),
        Category::Io => format!("could not read response body: {err}"),
    }
}

/// Body of `POST v1/distributions/check`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequestBody {
    pub distribution_type: String,
    pub distribution_environment: Environment,
    pub client_version: String,
    pub client_user: String,
    pub client_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_language: Option<String>,
}

/// Error envelope of the check endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "error_message")]
    pub message: String,
}
