// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SDK Error Types
//!
//! Unified error type surfaced to callers of the update workflow.

use thiserror::Error;

use crate::client::{ClientError, TransportError};
use crate::store::StoreError;

/// A value the host must configure before any remote check.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The API key is missing.
    #[error("the API key is missing")]
    MissingApiKey,

    /// The app version is missing.
    #[error("the app version is missing")]
    MissingAppVersion,

    /// The SDK version is missing.
    #[error("the SDK version is missing")]
    MissingSdkVersion,
}

impl ConfigurationError {
    /// Hint shown to integrators.
    pub fn recovery_suggestion(&self) -> &'static str {
        "Provide the missing value in SdkConfig before checking for updates"
    }
}

/// Coarse classification of an [`SdkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Api,
    Storage,
    Decoding,
    UpdateInProgress,
}

/// Unified error type for SDK operations.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Required configuration is missing.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Network failure or unusable response. Retryable by the caller.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success status from the distribution service.
    #[error("{}", describe_api_error(.status_code, .message))]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Message supplied by the server, if any.
        message: Option<String>,
    },

    /// Filesystem failure while installing or purging.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Malformed response body.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Another update is running in this process.
    #[error("an update is already in progress")]
    UpdateInProgress,
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::Configuration(_) => ErrorKind::Configuration,
            SdkError::Transport(_) => ErrorKind::Transport,
            SdkError::Api { .. } => ErrorKind::Api,
            SdkError::Storage(_) => ErrorKind::Storage,
            SdkError::Decoding(_) => ErrorKind::Decoding,
            SdkError::UpdateInProgress => ErrorKind::UpdateInProgress,
        }
    }

    /// HTTP status for API errors, `-1` for everything else.
    pub fn status_code(&self) -> i32 {
        match self {
            SdkError::Api { status_code, .. } => i32::from(*status_code),
            _ => -1,
        }
    }
}

impl From<ClientError> for SdkError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => SdkError::Transport(e),
            ClientError::Api {
                status_code,
                message,
            } => SdkError::Api {
                status_code,
                message,
            },
            ClientError::Decoding { context } => SdkError::Decoding(context),
            ClientError::Io(e) => SdkError::Storage(StoreError::Io(e)),
        }
    }
}

fn describe_api_error(status_code: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("API error with code {status_code}"),
    }
}

/// Result type for SDK operations.
pub type SdkResult<T> = Result<T, SdkError>;
