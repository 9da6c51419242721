// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for the localization update SDK

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Default distribution service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://cdn.lingohub.com/";

/// Folder created under the storage path for everything the SDK persists.
pub const FOLDER_NAME: &str = "Lingohub";

/// Distribution environment requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Test,
    Staging,
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Wire name used in `distributionEnvironment`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Test => "TEST",
            Environment::Staging => "STAGING",
            Environment::Development => "DEVELOPMENT",
            Environment::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TEST" => Ok(Environment::Test),
            "STAGING" => Ok(Environment::Staging),
            "DEVELOPMENT" | "DEV" => Ok(Environment::Development),
            "PRODUCTION" | "PROD" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {other}")),
        }
    }
}

/// Configuration for the update SDK
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// API key sent as bearer token
    pub api_key: Option<String>,

    /// Version of the host application
    pub app_version: Option<String>,

    /// Version of this SDK, reported in `clientAgent`
    pub sdk_version: Option<String>,

    /// Requested distribution environment
    pub environment: Environment,

    /// Stable device identifier (a random one is sent per request if unset)
    pub device_id: Option<String>,

    /// Initial language override (ISO 639-1 code)
    pub language: Option<String>,

    /// Local storage root; the SDK keeps its files in `<storage_path>/Lingohub`
    pub storage_path: PathBuf,

    /// Distribution service base URL
    pub base_url: String,

    /// `distributionType` reported to the service
    pub distribution_type: String,

    /// Agent name reported in `clientAgent`
    pub sdk_name: String,

    /// Minimum interval between update checks
    pub check_interval: Duration,

    /// HTTP timeout for checks and downloads
    pub timeout: Duration,

    /// Maximum artifact size (bytes)
    pub max_download_size: u64,

    /// Proxy URL
    pub proxy_url: Option<String>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            app_version: None,
            sdk_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            environment: Environment::Production,
            device_id: None,
            language: None,
            storage_path: PathBuf::from("."),
            base_url: DEFAULT_BASE_URL.to_string(),
            distribution_type: "MOBILE_SDK_IOS".to_string(),
            sdk_name: "Lingohub-Rust-SDK".to_string(),
            check_interval: Duration::from_secs(24 * 60 * 60),
            timeout: Duration::from_secs(30),
            max_download_size: 50 * 1024 * 1024,
            proxy_url: None,
        }
    }
}

impl SdkConfig {
    /// Creates a config with the two values every host has to supply.
    pub fn new(api_key: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            app_version: Some(app_version.into()),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_app_version(mut self, app_version: impl Into<String>) -> Self {
        self.app_version = Some(app_version.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Configure with custom proxy
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy_url = Some(proxy_url);
        self
    }

    /// Root folder owned by the SDK.
    pub fn sdk_dir(&self) -> PathBuf {
        self.storage_path.join(FOLDER_NAME)
    }

    /// Returns the values a remote check cannot run without.
    ///
    /// Checked in the order SDK version, app version, API key. Empty
    /// strings count as missing.
    pub fn require_credentials(&self) -> Result<Credentials<'_>, ConfigurationError> {
        let sdk_version =
            non_empty(&self.sdk_version).ok_or(ConfigurationError::MissingSdkVersion)?;
        let app_version =
            non_empty(&self.app_version).ok_or(ConfigurationError::MissingAppVersion)?;
        let api_key = non_empty(&self.api_key).ok_or(ConfigurationError::MissingApiKey)?;
        Ok(Credentials {
            api_key,
            app_version,
            sdk_version,
        })
    }
}

/// Borrowed view of the validated credentials.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub api_key: &'a str,
    pub app_version: &'a str,
    pub sdk_version: &'a str,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
