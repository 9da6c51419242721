//! CLI Configuration

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use lingohub_core::{Environment, Lingohub, SdkConfig, SdkError};

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory; the SDK keeps its `Lingohub/` folder here.
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub app_version: Option<String>,
    pub environment: Environment,
    pub device_id: Option<String>,
    pub base_url: String,
    /// Language override for lookups and update checks.
    pub language: Option<String>,
}

impl CliConfig {
    /// SDK configuration for this invocation.
    pub fn sdk_config(&self) -> SdkConfig {
        SdkConfig {
            api_key: self.api_key.clone(),
            app_version: self.app_version.clone(),
            environment: self.environment,
            device_id: self.device_id.clone(),
            language: self.language.clone(),
            storage_path: self.data_dir.clone(),
            base_url: self.base_url.clone(),
            ..SdkConfig::default()
        }
    }

    /// Opens the SDK context over the data directory.
    pub fn open(&self) -> Result<Lingohub> {
        Lingohub::new(self.sdk_config()).map_err(describe)
    }
}

/// Turns an SDK error into a CLI error, adding configuration hints.
pub fn describe(err: SdkError) -> anyhow::Error {
    match &err {
        SdkError::Configuration(missing) => {
            anyhow!("{err}\n  {}", missing.recovery_suggestion())
        }
        _ => anyhow::Error::new(err),
    }
}
