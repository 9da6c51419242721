//! Update Command
//!
//! Checks the distribution service and installs new translations.

use anyhow::Result;
use lingohub_core::UpdateOutcome;

use crate::config::{describe, CliConfig};
use crate::display;

/// Runs a check, throttled to once per interval unless `force` is set.
pub async fn run(config: &CliConfig, force: bool) -> Result<()> {
    let sdk = config.open()?;

    let outcome = if force {
        Some(sdk.update().await.map_err(describe)?)
    } else {
        sdk.update_if_due().await.map_err(describe)?
    };

    match outcome {
        None => {
            display::info("Checked recently, skipping");
            display::info("Use 'lingohub update --force' to check now");
        }
        Some(UpdateOutcome::NoUpdate) => display::success("Translations are up to date"),
        Some(UpdateOutcome::Updated { artifact_id }) => {
            display::success(&format!("Installed release {artifact_id}"));
            let languages = sdk.store().languages();
            if !languages.is_empty() {
                display::field("Languages:", &languages.join(", "));
            }
        }
    }

    Ok(())
}
