//! Reset Command

use anyhow::Result;

use crate::config::{describe, CliConfig};
use crate::display;

/// Removes installed translations and the recorded release.
pub fn run(config: &CliConfig) -> Result<()> {
    let sdk = config.open()?;
    if !sdk.store().exists() && sdk.installed_version().is_none() {
        display::info("Nothing installed");
        return Ok(());
    }
    sdk.reset().map_err(describe)?;
    display::success("Installed translations removed");
    Ok(())
}
