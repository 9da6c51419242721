//! Get Command
//!
//! Resolves a key the way an application would see it.

use std::sync::Arc;

use anyhow::Result;
use lingohub_core::{BundledStrings, DEFAULT_TABLE};

use crate::config::CliConfig;
use crate::display;

/// Prints the resolved value of `key`.
///
/// Without bundled strings the key itself is the last fallback.
pub fn run(config: &CliConfig, key: &str, table: Option<&str>) -> Result<()> {
    let sdk = config.open()?;
    let chain = sdk.resolution_chain(None, Arc::new(BundledStrings::new()));

    let value = chain.resolve(key, table, None);
    println!("{value}");

    if sdk.localized_string(key, table, None).is_none() {
        display::warning(&format!(
            "'{key}' is not in table '{}' for language '{}'",
            table.unwrap_or(DEFAULT_TABLE),
            sdk.effective_language(None)
        ));
    }
    Ok(())
}
