//! Status Command

use std::time::{Duration, SystemTime};

use anyhow::Result;
use console::style;

use crate::config::CliConfig;
use crate::display;

/// Shows the installed release and the effective settings.
pub fn run(config: &CliConfig) -> Result<()> {
    let sdk = config.open()?;

    println!("  {}", style("Lingohub").bold().cyan());
    display::field("Data dir:", &sdk.config().sdk_dir().display().to_string());
    display::field("Environment:", sdk.config().environment.as_str());
    display::field(
        "App version:",
        sdk.config().app_version.as_deref().unwrap_or("(not set)"),
    );
    display::field("Language:", &sdk.effective_language(None));

    match sdk.installed_version() {
        Some(version) if sdk.is_updated_bundle_used() => {
            display::field("Release:", &version.artifact_id);
            display::field("Installed for:", &version.app_version);
            display::field("Languages:", &sdk.store().languages().join(", "));
        }
        Some(version) => {
            display::field("Release:", &version.artifact_id);
            display::warning("Release is recorded but its files are missing");
        }
        None => display::field("Release:", "none (bundled strings in use)"),
    }

    let last_check = sdk
        .last_check_time()
        .map(|time| format_age(SystemTime::now().duration_since(time).unwrap_or_default()))
        .unwrap_or_else(|| "never".to_string());
    display::field("Last check:", &last_check);

    Ok(())
}

fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} min ago", secs / 60),
        3600..=86_399 => format!("{} h ago", secs / 3600),
        _ => format!("{} days ago", secs / 86_400),
    }
}
