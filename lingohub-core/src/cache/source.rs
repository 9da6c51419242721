//! Where string tables come from
//!
//! An artifact lays tables out as `<lang>/<Table>.strings`, with
//! `<lang>.lproj/<Table>.strings` and `<lang>/<Table>.json` accepted too.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::strings;
use crate::store::ArtifactStore;

/// A parsed string table: key to localized value.
pub type Table = HashMap<String, String>;

/// Loads whole tables for the cache.
///
/// `None` covers every way a table can be unavailable (no artifact, no
/// such language or table, unreadable file). The cache treats them alike.
pub trait TableSource: Send + Sync {
    fn load_table(&self, language: &str, table: &str) -> Option<Table>;
}

/// Candidate file locations for a table, in lookup order.
pub fn table_candidates(base: &Path, language: &str, table: &str) -> [PathBuf; 3] {
    [
        base.join(language).join(format!("{table}.strings")),
        base.join(format!("{language}.lproj"))
            .join(format!("{table}.strings")),
        base.join(language).join(format!("{table}.json")),
    ]
}

impl TableSource for ArtifactStore {
    fn load_table(&self, language: &str, table: &str) -> Option<Table> {
        if !is_plain_name(language) || !is_plain_name(table) {
            warn!(language, table, "rejecting table lookup with path characters");
            return None;
        }
        if !self.exists() {
            debug!("no artifact installed");
            return None;
        }

        let base = self.installed_directory();
        let Some(path) = table_candidates(&base, language, table)
            .into_iter()
            .find(|p| p.is_file())
        else {
            debug!(language, table, "table not present in artifact");
            return None;
        };

        read_table(&path)
    }
}

fn read_table(path: &Path) -> Option<Table> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, path = %path.display(), "could not read table");
            return None;
        }
    };
    let Some(text) = strings::decode_text(&bytes) else {
        warn!(path = %path.display(), "table is not valid text");
        return None;
    };

    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str::<Table>(&text).map_err(|e| e.to_string())
    } else {
        strings::parse(&text).map_err(|e| e.to_string())
    };

    match parsed {
        Ok(table) => {
            debug!(path = %path.display(), entries = table.len(), "table loaded");
            Some(table)
        }
        Err(err) => {
            warn!(error = %err, path = %path.display(), "could not parse table");
            None
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
