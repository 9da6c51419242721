//! Resolution chain
//!
//! Answers a single lookup by trying, in order, the string cache, the
//! artifact's native lookup and finally the application's bundled strings.
//! The last step always produces a value, so resolution never fails.
//!
//! The host's interception hook registers a [`StringResolver`] and routes
//! ordinary string lookups through it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use crate::cache::{Table, DEFAULT_TABLE};
use crate::sdk::Lingohub;

/// Platform lookup over one language directory of the installed artifact.
///
/// Used for entries the cache does not handle (plural rules, formatted
/// entries). Like the platform lookup it mirrors, it returns `key` itself
/// when nothing is found.
pub trait NativeLookup: Send + Sync {
    fn localized_string(&self, language_dir: &Path, key: &str, table: &str) -> String;
}

/// Whatever the application would have shown without updates.
pub trait FallbackSource: Send + Sync {
    fn localized_string(&self, key: &str, table: &str, language: &str) -> String;
}

/// Capability handed to the interception hook.
pub trait StringResolver: Send + Sync {
    fn resolve(&self, key: &str, table: Option<&str>, language: Option<&str>) -> String;
}

/// In-memory bundled strings: language → table → key → value.
///
/// Missing entries resolve to the key.
#[derive(Debug, Clone, Default)]
pub struct BundledStrings {
    languages: HashMap<String, HashMap<String, Table>>,
}

impl BundledStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table.
    pub fn with_table<K, V>(
        mut self,
        language: &str,
        table: &str,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.insert_table(language, table, entries);
        self
    }

    pub fn insert_table<K, V>(
        &mut self,
        language: &str,
        table: &str,
        entries: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.languages
            .entry(language.to_string())
            .or_default()
            .insert(table.to_string(), entries);
    }

    pub fn get(&self, key: &str, table: &str, language: &str) -> Option<&str> {
        self.languages
            .get(language)?
            .get(table)?
            .get(key)
            .map(String::as_str)
    }
}

impl FallbackSource for BundledStrings {
    fn localized_string(&self, key: &str, table: &str, language: &str) -> String {
        self.get(key, table, language).unwrap_or(key).to_string()
    }
}

/// Ordered fallback for one lookup: cache, native lookup, bundled strings.
pub struct ResolutionChain {
    sdk: Lingohub,
    native: Option<Arc<dyn NativeLookup>>,
    fallback: Arc<dyn FallbackSource>,
}

impl ResolutionChain {
    pub fn new(
        sdk: Lingohub,
        native: Option<Arc<dyn NativeLookup>>,
        fallback: Arc<dyn FallbackSource>,
    ) -> Self {
        Self {
            sdk,
            native,
            fallback,
        }
    }

    /// Resolves `key`, never failing.
    pub fn resolve(&self, key: &str, table: Option<&str>, language: Option<&str>) -> String {
        let table = table.unwrap_or(DEFAULT_TABLE);
        let language = self.sdk.effective_language(language);

        if self.sdk.is_updated_bundle_used() {
            if let Some(value) = self.sdk.cache().get(key, Some(table), &language) {
                trace!(key, table, %language, "resolved from cache");
                return value;
            }

            if let Some(native) = &self.native {
                if let Some(dir) = self.sdk.store().language_directory(&language) {
                    let value = native.localized_string(&dir, key, table);
                    // the platform lookup echoes the key on a miss
                    if value != key {
                        trace!(key, table, %language, "resolved from native lookup");
                        return value;
                    }
                }
            }
        }

        self.fallback.localized_string(key, table, &language)
    }
}

impl StringResolver for ResolutionChain {
    fn resolve(&self, key: &str, table: Option<&str>, language: Option<&str>) -> String {
        ResolutionChain::resolve(self, key, table, language)
    }
}
