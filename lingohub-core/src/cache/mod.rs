// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! String cache
//!
//! Memoizes whole tables per (language, table). A table that could not be
//! loaded is remembered as empty, so repeated misses never touch the disk
//! again until the cache is cleared.

mod source;
pub mod strings;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

pub use source::{table_candidates, Table, TableSource};

/// Table consulted when a lookup names none.
pub const DEFAULT_TABLE: &str = "Localizable";

// A load that raced a clear() is retried this many times before the value
// is returned uncached.
const MAX_LOAD_ATTEMPTS: usize = 3;

#[derive(Default)]
struct CacheState {
    generation: u64,
    languages: HashMap<String, HashMap<String, Arc<Table>>>,
}

/// Thread-safe lookup cache in front of a [`TableSource`].
pub struct StringCache {
    source: Arc<dyn TableSource>,
    state: RwLock<CacheState>,
}

impl StringCache {
    pub fn new(source: Arc<dyn TableSource>) -> Self {
        Self {
            source,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Looks up `key` in `table` (default `Localizable`) for `language`.
    ///
    /// The first lookup of a (language, table) pair loads the whole table;
    /// later lookups, hits or misses, are served from memory.
    pub fn get(&self, key: &str, table: Option<&str>, language: &str) -> Option<String> {
        let table = table.unwrap_or(DEFAULT_TABLE);

        for _ in 0..MAX_LOAD_ATTEMPTS {
            let generation = {
                let state = self.state.read();
                if let Some(cached) = state.languages.get(language).and_then(|t| t.get(table)) {
                    return cached.get(key).cloned();
                }
                state.generation
            };

            let loaded = match self.source.load_table(language, table) {
                Some(loaded) => loaded,
                None => {
                    debug!(language, table, "caching negative table entry");
                    Table::new()
                }
            };

            let mut state = self.state.write();
            if state.generation != generation {
                // cleared while loading, the table may belong to a replaced artifact
                continue;
            }
            let entry = state
                .languages
                .entry(language.to_string())
                .or_default()
                .entry(table.to_string())
                .or_insert_with(|| Arc::new(loaded));
            return entry.get(key).cloned();
        }

        self.source
            .load_table(language, table)
            .and_then(|t| t.get(key).cloned())
    }

    /// Drops every cached table. Later lookups reload from the source.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.languages.clear();
        state.generation = state.generation.wrapping_add(1);
        debug!(generation = state.generation, "string cache cleared");
    }

    /// Whether a (language, table) pair is currently memoized.
    pub fn is_cached(&self, language: &str, table: &str) -> bool {
        self.state
            .read()
            .languages
            .get(language)
            .is_some_and(|t| t.contains_key(table))
    }

    /// Number of memoized tables, negative entries included.
    pub fn cached_tables(&self) -> usize {
        self.state.read().languages.values().map(HashMap::len).sum()
    }
}
