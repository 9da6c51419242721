//! Tests for ResolutionChain
//!
//! Order: string cache, native lookup, bundled strings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lingohub_core::store::PersistedState;
use lingohub_core::{
    BundledStrings, FileVersionStore, Lingohub, MockTransport, NativeLookup, StoreError,
    StringResolver, VersionStore,
};
use parking_lot::Mutex;
use tempfile::TempDir;

use super::fixtures::{self, harness, standard_archive, Harness, RELEASE_ID};

fn bundled() -> Arc<BundledStrings> {
    Arc::new(
        BundledStrings::new()
            .with_table(
                "en",
                "Localizable",
                [("StringPlain", "Bundled string"), ("OnlyBundled", "From the app")],
            )
            .with_table("de", "Localizable", [("StringPlain", "Gebündelt")]),
    )
}

/// Answers one key, echoes everything else, and records the directories
/// it was asked to look in.
struct ScriptedNative {
    key: &'static str,
    value: &'static str,
    dirs: Mutex<Vec<PathBuf>>,
}

impl ScriptedNative {
    fn new(key: &'static str, value: &'static str) -> Arc<Self> {
        Arc::new(Self {
            key,
            value,
            dirs: Mutex::new(Vec::new()),
        })
    }
}

impl NativeLookup for ScriptedNative {
    fn localized_string(&self, language_dir: &Path, key: &str, _table: &str) -> String {
        self.dirs.lock().push(language_dir.to_path_buf());
        if key == self.key {
            self.value.to_string()
        } else {
            key.to_string()
        }
    }
}

#[tokio::test]
async fn test_bundled_when_nothing_installed() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    let native = ScriptedNative::new("StringPlain", "native");
    let chain = h
        .sdk
        .resolution_chain(Some(native.clone() as Arc<dyn NativeLookup>), bundled());

    assert_eq!(chain.resolve("StringPlain", None, Some("en")), "Bundled string");
    assert_eq!(chain.resolve("StringPlain", None, Some("de")), "Gebündelt");
    // native lookup only runs against an installed artifact
    assert!(native.dirs.lock().is_empty());
}

#[tokio::test]
async fn test_installed_artifact_wins() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;
    let chain = h.sdk.resolution_chain(None, bundled());

    assert_eq!(chain.resolve("StringPlain", None, Some("en")), "String");
    assert_eq!(chain.resolve("StringPlain", None, Some("de")), "Text");
    assert_eq!(
        chain.resolve("OtherString", Some("Other"), Some("en")),
        "Other string"
    );
}

#[tokio::test]
async fn test_falls_through_to_bundled() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;
    let chain = h.sdk.resolution_chain(None, bundled());

    assert_eq!(chain.resolve("OnlyBundled", None, Some("en")), "From the app");
    assert_eq!(chain.resolve("Unknown", None, Some("en")), "Unknown");
}

#[tokio::test]
async fn test_native_lookup_between_cache_and_bundled() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;
    let native = ScriptedNative::new("Plural", "3 items");
    let chain = h
        .sdk
        .resolution_chain(Some(native.clone() as Arc<dyn NativeLookup>), bundled());

    assert_eq!(chain.resolve("Plural", None, Some("en")), "3 items");
    // echoed key counts as a miss
    assert_eq!(chain.resolve("OnlyBundled", None, Some("en")), "From the app");
    // cache hits never reach the native lookup
    assert_eq!(chain.resolve("StringPlain", None, Some("en")), "String");

    let dirs = native.dirs.lock();
    assert_eq!(dirs.len(), 2);
    assert!(dirs.iter().all(|d| d.ends_with("en")));
}

#[tokio::test]
async fn test_native_skipped_for_language_missing_from_artifact() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;
    let native = ScriptedNative::new("StringPlain", "native");
    let chain = h
        .sdk
        .resolution_chain(Some(native.clone() as Arc<dyn NativeLookup>), bundled());

    assert_eq!(chain.resolve("StringPlain", None, Some("it")), "StringPlain");
    assert!(native.dirs.lock().is_empty());
}

#[tokio::test]
async fn test_active_language_applies() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;
    let resolver: Arc<dyn StringResolver> = Arc::new(h.sdk.resolution_chain(None, bundled()));

    h.sdk.set_language("de");
    assert_eq!(resolver.resolve("StringPlain", None, None), "Text");
    h.sdk.set_language("en");
    assert_eq!(resolver.resolve("StringPlain", None, None), "String");
}

#[tokio::test]
async fn test_reset_falls_back_to_bundled() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;
    let chain = h.sdk.resolution_chain(None, bundled());
    assert_eq!(chain.resolve("StringPlain", None, Some("en")), "String");

    h.sdk.reset().unwrap();
    assert_eq!(chain.resolve("StringPlain", None, Some("en")), "Bundled string");
}

/// File store that counts how often persisted state is read.
struct CountingVersions {
    inner: FileVersionStore,
    reads: Mutex<usize>,
}

impl VersionStore for CountingVersions {
    fn snapshot(&self) -> PersistedState {
        *self.reads.lock() += 1;
        self.inner.snapshot()
    }

    fn modify(&self, f: &mut dyn FnMut(&mut PersistedState)) -> Result<(), StoreError> {
        self.inner.modify(f)
    }
}

#[tokio::test]
async fn test_cached_lookups_do_not_read_persisted_state() {
    let temp = TempDir::new().unwrap();
    let config = fixtures::config(&temp, "1.0.0");
    let versions = Arc::new(CountingVersions {
        inner: FileVersionStore::new(&config.sdk_dir()),
        reads: Mutex::new(0),
    });
    let transport = Arc::new(MockTransport::new());
    let sdk = Lingohub::builder(config)
        .transport(transport.clone())
        .version_store(versions.clone())
        .build()
        .unwrap();
    let h = Harness { transport, sdk };
    h.install(RELEASE_ID, standard_archive()).await;
    let chain = h.sdk.resolution_chain(None, bundled());

    let before = *versions.reads.lock();
    for _ in 0..100 {
        assert_eq!(chain.resolve("StringPlain", None, Some("en")), "String");
    }
    assert_eq!(*versions.reads.lock(), before);

    // losing the state file does not change what a running context serves
    std::fs::remove_file(versions.inner.path()).unwrap();
    assert_eq!(chain.resolve("StringPlain", None, Some("en")), "String");
}
