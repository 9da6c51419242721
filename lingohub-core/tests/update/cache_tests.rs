//! Tests for StringCache over an installed artifact

use std::fs;
use std::sync::Arc;

use lingohub_core::{ArtifactStore, StringCache};
use tempfile::TempDir;

use super::fixtures::{standard_archive, zip_archive};

fn installed(temp: &TempDir, archive: Vec<u8>) -> Arc<ArtifactStore> {
    let path = temp.path().join("release.zip");
    fs::write(&path, archive).unwrap();
    let store = Arc::new(ArtifactStore::new(temp.path().join("Lingohub")));
    store.install(&path).unwrap();
    store
}

#[test]
fn test_lookup_from_artifact() {
    let temp = TempDir::new().unwrap();
    let store = installed(&temp, standard_archive());
    let cache = StringCache::new(store);

    assert_eq!(cache.get("StringPlain", None, "en").as_deref(), Some("String"));
    assert_eq!(cache.get("StringPlain", None, "de").as_deref(), Some("Text"));
    assert_eq!(
        cache.get("OtherString", Some("Other"), "en").as_deref(),
        Some("Other string")
    );
    assert_eq!(cache.get("OtherString", None, "en"), None);
}

#[test]
fn test_missing_table_is_not_reread() {
    let temp = TempDir::new().unwrap();
    let store = installed(&temp, standard_archive());
    let cache = StringCache::new(store.clone());

    assert_eq!(cache.get("Hello", None, "fr"), None);

    // appears on disk behind the cache's back
    let dir = store.installed_directory().join("fr");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Localizable.strings"), "\"Hello\" = \"Bonjour\";").unwrap();
    assert_eq!(cache.get("Hello", None, "fr"), None);

    cache.clear();
    assert_eq!(cache.get("Hello", None, "fr").as_deref(), Some("Bonjour"));
}

#[test]
fn test_loaded_table_is_not_reread() {
    let temp = TempDir::new().unwrap();
    let store = installed(&temp, standard_archive());
    let cache = StringCache::new(store.clone());
    assert_eq!(cache.get("StringPlain", None, "en").as_deref(), Some("String"));

    fs::remove_dir_all(store.installed_directory()).unwrap();
    assert_eq!(cache.get("StringPlain", None, "en").as_deref(), Some("String"));

    cache.clear();
    assert_eq!(cache.get("StringPlain", None, "en"), None);
}

#[test]
fn test_unparseable_table_is_negative() {
    let temp = TempDir::new().unwrap();
    let store = installed(
        &temp,
        zip_archive(&[("en/Localizable.strings", "\"StringPlain\" = ")]),
    );
    let cache = StringCache::new(store);

    assert_eq!(cache.get("StringPlain", None, "en"), None);
    assert!(cache.is_cached("en", "Localizable"));
}

#[test]
fn test_json_table() {
    let temp = TempDir::new().unwrap();
    let store = installed(
        &temp,
        zip_archive(&[("es/Localizable.json", "{\"StringPlain\": \"Cadena\"}")]),
    );
    let cache = StringCache::new(store);

    assert_eq!(cache.get("StringPlain", None, "es").as_deref(), Some("Cadena"));
}

#[test]
fn test_no_artifact_is_negative() {
    let temp = TempDir::new().unwrap();
    let cache = StringCache::new(Arc::new(ArtifactStore::new(temp.path())));

    assert_eq!(cache.get("StringPlain", None, "en"), None);
    assert_eq!(cache.cached_tables(), 1);
}
