//! Tests for the update workflow through the context
//!
//! Scenarios:
//! - Check returns 204, nothing changes
//! - Check returns 200, archive is installed and served
//! - Check returns 401 with a server message
//! - Archive is corrupt, nothing is installed
//! - A new install replaces cached strings
//! - Only one update runs at a time

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use lingohub_core::client::{DownloadResponse, HttpRequest, HttpResponse, TransportResult};
use lingohub_core::{
    CallbackHandler, ErrorKind, HttpTransport, InstalledVersion, Lingohub, SdkError, SdkEvent,
    UpdateOutcome, UpdateState,
};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::Notify;
use url::Url;

use super::fixtures::{self, harness, standard_archive, zip_archive, FILES_URL, RELEASE_ID};

#[tokio::test]
async fn test_update_installs_release() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.queue_release(RELEASE_ID, standard_archive());

    let outcome = h.sdk.update().await.unwrap();

    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            artifact_id: RELEASE_ID.into()
        }
    );
    assert_eq!(h.sdk.update_state(), UpdateState::Done);
    assert_eq!(
        h.sdk.installed_version(),
        Some(InstalledVersion {
            artifact_id: RELEASE_ID.into(),
            app_version: "1.0.0".into(),
        })
    );
    assert!(h.sdk.is_updated_bundle_used());
    assert_eq!(h.transport.downloaded_urls(), vec![Url::parse(FILES_URL).unwrap()]);
    assert_eq!(
        h.sdk.cache().get("OtherString", Some("Other"), "en").as_deref(),
        Some("Other string")
    );
    assert_eq!(
        h.sdk
            .localized_string("StringPlain", None, Some("de"))
            .as_deref(),
        Some("Text")
    );
}

#[tokio::test]
async fn test_downloaded_archive_is_removed() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;

    let downloads = h.sdk.config().sdk_dir().join("downloads");
    let leftovers = fs::read_dir(&downloads)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_no_content_leaves_install_untouched() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;

    h.transport.queue_response(204, Vec::new());
    let outcome = h.sdk.update().await.unwrap();

    assert_eq!(outcome, UpdateOutcome::NoUpdate);
    assert_eq!(h.sdk.update_state(), UpdateState::NoUpdateFound);
    assert_eq!(h.sdk.installed_version().unwrap().artifact_id, RELEASE_ID);
    assert_eq!(
        h.sdk.localized_string("StringPlain", None, Some("en")).as_deref(),
        Some("String")
    );
}

#[tokio::test]
async fn test_unauthorized_check() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.transport.queue_json(
        401,
        &serde_json::json!({"error_message": "Unauthorized access"}),
    );

    let err = h.sdk.update().await.unwrap_err();

    match &err {
        SdkError::Api {
            status_code,
            message,
        } => {
            assert_eq!(*status_code, 401);
            assert_eq!(message.as_deref(), Some("Unauthorized access"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "Unauthorized access");
    assert_eq!(h.sdk.update_state(), UpdateState::Failed(ErrorKind::Api));
    assert!(h.sdk.installed_version().is_none());
}

#[tokio::test]
async fn test_corrupt_archive_installs_nothing() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.queue_release(RELEASE_ID, b"this is not a zip archive".to_vec());

    let err = h.sdk.update().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(!h.sdk.store().exists());
    assert!(h.sdk.installed_version().is_none());
}

#[tokio::test]
async fn test_corrupt_archive_keeps_previous_install() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;

    h.queue_release("second-release", b"garbage".to_vec());
    assert!(h.sdk.update().await.is_err());

    assert_eq!(h.sdk.installed_version().unwrap().artifact_id, RELEASE_ID);
    assert_eq!(
        h.sdk.localized_string("StringPlain", None, Some("en")).as_deref(),
        Some("String")
    );
}

#[tokio::test]
async fn test_empty_download_is_storage_error() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.queue_release(RELEASE_ID, Vec::new());

    let err = h.sdk.update().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(!h.sdk.store().exists());
}

#[tokio::test]
async fn test_new_release_invalidates_cache() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;
    assert_eq!(
        h.sdk.localized_string("StringPlain", None, Some("en")).as_deref(),
        Some("String")
    );
    // negative entry for a table the first release lacks
    assert_eq!(h.sdk.localized_string("Hello", None, Some("fr")), None);

    let second = zip_archive(&[
        ("en/Localizable.strings", "\"StringPlain\" = \"Changed\";"),
        ("fr/Localizable.strings", "\"Hello\" = \"Bonjour\";"),
    ]);
    h.install("second-release", second).await;

    assert_eq!(
        h.sdk.localized_string("StringPlain", None, Some("en")).as_deref(),
        Some("Changed")
    );
    assert_eq!(
        h.sdk.localized_string("Hello", None, Some("fr")).as_deref(),
        Some("Bonjour")
    );
    // tables missing from the new release are gone
    assert_eq!(h.sdk.localized_string("StringPlain", None, Some("de")), None);
}

#[tokio::test]
async fn test_update_emits_event() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    h.sdk
        .add_event_handler(Arc::new(CallbackHandler::new(move |e| sink.lock().push(e))));

    h.install(RELEASE_ID, standard_archive()).await;
    h.sdk.reset().unwrap();

    assert_eq!(
        *events.lock(),
        vec![
            SdkEvent::LocalizationUpdated {
                artifact_id: RELEASE_ID.into()
            },
            SdkEvent::ArtifactRemoved,
        ]
    );
}

#[tokio::test]
async fn test_reset_removes_everything() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;

    h.sdk.reset().unwrap();

    assert!(!h.sdk.is_updated_bundle_used());
    assert!(!h.sdk.store().exists());
    assert!(h.sdk.installed_version().is_none());
    assert_eq!(h.sdk.localized_string("StringPlain", None, Some("en")), None);
    assert_eq!(h.sdk.cache().cached_tables(), 0);
}

#[tokio::test]
async fn test_update_if_due_runs_once_per_interval() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.transport.queue_response(204, Vec::new());

    assert_eq!(
        h.sdk.update_if_due().await.unwrap(),
        Some(UpdateOutcome::NoUpdate)
    );
    assert_eq!(h.sdk.update_if_due().await.unwrap(), None);
    assert_eq!(h.transport.sent_requests().len(), 1);
}

#[tokio::test]
async fn test_failed_check_does_not_count_for_throttle() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.transport.queue_response(500, Vec::new());
    h.transport.queue_response(204, Vec::new());

    assert!(h.sdk.update_if_due().await.is_err());
    assert_eq!(
        h.sdk.update_if_due().await.unwrap(),
        Some(UpdateOutcome::NoUpdate)
    );
}

#[tokio::test]
async fn test_app_version_change_purges_on_build() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;

    // same version: still in use after a restart
    let same = harness(&temp, "1.0.0");
    assert!(same.sdk.is_updated_bundle_used());

    let upgraded = harness(&temp, "1.0.1");
    assert!(!upgraded.sdk.is_updated_bundle_used());
    assert!(!upgraded.sdk.store().exists());
    assert!(upgraded.sdk.installed_version().is_none());
    assert!(upgraded.transport.sent_requests().is_empty());
}

#[tokio::test]
async fn test_missing_api_key_fails_before_network() {
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(lingohub_core::MockTransport::new());
    let mut config = fixtures::config(&temp, "1.0.0");
    config.api_key = None;
    let sdk = Lingohub::builder(config)
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = sdk.update().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(transport.sent_requests().is_empty());
}

/// Holds every check until released.
#[derive(Default)]
struct GatedTransport {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn send(&self, _request: HttpRequest) -> TransportResult<HttpResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(HttpResponse {
            status: 204,
            body: Vec::new(),
        })
    }

    async fn download(&self, _url: &Url) -> TransportResult<DownloadResponse> {
        unreachable!("no download expected")
    }
}

#[tokio::test]
async fn test_concurrent_update_rejected() {
    let temp = TempDir::new().unwrap();
    let gate = Arc::new(GatedTransport::default());
    let sdk = Lingohub::builder(fixtures::config(&temp, "1.0.0"))
        .transport(gate.clone())
        .build()
        .unwrap();

    let running = sdk.clone();
    let first = tokio::spawn(async move { running.update().await });
    gate.entered.notified().await;

    assert_eq!(sdk.update_state(), UpdateState::Checking);
    assert!(matches!(sdk.update().await, Err(SdkError::UpdateInProgress)));
    assert!(matches!(sdk.reset(), Err(SdkError::UpdateInProgress)));

    gate.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), UpdateOutcome::NoUpdate);
}

#[tokio::test]
async fn test_missing_artifact_is_downloaded_again() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;

    // crash between the install renames, or cleanup by the OS
    fs::remove_dir_all(h.sdk.store().installed_directory()).unwrap();

    let restarted = harness(&temp, "1.0.0");
    assert!(!restarted.sdk.is_updated_bundle_used());
    assert!(restarted.sdk.installed_version().is_none());

    restarted.queue_release(RELEASE_ID, standard_archive());
    restarted.sdk.update().await.unwrap();

    let body: serde_json::Value =
        serde_json::from_slice(restarted.transport.sent_requests()[0].body.as_ref().unwrap())
            .unwrap();
    assert!(body.get("clientRelease").is_none());
    assert!(restarted.sdk.store().exists());
    assert_eq!(
        restarted.sdk.localized_string("StringPlain", None, Some("en")).as_deref(),
        Some("String")
    );
}

#[tokio::test]
async fn test_artifact_removed_while_running_is_reconciled_before_check() {
    let temp = TempDir::new().unwrap();
    let h = harness(&temp, "1.0.0");
    h.install(RELEASE_ID, standard_archive()).await;

    fs::remove_dir_all(h.sdk.store().installed_directory()).unwrap();
    h.transport.queue_response(204, Vec::new());
    h.sdk.update().await.unwrap();

    let body: serde_json::Value =
        serde_json::from_slice(h.transport.sent_requests()[1].body.as_ref().unwrap()).unwrap();
    assert!(body.get("clientRelease").is_none());
    assert!(!h.sdk.is_updated_bundle_used());
}
