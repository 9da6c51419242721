// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Update Coordinator - orchestrates check, download and install
//!
//! Runs one update at a time:
//! `Idle → Checking → (NoUpdateFound | Downloading → Installing → Done)`,
//! with `Failed` reachable from every step after `Idle`.
//!
//! The installed version is only written after a fully successful install,
//! and the string cache is cleared whenever the artifact on disk changes.
//! A copy of the installed version is kept in memory for lookups, so the
//! lookup path never reads persisted state.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::StringCache;
use crate::client::{CheckOutcome, CheckRequest, UpdateClient};
use crate::config::SdkConfig;
use crate::error::{ErrorKind, SdkError, SdkResult};
use crate::events::{EventDispatcher, SdkEvent};
use crate::store::{should_check_now, ArtifactStore, InstalledVersion, StoreError, VersionStore};

/// Where the coordinator currently is in an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    Checking,
    NoUpdateFound,
    Downloading,
    Installing,
    Done,
    Failed(ErrorKind),
}

/// Successful result of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing newer was offered; the installed artifact is unchanged
    NoUpdate,
    /// A new artifact was installed
    Updated {
        /// Release id now recorded as installed
        artifact_id: String,
    },
}

/// Drives the update workflow for one context.
pub struct UpdateCoordinator {
    config: Arc<SdkConfig>,
    client: UpdateClient,
    store: Arc<ArtifactStore>,
    versions: Arc<dyn VersionStore>,
    cache: Arc<StringCache>,
    events: Arc<EventDispatcher>,
    installed: RwLock<Option<InstalledVersion>>,
    state: RwLock<UpdateState>,
    flight: Mutex<()>,
}

impl UpdateCoordinator {
    pub fn new(
        config: Arc<SdkConfig>,
        client: UpdateClient,
        store: Arc<ArtifactStore>,
        versions: Arc<dyn VersionStore>,
        cache: Arc<StringCache>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        let installed = versions.installed().filter(|_| store.exists());
        Self {
            config,
            client,
            store,
            versions,
            cache,
            events,
            installed: RwLock::new(installed),
            state: RwLock::new(UpdateState::Idle),
            flight: Mutex::new(()),
        }
    }

    /// State of the current or most recent update.
    pub fn state(&self) -> UpdateState {
        *self.state.read()
    }

    /// Installed version backing lookups, held in memory.
    pub fn installed(&self) -> Option<InstalledVersion> {
        self.installed.read().clone()
    }

    pub fn has_installed(&self) -> bool {
        self.installed.read().is_some()
    }

    /// Whether an update is running right now.
    pub fn is_running(&self) -> bool {
        self.flight.try_lock().is_err()
    }

    /// Check for a newer artifact and install it.
    ///
    /// `language` is reported to the service as the client language. A
    /// call made while another update is running fails with
    /// [`SdkError::UpdateInProgress`] without touching anything.
    pub async fn update(&self, language: Option<&str>) -> SdkResult<UpdateOutcome> {
        let Ok(_flight) = self.flight.try_lock() else {
            warn!("update requested while another is in flight");
            return Err(SdkError::UpdateInProgress);
        };

        let result = self.run(language).await;
        match &result {
            Ok(UpdateOutcome::NoUpdate) => self.set_state(UpdateState::NoUpdateFound),
            Ok(UpdateOutcome::Updated { .. }) => self.set_state(UpdateState::Done),
            Err(err) => {
                warn!(error = %err, "update failed");
                self.set_state(UpdateState::Failed(err.kind()));
            }
        }
        result
    }

    /// Like [`update`](Self::update), but only once per check interval.
    ///
    /// Returns `None` when the last completed check is too recent.
    pub async fn update_if_due(&self, language: Option<&str>) -> SdkResult<Option<UpdateOutcome>> {
        let last_check = self.versions.last_check_time();
        if !should_check_now(last_check, SystemTime::now(), self.config.check_interval) {
            debug!("last check is recent, skipping");
            return Ok(None);
        }
        self.update(language).await.map(Some)
    }

    /// Purge the installed artifact if it was installed under another app
    /// version, and forget a recorded version whose artifact is gone from
    /// disk. Returns whether anything was removed.
    pub fn reconcile_app_version(&self) -> SdkResult<bool> {
        if let Some(current) = self.config.app_version.as_deref().filter(|v| !v.is_empty()) {
            let stored = self.versions.stored_app_version();
            if stored.as_deref() != Some(current) && (stored.is_some() || self.store.exists()) {
                info!(
                    stored = stored.as_deref().unwrap_or("<none>"),
                    current, "app version changed, purging installed artifact"
                );
                self.remove_artifact()?;
                return Ok(true);
            }
        }

        let recorded = self.versions.installed();
        if recorded.is_some() && !self.store.exists() {
            warn!("recorded artifact is missing on disk, forgetting it");
            self.remove_artifact()?;
            return Ok(true);
        }
        *self.installed.write() = recorded;
        Ok(false)
    }

    /// Remove the artifact and the installed version.
    ///
    /// Fails with [`SdkError::UpdateInProgress`] while an update is running.
    pub fn reset(&self) -> SdkResult<()> {
        let Ok(_flight) = self.flight.try_lock() else {
            return Err(SdkError::UpdateInProgress);
        };
        self.remove_artifact()?;
        self.set_state(UpdateState::Idle);
        Ok(())
    }

    async fn run(&self, language: Option<&str>) -> SdkResult<UpdateOutcome> {
        let credentials = self.config.require_credentials()?;
        self.reconcile_app_version()?;

        let request = CheckRequest {
            api_key: credentials.api_key.to_string(),
            app_version: credentials.app_version.to_string(),
            sdk_version: credentials.sdk_version.to_string(),
            installed_artifact_id: self.installed().map(|v| v.artifact_id),
            environment: self.config.environment,
            device_id: self.config.device_id.clone(),
            language: language.map(str::to_string),
        };

        self.set_state(UpdateState::Checking);
        let outcome = self.client.check_for_update(&request).await?;
        self.record_check();

        let descriptor = match outcome {
            CheckOutcome::NoUpdate => return Ok(UpdateOutcome::NoUpdate),
            CheckOutcome::Available(descriptor) => descriptor,
        };
        let Some(url) = descriptor.download_url.as_ref() else {
            info!(release = %descriptor.id, "release has no files, nothing to install");
            return Ok(UpdateOutcome::NoUpdate);
        };

        self.set_state(UpdateState::Downloading);
        let archive = self.client.download(url).await?;

        self.set_state(UpdateState::Installing);
        let installed = self.install(archive.clone()).await;
        if let Err(err) = tokio::fs::remove_file(&archive).await {
            debug!(error = %err, path = %archive.display(), "could not remove downloaded archive");
        }
        installed?;

        // the artifact on disk changed, whatever happens next
        self.cache.clear();
        let version = InstalledVersion {
            artifact_id: descriptor.id.clone(),
            app_version: request.app_version,
        };
        if let Err(err) = self.versions.save(&version) {
            warn!(error = %err, "could not record installed version, discarding artifact");
            self.discard_unrecorded();
            return Err(err.into());
        }
        *self.installed.write() = Some(version);

        info!(release = %descriptor.id, "localization updated");
        self.events.dispatch(SdkEvent::LocalizationUpdated {
            artifact_id: descriptor.id.clone(),
        });

        Ok(UpdateOutcome::Updated {
            artifact_id: descriptor.id,
        })
    }

    async fn install(&self, archive: PathBuf) -> Result<(), StoreError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.install(&archive))
            .await
            .map_err(|e| StoreError::Io(io::Error::other(e)))?
    }

    fn remove_artifact(&self) -> SdkResult<()> {
        *self.installed.write() = None;
        self.store.purge()?;
        self.versions.clear()?;
        self.cache.clear();
        self.events.dispatch(SdkEvent::ArtifactRemoved);
        Ok(())
    }

    // Best effort: an artifact whose version could not be recorded must not
    // stay on disk under the previous release id.
    fn discard_unrecorded(&self) {
        *self.installed.write() = None;
        if let Err(err) = self.store.purge() {
            warn!(error = %err, "could not remove unrecorded artifact");
        }
        if let Err(err) = self.versions.clear() {
            warn!(error = %err, "could not clear installed version");
        }
        self.cache.clear();
        self.events.dispatch(SdkEvent::ArtifactRemoved);
    }

    fn record_check(&self) {
        if let Err(err) = self.versions.set_last_check_time(SystemTime::now()) {
            warn!(error = %err, "could not record check time");
        }
    }

    fn set_state(&self, state: UpdateState) {
        debug!(?state, "update state");
        *self.state.write() = state;
    }
}
