// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lingohub context
//!
//! Main entry point of the SDK.

use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::StringCache;
use crate::client::{HttpTransport, UpdateClient};
use crate::config::SdkConfig;
use crate::coordinator::{UpdateCoordinator, UpdateOutcome, UpdateState};
use crate::error::SdkResult;
use crate::events::{EventDispatcher, EventHandler};
use crate::resolve::{FallbackSource, NativeLookup, ResolutionChain};
use crate::store::{
    ArchiveExtractor, ArtifactStore, FileVersionStore, InstalledVersion, VersionStore,
    ZipExtractor,
};

/// Language used when nothing else is known.
pub const DEFAULT_LANGUAGE: &str = "en";

/// The SDK context.
///
/// Owns configuration, the active language, the installed artifact, the
/// string cache and the update coordinator. Cloning is cheap and every
/// clone refers to the same context.
///
/// # Example
///
/// ```ignore
/// use lingohub_core::{Lingohub, SdkConfig};
///
/// let sdk = Lingohub::new(SdkConfig::new("api-key", "1.4.0"))?;
/// sdk.set_language("de");
///
/// sdk.update().await?;
///
/// let title = sdk.localized_string("welcome.title", None, None);
/// ```
#[derive(Clone)]
pub struct Lingohub {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<SdkConfig>,
    language: RwLock<Option<String>>,
    store: Arc<ArtifactStore>,
    versions: Arc<dyn VersionStore>,
    cache: Arc<StringCache>,
    events: Arc<EventDispatcher>,
    coordinator: UpdateCoordinator,
}

impl Lingohub {
    /// Creates a context that talks to the service over HTTPS.
    #[cfg(feature = "remote-updates")]
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        LingohubBuilder::new(config).build()
    }

    pub fn builder(config: SdkConfig) -> LingohubBuilder {
        LingohubBuilder::new(config)
    }

    // === Language ===

    /// Pins the active language.
    pub fn set_language(&self, language: impl Into<String>) {
        let language = language.into();
        debug!(%language, "active language set");
        *self.inner.language.write() = Some(language);
    }

    /// Follows the system language again.
    pub fn set_system_language(&self) {
        *self.inner.language.write() = None;
    }

    /// The pinned language, if any.
    pub fn language(&self) -> Option<String> {
        self.inner.language.read().clone()
    }

    /// Language a lookup runs in: the requested one, else the pinned one,
    /// else the system's primary language, else `en`.
    pub fn effective_language(&self, requested: Option<&str>) -> String {
        if let Some(language) = requested.filter(|l| !l.is_empty()) {
            return language.to_string();
        }
        if let Some(language) = self.language().filter(|l| !l.is_empty()) {
            return language;
        }
        sys_locale::get_locale()
            .and_then(|locale| primary_subtag(&locale))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    // === Installed artifact ===

    /// True when an artifact is installed and its version is recorded.
    ///
    /// Answered from memory. Disk and persisted state are reconciled when
    /// the context is built and before every check.
    pub fn is_updated_bundle_used(&self) -> bool {
        self.inner.coordinator.has_installed()
    }

    pub fn installed_version(&self) -> Option<InstalledVersion> {
        self.inner.coordinator.installed()
    }

    /// Looks `key` up in the installed artifact only.
    ///
    /// Returns `None` when no artifact is in use or the key is not in the
    /// cached table. See [`ResolutionChain`] for the full fallback.
    pub fn localized_string(
        &self,
        key: &str,
        table: Option<&str>,
        language: Option<&str>,
    ) -> Option<String> {
        if !self.is_updated_bundle_used() {
            return None;
        }
        let language = self.effective_language(language);
        self.inner.cache.get(key, table, &language)
    }

    // === Updates ===

    /// Checks for and installs a newer artifact.
    pub async fn update(&self) -> SdkResult<UpdateOutcome> {
        let language = self.language();
        self.inner.coordinator.update(language.as_deref()).await
    }

    /// Like [`update`](Self::update), at most once per check interval.
    pub async fn update_if_due(&self) -> SdkResult<Option<UpdateOutcome>> {
        let language = self.language();
        self.inner.coordinator.update_if_due(language.as_deref()).await
    }

    /// When the service was last reached successfully.
    pub fn last_check_time(&self) -> Option<SystemTime> {
        self.inner.versions.last_check_time()
    }

    pub fn update_state(&self) -> UpdateState {
        self.inner.coordinator.state()
    }

    /// Removes the installed artifact and forgets its version.
    pub fn reset(&self) -> SdkResult<()> {
        self.inner.coordinator.reset()
    }

    // === Events and resolution ===

    pub fn add_event_handler(&self, handler: Arc<dyn EventHandler>) {
        self.inner.events.add_handler(handler);
    }

    /// Builds the resolver to register with the interception hook.
    pub fn resolution_chain(
        &self,
        native: Option<Arc<dyn NativeLookup>>,
        fallback: Arc<dyn FallbackSource>,
    ) -> ResolutionChain {
        ResolutionChain::new(self.clone(), native, fallback)
    }

    // === Accessors ===

    pub fn config(&self) -> &SdkConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.inner.store
    }

    pub fn cache(&self) -> &StringCache {
        &self.inner.cache
    }

    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.inner.events
    }
}

/// Builder for [`Lingohub`] contexts.
///
/// Every collaborator has a default: reqwest for HTTP, a JSON state file
/// next to the artifact and zip extraction.
pub struct LingohubBuilder {
    config: SdkConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    versions: Option<Arc<dyn VersionStore>>,
    extractor: Option<Arc<dyn ArchiveExtractor>>,
}

impl LingohubBuilder {
    pub fn new(config: SdkConfig) -> Self {
        Self {
            config,
            transport: None,
            versions: None,
            extractor: None,
        }
    }

    /// Sets the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets where the installed version is persisted.
    pub fn version_store(mut self, versions: Arc<dyn VersionStore>) -> Self {
        self.versions = Some(versions);
        self
    }

    /// Sets the archive extractor.
    pub fn extractor(mut self, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Builds the context.
    ///
    /// An artifact installed under a different app version is purged here.
    pub fn build(self) -> SdkResult<Lingohub> {
        let config = Arc::new(self.config);
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&config)?,
        };

        let sdk_dir = config.sdk_dir();
        let versions: Arc<dyn VersionStore> = match self.versions {
            Some(versions) => versions,
            None => Arc::new(FileVersionStore::new(&sdk_dir)),
        };
        let extractor: Arc<dyn ArchiveExtractor> = match self.extractor {
            Some(extractor) => extractor,
            None => Arc::new(ZipExtractor),
        };
        let store = Arc::new(ArtifactStore::with_extractor(sdk_dir, extractor));
        let cache = Arc::new(StringCache::new(store.clone()));
        let events = Arc::new(EventDispatcher::new());
        let client = UpdateClient::new(transport, &config)?;

        let coordinator = UpdateCoordinator::new(
            config.clone(),
            client,
            store.clone(),
            versions.clone(),
            cache.clone(),
            events.clone(),
        );
        if let Err(err) = coordinator.reconcile_app_version() {
            warn!(error = %err, "could not remove stale artifact");
        }

        Ok(Lingohub {
            inner: Arc::new(Inner {
                language: RwLock::new(config.language.clone()),
                config,
                store,
                versions,
                cache,
                events,
                coordinator,
            }),
        })
    }
}

#[cfg(feature = "remote-updates")]
fn default_transport(config: &SdkConfig) -> SdkResult<Arc<dyn HttpTransport>> {
    Ok(Arc::new(crate::client::ReqwestTransport::new(config)?))
}

#[cfg(not(feature = "remote-updates"))]
fn default_transport(_config: &SdkConfig) -> SdkResult<Arc<dyn HttpTransport>> {
    Err(crate::client::TransportError::Network(
        "remote updates disabled and no transport configured".into(),
    )
    .into())
}

fn primary_subtag(locale: &str) -> Option<String> {
    locale
        .split(['-', '_', '.'])
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}
