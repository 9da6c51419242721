// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lingohub Core Library
//!
//! Over-the-air localization updates. Checks the distribution service for
//! newer translations, installs them atomically on local storage and
//! resolves lookups through a layered cache that prefers the installed
//! artifact over the application's bundled strings.

pub mod cache;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod resolve;
pub mod sdk;
pub mod store;

pub use cache::{StringCache, TableSource, DEFAULT_TABLE};
#[cfg(feature = "remote-updates")]
pub use client::ReqwestTransport;
pub use client::{
    ArtifactDescriptor, CheckOutcome, CheckRequest, ClientError, HttpTransport, MockTransport,
    TransportError, UpdateClient,
};
pub use config::{Environment, SdkConfig};
pub use coordinator::{UpdateCoordinator, UpdateOutcome, UpdateState};
pub use error::{ConfigurationError, ErrorKind, SdkError, SdkResult};
pub use events::{CallbackHandler, EventDispatcher, EventHandler, SdkEvent};
pub use resolve::{BundledStrings, FallbackSource, NativeLookup, ResolutionChain, StringResolver};
pub use sdk::{Lingohub, LingohubBuilder, DEFAULT_LANGUAGE};
pub use store::{
    ArchiveExtractor, ArtifactStore, FileVersionStore, InstalledVersion, MemoryVersionStore,
    StoreError, VersionStore, ZipExtractor,
};
