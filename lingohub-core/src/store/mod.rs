// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local storage
//!
//! Installed artifact directory, archive extraction and the persisted
//! install metadata.

mod artifact;
mod extract;
mod version;

use std::io;

use thiserror::Error;

pub use artifact::{ArtifactStore, BUNDLE_NAME};
pub use extract::{ArchiveExtractor, ZipExtractor};
pub use version::{
    should_check_now, FileVersionStore, InstalledVersion, MemoryVersionStore, PersistedState,
    VersionStore,
};

/// Errors that can occur with local storage
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Archive could not be read or unpacked
    #[error("archive error: {0}")]
    Archive(String),

    /// Archive unpacked to nothing
    #[error("archive contains no files")]
    EmptyArchive,

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid time value
    #[error("invalid time value")]
    InvalidTime,
}
