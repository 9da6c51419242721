// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Installed artifact on local storage
//!
//! The artifact directory either fully exists or does not exist at all.
//! Installs extract into a staging directory next to it and swap it into
//! place with renames, so a failed extraction never touches the artifact
//! readers currently see.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::extract::{ArchiveExtractor, ZipExtractor};
use super::StoreError;

/// Directory name of the installed artifact.
pub const BUNDLE_NAME: &str = "update.bundle";

const STAGING_PREFIX: &str = ".staging-";
const BACKUP_PREFIX: &str = ".previous-";

/// Filesystem-backed holder of the currently installed artifact
pub struct ArtifactStore {
    root: PathBuf,
    extractor: Arc<dyn ArchiveExtractor>,
}

impl ArtifactStore {
    /// Create a store rooted at `root` using zip archives.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extractor(root, Arc::new(ZipExtractor))
    }

    pub fn with_extractor(root: impl Into<PathBuf>, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        Self {
            root: root.into(),
            extractor,
        }
    }

    /// Folder that holds the artifact and its staging siblings.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the installed artifact (whether or not it exists).
    pub fn installed_directory(&self) -> PathBuf {
        self.root.join(BUNDLE_NAME)
    }

    /// True when the artifact directory exists and is non-empty.
    pub fn exists(&self) -> bool {
        let dir = self.installed_directory();
        dir.is_dir() && !is_empty_dir(&dir)
    }

    /// Language directory inside the artifact (`<lang>` or `<lang>.lproj`).
    pub fn language_directory(&self, language: &str) -> Option<PathBuf> {
        if !self.exists() {
            return None;
        }
        let base = self.installed_directory();
        [base.join(language), base.join(format!("{language}.lproj"))]
            .into_iter()
            .find(|p| p.is_dir())
    }

    /// Languages present in the artifact, sorted.
    pub fn languages(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.installed_directory()) else {
            return Vec::new();
        };
        let mut languages: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                let name = name.strip_suffix(".lproj").unwrap_or(&name).to_string();
                (!name.starts_with('.') && !name.is_empty()).then_some(name)
            })
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }

    /// Replace the installed artifact with the contents of `archive`.
    ///
    /// On error the previously installed artifact (or its absence) is left
    /// as it was.
    pub fn install(&self, archive: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        // left by an install that crashed midway
        self.remove_leftovers();

        let staging = self.root.join(format!("{STAGING_PREFIX}{}", Uuid::new_v4()));
        if let Err(err) = self.extract_into(archive, &staging) {
            warn!(error = %err, "extraction failed, discarding staging directory");
            remove_dir_if_exists(&staging);
            return Err(err);
        }

        let target = self.installed_directory();
        let backup = self.root.join(format!("{BACKUP_PREFIX}{}", Uuid::new_v4()));
        let had_previous = target.exists();

        if had_previous {
            if let Err(err) = fs::rename(&target, &backup) {
                remove_dir_if_exists(&staging);
                return Err(err.into());
            }
        }

        if let Err(err) = fs::rename(&staging, &target) {
            if had_previous {
                if let Err(restore) = fs::rename(&backup, &target) {
                    warn!(error = %restore, "could not restore previous artifact");
                }
            }
            remove_dir_if_exists(&staging);
            return Err(err.into());
        }

        if had_previous {
            if let Err(err) = fs::remove_dir_all(&backup) {
                warn!(error = %err, path = %backup.display(), "could not remove previous artifact");
            }
        }

        info!(path = %target.display(), "artifact installed");
        Ok(())
    }

    /// Remove the installed artifact and any leftover staging directories.
    ///
    /// Purging an absent artifact is not an error.
    pub fn purge(&self) -> Result<(), StoreError> {
        let target = self.installed_directory();
        match fs::remove_dir_all(&target) {
            Ok(()) => info!(path = %target.display(), "artifact purged"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no artifact to purge");
            }
            Err(err) => return Err(err.into()),
        }
        self.remove_leftovers();
        Ok(())
    }

    fn extract_into(&self, archive: &Path, staging: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(staging)?;
        self.extractor.extract(archive, staging)?;
        if is_empty_dir(staging) {
            return Err(StoreError::EmptyArchive);
        }
        Ok(())
    }

    fn remove_leftovers(&self) {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(STAGING_PREFIX) || name.starts_with(BACKUP_PREFIX) {
                remove_dir_if_exists(&entry.path());
            }
        }
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

fn remove_dir_if_exists(path: &Path) {
    if let Err(err) = fs::remove_dir_all(path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(error = %err, path = %path.display(), "could not remove directory");
        }
    }
}
