//! Persisted install metadata
//!
//! Two values describe the installed artifact: the release id and the app
//! version it was installed under. The last-check timestamp used by the
//! daily throttle is kept alongside them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::StoreError;

/// Release id and app version of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub artifact_id: String,
    pub app_version: String,
}

/// Raw persisted values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(
        rename = "LingohubDistributionVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub artifact_id: Option<String>,
    #[serde(
        rename = "LingohubAppVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub app_version: Option<String>,
    /// Seconds since the Unix epoch
    #[serde(
        rename = "LingohubLastCheck",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_check: Option<u64>,
}

/// Storage for [`PersistedState`].
///
/// Implementations only provide a snapshot and an atomic modify; the rest
/// is derived.
pub trait VersionStore: Send + Sync {
    fn snapshot(&self) -> PersistedState;

    fn modify(&self, f: &mut dyn FnMut(&mut PersistedState)) -> Result<(), StoreError>;

    /// Both values, if both are present and non-empty.
    fn installed(&self) -> Option<InstalledVersion> {
        let state = self.snapshot();
        match (state.artifact_id, state.app_version) {
            (Some(artifact_id), Some(app_version))
                if !artifact_id.is_empty() && !app_version.is_empty() =>
            {
                Some(InstalledVersion {
                    artifact_id,
                    app_version,
                })
            }
            _ => None,
        }
    }

    fn stored_app_version(&self) -> Option<String> {
        self.snapshot().app_version
    }

    fn save(&self, version: &InstalledVersion) -> Result<(), StoreError> {
        self.modify(&mut |state| {
            state.artifact_id = Some(version.artifact_id.clone());
            state.app_version = Some(version.app_version.clone());
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.modify(&mut |state| {
            state.artifact_id = None;
            state.app_version = None;
        })
    }

    fn last_check_time(&self) -> Option<SystemTime> {
        self.snapshot()
            .last_check
            .map(|secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    fn set_last_check_time(&self, time: SystemTime) -> Result<(), StoreError> {
        let secs = time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| StoreError::InvalidTime)?
            .as_secs();
        self.modify(&mut |state| state.last_check = Some(secs))
    }
}

/// Whether the throttle allows another remote check.
pub fn should_check_now(last_check: Option<SystemTime>, now: SystemTime, interval: Duration) -> bool {
    let Some(last_check) = last_check else {
        // Never checked before
        return true;
    };
    now.duration_since(last_check).unwrap_or_default() >= interval
}

/// JSON file next to the artifact directory
pub struct FileVersionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileVersionStore {
    pub const FILE_NAME: &'static str = "state.json";

    /// Store state in `<dir>/state.json`.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(Self::FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PersistedState {
        match fs::read(&self.path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "unreadable state file, treating as empty");
                PersistedState::default()
            }),
            Err(_) => PersistedState::default(),
        }
    }
}

impl VersionStore for FileVersionStore {
    fn snapshot(&self) -> PersistedState {
        let _guard = self.lock.lock();
        self.read()
    }

    fn modify(&self, f: &mut dyn FnMut(&mut PersistedState)) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut state = self.read();
        f(&mut state);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&state)?;
        atomic_write(&self.path, &data)?;
        Ok(())
    }
}

/// In-memory state, lost on drop
#[derive(Default)]
pub struct MemoryVersionStore {
    state: Mutex<PersistedState>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out with an installed version already recorded.
    pub fn with_installed(version: InstalledVersion) -> Self {
        Self {
            state: Mutex::new(PersistedState {
                artifact_id: Some(version.artifact_id),
                app_version: Some(version.app_version),
                last_check: None,
            }),
        }
    }
}

impl VersionStore for MemoryVersionStore {
    fn snapshot(&self) -> PersistedState {
        self.state.lock().clone()
    }

    fn modify(&self, f: &mut dyn FnMut(&mut PersistedState)) -> Result<(), StoreError> {
        f(&mut self.state.lock());
        Ok(())
    }
}

/// Atomic file write (write to temp, then rename)
///
/// Either the old content remains or the new content is fully written.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data)?;
    fs::rename(&temp_path, path)
}
