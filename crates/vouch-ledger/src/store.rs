//! Snapshot storage: one JSON file per snapshot type.
//!
//! Loads are fail-soft. A missing file reads as the default value; an
//! unreadable or malformed one is logged, moved aside to `<file>.corrupt`,
//! and also reads as the default. Saves write a temp file and rename it over
//! the snapshot so a crash mid-write leaves the previous copy intact.

use crate::error::{Error, Result};
use crate::models::{BotConfig, Ledger};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A value persisted as a whole-file snapshot.
pub trait Snapshot: Serialize + DeserializeOwned + Default {
    /// File name inside the data directory.
    const FILE_NAME: &'static str;
}

impl Snapshot for Ledger {
    const FILE_NAME: &'static str = "vouches.json";
}

impl Snapshot for BotConfig {
    const FILE_NAME: &'static str = "vouch_config.json";
}

/// How a fail-soft load went.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Snapshot read and parsed
    Loaded,
    /// No snapshot on disk yet
    Missing,
    /// Snapshot could not be used; the default was substituted
    Recovered(Error),
}

impl LoadOutcome {
    /// Whether the stored snapshot was actually used.
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

impl fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadOutcome::Loaded => write!(f, "loaded"),
            LoadOutcome::Missing => write!(f, "missing"),
            LoadOutcome::Recovered(e) => write!(f, "recovered from: {}", e),
        }
    }
}

/// JSON file store for a [`Snapshot`] type.
pub struct SnapshotStore<T> {
    path: PathBuf,
    _snapshot: PhantomData<fn() -> T>,
}

/// Store for the vouch ledger.
pub type LedgerStore = SnapshotStore<Ledger>;

/// Store for the bot configuration.
pub type ConfigStore = SnapshotStore<BotConfig>;

impl<T: Snapshot> SnapshotStore<T> {
    /// Open the snapshot inside `data_dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self::at(data_dir.as_ref().join(T::FILE_NAME)))
    }

    /// Use an explicit snapshot file path.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            _snapshot: PhantomData,
        }
    }

    /// Snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict load: `Ok(None)` if absent, an error if unreadable or malformed.
    pub fn try_load(&self) -> Result<Option<T>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Persistence(format!("{:?}: {}", self.path, e))),
        };
        let value = serde_json::from_slice(&data)
            .map_err(|e| Error::Persistence(format!("{:?}: {}", self.path, e)))?;
        Ok(Some(value))
    }

    /// Fail-soft load, reporting what happened.
    pub fn load_outcome(&self) -> (T, LoadOutcome) {
        match self.try_load() {
            Ok(Some(value)) => (value, LoadOutcome::Loaded),
            Ok(None) => (T::default(), LoadOutcome::Missing),
            Err(e) => {
                tracing::warn!("Unusable snapshot, starting empty: {}", e);
                if self.path.is_file() {
                    self.quarantine();
                }
                (T::default(), LoadOutcome::Recovered(e))
            }
        }
    }

    /// Fail-soft load.
    pub fn load(&self) -> T {
        self.load_outcome().0
    }

    /// Overwrite the snapshot.
    pub fn save(&self, value: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(value)?;
        let tmp_path = self.sibling("tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn quarantine(&self) {
        // Never overwrite a copy set aside earlier
        let mut corrupt = self.sibling("corrupt");
        let mut n = 1u32;
        while corrupt.exists() {
            corrupt = self.sibling(&format!("corrupt.{}", n));
            n += 1;
        }
        match fs::rename(&self.path, &corrupt) {
            Ok(()) => tracing::warn!("Moved unreadable snapshot to {:?}", corrupt),
            Err(e) => tracing::error!("Failed to move aside {:?}: {}", self.path, e),
        }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }
}
