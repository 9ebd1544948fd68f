//! Serialized access to the ledger and bot config snapshots.
//!
//! The snapshot is the unit of truth, so every load-mutate-save cycle runs
//! under one lock for the whole ledger. Two events racing on the same user
//! (or on different users) can never lose each other's update.

use crate::error::Result;
use std::path::Path;
use tokio::sync::Mutex;
use vouch_ledger::{BotConfig, ConfigStore, Ledger, LedgerStore, LoadOutcome};

/// Owns the snapshot stores and serializes access to them.
pub struct LedgerService {
    ledger: Mutex<LedgerStore>,
    config: Mutex<ConfigStore>,
}

impl LedgerService {
    /// Open both snapshots inside `data_dir`.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let ledger = LedgerStore::open(&data_dir)?;
        let config = ConfigStore::open(&data_dir)?;
        tracing::info!("Ledger snapshot: {:?}", ledger.path());
        Ok(Self {
            ledger: Mutex::new(ledger),
            config: Mutex::new(config),
        })
    }

    /// Run one load-mutate-save cycle.
    ///
    /// When `apply` fails nothing is saved. A failed save is logged and the
    /// result is still returned: the vouch has been acknowledged and the next
    /// cycle will try to persist again from whatever is on disk.
    pub async fn update<R, F>(&self, apply: F) -> Result<R>
    where
        F: FnOnce(&mut Ledger) -> vouch_ledger::Result<R>,
    {
        let store = self.ledger.lock().await;
        let mut ledger = load_logged(&store);
        let result = apply(&mut ledger)?;
        if let Err(e) = store.save(&ledger) {
            tracing::error!("Failed to save ledger snapshot: {}", e);
        }
        Ok(result)
    }

    /// Read the current ledger without mutating it.
    pub async fn read<R, F>(&self, view: F) -> R
    where
        F: FnOnce(&Ledger) -> R,
    {
        let store = self.ledger.lock().await;
        view(&load_logged(&store))
    }

    /// Current bot configuration.
    pub async fn config(&self) -> BotConfig {
        let store = self.config.lock().await;
        load_logged(&store)
    }

    /// Change the bot configuration.
    pub async fn update_config<F>(&self, apply: F) -> Result<BotConfig>
    where
        F: FnOnce(&mut BotConfig),
    {
        let store = self.config.lock().await;
        let mut config = load_logged(&store);
        apply(&mut config);
        store.save(&config)?;
        Ok(config)
    }
}

fn load_logged<T: vouch_ledger::Snapshot>(store: &vouch_ledger::SnapshotStore<T>) -> T {
    let (value, outcome) = store.load_outcome();
    match &outcome {
        LoadOutcome::Loaded => {}
        LoadOutcome::Missing => tracing::debug!("No snapshot at {:?} yet", store.path()),
        LoadOutcome::Recovered(e) => {
            tracing::warn!("Snapshot {:?} unusable ({}), using empty state", store.path(), e)
        }
    }
    value
}
