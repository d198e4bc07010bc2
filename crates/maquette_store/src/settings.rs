//! # Settings Singleton
//!
//! The settings record lives in a single file at the application data
//! root, outside the `Scenes` namespace. It is the one place where a
//! load failure is deliberately absorbed: a missing or corrupt settings
//! file falls back to the defaults instead of failing the session.

use std::path::Path;

use maquette_shared::{SettingsRecord, RECORD_EXT, SETTINGS_NAME};

use crate::error::{StoreError, StoreResult};
use crate::store::RecordStore;

/// Store wrapper for the settings singleton.
pub struct SettingsStore {
    store: RecordStore<SettingsRecord>,
}

impl SettingsStore {
    /// Opens the settings store for an application data root.
    #[must_use]
    pub fn at_data_root(data_root: impl AsRef<Path>) -> Self {
        Self {
            store: RecordStore::new(data_root.as_ref().to_path_buf(), RECORD_EXT),
        }
    }

    /// Loads the settings singleton.
    ///
    /// A missing or corrupt record substitutes [`SettingsRecord::default`];
    /// every other failure propagates.
    pub fn load_or_default(&self) -> StoreResult<SettingsRecord> {
        match self.store.load(SETTINGS_NAME) {
            Ok(settings) => Ok(settings),
            Err(StoreError::NotFound(_)) => {
                tracing::warn!("settings file missing, using defaults");
                Ok(SettingsRecord::default())
            }
            Err(StoreError::Corrupt { .. }) => {
                tracing::warn!("settings file corrupt, using defaults");
                Ok(SettingsRecord::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Saves the settings singleton, overwriting unconditionally.
    pub fn save(&self, settings: &SettingsRecord) -> StoreResult<()> {
        self.store.save(SETTINGS_NAME, settings)
    }
}
