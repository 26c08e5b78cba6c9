pub mod cohort;
pub mod model;
pub mod operations;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::constants::SNAPSHOT_VERSION;
use crate::engine::config::EngineSettings;
use crate::store::model::{EloStore, PersistedState};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

/// Owns the durable model and funnels every rating mutation through
/// `apply_match`/`revert`. Single-writer: callers serialize access per cohort.
#[derive(Debug, Clone)]
pub struct RatingStore {
    settings: EngineSettings,
    store: EloStore,
}

impl RatingStore {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            store: EloStore::default(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    pub(crate) fn store(&self) -> &EloStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut EloStore {
        &mut self.store
    }

    /// Immutable deep copy of the persisted envelope for the write path.
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            version: SNAPSHOT_VERSION,
            settings: self.settings.clone(),
            store: self.store.clone(),
        }
    }

    pub fn from_persisted(persisted: PersistedState) -> Self {
        Self {
            settings: persisted.settings,
            store: persisted.store,
        }
    }

    /// Rebuild from snapshot bytes. Missing or malformed bytes fall back to
    /// an empty store so a corrupt save never blocks a session; the caller is
    /// expected to persist a fresh baseline right away.
    pub fn from_snapshot(bytes: Option<&[u8]>, fallback_settings: EngineSettings) -> Self {
        match bytes {
            Some(raw) => match Self::deserialize::<PersistedState>(raw) {
                Ok(persisted) => Self::from_persisted(persisted),
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed snapshot, starting from an empty store");
                    Self::new(fallback_settings)
                }
            },
            None => Self::new(fallback_settings),
        }
    }

    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, StoreError> {
        Self::serialize(&self.to_persisted())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
