use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::config::Config;
use crate::engine::config::EngineSettings;
use crate::engine::matchmaking;
use crate::engine::types::{Candidate, MatchOutcome, PairSelection};
use crate::persist::storage::SnapshotStorage;
use crate::persist::PersistenceGateway;
use crate::store::cohort::CohortDefinition;
use crate::store::model::{PersistedState, UndoFrame};
use crate::store::operations::matches::MatchReport;
use crate::store::{RatingStore, StoreError};

/// Root object of one rating session. Owns the store, the persistence
/// gateway, the LIFO undo stack, and the RNG; there is no shared global
/// state. All mutation goes through `&mut self`, which is the single-writer
/// contract the store relies on.
pub struct Session {
    id: Uuid,
    store: RatingStore,
    gateway: PersistenceGateway,
    undo_stack: Vec<UndoFrame>,
    /// Last presented pair signature per cohort, for repeat avoidance
    last_pair: HashMap<String, String>,
    rng: StdRng,
}

impl Session {
    /// Load the snapshot (or start empty when it is missing or malformed) and
    /// spawn the persistence writer. Must run inside a tokio runtime.
    pub fn open(config: &Config, storage: Arc<dyn SnapshotStorage>) -> Self {
        let loaded = match storage.load_snapshot() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot load failed, starting from an empty store");
                None
            }
        };
        let parsed = loaded.as_deref().and_then(|raw| {
            RatingStore::deserialize::<PersistedState>(raw)
                .map_err(|e| {
                    tracing::warn!(error = %e, "Malformed snapshot, starting from an empty store");
                    e
                })
                .ok()
        });
        let needs_baseline = parsed.is_none();
        let store = match parsed {
            Some(persisted) => RatingStore::from_persisted(persisted),
            None => RatingStore::new(EngineSettings::default()),
        };

        let gateway = PersistenceGateway::spawn(
            storage,
            Duration::from_millis(config.save_debounce_ms),
        );
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let session = Self {
            id: Uuid::new_v4(),
            store,
            gateway,
            undo_stack: Vec::new(),
            last_pair: HashMap::new(),
            rng,
        };
        tracing::info!(session = %session.id, baseline = needs_baseline, "Session opened");
        if needs_baseline {
            session.schedule_save();
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        self.store.settings()
    }

    pub fn update_settings(&mut self, settings: EngineSettings) -> Result<(), StoreError> {
        settings.validate().map_err(StoreError::Validation)?;
        self.store.set_settings(settings);
        self.schedule_save();
        Ok(())
    }

    /// Choose the next pair to present from the cohort's current members
    /// (resolved by the host, never cached here).
    pub fn next_pair(&mut self, cohort_key: &str, member_ids: &[String]) -> Option<PairSelection> {
        let candidates: Vec<Candidate> = member_ids
            .iter()
            .map(|id| Candidate {
                id: id.clone(),
                stats: self.store.candidate_stats(cohort_key, id),
            })
            .collect();

        let last = self.last_pair.get(cohort_key).cloned();
        let config = self.store.settings().matchmaking.clone();
        let pair = matchmaking::pick_next_pair(&candidates, &config, last.as_deref(), &mut self.rng)?;

        self.last_pair
            .insert(cohort_key.to_string(), pair.signature.clone());
        if self.store.last_used_cohort_key() != Some(cohort_key) {
            self.store.set_last_used_cohort_key(Some(cohort_key));
            self.schedule_save();
        }
        Some(pair)
    }

    /// Record one human judgment: apply the match, remember its undo frame,
    /// and schedule a save.
    pub fn record_judgment(
        &mut self,
        cohort_key: &str,
        id_a: &str,
        id_b: &str,
        outcome: MatchOutcome,
    ) -> MatchReport {
        let report = self.store.apply_match(cohort_key, id_a, id_b, outcome);
        self.undo_stack.push(report.frame.clone());
        self.schedule_save();
        report
    }

    /// Reverse the most recent judgment. The popped frame is gone either way
    /// (no redo); false when the stack is empty or the records have since
    /// been removed.
    pub fn undo_last(&mut self) -> bool {
        let Some(frame) = self.undo_stack.pop() else {
            return false;
        };
        if !self.store.revert(&frame) {
            tracing::warn!(
                cohort = %frame.cohort_key,
                "Undo target no longer present, frame dropped"
            );
            return false;
        }
        self.schedule_save();
        true
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn rank(&self, cohort_key: &str) -> HashMap<String, usize> {
        self.store.compute_rank(cohort_key)
    }

    pub fn upsert_cohort_def(&mut self, def: CohortDefinition) {
        self.store.upsert_cohort_def(def);
        self.schedule_save();
    }

    pub fn rename_cohort_key(&mut self, old_key: &str, new_def: CohortDefinition) {
        self.store.rename_cohort_key(old_key, new_def);
        self.schedule_save();
    }

    pub fn remove_cohort(&mut self, key: &str) -> bool {
        let removed = self.store.remove_cohort(key);
        if removed {
            self.schedule_save();
        }
        removed
    }

    /// Host-driven membership reconciliation; see `RatingStore::retain_players`.
    pub fn retain_players(&mut self, cohort_key: &str, keep: &HashSet<String>) -> usize {
        let removed = self.store.retain_players(cohort_key, keep);
        if removed > 0 {
            self.schedule_save();
        }
        removed
    }

    fn schedule_save(&self) {
        match self.store.snapshot_bytes() {
            Ok(bytes) => self.gateway.schedule_save(bytes),
            Err(e) => tracing::error!(error = %e, "Failed to serialize snapshot"),
        }
    }

    /// Write the current state now, bypassing the debounce window.
    pub async fn flush(&self) -> bool {
        match self.store.snapshot_bytes() {
            Ok(bytes) => self.gateway.flush_now(Some(bytes)).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize snapshot");
                false
            }
        }
    }

    /// Flush and tear down the persistence writer.
    pub async fn close(self) {
        let flushed = self.flush().await;
        tracing::info!(session = %self.id, flushed, "Session closing");
        self.gateway.shutdown().await;
    }
}
