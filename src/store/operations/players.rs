use std::collections::HashSet;

use crate::engine::types::CandidateStats;
use crate::store::model::{CohortData, PlayerRecord};
use crate::store::RatingStore;

impl RatingStore {
    /// Existing record, or a fresh default created in place. Idempotent.
    pub fn ensure_player(&mut self, cohort_key: &str, item_id: &str) -> &mut PlayerRecord {
        let initial_rating = self.settings().elo.initial_rating;
        self.store_mut()
            .cohorts
            .entry(cohort_key.to_string())
            .or_default()
            .entry(item_id.to_string())
            .or_insert_with(|| PlayerRecord {
                rating: initial_rating,
                ..PlayerRecord::default()
            })
    }

    pub fn player(&self, cohort_key: &str, item_id: &str) -> Option<&PlayerRecord> {
        self.store().cohorts.get(cohort_key)?.get(item_id)
    }

    pub fn cohort(&self, cohort_key: &str) -> Option<&CohortData> {
        self.store().cohorts.get(cohort_key)
    }

    /// Stats view for matchmaking. Unknown items read as unrated defaults
    /// without creating a record.
    pub fn candidate_stats(&self, cohort_key: &str, item_id: &str) -> CandidateStats {
        match self.player(cohort_key, item_id) {
            Some(record) => CandidateStats {
                rating: record.rating,
                matches: record.matches,
            },
            None => CandidateStats {
                rating: self.settings().elo.initial_rating,
                matches: 0,
            },
        }
    }

    /// Membership reconciliation primitive: drop records whose item no longer
    /// resolves into the cohort. Invoked by the host, never automatically.
    /// Returns the number of removed records; 0 for an unknown cohort.
    pub fn retain_players(&mut self, cohort_key: &str, keep: &HashSet<String>) -> usize {
        let Some(cohort) = self.store_mut().cohorts.get_mut(cohort_key) else {
            return 0;
        };
        let before = cohort.len();
        cohort.retain(|id, _| keep.contains(id));
        before - cohort.len()
    }
}
