use chrono::Utc;

use crate::engine::elo;
use crate::engine::types::MatchOutcome;
use crate::store::model::{PlayerSnapshot, UndoFrame};
use crate::store::RatingStore;

/// What `apply_match` hands back: the winner (absent on draws) and the frame
/// that reverses the whole mutation.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub winner_id: Option<String>,
    pub frame: UndoFrame,
}

impl RatingStore {
    /// The single mutation entry point: snapshot both players, run the rating
    /// update from pre-match state, then write ratings and counters back.
    pub fn apply_match(
        &mut self,
        cohort_key: &str,
        id_a: &str,
        id_b: &str,
        outcome: MatchOutcome,
    ) -> MatchReport {
        let snapshot_a = PlayerSnapshot::capture(id_a, self.ensure_player(cohort_key, id_a));
        let snapshot_b = PlayerSnapshot::capture(id_b, self.ensure_player(cohort_key, id_b));

        let base_k = self.settings().elo.base_k;
        let heuristics = self.settings().heuristics.clone();
        let (new_a, new_b) = elo::update_ratings(
            snapshot_a.rating,
            snapshot_b.rating,
            snapshot_a.matches,
            snapshot_b.matches,
            outcome,
            base_k,
            &heuristics,
        );

        let winner_id = match outcome {
            MatchOutcome::FirstWins => Some(id_a.to_string()),
            MatchOutcome::SecondWins => Some(id_b.to_string()),
            MatchOutcome::Draw => None,
        };

        {
            let record_a = self.ensure_player(cohort_key, id_a);
            record_a.rating = new_a;
            record_a.matches += 1;
            if outcome == MatchOutcome::FirstWins {
                record_a.wins += 1;
            }
        }
        {
            let record_b = self.ensure_player(cohort_key, id_b);
            record_b.rating = new_b;
            record_b.matches += 1;
            if outcome == MatchOutcome::SecondWins {
                record_b.wins += 1;
            }
        }

        tracing::debug!(
            cohort = cohort_key,
            a = id_a,
            b = id_b,
            outcome = ?outcome,
            rating_a = new_a,
            rating_b = new_b,
            "Applied match"
        );

        MatchReport {
            winner_id,
            frame: UndoFrame {
                cohort_key: cohort_key.to_string(),
                snapshot_a,
                snapshot_b,
                outcome,
                timestamp: Utc::now(),
            },
        }
    }

    /// Restore both players to the frame's captured values. Returns false
    /// without touching anything when the cohort or either record is gone.
    pub fn revert(&mut self, frame: &UndoFrame) -> bool {
        let Some(cohort) = self.store_mut().cohorts.get_mut(&frame.cohort_key) else {
            return false;
        };
        if !cohort.contains_key(&frame.snapshot_a.id) || !cohort.contains_key(&frame.snapshot_b.id)
        {
            return false;
        }

        for snapshot in [&frame.snapshot_a, &frame.snapshot_b] {
            if let Some(record) = cohort.get_mut(&snapshot.id) {
                record.rating = snapshot.rating;
                record.matches = snapshot.matches;
                record.wins = snapshot.wins;
            }
        }
        true
    }
}
