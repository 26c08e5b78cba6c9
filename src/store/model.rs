use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RATING, STORE_VERSION};
use crate::engine::config::EngineSettings;
use crate::engine::types::MatchOutcome;
use crate::store::cohort::CohortDefinition;

/// One item's skill state inside a cohort. Invariant: `wins <= matches`;
/// draws count toward neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub rating: f64,
    pub matches: u32,
    pub wins: u32,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING,
            matches: 0,
            wins: 0,
        }
    }
}

/// Item id -> record. Cohorts are fully independent rating universes.
pub type CohortData = HashMap<String, PlayerRecord>;

/// The root persisted aggregate, exclusively owned by `RatingStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EloStore {
    pub version: u32,
    pub cohorts: HashMap<String, CohortData>,
    pub cohort_defs: HashMap<String, CohortDefinition>,
    pub last_used_cohort_key: Option<String>,
}

impl Default for EloStore {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            cohorts: HashMap::new(),
            cohort_defs: HashMap::new(),
            last_used_cohort_key: None,
        }
    }
}

/// Pre-match copy of one player, captured by value so reverting restores the
/// exact bytes no matter how nonlinear the K schedule was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub rating: f64,
    pub matches: u32,
    pub wins: u32,
}

impl PlayerSnapshot {
    pub fn capture(id: &str, record: &PlayerRecord) -> Self {
        Self {
            id: id.to_string(),
            rating: record.rating,
            matches: record.matches,
            wins: record.wins,
        }
    }
}

/// Everything needed to reverse one `apply_match`, held in a per-session
/// LIFO stack. Popping a frame discards it permanently; there is no redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoFrame {
    pub cohort_key: String,
    pub snapshot_a: PlayerSnapshot,
    pub snapshot_b: PlayerSnapshot,
    pub outcome: MatchOutcome,
    pub timestamp: DateTime<Utc>,
}

/// The versioned snapshot envelope handed to durable storage. Field names are
/// a compatibility surface for existing saved data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub settings: EngineSettings,
    pub store: EloStore,
}
