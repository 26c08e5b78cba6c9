use serde::{Deserialize, Serialize};

/// Result of one human judgment between two items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOutcome {
    FirstWins,
    SecondWins,
    Draw,
}

/// Live rating state the selector reads for one candidate. The store owns the
/// authoritative records; callers build this view per selection round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateStats {
    pub rating: f64,
    pub matches: u32,
}

/// One entry of the candidate list handed to the selector: a stable item id
/// plus its live stats.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub stats: CandidateStats,
}

impl Candidate {
    pub fn new(id: impl Into<String>, rating: f64, matches: u32) -> Self {
        Self {
            id: id.into(),
            stats: CandidateStats { rating, matches },
        }
    }
}

/// A chosen pair, already coin-flipped into presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairSelection {
    pub first: String,
    pub second: String,
    /// Order-independent signature for repeat-avoidance bookkeeping
    pub signature: String,
}

/// Order-independent signature of an unordered pair.
pub fn pair_signature(id_a: &str, id_b: &str) -> String {
    if id_a < id_b {
        format!("{}|{}", id_a, id_b)
    } else {
        format!("{}|{}", id_b, id_a)
    }
}
