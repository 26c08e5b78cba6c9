use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_K, DEFAULT_RATING, DEFAULT_SAMPLE_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EloConfig {
    pub base_k: f64,
    pub initial_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            base_k: DEFAULT_BASE_K,
            initial_rating: DEFAULT_RATING,
        }
    }
}

/// Amplified K during a player's earliest matches. Mutually exclusive with
/// decay: while the provisional window is active, decay is not consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionalConfig {
    pub enabled: bool,
    pub matches: u32,
    /// Multiplier applied to the base K, >= 1.0
    pub multiplier: f64,
}

impl Default for ProvisionalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            matches: 10,
            multiplier: 2.0,
        }
    }
}

/// K shrinks as a player accumulates matches: `baseK / (1 + matches/halfLife)`,
/// clamped to not fall below `minK`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayConfig {
    pub enabled: bool,
    pub half_life: f64,
    pub min_k: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            half_life: 200.0,
            min_k: 8.0,
        }
    }
}

/// Extra weight when the lower-rated side wins across a large gap. Applied to
/// both players' K identically, so the update stays zero-sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsetBoostConfig {
    pub enabled: bool,
    pub threshold: f64,
    pub multiplier: f64,
}

impl Default for UpsetBoostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 150.0,
            multiplier: 1.5,
        }
    }
}

/// Extra weight when a draw lands across a large gap; an `else if` alternative
/// to the upset boost, never combined with it in one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawGapBoostConfig {
    pub enabled: bool,
    pub threshold: f64,
    pub multiplier: f64,
}

impl Default for DrawGapBoostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 200.0,
            multiplier: 1.25,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicsConfig {
    #[serde(default)]
    pub provisional: ProvisionalConfig,
    #[serde(default)]
    pub decay: DecayConfig,
    #[serde(default)]
    pub upset_boost: UpsetBoostConfig,
    #[serde(default)]
    pub draw_gap_boost: DrawGapBoostConfig,
}

impl HeuristicsConfig {
    /// Plain Elo: every heuristic switched off.
    pub fn disabled() -> Self {
        Self {
            provisional: ProvisionalConfig {
                enabled: false,
                ..ProvisionalConfig::default()
            },
            decay: DecayConfig {
                enabled: false,
                ..DecayConfig::default()
            },
            upset_boost: UpsetBoostConfig {
                enabled: false,
                ..UpsetBoostConfig::default()
            },
            draw_gap_boost: DrawGapBoostConfig {
                enabled: false,
                ..DrawGapBoostConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowMatchesBiasConfig {
    pub enabled: bool,
    /// Anchor weight is `1 / (1 + matches)^exponent`; clamped to [0, 3] at use
    pub exponent: f64,
}

impl Default for LowMatchesBiasConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exponent: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarRatingsConfig {
    pub enabled: bool,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

impl Default for SimilarRatingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsetProbesConfig {
    pub enabled: bool,
    pub probability: f64,
    pub min_gap: f64,
}

impl Default for UpsetProbesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probability: 0.15,
            min_gap: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchmakingConfig {
    pub enabled: bool,
    #[serde(default)]
    pub low_matches_bias: LowMatchesBiasConfig,
    #[serde(default)]
    pub similar_ratings: SimilarRatingsConfig,
    #[serde(default)]
    pub upset_probes: UpsetProbesConfig,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            low_matches_bias: LowMatchesBiasConfig::default(),
            similar_ratings: SimilarRatingsConfig::default(),
            upset_probes: UpsetProbesConfig::default(),
        }
    }
}

/// The settings blob persisted alongside the store in the snapshot envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default)]
    pub elo: EloConfig,
    #[serde(default)]
    pub heuristics: HeuristicsConfig,
    #[serde(default)]
    pub matchmaking: MatchmakingConfig,
}

impl EngineSettings {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.elo.base_k.is_finite() && self.elo.base_k > 0.0) {
            return Err("elo.baseK must be positive".to_string());
        }
        if !self.elo.initial_rating.is_finite() {
            return Err("elo.initialRating must be finite".to_string());
        }
        if self.heuristics.provisional.multiplier < 1.0 {
            return Err("heuristics.provisional.multiplier must be >= 1.0".to_string());
        }
        if self.heuristics.decay.half_life <= 0.0 {
            return Err("heuristics.decay.halfLife must be positive".to_string());
        }
        if self.heuristics.decay.min_k < 0.0 {
            return Err("heuristics.decay.minK must be non-negative".to_string());
        }
        if self.heuristics.upset_boost.multiplier <= 0.0
            || self.heuristics.draw_gap_boost.multiplier <= 0.0
        {
            return Err("heuristics boost multipliers must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.matchmaking.upset_probes.probability) {
            return Err("matchmaking.upsetProbes.probability must be in [0, 1]".to_string());
        }
        if self.matchmaking.similar_ratings.sample_size == 0 {
            return Err("matchmaking.similarRatings.sampleSize must be >= 1".to_string());
        }
        Ok(())
    }
}
