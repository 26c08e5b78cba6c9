//! Elo update rule with convergence heuristics: provisional amplification,
//! match-count decay, and upset / draw-gap boosts.

use crate::engine::config::HeuristicsConfig;
use crate::engine::types::MatchOutcome;

/// Expected score for A against B, the standard logistic expectation.
///
/// `expected_score(a, b) + expected_score(b, a) == 1` within floating
/// tolerance.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((rating_b - rating_a) / 400.0))
}

/// Per-player K under heuristics, from the pre-match match count.
///
/// Provisional and decay are phase-based and mutually exclusive: while the
/// provisional window is active it takes precedence, decay applies after.
pub fn effective_k(base_k: f64, matches_played: u32, heuristics: &HeuristicsConfig) -> f64 {
    let provisional = &heuristics.provisional;
    if provisional.enabled && matches_played < provisional.matches {
        return base_k * provisional.multiplier;
    }

    let decay = &heuristics.decay;
    if decay.enabled {
        let decayed = base_k / (1.0 + matches_played as f64 / decay.half_life);
        return decayed.max(decay.min_k);
    }

    base_k
}

/// Apply one comparison outcome and return both new ratings.
///
/// Upset and draw-gap boosts multiply both sides' K identically, so any
/// zero-sum drift comes only from the players being in different
/// provisional/decay phases.
pub fn update_ratings(
    rating_a: f64,
    rating_b: f64,
    matches_a: u32,
    matches_b: u32,
    outcome: MatchOutcome,
    base_k: f64,
    heuristics: &HeuristicsConfig,
) -> (f64, f64) {
    let e_a = expected_score(rating_a, rating_b);
    let e_b = 1.0 - e_a;

    let score_a: f64 = match outcome {
        MatchOutcome::FirstWins => 1.0,
        MatchOutcome::SecondWins => 0.0,
        MatchOutcome::Draw => 0.5,
    };
    let score_b = 1.0 - score_a;

    let mut k_a = effective_k(base_k, matches_a, heuristics);
    let mut k_b = effective_k(base_k, matches_b, heuristics);

    let gap = (rating_a - rating_b).abs();
    let winner_was_underdog = match outcome {
        MatchOutcome::FirstWins => rating_a < rating_b,
        MatchOutcome::SecondWins => rating_b < rating_a,
        MatchOutcome::Draw => false,
    };

    let upset = &heuristics.upset_boost;
    let draw_gap = &heuristics.draw_gap_boost;
    if upset.enabled && winner_was_underdog && gap >= upset.threshold {
        k_a *= upset.multiplier;
        k_b *= upset.multiplier;
    } else if draw_gap.enabled && outcome == MatchOutcome::Draw && gap >= draw_gap.threshold {
        k_a *= draw_gap.multiplier;
        k_b *= draw_gap.multiplier;
    }

    (
        rating_a + k_a * (score_a - e_a),
        rating_b + k_b * (score_b - e_b),
    )
}
