//! Pair selection: a weighted anchor draw, an opponent draw over a bounded
//! random sample, and an anti-repeat guard against the previous pair.

use rand::Rng;

use crate::constants::{MAX_BIAS_EXPONENT, MAX_PAIR_RETRIES};
use crate::engine::config::MatchmakingConfig;
use crate::engine::sampling::{reservoir_sample, weighted_choice};
use crate::engine::types::{pair_signature, Candidate, PairSelection};

fn signature_members(signature: &str) -> Option<(&str, &str)> {
    signature.split_once('|')
}

/// Pick the anchor of the next pair.
///
/// With at least 3 candidates the two members of the previous pair are taken
/// out of the pool. When the low-matches bias is on, pool entries are weighted
/// by `1 / (1 + matches)^exponent` so rarely-seen items surface sooner.
pub fn pick_anchor_index<R: Rng>(
    candidates: &[Candidate],
    config: &MatchmakingConfig,
    last_pair_signature: Option<&str>,
    rng: &mut R,
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }

    let excluded = match (last_pair_signature, candidates.len() >= 3) {
        (Some(sig), true) => signature_members(sig),
        _ => None,
    };
    let pool: Vec<usize> = (0..candidates.len())
        .filter(|&i| match excluded {
            Some((a, b)) => candidates[i].id != a && candidates[i].id != b,
            None => true,
        })
        .collect();
    if pool.is_empty() {
        return None;
    }

    if !config.enabled || !config.low_matches_bias.enabled {
        return Some(pool[rng.gen_range(0..pool.len())]);
    }

    let exponent = config
        .low_matches_bias
        .exponent
        .clamp(0.0, MAX_BIAS_EXPONENT);
    let weights: Vec<f64> = pool
        .iter()
        .map(|&i| 1.0 / (1.0 + candidates[i].stats.matches as f64).powf(exponent))
        .collect();

    match weighted_choice(&weights, rng) {
        Some(w) => Some(pool[w]),
        None => Some(pool[rng.gen_range(0..pool.len())]),
    }
}

/// Pick an opponent for `anchor` from a bounded random sample of the rest.
///
/// An upset probe occasionally feeds the anchor a far-away opponent; the
/// similarity branch otherwise prefers the closest rating, breaking ties
/// toward the less-seen item.
pub fn pick_opponent_index<R: Rng>(
    candidates: &[Candidate],
    anchor: usize,
    config: &MatchmakingConfig,
    rng: &mut R,
) -> Option<usize> {
    let pool: Vec<usize> = (0..candidates.len()).filter(|&i| i != anchor).collect();
    if pool.is_empty() {
        return None;
    }

    if !config.enabled {
        return Some(pool[rng.gen_range(0..pool.len())]);
    }

    let similar = &config.similar_ratings;
    let min_size = if similar.enabled { 2 } else { 1 };
    let size = similar.sample_size.max(min_size).min(pool.len());
    let sample: Vec<usize> = reservoir_sample(pool.len(), size, rng)
        .into_iter()
        .map(|pos| pool[pos])
        .collect();

    let anchor_rating = candidates[anchor].stats.rating;

    let probes = &config.upset_probes;
    if probes.enabled && rng.gen::<f64>() < probes.probability {
        let probe = sample
            .iter()
            .copied()
            .filter(|&i| (candidates[i].stats.rating - anchor_rating).abs() >= probes.min_gap)
            .max_by(|&a, &b| {
                let gap_a = (candidates[a].stats.rating - anchor_rating).abs();
                let gap_b = (candidates[b].stats.rating - anchor_rating).abs();
                gap_a.partial_cmp(&gap_b).unwrap_or(std::cmp::Ordering::Equal)
            });
        if probe.is_some() {
            return probe;
        }
    }

    if similar.enabled {
        return sample.iter().copied().min_by(|&a, &b| {
            let key_a = (
                (candidates[a].stats.rating - anchor_rating).abs(),
                candidates[a].stats.matches,
            );
            let key_b = (
                (candidates[b].stats.rating - anchor_rating).abs(),
                candidates[b].stats.matches,
            );
            key_a
                .partial_cmp(&key_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    Some(sample[rng.gen_range(0..sample.len())])
}

/// Select the next pair to present.
///
/// Fewer than 2 candidates yields no pair. Exactly 2 returns them in list
/// order without consuming randomness. Otherwise anchor and opponent are
/// drawn, retrying the opponent a bounded number of times when the draw would
/// repeat the previous pair, then accepting whatever came last.
pub fn pick_next_pair<R: Rng>(
    candidates: &[Candidate],
    config: &MatchmakingConfig,
    last_pair_signature: Option<&str>,
    rng: &mut R,
) -> Option<PairSelection> {
    match candidates.len() {
        0 | 1 => None,
        2 => Some(PairSelection {
            first: candidates[0].id.clone(),
            second: candidates[1].id.clone(),
            signature: pair_signature(&candidates[0].id, &candidates[1].id),
        }),
        _ => {
            let anchor = pick_anchor_index(candidates, config, last_pair_signature, rng)?;
            let mut opponent = pick_opponent_index(candidates, anchor, config, rng)?;

            if let Some(last) = last_pair_signature {
                let mut attempts = 0;
                while attempts < MAX_PAIR_RETRIES
                    && pair_signature(&candidates[anchor].id, &candidates[opponent].id) == last
                {
                    opponent = pick_opponent_index(candidates, anchor, config, rng)?;
                    attempts += 1;
                }
            }

            let (first, second) = if rng.gen::<f64>() < 0.5 {
                (anchor, opponent)
            } else {
                (opponent, anchor)
            };

            Some(PairSelection {
                first: candidates[first].id.clone(),
                second: candidates[second].id.clone(),
                signature: pair_signature(&candidates[anchor].id, &candidates[opponent].id),
            })
        }
    }
}
