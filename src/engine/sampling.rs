//! Random-selection primitives shared by the matchmaking selector, kept
//! standalone so determinism under a seeded RNG is easy to test.

use rand::Rng;

/// Cumulative-weight draw over `weights`. Returns `None` when the slice is
/// empty or no weight is positive; the caller falls back to uniform choice.
pub fn weighted_choice<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let mut remainder = rng.gen::<f64>() * total;
    let mut last_positive = 0;
    for (idx, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        last_positive = idx;
        remainder -= w;
        if remainder <= 0.0 {
            return Some(idx);
        }
    }

    // Floating accumulation can leave a sliver of remainder
    Some(last_positive)
}

/// Algorithm R reservoir sampling of `k` indices from `0..n`. Returns fewer
/// than `k` only when `n < k`; order within the sample is not meaningful.
pub fn reservoir_sample<R: Rng>(n: usize, k: usize, rng: &mut R) -> Vec<usize> {
    if k == 0 || n == 0 {
        return Vec::new();
    }

    let mut sample: Vec<usize> = (0..k.min(n)).collect();
    for idx in k..n {
        let slot = rng.gen_range(0..=idx);
        if slot < k {
            sample[slot] = idx;
        }
    }
    sample
}
