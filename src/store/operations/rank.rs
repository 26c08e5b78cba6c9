use std::cmp::Ordering;
use std::collections::HashMap;

use crate::store::RatingStore;

impl RatingStore {
    /// Standard competition ranking ("1224"): equal ratings share a rank and
    /// the next distinct rating ranks one past the players strictly above it.
    /// Unknown cohorts rank as empty.
    pub fn compute_rank(&self, cohort_key: &str) -> HashMap<String, usize> {
        let Some(cohort) = self.cohort(cohort_key) else {
            return HashMap::new();
        };

        let mut entries: Vec<(&str, f64)> = cohort
            .iter()
            .map(|(id, record)| (id.as_str(), record.rating))
            .collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut ranks = HashMap::with_capacity(entries.len());
        let mut current_rank = 0;
        let mut previous_rating = None;
        for (position, (id, rating)) in entries.iter().enumerate() {
            if previous_rating != Some(*rating) {
                current_rank = position + 1;
                previous_rating = Some(*rating);
            }
            ranks.insert((*id).to_string(), current_rank);
        }
        ranks
    }
}
