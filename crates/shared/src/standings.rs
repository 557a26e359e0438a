use std::cmp::Ordering;

use crate::domain::{ProbabilityMap, RankedEntry, Winner};

/// Equal maxima resolve to the lexicographically smallest name.
pub fn derive_winner(probabilities: &ProbabilityMap) -> Winner {
    probabilities
        .iter()
        .filter(|(_, probability)| !probability.is_nan())
        .max_by(|(name_a, prob_a), (name_b, prob_b)| {
            prob_a
                .partial_cmp(prob_b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| name_b.cmp(name_a))
        })
        .map(|(name, _)| Winner::Driver(name.clone()))
        .unwrap_or(Winner::Unknown)
}

pub fn rank(probabilities: &ProbabilityMap) -> Vec<RankedEntry> {
    let mut entries: Vec<(&String, f64)> = probabilities
        .iter()
        .map(|(name, probability)| (name, *probability))
        .filter(|(_, probability)| *probability > 0.0)
        .collect();

    entries.sort_by(|(name_a, prob_a), (name_b, prob_b)| {
        prob_b
            .total_cmp(prob_a)
            .then_with(|| name_a.cmp(name_b))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (driver, probability))| RankedEntry {
            driver: driver.clone(),
            probability,
            rank: index + 1,
        })
        .collect()
}
