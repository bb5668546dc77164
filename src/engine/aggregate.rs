//! Score aggregation.
//!
//! ```text
//! {name -> score} + {name -> weight}
//!        │
//!        ├─ weighted mean, clamp [0,1]   -> confidence
//!        └─ Transfer::apply(confidence)  -> enhancement factor (>= 1.0)
//! ```
//!
//! Weights missing from the map, or not finite and positive, count as 1.0.

use super::config::Transfer;
use super::runner::CategoryScore;
use crate::clamp_score;
use std::collections::BTreeMap;

/// Aggregate of one engine's category scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub confidence: f64,
    pub enhancement_factor: f64,
}

impl Aggregate {
    /// No signal: confidence 0.0, factor 1.0.
    pub const NEUTRAL: Aggregate = Aggregate { confidence: 0.0, enhancement_factor: 1.0 };
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator {
    transfer: Transfer,
}

impl ScoreAggregator {
    pub fn new(transfer: Transfer) -> Self {
        ScoreAggregator { transfer }
    }

    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    pub fn aggregate(&self, scores: &BTreeMap<String, CategoryScore>, weights: &BTreeMap<String, f64>) -> Aggregate {
        if scores.is_empty() {
            return Aggregate::NEUTRAL;
        }
        let confidence = weighted_mean(scores, weights);
        Aggregate { confidence, enhancement_factor: self.transfer.apply(confidence) }
    }
}

fn weighted_mean(scores: &BTreeMap<String, CategoryScore>, weights: &BTreeMap<String, f64>) -> f64 {
    let weighted: Vec<(f64, f64)> = scores
        .iter()
        .map(|(name, score)| {
            let weight = weights.get(name).copied().filter(|w| w.is_finite() && *w > 0.0).unwrap_or(1.0);
            (weight, clamp_score(score.score, 0.0, 1.0))
        })
        .collect();

    // Weights are scaled by the largest one so the sums cannot overflow.
    let max_weight = weighted.iter().map(|(w, _)| *w).fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return 0.0;
    }
    let (weighted_sum, weight_total) = weighted
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sum, total), &(w, score)| (sum + w / max_weight * score, total + w / max_weight));
    clamp_score(weighted_sum / weight_total, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entries: &[(&str, f64)]) -> BTreeMap<String, CategoryScore> {
        entries
            .iter()
            .map(|(name, score)| {
                (name.to_string(), CategoryScore { category: name.to_string(), score: *score, failure: None })
            })
            .collect()
    }

    fn weights(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(name, w)| (name.to_string(), *w)).collect()
    }

    #[test]
    fn empty_scores_are_neutral() {
        let agg = ScoreAggregator::new(Transfer::linear(3.0, 10.0));
        assert_eq!(agg.aggregate(&BTreeMap::new(), &BTreeMap::new()), Aggregate::NEUTRAL);
        assert_eq!(Aggregate::NEUTRAL.confidence, 0.0);
        assert_eq!(Aggregate::NEUTRAL.enhancement_factor, 1.0);
    }

    #[test]
    fn constant_scores_give_that_constant_for_any_weights() {
        let agg = ScoreAggregator::new(Transfer::default());
        for common in [0.0, 0.3, 0.77, 1.0] {
            let s = scores(&[("a", common), ("b", common), ("c", common)]);
            let cases = [
                weights(&[]),
                weights(&[("a", 5.0), ("b", 0.1)]),
                weights(&[("a", 1e6), ("c", 2.0)]),
                weights(&[("a", 1e308), ("b", 1e308), ("c", 1e308)]),
                weights(&[("a", f64::MAX), ("b", 1e-300)]),
            ];
            for w in cases {
                let out = agg.aggregate(&s, &w);
                assert!((out.confidence - common).abs() < 1e-12, "{common} vs {}", out.confidence);
            }
        }
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let agg = ScoreAggregator::new(Transfer::default());
        let s = scores(&[("a", 1.0), ("b", 0.0)]);
        let out = agg.aggregate(&s, &weights(&[("a", 1e308), ("b", 1e308)]));
        assert!((out.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn weights_shift_the_mean() {
        let agg = ScoreAggregator::new(Transfer::default());
        let s = scores(&[("a", 1.0), ("b", 0.0)]);
        let out = agg.aggregate(&s, &weights(&[("a", 3.0)]));
        assert!((out.confidence - 0.75).abs() < 1e-12);
    }

    #[test]
    fn invalid_weights_fall_back_to_one() {
        let agg = ScoreAggregator::new(Transfer::default());
        let s = scores(&[("a", 1.0), ("b", 0.0)]);
        let out = agg.aggregate(&s, &weights(&[("a", f64::NAN), ("b", -2.0)]));
        assert!((out.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn factor_follows_transfer_and_ceiling() {
        let agg = ScoreAggregator::new(Transfer::linear(4.0, 3.0));
        let half = agg.aggregate(&scores(&[("a", 0.25)]), &BTreeMap::new());
        assert!((half.enhancement_factor - 2.0).abs() < 1e-12);

        let capped = agg.aggregate(&scores(&[("a", 1.0)]), &BTreeMap::new());
        assert_eq!(capped.enhancement_factor, 3.0);
    }
}
