//! Insight and pattern generation.
//!
//! Two outputs, both pure functions of the score map:
//!
//! - [`Insights`]: a lazy iterator of human-readable lines. One line per
//!   category scoring strictly above the insight threshold (in category-name
//!   order), then at most one aggregate line for the confidence band.
//! - [`PatternSet`]: named relationships between scores.
//!
//! | pattern                    | condition                                              |
//! |----------------------------|--------------------------------------------------------|
//! | `balanced`                 | >= 2 categories, all > 0, max - min < 0.2              |
//! | `dominance`                | >= 2 categories, exactly one score > 0.8               |
//! | `multi-category-emergence` | >= 3 categories above the pattern threshold            |
//! | `polarized`                | >= 2 categories, max - min >= 0.8                      |
//!
//! Nothing here feeds back into confidence or the enhancement factor.

use super::runner::CategoryScore;
use std::collections::{BTreeMap, BTreeSet, btree_map};

pub const HIGH_CONFIDENCE_BAND: f64 = 0.7;
pub const MEDIUM_CONFIDENCE_BAND: f64 = 0.4;

const BALANCED_SPREAD: f64 = 0.2;
const DOMINANCE_SCORE: f64 = 0.8;
const EMERGENCE_MIN_CATEGORIES: usize = 3;
const POLARIZED_SPREAD: f64 = 0.8;

bitflags::bitflags! {
    /// Patterns detected across one engine's category scores.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PatternSet: u8 {
        const BALANCED                 = 1 << 0;
        const DOMINANCE                = 1 << 1;
        const MULTI_CATEGORY_EMERGENCE = 1 << 2;
        const POLARIZED                = 1 << 3;
    }
}

const PATTERN_NAMES: [(PatternSet, &str); 4] = [
    (PatternSet::BALANCED, "balanced"),
    (PatternSet::DOMINANCE, "dominance"),
    (PatternSet::MULTI_CATEGORY_EMERGENCE, "multi-category-emergence"),
    (PatternSet::POLARIZED, "polarized"),
];

impl PatternSet {
    /// Stable names of the contained patterns.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        PATTERN_NAMES.into_iter().filter(move |(flag, _)| self.contains(*flag)).map(|(_, name)| name)
    }

    /// Inverse of [`PatternSet::names`]. Takes the kebab-case name, not the flag identifier.
    pub fn from_pattern_name(name: &str) -> Option<PatternSet> {
        PATTERN_NAMES.iter().find(|(_, n)| *n == name).map(|(flag, _)| *flag)
    }

    pub fn to_name_set(self) -> BTreeSet<String> {
        self.names().map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    High,
    Medium,
}

/// Lazy, finite insight sequence. Clone it to iterate again from the start.
#[derive(Debug, Clone)]
pub struct Insights<'a> {
    categories: btree_map::Iter<'a, String, CategoryScore>,
    threshold: f64,
    confidence: f64,
    band: Option<Band>,
}

impl Iterator for Insights<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for (name, score) in self.categories.by_ref() {
            if score.score > self.threshold {
                return Some(format!("Strong '{name}' alignment detected (score: {:.3})", score.score));
            }
        }
        match self.band.take()? {
            Band::High => {
                Some(format!("High aggregate confidence across categories (confidence: {:.3})", self.confidence))
            }
            Band::Medium => {
                Some(format!("Moderate aggregate confidence across categories (confidence: {:.3})", self.confidence))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InsightGenerator {
    min_insight_threshold: f64,
    min_pattern_threshold: f64,
}

impl InsightGenerator {
    pub fn new(min_insight_threshold: f64, min_pattern_threshold: f64) -> Self {
        InsightGenerator { min_insight_threshold, min_pattern_threshold }
    }

    pub fn generate<'a>(
        &self,
        scores: &'a BTreeMap<String, CategoryScore>,
        confidence: f64,
    ) -> (Insights<'a>, PatternSet) {
        let band = if confidence >= HIGH_CONFIDENCE_BAND {
            Some(Band::High)
        } else if confidence >= MEDIUM_CONFIDENCE_BAND {
            Some(Band::Medium)
        } else {
            None
        };
        let insights = Insights { categories: scores.iter(), threshold: self.min_insight_threshold, confidence, band };
        (insights, self.detect_patterns(scores))
    }

    pub fn detect_patterns(&self, scores: &BTreeMap<String, CategoryScore>) -> PatternSet {
        let values: Vec<f64> = scores.values().map(|s| s.score).collect();
        let mut patterns = PatternSet::empty();

        if values.len() >= 2 {
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let spread = max - min;

            if min > 0.0 && spread < BALANCED_SPREAD {
                patterns |= PatternSet::BALANCED;
            }
            if values.iter().filter(|&&v| v > DOMINANCE_SCORE).count() == 1 {
                patterns |= PatternSet::DOMINANCE;
            }
            if spread >= POLARIZED_SPREAD {
                patterns |= PatternSet::POLARIZED;
            }
        }

        if values.iter().filter(|&&v| v > self.min_pattern_threshold).count() >= EMERGENCE_MIN_CATEGORIES {
            patterns |= PatternSet::MULTI_CATEGORY_EMERGENCE;
        }

        patterns
    }
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

    fn generator() -> InsightGenerator {
        InsightGenerator::new(0.5, 0.6)
    }

    #[test]
    fn zero_scores_yield_nothing() {
        let s = scores(&[("a", 0.0), ("b", 0.0), ("c", 0.0)]);
        let (insights, patterns) = generator().generate(&s, 0.0);
        assert_eq!(insights.count(), 0);
        assert!(patterns.is_empty());
    }

    #[test]
    fn insights_list_strong_categories_then_band() {
        let s = scores(&[("alpha", 0.9), ("beta", 0.5), ("gamma", 0.75)]);
        let (insights, _) = generator().generate(&s, 0.72);
        let lines: Vec<String> = insights.collect();
        assert_eq!(
            lines,
            vec![
                "Strong 'alpha' alignment detected (score: 0.900)".to_string(),
                "Strong 'gamma' alignment detected (score: 0.750)".to_string(),
                "High aggregate confidence across categories (confidence: 0.720)".to_string(),
            ]
        );
    }

    #[test]
    fn insights_restart_by_cloning() {
        let s = scores(&[("alpha", 0.9), ("beta", 0.1)]);
        let (insights, _) = generator().generate(&s, 0.5);
        let replay = insights.clone();
        let first: Vec<String> = insights.collect();
        let second: Vec<String> = replay.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert!(first[1].starts_with("Moderate"));
    }

    #[test]
    fn balanced_requires_signal_everywhere() {
        let g = generator();
        assert!(g.detect_patterns(&scores(&[("a", 0.5), ("b", 0.6)])).contains(PatternSet::BALANCED));
        assert!(!g.detect_patterns(&scores(&[("a", 0.0), ("b", 0.1)])).contains(PatternSet::BALANCED));
        assert!(!g.detect_patterns(&scores(&[("a", 0.5)])).contains(PatternSet::BALANCED));
    }

    #[test]
    fn dominance_and_polarized() {
        let p = generator().detect_patterns(&scores(&[("a", 0.95), ("b", 0.1), ("c", 0.0)]));
        assert!(p.contains(PatternSet::DOMINANCE));
        assert!(p.contains(PatternSet::POLARIZED));
        assert!(!p.contains(PatternSet::BALANCED));

        let two_high = generator().detect_patterns(&scores(&[("a", 0.95), ("b", 0.9)]));
        assert!(!two_high.contains(PatternSet::DOMINANCE));
    }

    #[test]
    fn emergence_needs_three_above_threshold() {
        let g = generator();
        let p = g.detect_patterns(&scores(&[("a", 0.7), ("b", 0.65), ("c", 0.61), ("d", 0.0)]));
        assert!(p.contains(PatternSet::MULTI_CATEGORY_EMERGENCE));
        let q = g.detect_patterns(&scores(&[("a", 0.7), ("b", 0.65), ("c", 0.6)]));
        assert!(!q.contains(PatternSet::MULTI_CATEGORY_EMERGENCE));
    }

    #[test]
    fn pattern_names_round_trip_through_lookup() {
        let set = PatternSet::BALANCED | PatternSet::POLARIZED;
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, ["balanced", "polarized"]);
        assert_eq!(PatternSet::from_pattern_name("dominance"), Some(PatternSet::DOMINANCE));
        assert_eq!(
            PatternSet::from_pattern_name("multi-category-emergence"),
            Some(PatternSet::MULTI_CATEGORY_EMERGENCE)
        );
        assert_eq!(PatternSet::from_pattern_name("DOMINANCE"), None);
        assert_eq!(PatternSet::from_pattern_name("unknown"), None);
    }
}
