//! Engine configuration.
//!
//! An [`EngineConfig`] is everything that distinguishes one engine from
//! another. It is assembled with [`EngineConfig::builder`] and validated once
//! in [`EngineConfigBuilder::build`]; a config that builds is never rejected
//! later at scoring time.
//!
//! Validation rules:
//!
//! - engine and category names are non-blank, category names are unique
//! - at least one category
//! - weights are finite and `> 0`
//! - thresholds are in `[0, 1]`
//! - `Transfer::gain` is finite and `>= 0`, `Transfer::ceiling` finite and `>= 1`
//! - a category deadline, when set, is non-zero

use crate::{CategoryDefinition, Error, Result, clamp_score};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Maps aggregate confidence to an enhancement factor:
/// `clamp(1 + confidence * gain, 1, ceiling)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub gain: f64,
    pub ceiling: f64,
}

impl Default for Transfer {
    fn default() -> Self {
        Transfer { gain: 1.0, ceiling: 2.0 }
    }
}

impl Transfer {
    pub fn linear(gain: f64, ceiling: f64) -> Self {
        Transfer { gain, ceiling }
    }

    pub fn apply(&self, confidence: f64) -> f64 {
        let confidence = clamp_score(confidence, 0.0, 1.0);
        clamp_score(1.0 + confidence * self.gain, 1.0, self.ceiling.max(1.0))
    }

    fn validate(&self, engine: &str) -> Result<()> {
        if !self.gain.is_finite() || self.gain < 0.0 {
            return Err(Error::Config(format!(
                "engine '{engine}': transfer gain must be finite and >= 0, got {}",
                self.gain
            )));
        }
        if !self.ceiling.is_finite() || self.ceiling < 1.0 {
            return Err(Error::Config(format!(
                "engine '{engine}': transfer ceiling must be finite and >= 1, got {}",
                self.ceiling
            )));
        }
        Ok(())
    }
}

/// Validated, immutable engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    name: String,
    categories: Vec<CategoryDefinition>,
    weights: BTreeMap<String, f64>,
    transfer: Transfer,
    min_insight_threshold: f64,
    min_pattern_threshold: f64,
    category_deadline: Option<Duration>,
}

impl EngineConfig {
    pub const DEFAULT_INSIGHT_THRESHOLD: f64 = 0.5;
    pub const DEFAULT_PATTERN_THRESHOLD: f64 = 0.6;

    pub fn builder(name: impl Into<String>) -> EngineConfigBuilder {
        EngineConfigBuilder {
            name: name.into(),
            categories: Vec::new(),
            transfer: Transfer::default(),
            min_insight_threshold: Self::DEFAULT_INSIGHT_THRESHOLD,
            min_pattern_threshold: Self::DEFAULT_PATTERN_THRESHOLD,
            category_deadline: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// Category weights keyed by category name.
    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    pub fn min_insight_threshold(&self) -> f64 {
        self.min_insight_threshold
    }

    pub fn min_pattern_threshold(&self) -> f64 {
        self.min_pattern_threshold
    }

    pub fn category_deadline(&self) -> Option<Duration> {
        self.category_deadline
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    name: String,
    categories: Vec<CategoryDefinition>,
    transfer: Transfer,
    min_insight_threshold: f64,
    min_pattern_threshold: f64,
    category_deadline: Option<Duration>,
}

impl EngineConfigBuilder {
    pub fn category(mut self, def: CategoryDefinition) -> Self {
        self.categories.push(def);
        self
    }

    pub fn categories(mut self, defs: impl IntoIterator<Item = CategoryDefinition>) -> Self {
        self.categories.extend(defs);
        self
    }

    pub fn transfer(mut self, transfer: Transfer) -> Self {
        self.transfer = transfer;
        self
    }

    /// Categories scoring strictly above this get an insight line.
    pub fn insight_threshold(mut self, threshold: f64) -> Self {
        self.min_insight_threshold = threshold;
        self
    }

    /// Score a category must exceed to count towards multi-category emergence.
    pub fn pattern_threshold(mut self, threshold: f64) -> Self {
        self.min_pattern_threshold = threshold;
        self
    }

    pub fn category_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.category_deadline = deadline;
        self
    }

    pub fn build(self) -> Result<EngineConfig> {
        let engine = self.name.trim();
        if engine.is_empty() {
            return Err(Error::Config("engine name must not be blank".to_string()));
        }
        if self.categories.is_empty() {
            return Err(Error::Config(format!("engine '{engine}' has no categories")));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for def in &self.categories {
            if def.name().trim().is_empty() {
                return Err(Error::Config(format!("engine '{engine}' has a category with a blank name")));
            }
            if !seen.insert(def.name()) {
                return Err(Error::DuplicateCategory { engine: engine.to_string(), category: def.name().to_string() });
            }
            if !def.weight().is_finite() || def.weight() <= 0.0 {
                return Err(Error::InvalidWeight { category: def.name().to_string(), weight: def.weight() });
            }
            if def.folded_indicators().is_empty() {
                log::warn!(
                    "engine '{engine}': category '{}' has no usable indicators and will always score 0",
                    def.name()
                );
            }
        }

        for (label, value) in
            [("insight threshold", self.min_insight_threshold), ("pattern threshold", self.min_pattern_threshold)]
        {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("engine '{engine}': {label} must be in [0, 1], got {value}")));
            }
        }
        self.transfer.validate(engine)?;
        if self.category_deadline.is_some_and(|d| d.is_zero()) {
            return Err(Error::Config(format!("engine '{engine}': category deadline must be > 0")));
        }

        let weights = self.categories.iter().map(|c| (c.name().to_string(), c.weight())).collect();
        Ok(EngineConfig {
            name: engine.to_string(),
            categories: self.categories,
            weights,
            transfer: self.transfer,
            min_insight_threshold: self.min_insight_threshold,
            min_pattern_threshold: self.min_pattern_threshold,
            category_deadline: self.category_deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, weight: f64) -> CategoryDefinition {
        CategoryDefinition::new(name, ["x"], weight)
    }

    #[test]
    fn builds_with_defaults() {
        let config = EngineConfig::builder("demo").category(def("a", 1.0)).category(def("b", 2.0)).build().unwrap();
        assert_eq!(config.name(), "demo");
        assert_eq!(config.categories().len(), 2);
        assert_eq!(config.weights()["b"], 2.0);
        assert_eq!(config.min_insight_threshold(), EngineConfig::DEFAULT_INSIGHT_THRESHOLD);
        assert_eq!(config.transfer(), Transfer::default());
    }

    #[test]
    fn rejects_duplicate_categories() {
        let err = EngineConfig::builder("demo").category(def("a", 1.0)).category(def("a", 1.0)).build().unwrap_err();
        assert_eq!(err, Error::DuplicateCategory { engine: "demo".into(), category: "a".into() });
    }

    #[test]
    fn rejects_non_positive_weights() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = EngineConfig::builder("demo").category(def("a", weight)).build().unwrap_err();
            assert!(matches!(err, Error::InvalidWeight { .. }), "{weight}: {err}");
        }
    }

    #[test]
    fn rejects_structural_problems() {
        assert!(EngineConfig::builder("  ").category(def("a", 1.0)).build().is_err());
        assert!(EngineConfig::builder("demo").build().is_err());
        assert!(EngineConfig::builder("demo").category(def(" ", 1.0)).build().is_err());
        assert!(EngineConfig::builder("demo").category(def("a", 1.0)).insight_threshold(1.5).build().is_err());
        assert!(EngineConfig::builder("demo").category(def("a", 1.0)).pattern_threshold(-0.1).build().is_err());
        assert!(
            EngineConfig::builder("demo").category(def("a", 1.0)).transfer(Transfer::linear(-1.0, 2.0)).build().is_err()
        );
        assert!(
            EngineConfig::builder("demo").category(def("a", 1.0)).transfer(Transfer::linear(1.0, 0.5)).build().is_err()
        );
        assert!(
            EngineConfig::builder("demo")
                .category(def("a", 1.0))
                .category_deadline(Some(Duration::ZERO))
                .build()
                .is_err()
        );
    }

    #[test]
    fn transfer_is_bounded() {
        let t = Transfer::linear(10.0, 4.0);
        assert_eq!(t.apply(0.0), 1.0);
        assert_eq!(t.apply(0.2), 3.0);
        assert_eq!(t.apply(1.0), 4.0);
        assert_eq!(t.apply(f64::NAN), 1.0);
        assert_eq!(t.apply(-5.0), 1.0);
    }
}
