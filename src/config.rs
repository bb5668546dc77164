//! JSON engine catalogs.
//!
//! A [`CatalogConfig`] describes a whole orchestrator: engines with their
//! categories, the co-occurrence table, worker count, deadlines, an optional
//! history buffer and an optional consistency gate.
//!
//! ```json
//! {
//!   "engines": [
//!     {
//!       "name": "research",
//!       "gain": 2.0,
//!       "categories": [
//!         { "name": "evidence", "indicators": ["data", "measured"], "weight": 1.5,
//!           "bonuses": [{ "kind": "regex", "pattern": "\\d", "delta": 0.1 }] }
//!       ]
//!     }
//!   ],
//!   "bonuses": [{ "engines": ["research", "technical"], "multiplier": 1.2 }],
//!   "engine_deadline_ms": 2000,
//!   "gate": { "threshold": 0.9 }
//! }
//! ```
//!
//! Parsing only checks shape. Everything else is checked by the builders
//! in [`CatalogConfig::into_orchestrator`].

use crate::{
    BonusRule, CategoryDefinition, CoOccurrenceBonus, ConsistencyGate, EngineConfig, Error, HistoryStore, Orchestrator,
    Result, Transfer,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    pub engines: Vec<EngineSpec>,
    #[serde(default)]
    pub bonuses: Vec<BonusSpec>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub engine_deadline_ms: Option<u64>,
    #[serde(default)]
    pub history_capacity: Option<usize>,
    #[serde(default)]
    pub gate: Option<GateSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSpec {
    pub name: String,
    pub categories: Vec<CategorySpec>,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default = "default_ceiling")]
    pub ceiling: f64,
    #[serde(default = "default_insight_threshold")]
    pub min_insight_threshold: f64,
    #[serde(default = "default_pattern_threshold")]
    pub min_pattern_threshold: f64,
    #[serde(default)]
    pub category_deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySpec {
    pub name: String,
    pub indicators: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub bonuses: Vec<BonusRuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum BonusRuleSpec {
    Contains { needle: String, delta: f64 },
    Regex { pattern: String, delta: f64 },
    MinWords { count: usize, delta: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BonusSpec {
    pub engines: Vec<String>,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateSpec {
    #[serde(default = "default_gate_threshold")]
    pub threshold: f64,
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

fn default_gain() -> f64 {
    Transfer::default().gain
}

fn default_ceiling() -> f64 {
    Transfer::default().ceiling
}

fn default_insight_threshold() -> f64 {
    EngineConfig::DEFAULT_INSIGHT_THRESHOLD
}

fn default_pattern_threshold() -> f64 {
    EngineConfig::DEFAULT_PATTERN_THRESHOLD
}

fn default_weight() -> f64 {
    1.0
}

fn default_gate_threshold() -> f64 {
    ConsistencyGate::DEFAULT_THRESHOLD
}

fn default_min_chars() -> usize {
    1
}

impl CatalogConfig {
    /// Load from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("JSON parse error: {e}")))
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Build and validate every engine, then the orchestrator itself.
    pub fn into_orchestrator(self) -> Result<Orchestrator> {
        if self.engine_deadline_ms == Some(0) {
            return Err(Error::Config("engine_deadline_ms must be > 0".to_string()));
        }

        let mut builder = Orchestrator::builder()
            .engine_deadline(self.engine_deadline_ms.map(Duration::from_millis))
            .bonuses(self.bonuses.into_iter().map(|b| CoOccurrenceBonus::new(b.engines, b.multiplier)));
        for spec in self.engines {
            builder = builder.engine(spec.into_config()?);
        }
        if let Some(workers) = self.workers {
            builder = builder.workers(workers);
        }
        if let Some(capacity) = self.history_capacity {
            builder = builder.history(Arc::new(HistoryStore::with_capacity(capacity)));
        }
        if let Some(gate) = self.gate {
            builder = builder.pre_check(ConsistencyGate::new(gate.threshold, gate.min_chars)?);
        }
        builder.build()
    }
}

impl EngineSpec {
    pub fn into_config(self) -> Result<EngineConfig> {
        if self.category_deadline_ms == Some(0) {
            return Err(Error::Config(format!("engine '{}': category_deadline_ms must be > 0", self.name)));
        }
        let categories = self.categories.into_iter().map(CategorySpec::into_definition).collect::<Result<Vec<_>>>()?;
        EngineConfig::builder(self.name)
            .categories(categories)
            .transfer(Transfer::linear(self.gain, self.ceiling))
            .insight_threshold(self.min_insight_threshold)
            .pattern_threshold(self.min_pattern_threshold)
            .category_deadline(self.category_deadline_ms.map(Duration::from_millis))
            .build()
    }
}

impl CategorySpec {
    pub fn into_definition(self) -> Result<CategoryDefinition> {
        let mut rules = Vec::with_capacity(self.bonuses.len());
        for bonus in self.bonuses {
            rules.push(bonus.into_rule(&self.name)?);
        }
        Ok(CategoryDefinition::new(self.name, self.indicators, self.weight).with_bonuses(rules))
    }
}

impl BonusRuleSpec {
    fn into_rule(self, category: &str) -> Result<BonusRule> {
        let delta = match &self {
            BonusRuleSpec::Contains { delta, .. }
            | BonusRuleSpec::Regex { delta, .. }
            | BonusRuleSpec::MinWords { delta, .. } => *delta,
        };
        if !(0.0..=BonusRule::MAX_BONUS).contains(&delta) {
            return Err(Error::Config(format!(
                "category '{category}': bonus delta must be in [0, {}], got {delta}",
                BonusRule::MAX_BONUS
            )));
        }
        Ok(match self {
            BonusRuleSpec::Contains { needle, delta } => BonusRule::contains(needle, delta),
            BonusRuleSpec::MinWords { count, delta } => BonusRule::min_words(count, delta),
            BonusRuleSpec::Regex { pattern, delta } => {
                let re = Regex::new(&pattern).map_err(|e| Error::InvalidRegex {
                    category: category.to_string(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
                BonusRule::regex(re, delta)
            }
        })
    }
}
