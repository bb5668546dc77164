//! The engine pipeline.
//!
//! [`Engine`] wires runner, aggregator and insight generator together for one
//! [`EngineConfig`]. It is the only pipeline implementation; engines differ
//! purely by configuration.
//!
//! [`ScoringEngine`] is the seam the orchestrator works against. `Engine`
//! never fails (category failures are absorbed as 0.0 scores), but other
//! implementations may, and the orchestrator treats an `Err` the same way it
//! treats a panic or a missed deadline.

use super::aggregate::ScoreAggregator;
use super::config::EngineConfig;
use super::insight::InsightGenerator;
use super::runner::ConcurrentCategoryRunner;
use crate::{Context, EngineFailure};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

/// Anything the orchestrator can run.
pub trait ScoringEngine: Send + Sync {
    /// Unique name within one orchestrator.
    fn name(&self) -> &str;

    fn run(&self, text: &str, context: &Context) -> Result<EngineResult, EngineFailure>;
}

/// Result of one engine pass over one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineResult {
    pub engine_name: String,
    /// Weighted mean of category scores, in `[0, 1]`.
    pub confidence: f64,
    /// `>= 1.0`.
    pub enhancement_factor: f64,
    pub insights: Vec<String>,
    pub patterns: BTreeSet<String>,
    /// Exactly one entry per configured category.
    pub per_category_scores: BTreeMap<String, f64>,
    /// Categories that panicked or timed out (scored 0.0).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_categories: Vec<String>,
    #[serde(rename = "processing_time_ms", serialize_with = "crate::serialize_millis")]
    pub processing_time: Duration,
}

/// One configured scoring pipeline.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    runner: ConcurrentCategoryRunner,
    aggregator: ScoreAggregator,
    insights: InsightGenerator,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let runner = ConcurrentCategoryRunner::with_deadline(config.category_deadline());
        let aggregator = ScoreAggregator::new(config.transfer());
        let insights = InsightGenerator::new(config.min_insight_threshold(), config.min_pattern_threshold());
        Engine { config, runner, aggregator, insights }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Score `text` with a default [`Context`].
    pub fn run(&self, text: &str) -> EngineResult {
        self.run_with(text, &Context::default())
    }

    /// Score `text`.
    ///
    /// `context` is not consulted by the scoring pipeline itself; it is logged
    /// for traceability.
    pub fn run_with(&self, text: &str, context: &Context) -> EngineResult {
        let started = Instant::now();

        let scores = self.runner.run_all(text, self.config.categories());
        let aggregate = self.aggregator.aggregate(&scores, self.config.weights());
        let (insights, patterns) = self.insights.generate(&scores, aggregate.confidence);
        let insights: Vec<String> = insights.collect();

        let failed_categories: Vec<String> =
            scores.values().filter(|s| s.failure.is_some()).map(|s| s.category.clone()).collect();
        let per_category_scores: BTreeMap<String, f64> =
            scores.into_iter().map(|(name, score)| (name, score.score)).collect();

        let processing_time = started.elapsed();
        log::debug!(
            "engine '{}' confidence={:.3} factor={:.3} insights={} patterns={:?} domain={:?} took {:?}",
            self.name(),
            aggregate.confidence,
            aggregate.enhancement_factor,
            insights.len(),
            patterns,
            context.domain,
            processing_time
        );

        EngineResult {
            engine_name: self.name().to_string(),
            confidence: aggregate.confidence,
            enhancement_factor: aggregate.enhancement_factor,
            insights,
            patterns: patterns.to_name_set(),
            per_category_scores,
            failed_categories,
            processing_time,
        }
    }
}

impl ScoringEngine for Engine {
    fn name(&self) -> &str {
        self.config.name()
    }

    fn run(&self, text: &str, context: &Context) -> Result<EngineResult, EngineFailure> {
        Ok(self.run_with(text, context))
    }
}
