//! Scoring engine.
//!
//! An engine is one parameterized pipeline over an [`EngineConfig`]. Every
//! concrete engine in the catalog runs the same control flow; only the
//! configuration (categories, weights, transfer constants, thresholds) differs.
//!
//! ## How the parts work together
//!
//! ```text
//! EngineConfig ──┐
//!                │  EngineConfig::builder().build()     (config.rs)
//!                └───────────────┬────────────────
//!                                │
//! input ── fold once ────────────┼─ ConcurrentCategoryRunner::run_all (runner.rs)
//!                                │    - one scorer call per category (par_iter)
//!                                │    - panics / deadline overruns -> 0.0
//!                                v
//!                      score_category (scorer.rs)
//!                        - indicator presence ratio
//!                        - bonus rules, clamp to [0,1]
//!                                │
//!                                v
//!                      ScoreAggregator::aggregate (aggregate.rs)
//!                        - weighted mean -> confidence
//!                        - Transfer -> enhancement factor
//!                                │
//!                                v
//!                      InsightGenerator::generate (insight.rs)
//!                        - lazy insight strings
//!                        - PatternSet
//!                                │
//!                                v
//!                           EngineResult (pipeline.rs)
//! ```
//!
//! Insights and patterns are strictly downstream of the aggregate: nothing the
//! generator produces is fed back into confidence or the enhancement factor.
//!
//! ## Responsibilities by module
//!
//! - `config.rs`: `EngineConfig`, its builder and validation, `Transfer`.
//! - `scorer.rs`: the pure per-category scoring function.
//! - `runner.rs`: concurrent fan-out over categories with failure isolation.
//! - `aggregate.rs`: weighted mean and transfer function.
//! - `insight.rs`: insight iterator and pattern detection.
//! - `pipeline.rs`: `Engine`, `EngineResult` and the `ScoringEngine` seam used by
//!   the orchestrator.

#[path = "engine/aggregate.rs"]
mod aggregate;
#[path = "engine/config.rs"]
mod config;
#[path = "engine/insight.rs"]
mod insight;
#[path = "engine/pipeline.rs"]
mod pipeline;
#[path = "engine/runner.rs"]
mod runner;
#[path = "engine/scorer.rs"]
mod scorer;

pub use aggregate::{Aggregate, ScoreAggregator};
pub use config::{EngineConfig, EngineConfigBuilder, Transfer};
pub use insight::{InsightGenerator, Insights, PatternSet};
pub use pipeline::{Engine, EngineResult, ScoringEngine};
pub use runner::{CategoryScore, ConcurrentCategoryRunner};
pub use scorer::{base_score, score as score_category};
