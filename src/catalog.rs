//! Built-in engine catalog.
//!
//! Five engines share one pipeline and differ only in their tables:
//!
//! | engine | looks for                                             | gain | ceiling |
//! |--------|-------------------------------------------------------|------|---------|
//! | `ulaf` | language structure: semantics, syntax, pragmatics     | 1.5  | 2.5     |
//! | `rdsf` | research framing: hypotheses, evidence, methodology   | 2.0  | 3.0     |
//! | `tcip` | technical content: architecture, performance          | 1.5  | 2.5     |
//! | `hrap` | reasoning: coherence, structure, synthesis            | 1.2  | 2.2     |
//! | `ftve` | verifiability: claims, sources, numbers, hedging      | 1.0  | 2.0     |
//!
//! Engine pairs that complement each other get a co-occurrence multiplier
//! (see [`co_occurrence_bonuses`]). All constants here are policy.

#[path = "catalog/engines.rs"]
mod engines;

use crate::{CoOccurrenceBonus, ConsistencyGate, EngineConfig, Orchestrator, Result};
use std::time::Duration;

/// Names of the built-in engines, in registration order.
pub const ENGINE_NAMES: [&str; 5] = ["ulaf", "rdsf", "tcip", "hrap", "ftve"];

/// Wall-clock budget for one engine in the default orchestrator.
pub const DEFAULT_ENGINE_DEADLINE: Duration = Duration::from_secs(5);

/// Build every built-in engine configuration.
pub fn engines() -> Result<Vec<EngineConfig>> {
    Ok(vec![engines::ulaf()?, engines::rdsf()?, engines::tcip()?, engines::hrap()?, engines::ftve()?])
}

/// Built-in co-occurrence table.
pub fn co_occurrence_bonuses() -> Vec<CoOccurrenceBonus> {
    vec![
        CoOccurrenceBonus::new(["ulaf", "rdsf"], 1.25),
        CoOccurrenceBonus::new(["tcip", "ftve"], 1.1),
        CoOccurrenceBonus::new(["rdsf", "hrap", "ftve"], 1.15),
    ]
}

pub fn default_gate() -> ConsistencyGate {
    ConsistencyGate::default()
}

/// Orchestrator over the built-in catalog, gated by [`default_gate`].
pub fn default_orchestrator() -> Result<Orchestrator> {
    engines()?
        .into_iter()
        .fold(Orchestrator::builder(), |builder, config| builder.engine(config))
        .bonuses(co_occurrence_bonuses())
        .pre_check(default_gate())
        .engine_deadline(Some(DEFAULT_ENGINE_DEADLINE))
        .build()
}

#[cfg(test)]
#[path = "catalog/tests.rs"]
mod tests;
