//! Concurrent category fan-out.
//!
//! The runner calls the scorer once per category. Calls are independent and
//! read-only, so they are spread with rayon's `par_iter` over whatever pool the
//! caller is on: the orchestrator's pool when an engine runs inside it, the
//! global pool otherwise. Work-stealing joins keep nested use (engine tasks
//! fanning out categories on the same pool) free of deadlocks.
//!
//! A category whose scorer panics or overruns the configured deadline scores
//! 0.0 and carries a [`ScoringFailure`]; the other categories are unaffected.

use super::scorer::{FoldedText, score_folded};
use crate::error::{duration_ms, panic_message};
use crate::{CategoryDefinition, ScoringFailure};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Outcome of scoring one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    /// Score in `[0, 1]`; 0.0 when `failure` is set.
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ScoringFailure>,
}

impl CategoryScore {
    fn ok(category: &str, score: f64) -> Self {
        CategoryScore { category: category.to_string(), score, failure: None }
    }

    fn failed(category: &str, failure: ScoringFailure) -> Self {
        CategoryScore { category: category.to_string(), score: 0.0, failure: Some(failure) }
    }
}

/// Runs every category scorer of one engine against the same input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrentCategoryRunner {
    deadline: Option<Duration>,
}

impl ConcurrentCategoryRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results of scorer calls that take longer than `deadline` are discarded.
    pub fn with_deadline(deadline: Option<Duration>) -> Self {
        ConcurrentCategoryRunner { deadline }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Score `text` against every definition.
    ///
    /// The map holds one entry per definition name. Its contents do not depend
    /// on the order in which the parallel calls complete.
    pub fn run_all(&self, text: &str, defs: &[CategoryDefinition]) -> BTreeMap<String, CategoryScore> {
        let folded = FoldedText::new(text);
        let scored: Vec<CategoryScore> = defs.par_iter().map(|def| self.run_one(&folded, text, def)).collect();
        scored.into_iter().map(|s| (s.category.clone(), s)).collect()
    }

    fn run_one(&self, folded: &FoldedText, raw: &str, def: &CategoryDefinition) -> CategoryScore {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| score_folded(folded, raw, def)));
        let elapsed = started.elapsed();

        match outcome {
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::warn!("category '{}' scorer panicked: {message}; scoring 0.0", def.name());
                CategoryScore::failed(def.name(), ScoringFailure::Panicked { message })
            }
            Ok(_) if self.deadline.is_some_and(|d| elapsed > d) => {
                let deadline_ms = self.deadline.map(duration_ms).unwrap_or_default();
                log::warn!(
                    "category '{}' scorer took {:?}, over the {deadline_ms}ms deadline; scoring 0.0",
                    def.name(),
                    elapsed
                );
                CategoryScore::failed(def.name(), ScoringFailure::TimedOut { deadline_ms })
            }
            Ok(score) => {
                log::trace!("category '{}' scored {score:.3} in {:?}", def.name(), elapsed);
                CategoryScore::ok(def.name(), score)
            }
        }
    }
}
