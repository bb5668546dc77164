use crate::{Orchestrator, OrchestratorReport, Result, catalog};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_ORCHESTRATOR: Lazy<Result<Orchestrator>> = Lazy::new(catalog::default_orchestrator);

/// Caller-supplied context for one analysis.
///
/// Scoring never looks at it. It reaches pre-checks, debug logs and the
/// history store, so callers can tag requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub domain: Option<String>,
    pub complexity: Option<u32>,
    pub stakes: Option<u32>,
    pub cultural_context: Vec<String>,
}

/// Options that affect which engines run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Restrict the run to these engine names. `None` runs every engine.
    pub engines: Option<Vec<String>>,
}

/// Analyze `text` with the built-in catalog and a default [`Context`].
///
/// # Example
/// ```
/// let report = lexiscore::analyze("The measured data supports the hypothesis.").unwrap();
/// assert!(report.total_enhancement_factor >= 1.0);
/// assert_eq!(report.engine_results.len(), 5);
/// ```
pub fn analyze(text: &str) -> Result<OrchestratorReport> {
    analyze_with(text, &Context::default(), &Options::default())
}

/// Analyze `text` with the built-in catalog and the provided `context`/`options`.
///
/// Fails only if the built-in catalog itself is invalid.
pub fn analyze_with(text: &str, context: &Context, options: &Options) -> Result<OrchestratorReport> {
    let orchestrator = DEFAULT_ORCHESTRATOR.as_ref().map_err(Clone::clone)?;
    Ok(match &options.engines {
        Some(names) => orchestrator.run_selected(text, context, names),
        None => orchestrator.run_all(text, context),
    })
}
