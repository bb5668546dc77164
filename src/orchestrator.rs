//! Multi-engine orchestration.
//!
//! ```text
//! text ── pre-check ──(reject)──────────────────────────▶ Rejected report
//!            │ admit
//!            v
//!   pool.spawn(engine₁) … pool.spawn(engineₙ)      (owned rayon ThreadPool)
//!            │   each: Started(at) ─ catch_unwind(engine.run) ─ Finished(elapsed) ── mpsc ──┐
//!            v                                                                              │
//!   recv until every engine finished or ran past its own deadline ◀─────────────────────────┘
//!            │
//!            ├─ product of enhancement factors
//!            ├─ × co-occurrence multipliers (all named engines present)
//!            ├─ pairwise pattern intersections -> correlations
//!            ├─ insight union -> crystallized knowledge
//!            └─ history append (optional)
//! ```
//!
//! Failure isolation: an engine that returns `Err`, panics, misses its
//! deadline or reports a non-finite confidence or factor is left out of the
//! product and the unions and shows up in `warnings`. A late engine keeps
//! running on the pool; its result is dropped. A panicking pre-check counts as
//! a rejection.
//!
//! The engine deadline is per engine and starts when a worker picks the engine
//! up, so engines queued behind others are not charged for the wait. Engines
//! still queued after `deadline * (rounds + 1)`, where `rounds` is the number
//! of engines per worker, are reported as timed out.
//!
//! The pool lives exactly as long as the orchestrator.

#[path = "orchestrator/report.rs"]
mod report;

pub use report::{CoOccurrenceBonus, OrchestratorReport, ReportStatus};

use crate::error::{duration_ms, panic_message};
use crate::{
    Context, Engine, EngineConfig, EngineFailure, EngineResult, Error, HistoryEntry, HistoryStore, PreCheck, Result,
    ScoringEngine, Verdict, clamp_score,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

/// Runs a fixed set of engines over the same input and combines their results.
pub struct Orchestrator {
    engines: Vec<Arc<dyn ScoringEngine>>,
    bonuses: Vec<CoOccurrenceBonus>,
    pre_check: Option<Arc<dyn PreCheck>>,
    history: Option<Arc<HistoryStore>>,
    engine_deadline: Option<Duration>,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engines", &self.engine_names())
            .field("bonuses", &self.bonuses)
            .field("pre_check", &self.pre_check.as_ref().map(|p| p.name().to_string()))
            .field("engine_deadline", &self.engine_deadline)
            .field("workers", &self.pool.current_num_threads())
            .finish()
    }
}

#[derive(Default)]
pub struct OrchestratorBuilder {
    engines: Vec<Arc<dyn ScoringEngine>>,
    bonuses: Vec<CoOccurrenceBonus>,
    pre_check: Option<Arc<dyn PreCheck>>,
    history: Option<Arc<HistoryStore>>,
    engine_deadline: Option<Duration>,
    workers: Option<usize>,
}

impl OrchestratorBuilder {
    /// Register an engine built from `config`.
    pub fn engine(self, config: EngineConfig) -> Self {
        self.scoring_engine(Arc::new(Engine::new(config)))
    }

    /// Register any [`ScoringEngine`] implementation.
    pub fn scoring_engine(mut self, engine: Arc<dyn ScoringEngine>) -> Self {
        self.engines.push(engine);
        self
    }

    pub fn bonus(mut self, bonus: CoOccurrenceBonus) -> Self {
        self.bonuses.push(bonus);
        self
    }

    pub fn bonuses(mut self, bonuses: impl IntoIterator<Item = CoOccurrenceBonus>) -> Self {
        self.bonuses.extend(bonuses);
        self
    }

    pub fn pre_check(mut self, pre_check: impl PreCheck + 'static) -> Self {
        self.pre_check = Some(Arc::new(pre_check));
        self
    }

    pub fn history(mut self, history: Arc<HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn engine_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.engine_deadline = deadline;
        self
    }

    /// Worker threads; defaults to `min(engines, available parallelism)`.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        let mut seen = HashSet::new();
        for engine in &self.engines {
            if !seen.insert(engine.name().to_string()) {
                return Err(Error::DuplicateEngine(engine.name().to_string()));
            }
        }
        for bonus in &self.bonuses {
            if bonus.engines.len() < 2 {
                return Err(Error::Config(format!(
                    "co-occurrence bonus {} names fewer than two engines",
                    bonus.label()
                )));
            }
            if !bonus.multiplier.is_finite() || bonus.multiplier <= 0.0 {
                return Err(Error::Config(format!(
                    "co-occurrence bonus {} must have a finite multiplier > 0",
                    bonus.label()
                )));
            }
            if let Some(unknown) = bonus.engines.iter().find(|name| !seen.contains(name.as_str())) {
                log::warn!("co-occurrence bonus {} names unregistered engine '{unknown}'", bonus.label());
            }
        }
        if self.engine_deadline.is_some_and(|d| d.is_zero()) {
            return Err(Error::Config("engine deadline must be > 0".to_string()));
        }
        if self.workers == Some(0) {
            return Err(Error::Config("worker count must be > 0".to_string()));
        }

        let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let workers = self.workers.unwrap_or_else(|| self.engines.len().clamp(1, available));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lexiscore-worker-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("failed to build worker pool: {e}")))?;

        log::debug!("orchestrator ready: {} engines, {workers} workers", self.engines.len());

        Ok(Orchestrator {
            engines: self.engines,
            bonuses: self.bonuses,
            pre_check: self.pre_check,
            history: self.history,
            engine_deadline: self.engine_deadline,
            pool,
        })
    }
}

type Outcome = std::result::Result<EngineResult, EngineFailure>;

/// Messages from engine tasks back to the collecting thread.
enum Event {
    Started { engine: String, at: Instant },
    Finished { engine: String, outcome: Outcome, elapsed: Duration },
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    pub fn bonuses(&self) -> &[CoOccurrenceBonus] {
        &self.bonuses
    }

    pub fn history(&self) -> Option<&Arc<HistoryStore>> {
        self.history.as_ref()
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every registered engine over `text`.
    pub fn run_all(&self, text: &str, context: &Context) -> OrchestratorReport {
        let engines: Vec<&Arc<dyn ScoringEngine>> = self.engines.iter().collect();
        self.run_engines(text, context, engines, Vec::new())
    }

    /// Run only the named engines. Unknown names end up in `warnings`.
    pub fn run_selected<S: AsRef<str>>(&self, text: &str, context: &Context, names: &[S]) -> OrchestratorReport {
        let wanted: BTreeSet<&str> = names.iter().map(AsRef::as_ref).collect();
        let engines: Vec<&Arc<dyn ScoringEngine>> =
            self.engines.iter().filter(|e| wanted.contains(e.name())).collect();
        let known: HashSet<&str> = self.engines.iter().map(|e| e.name()).collect();
        let warnings = wanted
            .iter()
            .filter(|name| !known.contains(*name))
            .map(|name| format!("engine '{name}' is not registered"))
            .collect();
        self.run_engines(text, context, engines, warnings)
    }

    fn run_engines(
        &self,
        text: &str,
        context: &Context,
        engines: Vec<&Arc<dyn ScoringEngine>>,
        mut warnings: Vec<String>,
    ) -> OrchestratorReport {
        let started = Instant::now();

        if let Some(gate) = &self.pre_check {
            let verdict =
                panic::catch_unwind(AssertUnwindSafe(|| gate.check(text, context))).unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    log::warn!("{} panicked: {message}; rejecting input", gate.name());
                    Verdict::Reject { reason: format!("pre-check panicked: {message}") }
                });
            if let Verdict::Reject { reason } = verdict {
                log::info!("{} rejected input: {reason}", gate.name());
                let report = OrchestratorReport::rejected(gate.name(), &reason, started.elapsed());
                self.record(text, context, &report);
                return report;
            }
        }

        let mut outcomes = self.fan_out(text, context, &engines);

        let mut results: BTreeMap<String, EngineResult> = BTreeMap::new();
        for engine in &engines {
            match outcomes.remove(engine.name()) {
                Some(Ok(result)) => {
                    results.insert(engine.name().to_string(), result);
                }
                Some(Err(failure)) => {
                    log::warn!("engine '{}' omitted: {failure}", engine.name());
                    warnings.push(format!("engine '{}' omitted: {failure}", engine.name()));
                }
                None => {
                    let failure =
                        EngineFailure::TimedOut { deadline_ms: self.engine_deadline.map(duration_ms).unwrap_or(0) };
                    log::warn!("engine '{}' omitted: {failure}", engine.name());
                    warnings.push(format!("engine '{}' omitted: {failure}", engine.name()));
                }
            }
        }

        let (total_enhancement_factor, applied_bonuses) = self.combine_factors(&results);
        let cross_engine_correlations = correlations(&results);
        let crystallized_knowledge = crystallize(&results);
        let total_patterns = results.values().flat_map(|r| r.patterns.iter()).collect::<BTreeSet<_>>().len();

        let report = OrchestratorReport {
            status: ReportStatus::Completed,
            total_enhancement_factor,
            total_insights: crystallized_knowledge.len(),
            total_patterns,
            engine_results: results,
            cross_engine_correlations,
            crystallized_knowledge,
            applied_bonuses,
            warnings,
            processing_time: started.elapsed(),
        };
        log::debug!(
            "orchestrator: {} engines, total factor {:.4}, {} correlations, took {:?}",
            report.engine_results.len(),
            report.total_enhancement_factor,
            report.cross_engine_correlations.len(),
            report.processing_time
        );
        self.record(text, context, &report);
        report
    }

    /// Submit one task per engine and collect what finishes within its deadline.
    fn fan_out(
        &self,
        text: &str,
        context: &Context,
        engines: &[&Arc<dyn ScoringEngine>],
    ) -> BTreeMap<String, Outcome> {
        let text: Arc<str> = Arc::from(text);
        let context = Arc::new(context.clone());
        let (tx, rx) = mpsc::channel::<Event>();

        for engine in engines {
            let engine = Arc::clone(engine);
            let text = Arc::clone(&text);
            let context = Arc::clone(&context);
            let tx = tx.clone();
            self.pool.spawn(move || {
                let name = engine.name().to_string();
                let at = Instant::now();
                // The collector may already be gone; nothing to report then.
                let _ = tx.send(Event::Started { engine: name.clone(), at });
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.run(&text, &context)))
                    .unwrap_or_else(|payload| Err(EngineFailure::Panicked { message: panic_message(payload.as_ref()) }))
                    .and_then(checked);
                let elapsed = at.elapsed();
                if tx.send(Event::Finished { engine: name, outcome, elapsed }).is_err() {
                    log::debug!("engine '{}' finished after the orchestrator stopped waiting", engine.name());
                }
            });
        }
        drop(tx);

        match self.engine_deadline {
            Some(deadline) => self.collect_with_deadline(&rx, engines.len(), deadline),
            None => rx
                .iter()
                .filter_map(|event| match event {
                    Event::Finished { engine, outcome, .. } => Some((engine, outcome)),
                    Event::Started { .. } => None,
                })
                .collect(),
        }
    }

    fn collect_with_deadline(
        &self,
        rx: &mpsc::Receiver<Event>,
        expected: usize,
        deadline: Duration,
    ) -> BTreeMap<String, Outcome> {
        let timed_out = || EngineFailure::TimedOut { deadline_ms: duration_ms(deadline) };
        let rounds = expected.div_ceil(self.workers().max(1)) + 1;
        let give_up = Instant::now() + deadline.saturating_mul(u32::try_from(rounds).unwrap_or(u32::MAX));

        let mut running: BTreeMap<String, Instant> = BTreeMap::new();
        let mut outcomes: BTreeMap<String, Outcome> = BTreeMap::new();
        while outcomes.len() < expected {
            let now = Instant::now();
            let expired: Vec<String> =
                running.iter().filter(|(_, due)| **due <= now).map(|(name, _)| name.clone()).collect();
            for name in expired {
                running.remove(&name);
                outcomes.insert(name, Err(timed_out()));
            }
            if outcomes.len() >= expected || now >= give_up {
                break;
            }

            let wake = running.values().copied().min().map_or(give_up, |due| due.min(give_up));
            match rx.recv_timeout(wake.saturating_duration_since(now)) {
                Ok(Event::Started { engine, at }) => {
                    running.insert(engine, at + deadline);
                }
                Ok(Event::Finished { engine, outcome, elapsed }) => {
                    running.remove(&engine);
                    let outcome = if elapsed > deadline { Err(timed_out()) } else { outcome };
                    outcomes.entry(engine).or_insert(outcome);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        outcomes
    }

    fn combine_factors(&self, results: &BTreeMap<String, EngineResult>) -> (f64, Vec<String>) {
        let mut total: f64 = results.values().map(|r| r.enhancement_factor).product();
        let mut applied = Vec::new();
        for bonus in &self.bonuses {
            if bonus.applies_to(results) {
                total *= bonus.multiplier;
                applied.push(bonus.label());
            }
        }
        let total = if total.is_finite() { total.max(1.0) } else { 1.0 };
        (total, applied)
    }

    fn record(&self, text: &str, context: &Context, report: &OrchestratorReport) {
        if let Some(history) = &self.history {
            history.append(HistoryEntry {
                timestamp: chrono::Utc::now(),
                input_chars: text.chars().count(),
                status: report.status,
                total_enhancement_factor: report.total_enhancement_factor,
                engines: report.engine_results.keys().cloned().collect(),
                domain: context.domain.clone(),
            });
        }
    }
}

/// One line per engine pair (name order) sharing at least one pattern.
fn correlations(results: &BTreeMap<String, EngineResult>) -> Vec<String> {
    let ordered: Vec<&EngineResult> = results.values().collect();
    let mut out = Vec::new();
    for (i, a) in ordered.iter().enumerate() {
        for b in &ordered[i + 1..] {
            let shared: Vec<&str> = a.patterns.intersection(&b.patterns).map(String::as_str).collect();
            if !shared.is_empty() {
                out.push(format!(
                    "Cross-engine correlation between '{}' and '{}': shared patterns [{}]",
                    a.engine_name,
                    b.engine_name,
                    shared.join(", ")
                ));
            }
        }
    }
    out
}

/// Union of engine insights in engine-name order. An insight text already
/// contributed by an earlier engine is not repeated.
fn crystallize(results: &BTreeMap<String, EngineResult>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for (name, result) in results {
        for insight in &result.insights {
            if seen.insert(insight.as_str()) {
                out.push(format!("[{name}] {insight}"));
            }
        }
    }
    out
}

/// Rejects non-finite results and clamps the rest into the ranges an
/// [`EngineResult`] promises.
fn checked(mut result: EngineResult) -> Outcome {
    if !result.confidence.is_finite() || !result.enhancement_factor.is_finite() {
        return Err(EngineFailure::Failed {
            message: format!(
                "non-finite result (confidence {}, enhancement factor {})",
                result.confidence, result.enhancement_factor
            ),
        });
    }
    result.confidence = clamp_score(result.confidence, 0.0, 1.0);
    result.enhancement_factor = clamp_score(result.enhancement_factor, 1.0, f64::MAX);
    for score in result.per_category_scores.values_mut() {
        *score = clamp_score(*score, 0.0, 1.0);
    }
    Ok(result)
}
