//! Orchestrator output.

use crate::EngineResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    /// A pre-check rejected the input; no engine ran.
    Rejected,
}

/// A multiplier applied to the total enhancement factor when every named
/// engine produced a result in the same run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoOccurrenceBonus {
    pub engines: BTreeSet<String>,
    pub multiplier: f64,
}

impl CoOccurrenceBonus {
    pub fn new<I, S>(engines: I, multiplier: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CoOccurrenceBonus { engines: engines.into_iter().map(Into::into).collect(), multiplier }
    }

    pub(crate) fn applies_to(&self, present: &BTreeMap<String, EngineResult>) -> bool {
        self.engines.iter().all(|name| present.contains_key(name))
    }

    pub(crate) fn label(&self) -> String {
        let names: Vec<&str> = self.engines.iter().map(String::as_str).collect();
        format!("{} x{}", names.join("+"), self.multiplier)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratorReport {
    pub status: ReportStatus,
    /// Product of engine factors and applied co-occurrence multipliers (`>= 1.0`),
    /// or exactly 0.0 when rejected.
    pub total_enhancement_factor: f64,
    pub engine_results: BTreeMap<String, EngineResult>,
    pub cross_engine_correlations: Vec<String>,
    /// De-duplicated union of engine insights, prefixed with the engine name.
    pub crystallized_knowledge: Vec<String>,
    pub total_insights: usize,
    /// Distinct patterns across all engines.
    pub total_patterns: usize,
    pub applied_bonuses: Vec<String>,
    /// Engines that failed, timed out or were unknown.
    pub warnings: Vec<String>,
    #[serde(rename = "processing_time_ms", serialize_with = "crate::serialize_millis")]
    pub processing_time: Duration,
}

impl OrchestratorReport {
    pub(crate) fn rejected(gate: &str, reason: &str, processing_time: Duration) -> Self {
        OrchestratorReport {
            status: ReportStatus::Rejected,
            total_enhancement_factor: 0.0,
            engine_results: BTreeMap::new(),
            cross_engine_correlations: Vec::new(),
            crystallized_knowledge: vec![format!("Input rejected by {gate}: {reason}")],
            total_insights: 1,
            total_patterns: 0,
            applied_bonuses: Vec::new(),
            warnings: Vec::new(),
            processing_time,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ReportStatus::Rejected
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Line-oriented plain-text rendering.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let status = match self.status {
            ReportStatus::Completed => "completed",
            ReportStatus::Rejected => "rejected",
        };
        lines.push(format!("status: {status}"));
        lines.push(format!("total_enhancement_factor: {:.4}", self.total_enhancement_factor));
        for (name, result) in &self.engine_results {
            lines.push(format!(
                "engine {name}: confidence={:.3} factor={:.3} patterns=[{}]",
                result.confidence,
                result.enhancement_factor,
                result.patterns.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            ));
        }
        for bonus in &self.applied_bonuses {
            lines.push(format!("bonus: {bonus}"));
        }
        for correlation in &self.cross_engine_correlations {
            lines.push(format!("correlation: {correlation}"));
        }
        for insight in &self.crystallized_knowledge {
            lines.push(format!("insight: {insight}"));
        }
        for warning in &self.warnings {
            lines.push(format!("warning: {warning}"));
        }
        lines.push(format!("totals: insights={} patterns={}", self.total_insights, self.total_patterns));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_report_shape() {
        let report = OrchestratorReport::rejected("consistency-gate", "input is blank", Duration::ZERO);
        assert!(report.is_rejected());
        assert_eq!(report.total_enhancement_factor, 0.0);
        assert!(report.engine_results.is_empty());
        assert_eq!(report.crystallized_knowledge, vec!["Input rejected by consistency-gate: input is blank"]);
        assert_eq!(report.total_insights, 1);
    }

    #[test]
    fn json_uses_snake_case_status() {
        let report = OrchestratorReport::rejected("pre-check", "no", Duration::from_millis(2));
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["total_enhancement_factor"], 0.0);
        assert!((json["processing_time_ms"].as_f64().unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn summary_mentions_every_section() {
        let mut report = OrchestratorReport::rejected("pre-check", "no", Duration::ZERO);
        report.warnings.push("engine 'x' failed".into());
        let lines = report.summary_lines();
        assert_eq!(lines[0], "status: rejected");
        assert!(lines.iter().any(|l| l.starts_with("insight: Input rejected")));
        assert!(lines.iter().any(|l| l == "warning: engine 'x' failed"));
        assert_eq!(lines.last().unwrap(), "totals: insights=1 patterns=0");
    }

    #[test]
    fn bonus_applies_only_when_all_engines_present() {
        let bonus = CoOccurrenceBonus::new(["a", "b"], 1.5);
        let mut present = BTreeMap::new();
        let result = EngineResult {
            engine_name: "a".into(),
            confidence: 0.0,
            enhancement_factor: 1.0,
            insights: Vec::new(),
            patterns: BTreeSet::new(),
            per_category_scores: BTreeMap::new(),
            failed_categories: Vec::new(),
            processing_time: Duration::ZERO,
        };
        present.insert("a".to_string(), result.clone());
        assert!(!bonus.applies_to(&present));
        present.insert("b".to_string(), EngineResult { engine_name: "b".into(), ..result });
        assert!(bonus.applies_to(&present));
        assert_eq!(bonus.label(), "a+b x1.5");
    }
}
