extern crate self as lexiscore;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

#[macro_use]
mod macros;
mod api;
pub mod catalog;
pub mod config;
mod engine;
mod error;
mod gate;
mod history;
mod orchestrator;

pub use api::{Context, Options, analyze, analyze_with};
pub use engine::{
    Aggregate, CategoryScore, ConcurrentCategoryRunner, Engine, EngineConfig, EngineConfigBuilder, EngineResult,
    InsightGenerator, Insights, PatternSet, ScoreAggregator, ScoringEngine, Transfer, base_score, score_category,
};
pub use error::{EngineFailure, Error, Result, ScoringFailure};
pub use gate::{ConsistencyGate, PreCheck, Verdict};
pub use history::{HistoryEntry, HistoryStore};
pub use orchestrator::{CoOccurrenceBonus, Orchestrator, OrchestratorBuilder, OrchestratorReport, ReportStatus};

// --- Core types --------------------------------------------------------------

/// Clamp `value` to `[lo, hi]`, mapping NaN to `lo` and infinities to the
/// nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        return if value > 0.0 { hi } else { lo };
    }
    value.clamp(lo, hi)
}

/// Fold `text` for indicator comparison: NFKC normalization, Unicode
/// lowercasing, and `ß` expanded to `ss` (so "STRASSE" meets "straße").
///
/// This is not full Unicode case folding; other multi-character folds are
/// left alone.
pub(crate) fn fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.nfkc().flat_map(char::to_lowercase) {
        match c {
            'ß' => folded.push_str("ss"),
            c => folded.push(c),
        }
    }
    folded
}

pub(crate) fn serialize_millis<S>(d: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// Evaluator behind a [`BonusRule`]: raw input text in, unclamped delta out.
pub type BonusFn = dyn Fn(&str) -> f64 + Send + Sync;

/// An additive adjustment applied to a category score after indicator matching.
///
/// The evaluator sees the *raw* input (not the folded form). Whatever it
/// returns is clamped to `[0, cap]`, and `cap` itself never exceeds
/// [`BonusRule::MAX_BONUS`].
#[derive(Clone)]
pub struct BonusRule {
    name: String,
    cap: f64,
    eval: Arc<BonusFn>,
}

impl BonusRule {
    /// Upper bound for any single rule's contribution.
    pub const MAX_BONUS: f64 = 0.2;

    /// Rule backed by an arbitrary closure.
    pub fn custom(name: impl Into<String>, cap: f64, eval: impl Fn(&str) -> f64 + Send + Sync + 'static) -> Self {
        BonusRule { name: name.into(), cap: clamp_score(cap, 0.0, Self::MAX_BONUS), eval: Arc::new(eval) }
    }

    /// Adds `delta` when the raw text contains `needle` (case-sensitive).
    pub fn contains(needle: impl Into<String>, delta: f64) -> Self {
        let needle = needle.into();
        let name = format!("contains:{needle}");
        Self::custom(name, delta, move |text| if text.contains(needle.as_str()) { delta } else { 0.0 })
    }

    /// Adds `delta` when `re` matches anywhere in the raw text.
    pub fn regex(re: Regex, delta: f64) -> Self {
        let name = format!("regex:{}", re.as_str());
        Self::custom(name, delta, move |text| if re.is_match(text) { delta } else { 0.0 })
    }

    /// Adds `delta` when the raw text has at least `count` whitespace-separated words.
    pub fn min_words(count: usize, delta: f64) -> Self {
        Self::custom(format!("min_words:{count}"), delta, move |text| {
            if text.split_whitespace().count() >= count { delta } else { 0.0 }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    /// Evaluate against the raw text; the result is always in `[0, cap]`.
    pub fn evaluate(&self, raw: &str) -> f64 {
        clamp_score((self.eval)(raw), 0.0, self.cap)
    }
}

impl fmt::Debug for BonusRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BonusRule").field("name", &self.name).field("cap", &self.cap).field("eval", &"<fn>").finish()
    }
}

/// One scoring dimension: a named list of indicator substrings, a weight for
/// aggregation and optional bonus rules.
///
/// Indicators are folded once at construction. Blank indicators are dropped
/// and repeated ones collapse, so each indicator can contribute at most once.
#[derive(Debug, Clone)]
pub struct CategoryDefinition {
    name: String,
    indicators: Vec<String>,
    folded: Vec<String>,
    weight: f64,
    bonus_rules: Vec<BonusRule>,
}

impl CategoryDefinition {
    pub fn new<I, S>(name: impl Into<String>, indicators: I, weight: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let indicators: Vec<String> = indicators.into_iter().map(Into::into).collect();
        let mut folded: Vec<String> = Vec::with_capacity(indicators.len());
        for indicator in &indicators {
            let f = fold(indicator.trim());
            if !f.is_empty() && !folded.contains(&f) {
                folded.push(f);
            }
        }
        CategoryDefinition { name: name.into(), indicators, folded, weight, bonus_rules: Vec::new() }
    }

    pub fn with_bonus(mut self, rule: BonusRule) -> Self {
        self.bonus_rules.push(rule);
        self
    }

    pub fn with_bonuses(mut self, rules: impl IntoIterator<Item = BonusRule>) -> Self {
        self.bonus_rules.extend(rules);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indicators exactly as configured.
    pub fn indicators(&self) -> &[String] {
        &self.indicators
    }

    /// Folded, de-duplicated, non-blank indicators used for matching.
    pub fn folded_indicators(&self) -> &[String] {
        &self.folded
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn bonus_rules(&self) -> &[BonusRule] {
        &self.bonus_rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_handles_non_finite() {
        assert_eq!(clamp_score(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(clamp_score(f64::INFINITY, 0.0, 1.0), 1.0);
        assert_eq!(clamp_score(f64::NEG_INFINITY, 0.0, 1.0), 0.0);
        assert_eq!(clamp_score(0.25, 0.0, 1.0), 0.25);
        assert_eq!(clamp_score(-3.0, 1.0, 5.0), 1.0);
    }

    #[test]
    fn fold_normalizes_width_and_case() {
        assert_eq!(fold("ＡＢＣ"), "abc");
        assert_eq!(fold("ÉCOLE"), "école");
    }

    #[test]
    fn fold_expands_sharp_s() {
        assert_eq!(fold("Straße"), "strasse");
        assert_eq!(fold("STRASSE"), fold("straße"));
        assert_eq!(fold("GROẞ"), "gross");
        let def = CategoryDefinition::new("street", ["Straße"], 1.0);
        assert_eq!(def.folded_indicators(), ["strasse"]);
    }

    #[test]
    fn definition_folds_and_dedups_indicators() {
        let def = CategoryDefinition::new("c", ["Alpha", "alpha", "  ", "BETA "], 1.0);
        assert_eq!(def.indicators().len(), 4);
        assert_eq!(def.folded_indicators(), ["alpha", "beta"]);
    }

    #[test]
    fn bonus_rules_clamp_their_contribution() {
        let rule = BonusRule::custom("huge", 5.0, |_| 100.0);
        assert_eq!(rule.cap(), BonusRule::MAX_BONUS);
        assert_eq!(rule.evaluate("anything"), BonusRule::MAX_BONUS);

        let negative = BonusRule::custom("negative", 0.1, |_| -1.0);
        assert_eq!(negative.evaluate("anything"), 0.0);

        let nan = BonusRule::custom("nan", 0.1, |_| f64::NAN);
        assert_eq!(nan.evaluate("anything"), 0.0);
    }

    #[test]
    fn builtin_bonus_rules_match_raw_text() {
        assert_eq!(BonusRule::contains("?", 0.1).evaluate("why?"), 0.1);
        assert_eq!(BonusRule::contains("?", 0.1).evaluate("because"), 0.0);

        let digits = BonusRule::regex(Regex::new(r"\d+").unwrap(), 0.15);
        assert_eq!(digits.evaluate("42 items"), 0.15);
        assert_eq!(digits.evaluate("many items"), 0.0);

        assert_eq!(BonusRule::min_words(3, 0.05).evaluate("one two three"), 0.05);
        assert_eq!(BonusRule::min_words(3, 0.05).evaluate("one two"), 0.0);
    }
}
