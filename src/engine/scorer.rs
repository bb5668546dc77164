//! Per-category scoring.
//!
//! A score is the share of a category's indicators that occur in the input,
//! plus whatever the category's bonus rules add, clamped to `[0, 1]`.
//!
//! ```text
//! "The data was measured twice"   indicators: [data, measured, observed]
//!      ^^^^     ^^^^^^^^          base = 2 / 3
//!                                 + bonus rules (each <= cap)
//!                                 clamp -> [0, 1]
//! ```
//!
//! Presence, not frequency: repeating an indicator does not raise the score.
//! Comparison happens on folded text (NFKC + lowercase, see `crate::fold`), so
//! full-width or differently-cased input matches the same indicators.

use crate::{CategoryDefinition, clamp_score, fold};

/// Input text folded once per run and shared by every scorer call.
#[derive(Debug, Clone)]
pub(crate) struct FoldedText {
    folded: String,
}

impl FoldedText {
    pub(crate) fn new(raw: &str) -> Self {
        FoldedText { folded: fold(raw) }
    }

    fn contains(&self, indicator: &str) -> bool {
        self.folded.contains(indicator)
    }
}

/// Score `text` against `def`.
///
/// Pure function of its inputs. A category without indicators scores 0.0 no
/// matter what its bonus rules would add.
pub fn score(text: &str, def: &CategoryDefinition) -> f64 {
    score_folded(&FoldedText::new(text), text, def)
}

/// Indicator presence ratio of `text` for `def`, before bonus rules.
pub fn base_score(text: &str, def: &CategoryDefinition) -> f64 {
    base_folded(&FoldedText::new(text), def)
}

pub(crate) fn score_folded(text: &FoldedText, raw: &str, def: &CategoryDefinition) -> f64 {
    if def.folded_indicators().is_empty() {
        return 0.0;
    }
    let base = base_folded(text, def);
    let bonus: f64 = def.bonus_rules().iter().map(|rule| rule.evaluate(raw)).sum();
    clamp_score(base + bonus, 0.0, 1.0)
}

fn base_folded(text: &FoldedText, def: &CategoryDefinition) -> f64 {
    let indicators = def.folded_indicators();
    let matched = indicators.iter().filter(|indicator| text.contains(indicator)).count();
    (matched as f64 / indicators.len().max(1) as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BonusRule;

    fn evidence() -> CategoryDefinition {
        CategoryDefinition::new("evidence", ["data", "measured", "observed", "sample"], 1.0)
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(score("", &evidence()), 0.0);
    }

    #[test]
    fn empty_indicators_score_zero_for_any_text() {
        let def = CategoryDefinition::new("nothing", Vec::<String>::new(), 1.0)
            .with_bonus(BonusRule::custom("always", 0.2, |_| 1.0));
        for text in ["", "anything at all", "data measured observed"] {
            assert_eq!(score(text, &def), 0.0);
        }
    }

    #[test]
    fn all_indicators_once_gives_full_base_score() {
        let text = "data measured observed sample";
        assert_eq!(base_score(text, &evidence()), 1.0);
        assert_eq!(score(text, &evidence()), 1.0);
    }

    #[test]
    fn presence_not_frequency() {
        let once = score("data", &evidence());
        let many = score("data data data data data data", &evidence());
        assert_eq!(once, 0.25);
        assert_eq!(once, many);
    }

    #[test]
    fn matching_is_case_and_width_insensitive() {
        assert_eq!(score("DATA was MEASURED", &evidence()), 0.5);
        assert_eq!(score("ｄａｔａ", &evidence()), 0.25);

        let street = CategoryDefinition::new("street", ["Straße"], 1.0);
        assert_eq!(score("HAUPTSTRASSE 5", &street), 1.0);
    }

    #[test]
    fn bonuses_add_then_clamp() {
        let def = evidence()
            .with_bonus(BonusRule::contains("?", 0.2))
            .with_bonus(BonusRule::custom("big", 0.2, |_| 1.0));
        let partial = score("data?", &def);
        assert!((partial - 0.65).abs() < 1e-12);

        let full = score("data measured observed sample?", &def);
        assert_eq!(full, 1.0);
    }

    #[test]
    fn scores_stay_in_unit_interval_and_repeat() {
        let def = evidence().with_bonus(BonusRule::min_words(2, 0.2));
        let inputs = ["", "x", "data", "Observed SAMPLE data measured", "ü ß ø 日本語", "?!?!"];
        for text in inputs {
            let first = score(text, &def);
            assert!((0.0..=1.0).contains(&first), "{text:?} -> {first}");
            assert_eq!(first, score(text, &def));
        }
    }
}
