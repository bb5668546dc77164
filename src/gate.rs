//! Pre-checks run before any engine.
//!
//! A [`PreCheck`] returning [`Verdict::Reject`] short-circuits the orchestrator:
//! no engine task is submitted and the report carries a zero enhancement
//! factor plus the rejection reason. Rejection is a normal outcome, not an
//! error.
//!
//! Plain closures `Fn(&str) -> bool` are pre-checks. [`ConsistencyGate`] is the
//! built-in sanity gate: it rejects blank input and input dominated by
//! non-textual characters. Its threshold is policy, not a derived constant.

use crate::{Context, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admit,
    Reject { reason: String },
}

pub trait PreCheck: Send + Sync {
    fn name(&self) -> &str {
        "pre-check"
    }

    fn check(&self, text: &str, context: &Context) -> Verdict;
}

impl<F> PreCheck for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn check(&self, text: &str, _context: &Context) -> Verdict {
        if self(text) { Verdict::Admit } else { Verdict::Reject { reason: "input rejected by pre-check".to_string() } }
    }
}

/// Rejects input whose share of textual characters (letters, digits,
/// whitespace, common punctuation) is below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsistencyGate {
    threshold: f64,
    min_chars: usize,
}

impl Default for ConsistencyGate {
    fn default() -> Self {
        ConsistencyGate { threshold: Self::DEFAULT_THRESHOLD, min_chars: 1 }
    }
}

impl ConsistencyGate {
    pub const DEFAULT_THRESHOLD: f64 = 0.95;

    pub fn new(threshold: f64, min_chars: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!("consistency threshold must be in [0, 1], got {threshold}")));
        }
        Ok(ConsistencyGate { threshold, min_chars: min_chars.max(1) })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Share of textual characters in `text`; 0.0 for empty input.
    pub fn consistency(text: &str) -> f64 {
        let (textual, total) =
            text.chars().fold((0usize, 0usize), |(t, n), c| (t + usize::from(is_textual(c)), n + 1));
        if total == 0 { 0.0 } else { textual as f64 / total as f64 }
    }
}

fn is_textual(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || ".,;:!?'\"()[]-/&%+*=#@$€£‘’“”–—…".contains(c)
}

impl PreCheck for ConsistencyGate {
    fn name(&self) -> &str {
        "consistency-gate"
    }

    fn check(&self, text: &str, _context: &Context) -> Verdict {
        if text.trim().is_empty() {
            return Verdict::Reject { reason: "input is blank".to_string() };
        }
        let chars = text.chars().count();
        if chars < self.min_chars {
            return Verdict::Reject {
                reason: format!("input has {chars} characters, at least {} required", self.min_chars),
            };
        }
        let consistency = Self::consistency(text);
        if consistency < self.threshold {
            return Verdict::Reject {
                reason: format!("textual consistency {consistency:.3} is below threshold {:.3}", self.threshold),
            };
        }
        Verdict::Admit
    }
}
