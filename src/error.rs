//! Error types.
//!
//! Only configuration problems surface as [`Error`]. Failures that happen while
//! scoring are recovered where they occur and reported as values
//! ([`ScoringFailure`], [`EngineFailure`]) on the result that absorbed them.

use serde::Serialize;
use thiserror::Error;

/// Configuration errors. Returned by builders and loaders, never by a scoring pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Generic malformed configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Two categories of one engine share a name.
    #[error("engine '{engine}' defines category '{category}' more than once")]
    DuplicateCategory { engine: String, category: String },

    /// Category weights must be finite and strictly positive.
    #[error("category '{category}' has invalid weight {weight} (must be finite and > 0)")]
    InvalidWeight { category: String, weight: f64 },

    /// Two engines registered with one orchestrator share a name.
    #[error("engine '{0}' registered more than once")]
    DuplicateEngine(String),

    /// A bonus rule pattern failed to compile.
    #[error("category '{category}': invalid bonus pattern '{pattern}': {reason}")]
    InvalidRegex { category: String, pattern: String, reason: String },

    /// Reading a configuration file failed.
    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single category scored 0.0 without being evaluated to completion.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringFailure {
    #[error("scorer panicked: {message}")]
    Panicked { message: String },

    #[error("scorer exceeded {deadline_ms}ms deadline")]
    TimedOut { deadline_ms: u64 },
}

/// Why an engine is missing from an orchestrator report.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineFailure {
    #[error("engine panicked: {message}")]
    Panicked { message: String },

    #[error("engine exceeded {deadline_ms}ms deadline")]
    TimedOut { deadline_ms: u64 },

    #[error("engine failed: {message}")]
    Failed { message: String },
}

/// Best-effort extraction of a panic payload message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

pub(crate) fn duration_ms(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_item() {
        let err = Error::DuplicateCategory { engine: "ulaf".into(), category: "semantic".into() };
        assert_eq!(err.to_string(), "engine 'ulaf' defines category 'semantic' more than once");

        let err = Error::InvalidWeight { category: "depth".into(), weight: -1.0 };
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn panic_message_handles_both_payload_kinds() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "<non-string panic payload>");
    }
}
