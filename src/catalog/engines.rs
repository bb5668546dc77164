use crate::{BonusRule, EngineConfig, Result, Transfer};

/// Universal language analysis.
pub(super) fn ulaf() -> Result<EngineConfig> {
    EngineConfig::builder("ulaf")
        .category(category! {
            name: "semantic",
            indicators: ["meaning", "means", "concept", "definition", "sense", "implies", "interpret"],
            weight: 1.2,
        })
        .category(category! {
            name: "syntactic",
            indicators: ["clause", "sentence", "grammar", "structure", "phrase", "subject", "verb"],
        })
        .category(category! {
            name: "pragmatic",
            indicators: ["context", "intent", "purpose", "audience", "situation", "tone"],
        })
        .category(category! {
            name: "discourse",
            indicators: ["however", "therefore", "moreover", "in contrast", "furthermore", "consequently"],
            weight: 0.8,
            bonuses: [BonusRule::min_words(40, 0.1)],
        })
        .transfer(Transfer::linear(1.5, 2.5))
        .build()
}

/// Research design and scientific framing.
pub(super) fn rdsf() -> Result<EngineConfig> {
    EngineConfig::builder("rdsf")
        .category(category! {
            name: "hypothesis",
            indicators: ["hypothesis", "hypothesize", "predict", "theory", "conjecture", "assume"],
            weight: 1.2,
            bonuses: [BonusRule::contains("?", 0.05)],
        })
        .category(category! {
            name: "evidence",
            indicators: ["data", "evidence", "measured", "observed", "result", "experiment", "sample"],
            weight: 1.5,
        })
        .category(category! {
            name: "methodology",
            indicators: ["method", "protocol", "control group", "randomized", "replicate", "variable"],
        })
        .category(category! {
            name: "novelty",
            indicators: ["novel", "new approach", "first time", "breakthrough", "unexplored", "original"],
            weight: 0.8,
        })
        .transfer(Transfer::linear(2.0, 3.0))
        .build()
}

/// Technical content and implementation detail.
pub(super) fn tcip() -> Result<EngineConfig> {
    EngineConfig::builder("tcip")
        .category(category! {
            name: "architecture",
            indicators: ["architecture", "component", "module", "interface", "layer", "design"],
        })
        .category(category! {
            name: "implementation",
            indicators: ["implement", "function", "code", "algorithm", "compile", "library"],
            bonuses: [BonusRule::regex(regex!(r"`[^`]+`").clone(), 0.1)],
        })
        .category(category! {
            name: "performance",
            indicators: ["latency", "throughput", "performance", "memory", "benchmark", "optimiz"],
            bonuses: [BonusRule::regex(regex!(r"(?i)\b\d+(?:\.\d+)?\s*(?:ms|µs|ns|mb|gb|%)\b").clone(), 0.1)],
        })
        .category(category! {
            name: "reliability",
            indicators: ["failure", "fault", "retry", "redundan", "recovery", "test"],
        })
        .transfer(Transfer::linear(1.5, 2.5))
        .build()
}

/// Higher-order reasoning.
pub(super) fn hrap() -> Result<EngineConfig> {
    EngineConfig::builder("hrap")
        .category(category! {
            name: "coherence",
            indicators: ["because", "since", "thus", "it follows", "consistent"],
            weight: 1.2,
        })
        .category(category! {
            name: "structure",
            indicators: ["first", "second", "finally", "step", "in summary"],
            bonuses: [BonusRule::regex(regex!(r"(?m)^\s*(?:\d+[.)]|[-*])\s").clone(), 0.1)],
        })
        .category(category! {
            name: "synthesis",
            indicators: ["combine", "integrate", "overall", "taken together", "synthesi"],
        })
        .category(category! {
            name: "connection",
            indicators: ["related to", "analogous", "similar", "link", "relationship", "compared"],
            weight: 0.8,
        })
        .transfer(Transfer::linear(1.2, 2.2))
        .build()
}

/// Fact and truth verification.
pub(super) fn ftve() -> Result<EngineConfig> {
    EngineConfig::builder("ftve")
        .category(category! {
            name: "claims",
            indicators: ["is", "shows", "proves", "demonstrates", "confirms", "according to"],
            weight: 0.8,
        })
        .category(category! {
            name: "sources",
            indicators: ["source", "cited", "reference", "study", "report", "published"],
            weight: 1.5,
            bonuses: [
                BonusRule::regex(regex!(r"\([A-Z][A-Za-z-]+(?: et al\.)?,? \d{4}\)").clone(), 0.15),
                BonusRule::regex(regex!(r"https?://\S+").clone(), 0.1),
            ],
        })
        .category(category! {
            name: "quantification",
            indicators: ["percent", "average", "median", "rate", "ratio", "total"],
            bonuses: [BonusRule::regex(regex!(r"\d").clone(), 0.15)],
        })
        .category(category! {
            name: "hedging",
            indicators: ["may", "might", "suggests", "likely", "approximately", "uncertain"],
        })
        .transfer(Transfer::linear(1.0, 2.0))
        .build()
}
