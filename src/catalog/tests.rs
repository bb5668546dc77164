use super::*;
use crate::{Context, Engine, ReportStatus};
use std::collections::HashSet;

#[test]
fn every_builtin_engine_builds() {
    let configs = engines().unwrap();
    let names: Vec<&str> = configs.iter().map(|c| c.name()).collect();
    assert_eq!(names, ENGINE_NAMES);
    for config in &configs {
        assert!(config.categories().len() >= 4, "{} is too thin", config.name());
        assert!(config.categories().iter().all(|c| !c.folded_indicators().is_empty()));
    }
}

#[test]
fn category_names_are_unique_per_engine() {
    for config in engines().unwrap() {
        let mut seen = HashSet::new();
        for def in config.categories() {
            assert!(seen.insert(def.name()), "{} repeats {}", config.name(), def.name());
        }
    }
}

#[test]
fn bonuses_only_name_builtin_engines() {
    let known: HashSet<&str> = ENGINE_NAMES.into_iter().collect();
    for bonus in co_occurrence_bonuses() {
        assert!(bonus.engines.len() >= 2);
        assert!(bonus.multiplier > 1.0);
        assert!(bonus.engines.iter().all(|e| known.contains(e.as_str())), "{bonus:?}");
    }
}

#[test]
fn default_orchestrator_registers_catalog() {
    let orchestrator = default_orchestrator().unwrap();
    assert_eq!(orchestrator.engine_names(), ENGINE_NAMES);
    assert_eq!(orchestrator.bonuses().len(), co_occurrence_bonuses().len());
}

#[test]
fn research_text_lights_up_rdsf() {
    let configs = engines().unwrap();
    let rdsf = configs.into_iter().find(|c| c.name() == "rdsf").unwrap();
    let result = Engine::new(rdsf).run(
        "Our hypothesis predicts the effect. We measured data from a randomized control group \
         using a fixed protocol, and the observed result was a novel finding.",
    );
    assert!(result.per_category_scores["hypothesis"] > 0.0);
    assert!(result.per_category_scores["evidence"] >= 0.5);
    assert!(result.per_category_scores["methodology"] >= 0.5);
    assert!(result.enhancement_factor > 1.0);
}

#[test]
fn citations_and_numbers_feed_ftve_bonuses() {
    let configs = engines().unwrap();
    let ftve = Engine::new(configs.into_iter().find(|c| c.name() == "ftve").unwrap());
    let plain = ftve.run("the source");
    let cited = ftve.run("the source (Smith, 2020) reports 42");
    assert!(cited.per_category_scores["sources"] > plain.per_category_scores["sources"]);
    assert!(cited.per_category_scores["quantification"] > 0.0);
    assert_eq!(plain.per_category_scores["quantification"], 0.0);
}

#[test]
fn full_run_applies_co_occurrence_table() {
    let report = default_orchestrator().unwrap().run_all(
        "The hypothesis is that the data means what it says, in context, because the study shows it.",
        &Context::default(),
    );
    assert_eq!(report.status, ReportStatus::Completed);
    assert_eq!(report.applied_bonuses.len(), co_occurrence_bonuses().len());
    let product: f64 = report.engine_results.values().map(|r| r.enhancement_factor).product();
    assert!(report.total_enhancement_factor > product);
}
