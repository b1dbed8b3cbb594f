//! Rule engine scenarios and label-distribution coverage.

use std::collections::HashMap;

use optionlab_core::domain::{MarketFeatureSnapshot, RuleInputs, StrategyLabel, FEATURE_NAMES};
use optionlab_core::rules::{validate_strategy_distribution, RuleMatch, StrategyRuleEngine};
use optionlab_core::synthetic::MarketGenerator;

fn snapshot_with(overrides: &[(&str, f64)]) -> MarketFeatureSnapshot {
    let mut values: HashMap<String, f64> =
        FEATURE_NAMES.iter().map(|n| (n.to_string(), 0.0)).collect();
    values.insert("current_price".into(), 100.0);
    values.insert("trend_regime".into(), 2.0);
    values.insert("volatility_regime".into(), 2.0);
    for (name, value) in overrides {
        values.insert(name.to_string(), *value);
    }
    MarketFeatureSnapshot::from_map(&values).unwrap()
}

#[test]
fn high_iv_quiet_market_is_iron_condor() {
    let snap = snapshot_with(&[("iv_rank", 60.0), ("adx_14", 15.0), ("rsi_14", 50.0)]);
    assert_eq!(
        StrategyRuleEngine::new().select_snapshot(&snap),
        StrategyLabel::IronCondor
    );
}

#[test]
fn cheap_options_in_strong_uptrend_is_long_call() {
    let snap = snapshot_with(&[
        ("iv_rank", 30.0),
        ("adx_14", 25.0),
        ("trend_regime", 4.0),
        ("rsi_14", 60.0),
    ]);
    assert_eq!(
        StrategyRuleEngine::new().select_snapshot(&snap),
        StrategyLabel::LongCall
    );
}

#[test]
fn identical_inputs_identical_label() {
    let engine = StrategyRuleEngine::new();
    let generator = MarketGenerator::new(11);
    for inputs in generator.rule_inputs("purity", 500) {
        assert_eq!(engine.explain(&inputs), engine.explain(&inputs));
    }
}

/// Inputs here are uniform over each documented range, not shaped like real
/// market history, so only coverage is asserted. The target bands are checked
/// against a calibrated mix in `rules::distribution`.
#[test]
fn broad_batch_emits_every_label() {
    let engine = StrategyRuleEngine::new();
    let inputs = MarketGenerator::new(2024).rule_inputs("distribution", 50_000);
    let labels: Vec<StrategyLabel> = inputs.iter().map(|x| engine.select(x)).collect();

    let report = validate_strategy_distribution(&labels);
    assert_eq!(report.total, 50_000);
    assert!(report.missing.is_empty(), "missing: {:?}", report.missing);
    let total: usize = report.shares.iter().map(|s| s.count).sum();
    assert_eq!(total, 50_000);
    for share in &report.shares {
        let (lo, hi) = share.target;
        assert_eq!(
            share.within_target,
            share.percentage >= lo && share.percentage <= hi,
            "{}",
            share.label
        );
    }
}

#[test]
fn fallback_is_reached_and_labels_something() {
    let engine = StrategyRuleEngine::new();
    // Medium IV, strong trend, neutral RSI: no rule fits.
    let x = RuleInputs::new(50.0, 30.0, 2, 50.0, 0.0, 2).unwrap();
    let decision = engine.explain(&x);
    assert_eq!(decision.matched, RuleMatch::Fallback);
    assert_eq!(decision.label, StrategyLabel::IronCondor);
}

#[test]
fn decision_serializes_with_rule_name() {
    let x = RuleInputs::new(60.0, 15.0, 2, 50.0, 0.0, 2).unwrap();
    let json = serde_json::to_value(StrategyRuleEngine::new().explain(&x)).unwrap();
    assert_eq!(json["label"], "IRON_CONDOR");
    assert_eq!(json["matched"]["kind"], "rule");
    assert_eq!(json["matched"]["name"], "iron_condor");
}
