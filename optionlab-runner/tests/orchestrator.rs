//! End-to-end orchestration with stub classifiers.

use std::collections::HashMap;

use chrono::NaiveDate;
use optionlab_core::domain::{ChainError, MaxProfit, StrategyLabel, FEATURE_NAMES};
use optionlab_core::params::GenerateError;
use optionlab_core::synthetic::{atm_iv_for_rank, black_scholes_chain, ChainSpec};
use optionlab_core::{MarketFeatureSnapshot, OptionChain};
use optionlab_runner::{
    Classifier, ClassifierError, EngineConfig, LabelEncoder, MarketContext, PredictError,
    PredictionOrchestrator, Recommendation,
};

// ── Helpers ──────────────────────────────────────────────────────────

/// Returns fixed probabilities, indexed by the fitted encoder.
struct FixedClassifier {
    probabilities: Vec<f64>,
    names: Option<Vec<String>>,
}

impl FixedClassifier {
    fn ranked(weights: &[(StrategyLabel, f64)]) -> Self {
        let enc = LabelEncoder::fitted();
        let mut probabilities = vec![0.0; enc.len()];
        for (label, p) in weights {
            probabilities[enc.encode(*label).unwrap()] = *p;
        }
        Self {
            probabilities,
            names: None,
        }
    }

    fn expected_len(&self) -> usize {
        self.names.as_ref().map_or(FEATURE_NAMES.len(), Vec::len)
    }
}

impl Classifier for FixedClassifier {
    fn n_classes(&self) -> usize {
        self.probabilities.len()
    }

    fn predict(&self, features: &[f64]) -> Result<usize, ClassifierError> {
        let probs = self.predict_probability(features)?;
        Ok((0..probs.len())
            .max_by(|&a, &b| probs[a].total_cmp(&probs[b]).then(b.cmp(&a)))
            .unwrap())
    }

    fn predict_probability(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        if features.len() != self.expected_len() {
            return Err(ClassifierError::FeatureCount {
                expected: self.expected_len(),
                actual: features.len(),
            });
        }
        Ok(self.probabilities.clone())
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }
}

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

/// Rules say IRON_CONDOR for this one.
fn condor_snapshot() -> MarketFeatureSnapshot {
    snapshot_with(&[("iv_rank", 60.0), ("adx_14", 15.0), ("rsi_14", 50.0)])
}

fn chain_for(iv_rank: f64) -> OptionChain {
    black_scholes_chain(&ChainSpec::new(100.0, atm_iv_for_rank(iv_rank))).unwrap()
}

fn context() -> MarketContext {
    MarketContext::new("SPY", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
}

fn recommend(clf: &FixedClassifier, config: &EngineConfig) -> Recommendation {
    PredictionOrchestrator::new(config, clf, LabelEncoder::fitted())
        .unwrap()
        .recommend(&context(), &condor_snapshot(), &chain_for(60.0))
        .unwrap()
}

// ── Stage one ────────────────────────────────────────────────────────

#[test]
fn prediction_ranks_top_k_best_first() {
    let clf = FixedClassifier::ranked(&[
        (StrategyLabel::IronCondor, 0.55),
        (StrategyLabel::IronButterfly, 0.25),
        (StrategyLabel::LongStraddle, 0.15),
        (StrategyLabel::LongCall, 0.05),
    ]);
    let orch = PredictionOrchestrator::new(&EngineConfig::default(), &clf, LabelEncoder::fitted())
        .unwrap();
    let prediction = orch.predict(&condor_snapshot()).unwrap();

    assert_eq!(prediction.label, StrategyLabel::IronCondor);
    assert!((prediction.confidence - 0.55).abs() < 1e-12);
    let labels: Vec<StrategyLabel> = prediction.alternatives.iter().map(|a| a.label).collect();
    assert_eq!(
        labels,
        vec![
            StrategyLabel::IronCondor,
            StrategyLabel::IronButterfly,
            StrategyLabel::LongStraddle
        ]
    );
    assert_eq!(prediction.runners_up().count(), 2);
}

#[test]
fn model_feature_order_is_honoured() {
    let mut clf = FixedClassifier::ranked(&[(StrategyLabel::IronCondor, 1.0)]);
    clf.names = Some(vec!["iv_rank".into(), "adx_14".into()]);
    let orch = PredictionOrchestrator::new(&EngineConfig::default(), &clf, LabelEncoder::fitted())
        .unwrap();
    assert_eq!(
        orch.predict(&condor_snapshot()).unwrap().label,
        StrategyLabel::IronCondor
    );

    clf.names = Some(vec!["not_a_feature".into()]);
    let orch = PredictionOrchestrator::new(&EngineConfig::default(), &clf, LabelEncoder::fitted())
        .unwrap();
    assert!(matches!(
        orch.predict(&condor_snapshot()),
        Err(PredictError::Feature(_))
    ));
}

// ── Stage two ────────────────────────────────────────────────────────

#[test]
fn disagreement_is_recorded_not_an_error() {
    let clf = FixedClassifier::ranked(&[(StrategyLabel::LongCall, 0.7), (StrategyLabel::IronCondor, 0.3)]);
    let rec = recommend(&clf, &EngineConfig::default());

    assert_eq!(rec.label, StrategyLabel::LongCall);
    assert_eq!(rec.trade.strategy, StrategyLabel::LongCall);
    assert_eq!(rec.rule_label, Some(StrategyLabel::IronCondor));
    assert_eq!(rec.agrees_with_rules, Some(false));
    assert_eq!(rec.fallback_from, None);
}

#[test]
fn audit_can_be_disabled() {
    let clf = FixedClassifier::ranked(&[(StrategyLabel::IronCondor, 1.0)]);
    let mut config = EngineConfig::default();
    config.prediction.audit_with_rules = false;
    let rec = recommend(&clf, &config);
    assert_eq!(rec.rule_label, None);
    assert_eq!(rec.agrees_with_rules, None);
}

#[test]
fn unlimited_profit_validated_at_configured_multiple() {
    let clf = FixedClassifier::ranked(&[(StrategyLabel::LongCall, 1.0)]);
    let rec = recommend(&clf, &EngineConfig::default());
    assert_eq!(rec.trade.max_profit, MaxProfit::Unlimited);
    assert!((rec.validation.risk_reward_ratio - 3.0).abs() < 1e-9);

    let mut config = EngineConfig::default();
    config.prediction.unlimited_profit_multiple = 0.4;
    let rec = recommend(&clf, &config);
    assert!(!rec.validation.approved);
}

#[test]
fn validation_uses_total_figures() {
    let clf = FixedClassifier::ranked(&[(StrategyLabel::IronCondor, 1.0)]);
    let rec = recommend(&clf, &EngineConfig::default());
    let expected = rec.trade.max_loss / 10_000.0;
    assert!((rec.validation.risk_percentage - expected).abs() < 1e-12);
}

#[test]
fn missing_expiration_falls_back_to_alternative() {
    let clf = FixedClassifier::ranked(&[
        (StrategyLabel::CalendarSpread, 0.6),
        (StrategyLabel::IronCondor, 0.3),
        (StrategyLabel::LongStraddle, 0.1),
    ]);
    let mut spec = ChainSpec::new(100.0, 0.25);
    spec.dtes = vec![7, 14, 21, 30];
    let chain = black_scholes_chain(&spec).unwrap();
    let orch = PredictionOrchestrator::new(&EngineConfig::default(), &clf, LabelEncoder::fitted())
        .unwrap();

    let err = orch
        .recommend(&context(), &condor_snapshot(), &chain)
        .unwrap_err();
    assert!(matches!(
        err,
        PredictError::Generate(GenerateError::Chain(ChainError::ContractNotFound { .. }))
    ));

    let rec = orch
        .recommend_with_fallback(&context(), &condor_snapshot(), &chain)
        .unwrap();
    assert_eq!(rec.label, StrategyLabel::IronCondor);
    assert_eq!(rec.fallback_from, Some(StrategyLabel::CalendarSpread));
    // Confidence and the rule audit describe the strategy actually built.
    assert_eq!(rec.confidence, 0.3);
    assert_eq!(rec.rule_label, Some(StrategyLabel::IronCondor));
    assert_eq!(rec.agrees_with_rules, Some(true));
}

#[test]
fn ids_are_deterministic() {
    let clf = FixedClassifier::ranked(&[(StrategyLabel::IronCondor, 1.0)]);
    let a = recommend(&clf, &EngineConfig::default());
    let b = recommend(&clf, &EngineConfig::default());
    assert_eq!(a.id, b.id);

    let orch = PredictionOrchestrator::new(&EngineConfig::default(), &clf, LabelEncoder::fitted())
        .unwrap();
    let other = orch
        .recommend(
            &MarketContext::new("QQQ", NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            &condor_snapshot(),
            &chain_for(60.0),
        )
        .unwrap();
    assert_ne!(a.id, other.id);
}

#[test]
fn recommendation_round_trips_through_json() {
    let clf = FixedClassifier::ranked(&[(StrategyLabel::DiagonalSpread, 1.0)]);
    let rec = recommend(&clf, &EngineConfig::default());
    let json = serde_json::to_string_pretty(&rec).unwrap();
    assert!(json.contains("\"label\": \"DIAGONAL_SPREAD\""));
    let back: Recommendation = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, rec.id);
    assert_eq!(back.trade.structure, rec.trade.structure);
    assert_eq!(back.trade.max_profit, MaxProfit::Variable);
    assert_eq!(back.validation.approved, rec.validation.approved);
}
