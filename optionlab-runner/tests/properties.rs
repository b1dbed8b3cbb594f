//! Property tests for the serving layer.
//!
//! 1. Ranked alternatives are sorted, bounded by top_k, and led by the top label
//! 2. Every synthetic scenario yields a recommendation whose risk verdict
//!    matches its own numbers

use proptest::prelude::*;

use chrono::NaiveDate;
use optionlab_core::domain::FEATURE_NAMES;
use optionlab_core::synthetic::MarketGenerator;
use optionlab_runner::{
    label_snapshots, Classifier, ClassifierError, EngineConfig, LabelEncoder, MarketContext,
    PredictionOrchestrator, RuleBasedClassifier,
};

struct Weights(Vec<f64>);

impl Classifier for Weights {
    fn n_classes(&self) -> usize {
        self.0.len()
    }

    fn predict(&self, _: &[f64]) -> Result<usize, ClassifierError> {
        Ok((0..self.0.len())
            .max_by(|&a, &b| self.0[a].total_cmp(&self.0[b]).then(b.cmp(&a)))
            .unwrap_or(0))
    }

    fn predict_probability(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        assert_eq!(features.len(), FEATURE_NAMES.len());
        Ok(self.0.clone())
    }
}

proptest! {
    #[test]
    fn alternatives_sorted_and_bounded(
        weights in prop::collection::vec(0.0..1.0_f64, 10),
        top_k in 1usize..12,
        index in 0u64..50,
    ) {
        let clf = Weights(weights.clone());
        let mut config = EngineConfig::default();
        config.prediction.top_k = top_k;
        let orch = PredictionOrchestrator::new(&config, &clf, LabelEncoder::fitted()).unwrap();
        let scenario = MarketGenerator::new(4).scenario("SPY", index).unwrap();

        let p = orch.predict(&scenario.snapshot).unwrap();
        prop_assert_eq!(p.alternatives.len(), top_k.min(10));
        prop_assert!(p.alternatives.windows(2).all(|w| w[0].probability >= w[1].probability));
        prop_assert_eq!(p.alternatives[0].label, p.label);
        prop_assert_eq!(p.confidence, p.alternatives[0].probability);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn verdict_matches_its_numbers(seed in 0u64..1_000, index in 0u64..20) {
        let clf = RuleBasedClassifier::default();
        let config = EngineConfig::default();
        let orch = PredictionOrchestrator::new(&config, &clf, LabelEncoder::fitted()).unwrap();
        let scenario = MarketGenerator::new(seed).scenario("QQQ", index).unwrap();
        let context = MarketContext::new("QQQ", NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());

        let rec = orch.recommend(&context, &scenario.snapshot, &scenario.chain).unwrap();
        let v = &rec.validation;
        let within_budget = v.risk_percentage <= config.risk.risk_per_trade;
        let enough_reward = v.risk_reward_ratio > 0.5;
        prop_assert_eq!(v.approved, within_budget && enough_reward);
        prop_assert_eq!(rec.agrees_with_rules, Some(true));
        prop_assert_eq!(
            label_snapshots(&[*scenario.snapshot.rule_inputs()])[0],
            rec.label
        );
    }
}
