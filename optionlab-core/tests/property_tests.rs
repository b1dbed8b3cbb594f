//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Position size bounds — always in 1..=max_contracts
//! 2. Rule engine totality and purity — every input gets a label, the same one twice
//! 3. Strike round trip — select-by-delta then select-by-price returns the same strike
//! 4. Generation completeness — every label yields a fully populated, consistently scaled trade

use proptest::prelude::*;
use optionlab_core::domain::{OptionType, RuleInputs, StrategyLabel, TradeStructure};
use optionlab_core::risk::RiskManager;
use optionlab_core::rules::StrategyRuleEngine;
use optionlab_core::selection::StrikeSelector;
use optionlab_core::synthetic::{atm_iv_for_rank, black_scholes_chain, ChainSpec};
use optionlab_core::ParameterGenerator;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_rule_inputs() -> impl Strategy<Value = RuleInputs> {
    (
        0.0..100.0_f64,
        0.0..60.0_f64,
        0u8..=4,
        0.0..100.0_f64,
        -0.10..0.10_f64,
        0u8..=4,
    )
        .prop_map(|(iv, adx, trend, rsi, p, vol)| {
            RuleInputs::new(iv, adx, trend, rsi, p, vol).unwrap()
        })
}

fn arb_risk_manager() -> impl Strategy<Value = RiskManager> {
    (1_000.0..1_000_000.0_f64, 0.001..1.0_f64, 1u32..50)
        .prop_map(|(account, risk, max)| RiskManager::new(account, risk, max).unwrap())
}

fn arb_spot() -> impl Strategy<Value = f64> {
    (20.0..600.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

// ── 1. Position size bounds ──────────────────────────────────────────

proptest! {
    #[test]
    fn position_size_within_bounds(rm in arb_risk_manager(), loss in -1_000.0..100_000.0_f64) {
        let contracts = rm.calculate_position_size(loss);
        prop_assert!(contracts >= 1);
        prop_assert!(contracts <= rm.max_contracts());
    }

    #[test]
    fn zero_loss_never_divides(rm in arb_risk_manager(), profit in -1_000.0..1_000.0_f64) {
        let v = rm.validate_trade(0.0, profit);
        prop_assert_eq!(v.risk_reward_ratio, 0.0);
        prop_assert!(!v.approved);
    }
}

// ── 2. Rule engine totality and purity ───────────────────────────────

proptest! {
    #[test]
    fn rule_engine_is_total_and_pure(inputs in arb_rule_inputs()) {
        let engine = StrategyRuleEngine::new();
        let first = engine.select(&inputs);
        let second = engine.select(&inputs);
        prop_assert_eq!(first, second);
        prop_assert!(StrategyLabel::ALL.contains(&first));
    }
}

// ── 3. Strike round trip ─────────────────────────────────────────────

proptest! {
    #[test]
    fn delta_then_price_returns_same_strike(
        spot in arb_spot(),
        iv_rank in 0.0..100.0_f64,
        target in 0.05..0.95_f64,
        put in any::<bool>(),
        dte_idx in 0usize..6,
    ) {
        let chain = black_scholes_chain(&ChainSpec::new(spot, atm_iv_for_rank(iv_rank))).unwrap();
        let dte = chain.available_dtes()[dte_idx];
        let option_type = if put { OptionType::Put } else { OptionType::Call };
        let selector = StrikeSelector::new(&chain);

        let strike = selector.by_delta(target * option_type.sign(), option_type, dte).unwrap();
        prop_assert_eq!(selector.by_price(strike, option_type, dte).unwrap(), strike);
    }
}

// ── 4. Generation completeness ───────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_label_generates_a_complete_trade(
        inputs in arb_rule_inputs(),
        spot in arb_spot(),
        rm in arb_risk_manager(),
    ) {
        let chain = black_scholes_chain(&ChainSpec::new(spot, atm_iv_for_rank(inputs.iv_rank()))).unwrap();
        let generator = ParameterGenerator::new(rm);

        for label in StrategyLabel::ALL {
            let trade = generator.generate(label, &chain, &inputs).unwrap();
            let n = f64::from(trade.contracts);

            prop_assert_eq!(trade.strategy, label);
            prop_assert!(trade.contracts >= 1 && trade.contracts <= rm.max_contracts());
            prop_assert!(!trade.legs.is_empty());
            prop_assert!(trade.legs.iter().all(|l| l.contracts == trade.contracts));
            prop_assert!((trade.max_loss - trade.max_loss_per_contract * n).abs() < 1e-6);
            prop_assert!((trade.total_premium - trade.premium_per_contract * n).abs() < 1e-6);
            prop_assert!(trade.breakevens.windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(trade.max_profit, trade.max_profit_per_contract.scaled(trade.contracts));

            let is_time_spread = matches!(
                trade.structure,
                TradeStructure::Calendar { .. } | TradeStructure::Diagonal { .. }
            );
            prop_assert_eq!(trade.breakevens.is_empty(), is_time_spread);
        }
    }
}
