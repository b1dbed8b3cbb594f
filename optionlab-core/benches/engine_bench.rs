//! Criterion benchmarks for OptionLab hot paths.
//!
//! Benchmarks:
//! 1. Rule engine over a batch of rule inputs
//! 2. Strike selection by delta on a full chain
//! 3. Parameter generation per strategy
//! 4. Synthetic chain construction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use optionlab_core::domain::{OptionType, RuleInputs, StrategyLabel};
use optionlab_core::rules::StrategyRuleEngine;
use optionlab_core::selection::StrikeSelector;
use optionlab_core::synthetic::{atm_iv_for_rank, black_scholes_chain, ChainSpec, MarketGenerator};
use optionlab_core::ParameterGenerator;

// ── Helpers ──────────────────────────────────────────────────────────

fn bench_inputs() -> RuleInputs {
    RuleInputs::new(45.0, 18.0, 2, 52.0, 0.004, 2).unwrap()
}

// ── 1. Rule engine ───────────────────────────────────────────────────

fn bench_rule_engine(c: &mut Criterion) {
    let engine = StrategyRuleEngine::new();
    let batch = MarketGenerator::new(7).rule_inputs("bench", 10_000);

    c.bench_function("rule_engine/10k", |b| {
        b.iter(|| {
            for inputs in &batch {
                black_box(engine.select(black_box(inputs)));
            }
        })
    });
}

// ── 2. Strike selection ──────────────────────────────────────────────

fn bench_strike_selection(c: &mut Criterion) {
    let chain = black_scholes_chain(&ChainSpec::new(450.0, 0.30)).unwrap();
    let selector = StrikeSelector::new(&chain);

    c.bench_function("strike_selection/by_delta", |b| {
        b.iter(|| {
            black_box(
                selector
                    .by_delta(black_box(0.30), OptionType::Call, 30)
                    .unwrap(),
            )
        })
    });
}

// ── 3. Parameter generation ──────────────────────────────────────────

fn bench_generation(c: &mut Criterion) {
    let inputs = bench_inputs();
    let chain = black_scholes_chain(&ChainSpec::new(450.0, atm_iv_for_rank(inputs.iv_rank()))).unwrap();
    let generator = ParameterGenerator::default();

    let mut group = c.benchmark_group("generate");
    for label in StrategyLabel::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(label), &label, |b, &label| {
            b.iter(|| black_box(generator.generate(label, &chain, &inputs).unwrap()))
        });
    }
    group.finish();
}

// ── 4. Synthetic chain ───────────────────────────────────────────────

fn bench_chain_build(c: &mut Criterion) {
    c.bench_function("synthetic/black_scholes_chain", |b| {
        b.iter(|| black_box(black_scholes_chain(&ChainSpec::new(black_box(450.0), 0.30)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_rule_engine,
    bench_strike_selection,
    bench_generation,
    bench_chain_build
);
criterion_main!(benches);
