//! Config, CSV loading and history files on disk.

use std::fs;
use std::io::Write;

use chrono::NaiveDate;
use optionlab_core::domain::{FeatureError, FEATURE_NAMES};
use optionlab_core::synthetic::MarketGenerator;
use optionlab_runner::{
    label_feature_rows, load_feature_rows, load_option_chain, EngineConfig, LabelEncoder,
    LoadError, MarketContext, PredictionOrchestrator, RecommendationLog, RuleBasedClassifier,
};

fn write_features_csv(path: &std::path::Path, rows: &[(NaiveDate, Vec<f64>)]) {
    let mut file = fs::File::create(path).unwrap();
    writeln!(file, "date,{}", FEATURE_NAMES.join(",")).unwrap();
    for (date, values) in rows {
        let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        writeln!(file, "{date},{}", cells.join(",")).unwrap();
    }
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(
        &path,
        "[risk]\naccount_size = 25000.0\nmax_contracts = 4\n\n[prediction]\ntop_k = 5\n",
    )
    .unwrap();

    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.risk.account_size, 25_000.0);
    assert_eq!(config.risk.max_contracts, 4);
    assert_eq!(config.prediction.top_k, 5);
    assert_eq!(config.risk_manager().unwrap().max_risk_amount(), 500.0);
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn feature_rows_load_and_label() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("features.csv");
    let generator = MarketGenerator::new(17);
    let rows: Vec<(NaiveDate, Vec<f64>)> = (0..5)
        .map(|i| {
            let scenario = generator.scenario("SPY", i).unwrap();
            let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Days::new(i);
            (date, scenario.snapshot.to_feature_vector().to_vec())
        })
        .collect();
    write_features_csv(&path, &rows);

    let loaded = load_feature_rows(&path).unwrap();
    assert_eq!(loaded.len(), 5);
    assert_eq!(loaded[4].date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
    assert_eq!(loaded[0].snapshot.to_feature_vector(), rows[0].1.as_slice());

    let (labeled, report) = label_feature_rows(&loaded);
    assert_eq!(labeled.len(), 5);
    assert_eq!(report.total, 5);
}

#[test]
fn blank_feature_cell_rejects_row_with_line_number() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("features.csv");
    let scenario = MarketGenerator::new(1).scenario("IWM", 0).unwrap();
    let good = scenario.snapshot.to_feature_vector().to_vec();
    let mut bad = good.clone();
    bad[3] = f64::NAN;
    write_features_csv(
        &path,
        &[
            (NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), good),
            (NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), bad),
        ],
    );

    let err = load_feature_rows(&path).unwrap_err();
    match err {
        LoadError::Feature { line, source } => {
            assert_eq!(line, 3);
            assert!(matches!(source, FeatureError::NotFinite { .. }));
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn chain_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chain.csv");
    fs::write(
        &path,
        "strike,type,dte,bid,ask,volume,open_interest,iv,delta,gamma,theta,vega\n\
         95,put,30,1.1,1.2,300,4000,0.24,-0.30,0.03,-0.04,0.10\n\
         100,call,30,3.0,3.2,500,9000,0.22,0.51,0.04,-0.05,0.12\n",
    )
    .unwrap();
    let chain = load_option_chain(&path).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.available_dtes(), vec![30]);
}

#[test]
fn history_appends_and_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log = RecommendationLog::new(dir.path().join("nested").join("history.jsonl"));
    assert!(log.read_all().unwrap().is_empty());

    let clf = RuleBasedClassifier::default();
    let orch =
        PredictionOrchestrator::new(&EngineConfig::default(), &clf, LabelEncoder::fitted()).unwrap();
    let generator = MarketGenerator::new(99);
    for i in 0..2 {
        let scenario = generator.scenario("DIA", i).unwrap();
        let context = MarketContext::new("DIA", NaiveDate::from_ymd_opt(2024, 9, 3).unwrap());
        let rec = orch
            .recommend(&context, &scenario.snapshot, &scenario.chain)
            .unwrap();
        log.append(&rec).unwrap();
    }

    let mut file = fs::OpenOptions::new().append(true).open(log.path()).unwrap();
    writeln!(file, "{{not json").unwrap();

    let entries = log.read_all().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.symbol == "DIA"));
}
