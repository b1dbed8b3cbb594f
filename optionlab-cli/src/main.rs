//! OptionLab CLI — label, recommend, and demo commands.
//!
//! Commands:
//! - `label` — run the rule engine over a feature CSV and write training labels
//! - `recommend` — build a sized trade for one symbol-day from feature and chain CSVs
//! - `demo` — the full pipeline on seeded synthetic markets

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::prelude::*;

use optionlab_core::synthetic::MarketGenerator;
use optionlab_runner::{
    label_feature_rows, load_feature_rows, load_option_chain, report, write_labels,
    EngineConfig, LabelEncoder, MarketContext, PredictionOrchestrator, Recommendation,
    RecommendationLog, RuleBasedClassifier,
};

#[derive(Parser)]
#[command(
    name = "optionlab",
    about = "OptionLab CLI — options strategy selection and trade construction"
)]
struct Cli {
    /// Engine config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Label every row of a feature CSV with the rule engine.
    Label {
        /// Feature CSV with a `date` column and one column per feature.
        #[arg(long)]
        features: PathBuf,

        /// Output CSV (`date,label,rule`). Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Recommend a trade for one symbol-day.
    Recommend {
        /// Ticker the files describe.
        #[arg(long)]
        symbol: String,

        /// Feature CSV with a `date` column.
        #[arg(long)]
        features: PathBuf,

        /// Option chain CSV for the same day.
        #[arg(long)]
        chain: PathBuf,

        /// Row to use (YYYY-MM-DD). Defaults to the last row.
        #[arg(long)]
        date: Option<String>,

        /// Append the recommendation to this JSONL history file.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Print JSON instead of the text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run the pipeline on synthetic markets.
    Demo {
        /// Master seed for the synthetic generator.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Symbols to simulate.
        #[arg(long, num_args = 1.., default_values_t = ["SPY".to_string(), "QQQ".to_string(), "IWM".to_string()])]
        symbols: Vec<String>,

        /// Print JSON instead of the text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Label { features, output } => run_label(&features, output.as_deref()),
        Commands::Recommend {
            symbol,
            features,
            chain,
            date,
            history,
            json,
        } => run_recommend(&config, symbol, &features, &chain, date, history, json),
        Commands::Demo {
            seed,
            symbols,
            json,
        } => run_demo(&config, seed, &symbols, json),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn run_label(features: &Path, output: Option<&Path>) -> Result<()> {
    let rows = load_feature_rows(features)?;
    if rows.is_empty() {
        bail!("{} has no feature rows", features.display());
    }
    let (labeled, report) = label_feature_rows(&rows);

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_labels(file, &labeled)?;
            info!(rows = labeled.len(), path = %path.display(), "labels written");
        }
        None => write_labels(std::io::stdout().lock(), &labeled)?,
    }

    eprintln!("Label distribution ({} rows):", report.total);
    for share in &report.shares {
        let (lo, hi) = share.target;
        eprintln!(
            "  {:<18} {:>6} {:>6.1}%  target {lo:.0}-{hi:.0}%  {}",
            share.label.as_str(),
            share.count,
            share.percentage,
            if share.within_target { "ok" } else { "OUT" }
        );
    }
    if !report.missing.is_empty() {
        let missing: Vec<&str> = report.missing.iter().map(|l| l.as_str()).collect();
        eprintln!("  never emitted: {}", missing.join(", "));
    }
    Ok(())
}

fn run_recommend(
    config: &EngineConfig,
    symbol: String,
    features: &Path,
    chain: &Path,
    date: Option<String>,
    history: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let rows = load_feature_rows(features)?;
    let chain = load_option_chain(chain)?;

    let row = match date.as_deref() {
        Some(s) => {
            let wanted = NaiveDate::parse_from_str(s, "%Y-%m-%d")?;
            rows.iter()
                .find(|r| r.date == wanted)
                .with_context(|| format!("no feature row for {wanted}"))?
        }
        None => rows
            .last()
            .with_context(|| format!("{} has no feature rows", features.display()))?,
    };

    let classifier = RuleBasedClassifier::default();
    let orchestrator = PredictionOrchestrator::new(config, &classifier, LabelEncoder::fitted())?;
    let context = MarketContext::new(symbol, row.date);
    let rec = orchestrator.recommend_with_fallback(&context, &row.snapshot, &chain)?;

    print_recommendation(&rec, json)?;
    if let Some(path) = history {
        RecommendationLog::new(path.clone())
            .append(&rec)
            .with_context(|| format!("appending to {}", path.display()))?;
    }
    Ok(())
}

fn run_demo(config: &EngineConfig, seed: u64, symbols: &[String], json: bool) -> Result<()> {
    let generator = MarketGenerator::new(seed);
    let classifier = RuleBasedClassifier::default();
    let orchestrator = PredictionOrchestrator::new(config, &classifier, LabelEncoder::fitted())?;
    let as_of = chrono::Local::now().date_naive();

    for (i, symbol) in symbols.iter().enumerate() {
        let scenario = generator.scenario(symbol, i as u64)?;
        let context = MarketContext::new(symbol.as_str(), as_of);
        let rec =
            orchestrator.recommend_with_fallback(&context, &scenario.snapshot, &scenario.chain)?;
        print_recommendation(&rec, json)?;
    }
    Ok(())
}

fn print_recommendation(rec: &Recommendation, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rec)?);
    } else {
        print!("{}", report::render(rec));
    }
    Ok(())
}
