//! CSV loading for option chains and feature snapshots.
//!
//! Both loaders are strict: a row with a missing or non-numeric required
//! value is rejected with its line number. Nothing is back-filled.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use optionlab_core::domain::{ChainError, FeatureError, OptionContract, OptionType};
use optionlab_core::{MarketFeatureSnapshot, OptionChain};

/// Errors from the loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {source}")]
    Chain {
        line: u64,
        #[source]
        source: ChainError,
    },

    #[error(transparent)]
    EmptyChain(ChainError),

    #[error("line {line}: {source}")]
    Feature {
        line: u64,
        #[source]
        source: FeatureError,
    },

    #[error("line {line}: bad date '{value}'")]
    Date { line: u64, value: String },

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
}

#[derive(Debug, Deserialize)]
struct ChainRow {
    strike: f64,
    #[serde(rename = "type")]
    option_type: String,
    dte: u32,
    #[serde(default)]
    expiration: Option<NaiveDate>,
    bid: f64,
    ask: f64,
    volume: u64,
    open_interest: u64,
    iv: f64,
    delta: f64,
    gamma: f64,
    theta: f64,
    vega: f64,
}

impl ChainRow {
    fn into_contract(self) -> Result<OptionContract, ChainError> {
        Ok(OptionContract {
            strike: self.strike,
            option_type: self.option_type.parse::<OptionType>()?,
            dte: self.dte,
            expiration: self.expiration,
            bid: self.bid,
            ask: self.ask,
            volume: self.volume,
            open_interest: self.open_interest,
            iv: self.iv,
            delta: self.delta,
            gamma: self.gamma,
            theta: self.theta,
            vega: self.vega,
        })
    }
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })
}

/// Load an option chain from a CSV file.
pub fn load_option_chain(path: &Path) -> Result<OptionChain, LoadError> {
    read_option_chain(open(path)?)
}

/// Parse an option chain from any CSV source.
///
/// Columns: `strike,type,dte,bid,ask,volume,open_interest,iv,delta,gamma,theta,vega`
/// plus an optional `expiration` (YYYY-MM-DD).
pub fn read_option_chain<R: Read>(reader: R) -> Result<OptionChain, LoadError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut contracts = Vec::new();
    for row in csv.deserialize::<ChainRow>() {
        let row = row?;
        let contract = row.into_contract().map_err(|source| LoadError::Chain {
            line: contracts.len() as u64 + 2,
            source,
        })?;
        contract.validate().map_err(|source| LoadError::Chain {
            line: contracts.len() as u64 + 2,
            source,
        })?;
        contracts.push(contract);
    }
    debug!(contracts = contracts.len(), "option chain loaded");
    OptionChain::new(contracts).map_err(LoadError::EmptyChain)
}

/// One validated snapshot from a feature file.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub snapshot: MarketFeatureSnapshot,
}

/// Load feature snapshots from a CSV file.
pub fn load_feature_rows(path: &Path) -> Result<Vec<FeatureRow>, LoadError> {
    read_feature_rows(open(path)?)
}

/// Parse feature snapshots keyed by header, with a `date` column.
///
/// Empty cells and non-numeric text count as missing. Extra columns are
/// ignored.
pub fn read_feature_rows<R: Read>(reader: R) -> Result<Vec<FeatureRow>, LoadError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv.headers()?.clone();
    let date_col = headers
        .iter()
        .position(|h| h == "date")
        .ok_or(LoadError::MissingColumn("date"))?;

    let mut rows = Vec::new();
    for (i, record) in csv.records().enumerate() {
        let record = record?;
        let line = i as u64 + 2;

        let raw_date = record.get(date_col).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| LoadError::Date {
            line,
            value: raw_date.to_string(),
        })?;

        let values: HashMap<String, f64> = headers
            .iter()
            .zip(record.iter())
            .filter(|(name, _)| *name != "date")
            .filter_map(|(name, cell)| cell.parse::<f64>().ok().map(|v| (name.to_string(), v)))
            .collect();

        let snapshot = MarketFeatureSnapshot::from_map(&values)
            .map_err(|source| LoadError::Feature { line, source })?;
        rows.push(FeatureRow { date, snapshot });
    }
    debug!(rows = rows.len(), "feature rows loaded");
    Ok(rows)
}
