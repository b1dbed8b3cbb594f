//! Recommendation history — JSONL append-only persistence.
//!
//! One JSON object per line. A re-run of the same symbol-day produces the
//! same recommendation id, so duplicates are easy to spot after the fact.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::orchestrator::Recommendation;

/// Append-only log of recommendations.
#[derive(Debug, Clone)]
pub struct RecommendationLog {
    path: PathBuf,
}

impl RecommendationLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one recommendation, creating the file and its parent as needed.
    pub fn append(&self, rec: &Recommendation) -> io::Result<()> {
        let json = serde_json::to_string(rec)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{json}")?;
        file.flush()
    }

    /// Read every entry. Malformed lines are skipped with a warning.
    pub fn read_all(&self) -> io::Result<Vec<Recommendation>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = io::BufReader::new(fs::File::open(&self.path)?);
        let mut entries = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Recommendation>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = %self.path.display(), line = i + 1, error = %e, "skipping malformed history line"),
            }
        }

        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
