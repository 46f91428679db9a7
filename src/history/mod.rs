// src/history/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::PathBuf,
};
use tracing::warn;

const CONSOLIDATED_LOG: &str = "consolidated.jsonl";

/// One run-history record: which export was consolidated, for which month,
/// and how many rows went in and came out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub file: String,
    pub month: String,
    pub rows_in: usize,
    pub rows_aggregated: usize,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only run history backed by a JSON-lines file. Audit only: the
/// report is rebuilt wholesale every run, history never short-circuits it.
pub struct History {
    history_dir: PathBuf,
}

impl History {
    /// Construct a `History` at `history_dir`, creating the directory if needed.
    pub fn new(history_dir: impl Into<PathBuf>) -> Result<Self> {
        let history_dir = history_dir.into();
        fs::create_dir_all(&history_dir)
            .with_context(|| format!("creating history directory {:?}", &history_dir))?;
        Ok(Self { history_dir })
    }

    /// Append one record to the consolidated log.
    pub fn record(&self, record: &RunRecord) -> Result<()> {
        let path = self.history_dir.join(CONSOLIDATED_LOG);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening history log {:?}", &path))?;
        let line = serde_json::to_string(record).context("serializing history record")?;
        writeln!(file, "{}", line).with_context(|| format!("appending to {:?}", &path))?;
        Ok(())
    }

    /// Distinct export file names that have been consolidated before.
    /// Unreadable lines are skipped, not fatal.
    pub fn load_consolidated(&self) -> Result<HashSet<String>> {
        let path = self.history_dir.join(CONSOLIDATED_LOG);
        let mut set = HashSet::new();
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(_) => return Ok(set), // no log yet
        };
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("reading history log {:?}", &path))?;
            match serde_json::from_str::<RunRecord>(&line) {
                Ok(record) => {
                    set.insert(record.file);
                }
                Err(e) => warn!(line = idx, "skipping malformed history record: {}", e),
            }
        }
        Ok(set)
    }
}
