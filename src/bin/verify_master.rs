// src/bin/verify_master.rs
//
// Re-read written master reports and check their invariants: unique group
// keys, and a total column equal to the row-wise sum of the month columns.

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use dmsreport::{config, process::GroupKey};
use glob::glob;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

const TOLERANCE: f64 = 1e-6;

fn main() -> Result<()> {
    // 1) verify an explicit path, or every CSV in the output directory
    let paths: Vec<PathBuf> = match std::env::args().nth(1) {
        Some(path) => vec![PathBuf::from(path)],
        None => {
            let pattern = format!("{}/*.csv", config::OUTPUT_DIR);
            glob(&pattern)
                .with_context(|| format!("bad glob pattern '{}'", pattern))?
                .filter_map(|entry| entry.ok())
                .collect()
        }
    };
    if paths.is_empty() {
        bail!("no report files found under '{}'", config::OUTPUT_DIR);
    }

    println!(
        "{: <45} {:>8} {:>12} {:>12}",
        "Report", "Rows", "Bad totals", "Dup keys"
    );
    println!("{:-<80}", "");

    let mut failures = 0usize;
    for path in &paths {
        let (rows, bad_totals, dup_keys) = verify_report(path)
            .with_context(|| format!("verifying {}", path.display()))?;
        println!(
            "{: <45} {:>8} {:>12} {:>12}",
            path.display(),
            rows,
            bad_totals,
            dup_keys
        );
        failures += bad_totals + dup_keys;
    }

    if failures > 0 {
        bail!("{} invariant violations found", failures);
    }
    Ok(())
}

/// Returns (row count, rows whose total differs from the month sum, rows
/// whose group key repeats).
fn verify_report(path: &Path) -> Result<(usize, usize, usize)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let mut descriptive_idx: [Option<usize>; 6] = [None; 6];
    let mut month_idx: Vec<usize> = Vec::new();
    let mut total_idx: Option<usize> = None;
    for (col, header) in headers.iter().enumerate() {
        let trimmed = header.trim();
        if let Some(pos) = config::DESCRIPTIVE_COLS
            .iter()
            .position(|c| c.eq_ignore_ascii_case(trimmed))
        {
            descriptive_idx[pos] = Some(col);
        } else if config::month_index(trimmed).is_some() {
            month_idx.push(col);
        } else if config::is_total_column(trimmed) {
            total_idx = Some(col);
        }
    }
    let Some(total_idx) = total_idx else {
        bail!("{} has no total column", path.display());
    };

    let mut rows = 0usize;
    let mut bad_totals = 0usize;
    let mut dup_keys = 0usize;
    let mut seen: HashSet<GroupKey> = HashSet::new();
    for result in reader.records() {
        let record = result?;
        rows += 1;

        let number = |col: usize| -> f64 {
            record
                .get(col)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0.0)
        };
        let month_sum: f64 = month_idx.iter().map(|c| number(*c)).sum();
        if (month_sum - number(total_idx)).abs() > TOLERANCE {
            bad_totals += 1;
        }

        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("");
        let key = GroupKey::new(
            field(descriptive_idx[0]),
            field(descriptive_idx[1]),
            field(descriptive_idx[2]),
            field(descriptive_idx[3]),
            field(descriptive_idx[4]),
            field(descriptive_idx[5]),
        );
        if !seen.insert(key) {
            dup_keys += 1;
        }
    }

    Ok((rows, bad_totals, dup_keys))
}
