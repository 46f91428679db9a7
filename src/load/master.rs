use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};
use tracing::{info, warn};

use crate::config::{self, DESCRIPTIVE_COLS, MONTHS_ORDER};
use crate::process::normalize::clean_field;
use crate::process::GroupKey;

/// The prior cumulative report, loaded with stale columns already dropped:
/// months about to be re-merged and every `Total_Sales*` generation are
/// removed here because they get recomputed downstream. `months` holds the
/// surviving labels in calendar order; each row's values run parallel to it.
#[derive(Debug, Default)]
pub struct MasterSnapshot {
    pub months: Vec<String>,
    pub rows: BTreeMap<GroupKey, Vec<f64>>,
}

impl MasterSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load the old master CSV. `remerged_months` are the labels whose columns
/// must be discarded because fresh consolidations replace them.
#[tracing::instrument(level = "info", skip(path, remerged_months), fields(path = %path.as_ref().display()))]
pub fn load_master<P: AsRef<Path>>(path: P, remerged_months: &[String]) -> Result<MasterSnapshot> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open master {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers of {}", path.display()))?
        .clone();

    // classify every column: descriptive, surviving month, or dropped
    let mut descriptive_idx: [Option<usize>; 6] = [None; 6];
    // (calendar index, canonical label, column index)
    let mut month_cols: Vec<(usize, String, usize)> = Vec::new();
    for (col, header) in headers.iter().enumerate() {
        let cleaned = clean_field(header);
        if let Some(pos) = DESCRIPTIVE_COLS.iter().position(|c| *c == cleaned) {
            descriptive_idx[pos] = Some(col);
        } else if let Some(cal) = config::month_index(header) {
            if remerged_months
                .iter()
                .any(|m| m.eq_ignore_ascii_case(header.trim()))
            {
                info!(column = header, "dropping stale month column");
            } else if month_cols.iter().any(|(c, _, _)| *c == cal) {
                warn!(column = header, "duplicate month column, keeping first");
            } else {
                month_cols.push((cal, MONTHS_ORDER[cal].to_string(), col));
            }
        } else if config::is_total_column(header) {
            info!(column = header, "dropping stale total column");
        } else {
            warn!(column = header, "unrecognized master column, dropping");
        }
    }

    for (pos, idx) in descriptive_idx.iter().enumerate() {
        if idx.is_none() {
            bail!(
                "master {} is missing descriptive column `{}`",
                path.display(),
                DESCRIPTIVE_COLS[pos]
            );
        }
    }
    month_cols.sort_by_key(|(cal, _, _)| *cal);

    let months: Vec<String> = month_cols.iter().map(|(_, label, _)| label.clone()).collect();
    let mut rows: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("");
        let key = GroupKey::new(
            field(descriptive_idx[0]),
            field(descriptive_idx[1]),
            field(descriptive_idx[2]),
            field(descriptive_idx[3]),
            field(descriptive_idx[4]),
            field(descriptive_idx[5]),
        );

        let values: Vec<f64> = month_cols
            .iter()
            .map(|(_, _, col)| {
                record
                    .get(*col)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0)
            })
            .collect();

        // rows that normalize to the same key collapse by summation, the
        // same rule consolidation applies
        match rows.entry(key) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(values);
            }
            std::collections::btree_map::Entry::Occupied(mut e) => {
                warn!(record = idx, "duplicate group key in master, summing");
                for (acc, v) in e.get_mut().iter_mut().zip(values) {
                    *acc += v;
                }
            }
        }
    }

    info!(rows = rows.len(), months = ?months, "master loaded");
    Ok(MasterSnapshot { months, rows })
}
