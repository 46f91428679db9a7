use std::path::Path;
use tracing::{error, info, warn};

use crate::config::{COLUMN_MAPPING, DATE_COLUMN, SALES_VALUE_COLUMN};
use crate::load::{self, Cell, Sheet};
use crate::process::date_parser::month_label;
use crate::process::{GroupKey, MonthSummary};

/// Consolidate one raw export for `month`: concatenate all sheets, filter
/// transactions to the target month by the day-first `orderdate`, normalize
/// the descriptive fields and sum sales per group key.
///
/// A load failure is reported and yields an empty summary rather than an
/// error; the pipeline driver decides whether an empty month is fatal.
/// Rows with an unparseable date are filter-excluded.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display(), month = %month))]
pub fn consolidate_month<P: AsRef<Path>>(path: P, month: &str) -> MonthSummary {
    let mut summary = MonthSummary::new(month);

    let sheets = match load::load_raw_export(&path) {
        Ok(sheets) => sheets,
        Err(e) => {
            error!("could not load raw export {}: {:#}", path.as_ref().display(), e);
            return summary;
        }
    };

    for sheet in &sheets {
        consolidate_sheet(sheet, &mut summary);
    }

    info!(
        loaded = summary.rows_loaded,
        matched = summary.rows_matched,
        groups = summary.sales.len(),
        "consolidated"
    );
    summary
}

fn consolidate_sheet(sheet: &Sheet, summary: &mut MonthSummary) {
    let Some(date_idx) = find_column(&sheet.headers, DATE_COLUMN) else {
        warn!(sheet = %sheet.name, column = DATE_COLUMN, "missing date column, skipping sheet");
        return;
    };
    let Some(sales_idx) = find_column(&sheet.headers, SALES_VALUE_COLUMN) else {
        warn!(sheet = %sheet.name, column = SALES_VALUE_COLUMN, "missing sales column, skipping sheet");
        return;
    };

    // group-key columns, by their raw export spelling
    let key_idx: Vec<Option<usize>> = COLUMN_MAPPING
        .iter()
        .map(|(raw, canonical)| {
            let idx = find_column(&sheet.headers, raw);
            if idx.is_none() {
                warn!(sheet = %sheet.name, column = canonical, "descriptive column missing, key field left blank");
            }
            idx
        })
        .collect();

    for row in &sheet.rows {
        summary.rows_loaded += 1;

        let Some(date) = row.get(date_idx).and_then(Cell::as_date) else {
            continue;
        };
        if !month_label(date).eq_ignore_ascii_case(&summary.month) {
            continue;
        }
        summary.rows_matched += 1;

        let text = |i: usize| -> String {
            key_idx[i]
                .and_then(|col| row.get(col))
                .map(Cell::as_text)
                .unwrap_or_default()
        };
        let key = GroupKey::new(&text(0), &text(1), &text(2), &text(3), &text(4), &text(5));

        let value = match row.get(sales_idx) {
            None | Some(Cell::Empty) => 0.0,
            Some(cell) => cell.as_number().unwrap_or_else(|| {
                warn!(sheet = %sheet.name, "unparseable sales value, counting as zero");
                0.0
            }),
        };

        *summary.sales.entry(key).or_insert(0.0) += value;
    }
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}
