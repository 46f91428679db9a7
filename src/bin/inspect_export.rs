// src/bin/inspect_export.rs
//
// Print per-sheet row counts and the month distribution of a raw export,
// before committing it to a consolidation run.

use anyhow::{Context, Result};
use dmsreport::{
    config,
    load::{self, Cell},
};
use std::env;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| config::RAW_EXPORTS[0].0.to_string());

    let sheets = load::load_raw_export(&path).with_context(|| format!("loading {}", path))?;

    println!("{}\n", path);
    println!("{: <30} {:>10}", "Sheet", "Rows");
    println!("{:-<41}", "");
    let mut total = 0usize;
    for sheet in &sheets {
        println!("{: <30} {:>10}", sheet.name, sheet.rows.len());
        total += sheet.rows.len();
    }
    println!("{: <30} {:>10}\n", "total", total);

    // 2) month distribution across all sheets, via the date column
    let mut by_month = [0usize; 12];
    let mut unparsed = 0usize;
    for sheet in &sheets {
        let Some(date_idx) = sheet
            .headers
            .iter()
            .position(|h| h == config::DATE_COLUMN)
        else {
            println!(
                "sheet `{}` has no `{}` column",
                sheet.name,
                config::DATE_COLUMN
            );
            continue;
        };
        for row in &sheet.rows {
            match row.get(date_idx).and_then(Cell::as_date) {
                Some(date) => {
                    let label = dmsreport::process::date_parser::month_label(date);
                    if let Some(idx) = config::month_index(&label) {
                        by_month[idx] += 1;
                    }
                }
                None => unparsed += 1,
            }
        }
    }

    println!("{: <30} {:>10}", "Month", "Rows");
    println!("{:-<41}", "");
    for (idx, count) in by_month.iter().enumerate() {
        if *count > 0 {
            println!("{: <30} {:>10}", config::MONTHS_ORDER[idx], count);
        }
    }
    if unparsed > 0 {
        println!("{: <30} {:>10}", "unparseable dates", unparsed);
    }

    Ok(())
}
