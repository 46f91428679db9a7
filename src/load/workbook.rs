use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::{fs::File, io::BufReader, path::Path};
use tracing::{debug, warn};

use crate::process::date_parser::parse_day_first;
use crate::process::normalize::{clean_field, format_number};

/// One typed cell of a raw export. Workbook date cells arrive as real
/// datetimes; CSV cells arrive as text and stay text until interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Transaction date of this cell, if any. Text dates parse day-first.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::DateTime(dt) => Some(dt.date()),
            Cell::Text(s) => parse_day_first(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }

    /// Text rendering used for descriptive fields. Numeric cells render in
    /// shortest form so an id column read as floats still yields `"1001"`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => format_number(*v),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One sheet of a raw export: normalized headers plus typed rows.
/// Mirrors the file's claimed layout; canonical renaming happens later.
#[derive(Debug)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Load a raw monthly export into memory, one `Sheet` per workbook sheet.
/// `.csv` exports load as a single sheet named after the file; anything
/// else goes through the workbook reader (`.xlsx`, `.xls`, `.ods`, ...).
/// Headers are trimmed + lowercased on the way in.
pub fn load_raw_export<P: AsRef<Path>>(path: P) -> Result<Vec<Sheet>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(vec![load_csv_sheet(path)?]),
        _ => load_workbook_sheets(path),
    }
}

fn load_workbook_sheets(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;

    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = workbook
            .worksheet_range(name)
            .with_context(|| format!("failed to read sheet `{}` of {}", name, path.display()))?;

        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row
                .iter()
                .map(|c| clean_field(&convert_cell(c).as_text()))
                .collect(),
            None => {
                warn!(sheet = %name, "sheet is empty, skipping");
                continue;
            }
        };

        let rows: Vec<Vec<Cell>> = rows_iter
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        debug!(sheet = %name, rows = rows.len(), "sheet loaded");
        sheets.push(Sheet {
            name: name.clone(),
            headers,
            rows,
        });
    }
    Ok(sheets)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::DateTime(naive),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => {
            warn!(error = ?e, "cell error in workbook, treating as empty");
            Cell::Empty
        }
    }
}

fn load_csv_sheet(path: &Path) -> Result<Sheet> {
    let file =
        File::open(path).with_context(|| format!("failed to open export {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers of {}", path.display()))?
        .iter()
        .map(clean_field)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("export")
        .to_string();
    Ok(Sheet {
        name,
        headers,
        rows,
    })
}
