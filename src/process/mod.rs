// src/process/mod.rs
pub mod consolidate;
pub mod date_parser;
pub mod merge;
pub mod normalize;

use std::collections::BTreeMap;

use crate::process::normalize::{clean_client_id, clean_field};

/// The tuple of descriptive fields identifying one client/source row of the
/// report. All fields are held in normalized form (trim + lowercase, client
/// id additionally stripped of a `.0` artifact), so two keys that differ
/// only in formatting compare equal. `Ord` gives the report its stable row
/// order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub sourcezone: String,
    pub sourcestate: String,
    pub source_id: String,
    pub sourcename: String,
    pub distributor_type: String,
    pub client_unique_id: String,
}

impl GroupKey {
    pub fn new(
        sourcezone: &str,
        sourcestate: &str,
        source_id: &str,
        sourcename: &str,
        distributor_type: &str,
        client_unique_id: &str,
    ) -> Self {
        GroupKey {
            sourcezone: clean_field(sourcezone),
            sourcestate: clean_field(sourcestate),
            source_id: clean_field(source_id),
            sourcename: clean_field(sourcename),
            distributor_type: clean_field(distributor_type),
            client_unique_id: clean_client_id(client_unique_id),
        }
    }

    /// Field values in canonical column order.
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.sourcezone,
            &self.sourcestate,
            &self.source_id,
            &self.sourcename,
            &self.distributor_type,
            &self.client_unique_id,
        ]
    }
}

/// One consolidated month: summed sales per group key, plus the row counts
/// that went into it (for logging and the run history).
#[derive(Debug, Default)]
pub struct MonthSummary {
    /// Month label this summary covers, e.g. `"Sep"`.
    pub month: String,
    pub sales: BTreeMap<GroupKey, f64>,
    /// Rows read across all sheets, before the month filter.
    pub rows_loaded: usize,
    /// Rows that matched the target month.
    pub rows_matched: usize,
}

impl MonthSummary {
    pub fn new(month: &str) -> Self {
        MonthSummary {
            month: month.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}
