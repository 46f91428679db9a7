//! Fixed paths and the canonical report schema.
//!
//! The pipeline has no CLI surface; every input and output location is a
//! constant here, and each raw export is paired with the month label it is
//! consolidated under.

/// Raw monthly export files and the month label each one covers.
pub const RAW_EXPORTS: &[(&str, &str)] = &[
    ("data/raw/order_report_sep.xlsx", "Sep"),
    ("data/raw/order_report_oct.xlsx", "Oct"),
];

/// Prior cumulative report, the base of the merge.
pub const OLD_MASTER_PATH: &str = "data/master/client_sales_by_month_report.csv";

pub const OUTPUT_DIR: &str = "data/out";
pub const OUTPUT_FILENAME: &str = "client_sales_master.csv";

/// Append-only run records live here.
pub const HISTORY_DIR: &str = "history";

/// Month labels in calendar order; report month columns follow this order.
pub const MONTHS_ORDER: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Transaction date column of the raw exports, after header normalization.
pub const DATE_COLUMN: &str = "orderdate";

/// Sales value column of the raw exports, after header normalization.
pub const SALES_VALUE_COLUMN: &str = "ptsrateordervalue";

/// Canonical descriptive columns, in output order. Together they form the
/// group key of one report row.
pub const DESCRIPTIVE_COLS: [&str; 6] = [
    "sourcezone",
    "sourcestate",
    "source_id",
    "sourcename",
    "distributor_type",
    "client_unique_id",
];

/// Raw export header spelling → canonical column name, in group-key order.
pub const COLUMN_MAPPING: [(&str, &str); 6] = [
    ("sourcezone", "sourcezone"),
    ("sourcestate", "sourcestate"),
    ("source id", "source_id"),
    ("sourcename", "sourcename"),
    ("distributor type", "distributor_type"),
    ("client unique id", "client_unique_id"),
];

/// Prefix shared by every generation of the running-total column.
pub const TOTAL_COL_PREFIX: &str = "Total_Sales";

/// Calendar position of a month label, matched case-insensitively.
pub fn month_index(label: &str) -> Option<usize> {
    let label = label.trim();
    MONTHS_ORDER
        .iter()
        .position(|m| m.eq_ignore_ascii_case(label))
}

/// Span-qualified name of the running-total column, e.g.
/// `Total_Sales_Jan_to_Oct` for a report covering Jan through Oct.
pub fn total_column_name(months: &[String]) -> String {
    match (months.first(), months.last()) {
        (Some(first), Some(last)) => format!("{}_{}_to_{}", TOTAL_COL_PREFIX, first, last),
        _ => TOTAL_COL_PREFIX.to_string(),
    }
}

/// True for any column carrying a previously computed running total,
/// whatever span it was named for.
pub fn is_total_column(header: &str) -> bool {
    header
        .trim()
        .to_lowercase()
        .starts_with(&TOTAL_COL_PREFIX.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_index_is_case_insensitive() {
        assert_eq!(month_index("Sep"), Some(8));
        assert_eq!(month_index("sep"), Some(8));
        assert_eq!(month_index(" OCT "), Some(9));
        assert_eq!(month_index("Sept"), None);
    }

    #[test]
    fn total_column_name_spans_first_to_last() {
        let months: Vec<String> = ["Jan", "Feb", "Oct"].iter().map(|m| m.to_string()).collect();
        assert_eq!(total_column_name(&months), "Total_Sales_Jan_to_Oct");
        assert_eq!(total_column_name(&[]), "Total_Sales");
    }

    #[test]
    fn total_column_detection_covers_stale_generations() {
        assert!(is_total_column("Total_Sales_Jan_to_Sep"));
        assert!(is_total_column("total_sales_jan_to_oct_16"));
        assert!(is_total_column(" Total_Sales "));
        assert!(!is_total_column("sourcename"));
        assert!(!is_total_column("Sep"));
    }
}
