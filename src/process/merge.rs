use std::collections::BTreeMap;
use tracing::info;

use crate::config;
use crate::load::MasterSnapshot;
use crate::process::{GroupKey, MonthSummary};

/// The merged cumulative report: every known month in calendar order, one
/// zero-filled value row per group key. The running total is derived at
/// write time from `months`, never stored, so it cannot drift from the row.
#[derive(Debug)]
pub struct MasterReport {
    pub months: Vec<String>,
    pub total_column: String,
    pub rows: BTreeMap<GroupKey, Vec<f64>>,
}

impl MasterReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-wise running total.
    pub fn row_total(values: &[f64]) -> f64 {
        values.iter().sum()
    }
}

/// Outer-join each consolidated month onto the base snapshot by group key.
/// Rows present on only one side are zero-filled on the other; a summary
/// for a month the report already carries overwrites that column (this is
/// how a correction run re-states a month). Summaries apply in the given
/// order.
#[tracing::instrument(level = "info", skip(base, summaries), fields(base_rows = base.len(), merged = summaries.len()))]
pub fn merge_into_master(base: MasterSnapshot, summaries: &[MonthSummary]) -> MasterReport {
    // 1) final month set, calendar order
    let mut months: Vec<String> = base.months.clone();
    for summary in summaries {
        if !months.iter().any(|m| m.eq_ignore_ascii_case(&summary.month)) {
            months.push(summary.month.clone());
        }
    }
    months.sort_by_key(|m| config::month_index(m).unwrap_or(usize::MAX));

    // 2) re-seat base rows into the widened month layout
    let base_pos: Vec<usize> = base
        .months
        .iter()
        .map(|m| {
            months
                .iter()
                .position(|n| n.eq_ignore_ascii_case(m))
                .expect("base month survives into merged set")
        })
        .collect();
    let mut rows: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for (key, old_values) in base.rows {
        let mut values = vec![0.0; months.len()];
        for (i, v) in old_values.into_iter().enumerate() {
            values[base_pos[i]] = v;
        }
        rows.insert(key, values);
    }

    // 3) outer-join each summary
    let width = months.len();
    for summary in summaries {
        let pos = months
            .iter()
            .position(|m| m.eq_ignore_ascii_case(&summary.month))
            .expect("summary month is in merged set");
        for (key, value) in &summary.sales {
            let values = rows
                .entry(key.clone())
                .or_insert_with(|| vec![0.0; width]);
            values[pos] = *value;
        }
        info!(month = %summary.month, groups = summary.sales.len(), "month merged");
    }

    let total_column = config::total_column_name(&months);
    MasterReport {
        months,
        total_column,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(client: &str) -> GroupKey {
        GroupKey::new("north", "tn", "s01", "acme", "super", client)
    }

    fn snapshot(months: &[&str], rows: Vec<(GroupKey, Vec<f64>)>) -> MasterSnapshot {
        MasterSnapshot {
            months: months.iter().map(|m| m.to_string()).collect(),
            rows: rows.into_iter().collect(),
        }
    }

    fn summary(month: &str, sales: Vec<(GroupKey, f64)>) -> MonthSummary {
        MonthSummary {
            month: month.to_string(),
            sales: sales.into_iter().collect(),
            rows_loaded: 0,
            rows_matched: 0,
        }
    }

    #[test]
    fn new_client_gets_zero_filled_prior_months() {
        let base = snapshot(&["Jan", "Feb"], vec![(key("1001"), vec![10.0, 20.0])]);
        let merged = merge_into_master(base, &[summary("Sep", vec![(key("2002"), 100.0)])]);

        assert_eq!(merged.months, vec!["Jan", "Feb", "Sep"]);
        assert_eq!(merged.total_column, "Total_Sales_Jan_to_Sep");
        assert_eq!(merged.rows[&key("1001")], vec![10.0, 20.0, 0.0]);
        // first-ever Sep sale: Sep = 100, everything prior zero
        assert_eq!(merged.rows[&key("2002")], vec![0.0, 0.0, 100.0]);
        assert_eq!(MasterReport::row_total(&merged.rows[&key("2002")]), 100.0);
    }

    #[test]
    fn existing_client_keeps_prior_months() {
        let base = snapshot(&["Jan"], vec![(key("1001"), vec![10.0])]);
        let merged = merge_into_master(base, &[summary("Sep", vec![(key("1001"), 90.0)])]);
        assert_eq!(merged.rows[&key("1001")], vec![10.0, 90.0]);
        assert_eq!(MasterReport::row_total(&merged.rows[&key("1001")]), 100.0);
    }

    #[test]
    fn months_end_up_in_calendar_order_regardless_of_merge_order() {
        let base = snapshot(&["Jan"], vec![(key("1001"), vec![10.0])]);
        let merged = merge_into_master(
            base,
            &[
                summary("Oct", vec![(key("1001"), 5.0)]),
                summary("Sep", vec![(key("1001"), 7.0)]),
            ],
        );
        assert_eq!(merged.months, vec!["Jan", "Sep", "Oct"]);
        assert_eq!(merged.rows[&key("1001")], vec![10.0, 7.0, 5.0]);
        assert_eq!(merged.total_column, "Total_Sales_Jan_to_Oct");
    }

    #[test]
    fn correction_run_restates_a_month() {
        let base = snapshot(&["Jan", "Sep"], vec![(key("1001"), vec![10.0, 999.0])]);
        let merged = merge_into_master(base, &[summary("Sep", vec![(key("1001"), 90.0)])]);
        assert_eq!(merged.rows[&key("1001")], vec![10.0, 90.0]);
    }

    #[test]
    fn empty_base_is_just_the_new_months() {
        let merged = merge_into_master(
            MasterSnapshot::default(),
            &[summary("Sep", vec![(key("1001"), 100.0)])],
        );
        assert_eq!(merged.months, vec!["Sep"]);
        assert_eq!(merged.rows[&key("1001")], vec![100.0]);
        assert_eq!(merged.total_column, "Total_Sales_Sep_to_Sep");
    }
}
