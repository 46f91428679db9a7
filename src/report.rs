use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::config::DESCRIPTIVE_COLS;
use crate::process::merge::MasterReport;
use crate::process::normalize::format_number;

/// Write the merged report as CSV: descriptive columns, months in calendar
/// order, then the running total. Creates `out_dir` if absent and returns
/// the written path. Row order follows the group-key ordering, so identical
/// inputs produce an identical file.
#[tracing::instrument(level = "info", skip(report, out_dir), fields(rows = report.len()))]
pub fn write_master_csv(report: &MasterReport, out_dir: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let path = out_dir.join(file_name);
    let file = File::create(&path)
        .with_context(|| format!("creating report file {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

    let mut header: Vec<String> = DESCRIPTIVE_COLS.iter().map(|c| c.to_string()).collect();
    header.extend(report.months.iter().cloned());
    header.push(report.total_column.clone());
    writer
        .write_record(&header)
        .context("writing report header")?;

    for (key, values) in &report.rows {
        let mut record: Vec<String> = key.fields().iter().map(|f| f.to_string()).collect();
        record.extend(values.iter().map(|v| format_number(*v)));
        record.push(format_number(MasterReport::row_total(values)));
        writer
            .write_record(&record)
            .context("writing report record")?;
    }

    writer.flush().context("flushing report")?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::load_master;
    use crate::process::merge::merge_into_master;
    use crate::process::{GroupKey, MonthSummary};
    use anyhow::Result;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn sample_report() -> MasterReport {
        let mut sales = BTreeMap::new();
        sales.insert(
            GroupKey::new("north", "tn", "s01", "acme", "super", "1001"),
            100.0,
        );
        sales.insert(
            GroupKey::new("south", "kl", "s02", "zenith", "sub", "2002"),
            42.5,
        );
        let summary = MonthSummary {
            month: "Sep".to_string(),
            sales,
            rows_loaded: 2,
            rows_matched: 2,
        };
        merge_into_master(Default::default(), &[summary])
    }

    #[test]
    fn header_and_totals_line_up() -> Result<()> {
        let dir = tempdir()?;
        let path = write_master_csv(&sample_report(), dir.path(), "out.csv")?;

        let content = fs::read_to_string(&path)?;
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "sourcezone,sourcestate,source_id,sourcename,distributor_type,client_unique_id,Sep,Total_Sales_Sep_to_Sep"
        );
        assert_eq!(
            lines.next().unwrap(),
            "north,tn,s01,acme,super,1001,100,100"
        );
        assert_eq!(
            lines.next().unwrap(),
            "south,kl,s02,zenith,sub,2002,42.5,42.5"
        );
        Ok(())
    }

    #[test]
    fn written_report_reloads_as_a_snapshot() -> Result<()> {
        // the written file must be a valid merge base for the next run
        let dir = tempdir()?;
        let path = write_master_csv(&sample_report(), dir.path(), "out.csv")?;

        let snapshot = load_master(&path, &[])?;
        assert_eq!(snapshot.months, vec!["Sep"]);
        assert_eq!(snapshot.len(), 2);
        let key = GroupKey::new("north", "tn", "s01", "acme", "super", "1001");
        assert_eq!(snapshot.rows[&key], vec![100.0]);
        Ok(())
    }

    #[test]
    fn rewriting_identical_inputs_is_byte_identical() -> Result<()> {
        let dir = tempdir()?;
        let a = write_master_csv(&sample_report(), dir.path(), "a.csv")?;
        let b = write_master_csv(&sample_report(), dir.path(), "b.csv")?;
        assert_eq!(fs::read_to_string(a)?, fs::read_to_string(b)?);
        Ok(())
    }
}
