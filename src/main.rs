use anyhow::{bail, Context, Result};
use chrono::Utc;
use dmsreport::{
    config,
    history::{History, RunRecord},
    load, process, report,
};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) history ──────────────────────────────────────────────────
    let history = History::new(config::HISTORY_DIR)?;
    let seen = history.load_consolidated()?;
    info!("{} exports consolidated in earlier runs", seen.len());

    // ─── 3) consolidate each configured raw export ───────────────────
    let mut summaries = Vec::with_capacity(config::RAW_EXPORTS.len());
    for &(path, month) in config::RAW_EXPORTS {
        if seen.contains(path) {
            info!(file = path, "seen in an earlier run; rebuilding anyway");
        }
        let summary = process::consolidate::consolidate_month(path, month);
        if summary.is_empty() {
            bail!("consolidation produced no rows for {} ({})", path, month);
        }
        summaries.push(summary);
    }

    // ─── 4) load the prior master ────────────────────────────────────
    let remerged: Vec<String> = summaries.iter().map(|s| s.month.clone()).collect();
    let snapshot = load::load_master(config::OLD_MASTER_PATH, &remerged)
        .with_context(|| format!("could not load old master {}", config::OLD_MASTER_PATH))?;

    // ─── 5) merge and recompute totals ───────────────────────────────
    let merged = process::merge::merge_into_master(snapshot, &summaries);

    // ─── 6) write the final report ───────────────────────────────────
    let out_path = report::write_master_csv(
        &merged,
        Path::new(config::OUTPUT_DIR),
        config::OUTPUT_FILENAME,
    )?;

    // ─── 7) record history ───────────────────────────────────────────
    for (&(path, _), summary) in config::RAW_EXPORTS.iter().zip(&summaries) {
        history.record(&RunRecord {
            file: path.to_string(),
            month: summary.month.clone(),
            rows_in: summary.rows_loaded,
            rows_aggregated: summary.sales.len(),
            recorded_at: Utc::now(),
        })?;
    }

    info!(
        rows = merged.len(),
        months = merged.months.len(),
        path = %out_path.display(),
        "master report updated"
    );
    Ok(())
}
