use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::commands::CommandReport;
use crate::vrstats::config::load_config;
use crate::vrstats::http::HttpFetcher;
use crate::vrstats::paths::resolve_paths;
use crate::vrstats::{county, total};

/// Download the current statistics workbook, clean it per county and sum
/// the statewide totals.
pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config()?;
    let mut report = CommandReport::new("current-stats");

    for dir in [&paths.raw_dir, &paths.processed_dir] {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let fetcher = HttpFetcher::new(cfg.current.timeout_secs)?;
    let bytes = fetcher
        .get_bytes(&cfg.current.source_url)
        .context("failed to download current statistics")?;
    let raw_path = paths.raw_dir.join(&cfg.current.raw_file_name);
    fs::write(&raw_path, &bytes)
        .with_context(|| format!("failed to write {}", raw_path.display()))?;
    info!(path = %raw_path.display(), bytes = bytes.len(), "downloaded current statistics");
    report.detail(format!("raw={}", raw_path.display()));

    let county = county::process_file(&raw_path, &paths.processed_dir)?;
    report.detail(format!("county={}", county.output_path.display()));
    report.detail(format!("county.metadata={}", county.metadata_path.display()));
    report.detail(format!("county.rows={}", county.rows));
    report.detail(format!("county.last_updated={}", county.last_updated));
    report.detail(format!("county.headers={}", county.headers.join("|")));

    let totals = total::process_file(&county.output_path, &paths.processed_dir)?;
    report.detail(format!("total={}", totals.output_path.display()));
    for (party, sum) in &totals.totals {
        report.detail(format!("total.{party}={sum}"));
    }
    report.detail(format!("metadata={}", totals.metadata_path.display()));

    Ok(report)
}
