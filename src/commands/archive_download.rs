use anyhow::{Context, Result};
use url::Url;

use crate::commands::CommandReport;
use crate::vrstats::config::load_config;
use crate::vrstats::harvest::{HarvestSettings, harvest_html};
use crate::vrstats::http::HttpFetcher;
use crate::vrstats::materialize::fetch_all;
use crate::vrstats::paths::resolve_paths;

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config()?;
    let mut report = CommandReport::new("archive-download");

    report.detail(format!("archive_dir={}", paths.archive_dir.display()));
    report.detail(format!("listing_url={}", cfg.archive.listing_url));

    let settings = HarvestSettings {
        base_origin: Url::parse(&cfg.archive.base_origin)
            .with_context(|| format!("invalid base origin {}", cfg.archive.base_origin))?,
        container_id_suffix: cfg.archive.container_id_suffix.clone(),
    };

    let listing_fetcher = HttpFetcher::new(cfg.archive.listing_timeout_secs)?;
    let listing = listing_fetcher
        .get_text(&cfg.archive.listing_url)
        .context("failed to fetch archive listing")?;
    let items = harvest_html(&listing, &settings);
    report.detail(format!("manifest.items={}", items.len()));

    let document_fetcher = HttpFetcher::new(cfg.archive.document_timeout_secs)?;
    let outcome = fetch_all(&document_fetcher, &items, &paths.archive_dir)?;

    report.detail(format!("downloaded={}", outcome.written.len()));
    report.detail(format!("collision_suffixed={}", outcome.collisions));
    for path in &outcome.written {
        report.detail(format!("wrote {}", path.display()));
    }
    if outcome.skipped > 0 {
        report.detail(format!("skipped_without_url={}", outcome.skipped));
    }

    Ok(report)
}
