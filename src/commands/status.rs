use anyhow::Result;
use std::env;

use crate::commands::CommandReport;
use crate::vrstats::config::{load_config, resolve_config_path};
use crate::vrstats::paths::resolve_paths;

include!(concat!(env!("OUT_DIR"), "/env_keys.rs"));

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("version={}", env!("CARGO_PKG_VERSION")));
    report.detail(format!("data_dir={}", paths.data_dir.display()));
    report.detail(format!("archive_dir={}", paths.archive_dir.display()));
    report.detail(format!("raw_dir={}", paths.raw_dir.display()));
    report.detail(format!("processed_dir={}", paths.processed_dir.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));

    match resolve_config_path() {
        Some(path) if path.exists() => report.detail(format!("config_file={}", path.display())),
        Some(path) => report.detail(format!("config_file={} (absent)", path.display())),
        None => report.detail("config_file=none"),
    }

    match load_config() {
        Ok(cfg) => {
            report.detail(format!("archive.listing_url={}", cfg.archive.listing_url));
            report.detail(format!("archive.base_origin={}", cfg.archive.base_origin));
            report.detail(format!(
                "archive.timeouts={}s/{}s",
                cfg.archive.listing_timeout_secs, cfg.archive.document_timeout_secs
            ));
            report.detail(format!("current.source_url={}", cfg.current.source_url));
        }
        Err(err) => report.issue(format!("config: {err:#}")),
    }

    for key in RECOGNIZED_ENV_KEYS {
        if env::var_os(key).is_some() {
            report.detail(format!("env.{key}=set"));
        }
    }

    if paths.archive_dir.exists() {
        let pdfs = std::fs::read_dir(&paths.archive_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == "pdf")
            })
            .count();
        report.detail(format!("archive.pdfs={pdfs}"));
    } else {
        report.detail("archive_dir missing (run archive-download)");
    }

    Ok(report)
}
