use anyhow::Result;

use crate::commands::CommandReport;
use crate::vrstats::materialize::renormalize_existing;
use crate::vrstats::paths::resolve_paths;

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("archive-renormalize");
    report.detail(format!("archive_dir={}", paths.archive_dir.display()));

    let outcome = renormalize_existing(&paths.archive_dir)?;
    report.detail(format!("scanned={}", outcome.scanned));
    report.detail(format!("renamed={}", outcome.renamed.len()));
    report.detail(format!("already_canonical={}", outcome.already_canonical));
    report.detail(format!("unrecognized={}", outcome.unrecognized));
    for (from, to) in &outcome.renamed {
        report.detail(format!("renamed {from} -> {to}"));
    }

    Ok(report)
}
