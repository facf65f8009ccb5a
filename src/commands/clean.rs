use anyhow::Result;
use clap::ValueEnum;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::vrstats::county::OutputNaming;
use crate::vrstats::paths::resolve_paths;
use crate::vrstats::{congress, county, proper_case, total};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CleanKind {
    County,
    Congress,
    Total,
    ProperCase,
}

#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub kind: CleanKind,
    pub input: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub date_stamp: bool,
}

pub fn run(opts: &CleanOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("clean");
    let output_dir = match &opts.output_dir {
        Some(dir) => dir.clone(),
        None => resolve_paths()?.processed_dir,
    };

    report.detail(format!("input={}", opts.input.display()));
    report.detail(format!("output_dir={}", output_dir.display()));

    if !opts.input.is_file() {
        report.issue(format!("input file not found: {}", opts.input.display()));
        return Ok(report);
    }

    if opts.date_stamp && opts.kind != CleanKind::County {
        report.detail("date_stamp only applies to county; using the default name");
    }

    let written = match opts.kind {
        CleanKind::County => {
            let naming = if opts.date_stamp {
                OutputNaming::DateStamped
            } else {
                OutputNaming::Fixed
            };
            county::process_file_named(&opts.input, &output_dir, naming)?.output_path
        }
        CleanKind::Congress => congress::process_file(&opts.input, &output_dir)?,
        CleanKind::Total => total::process_file(&opts.input, &output_dir)?.output_path,
        CleanKind::ProperCase => proper_case::process_file(&opts.input, &output_dir)?,
    };
    report.detail(format!("wrote {}", written.display()));

    Ok(report)
}
