use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use crate::commands::clean::{CleanKind, CleanOptions};
use crate::commands::{
    CommandReport, archive_download, archive_renormalize, clean, current_stats, status,
};
use crate::vrstats::audit;
use crate::vrstats::paths::resolve_paths;

#[derive(Debug, Parser)]
#[command(
    name = "vrstats",
    version,
    about = "Harvest and normalize Pennsylvania voter-registration statistics"
)]
struct Cli {
    /// Print the command report as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download archived statistics PDFs listed on the state statistics page.
    ArchiveDownload,
    /// Rename PDFs already in the archive directory to MM-YYYY.pdf.
    ArchiveRenormalize,
    /// Download the current statistics workbook and build county/total outputs.
    CurrentStats,
    /// Run a single spreadsheet cleaner on a local file.
    Clean {
        #[arg(value_enum)]
        kind: CleanKind,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Name the county output after its report date (county_YYYY_MM_DD.csv).
        #[arg(long)]
        date_stamp: bool,
    },
    /// Show resolved paths, configuration and environment overrides.
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let state = if report.ok { "ok" } else { "failed" };
    println!("{}: {state}", report.command);
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}

fn record_audit(command: &str, result: &Result<CommandReport>) {
    let Ok(paths) = resolve_paths() else {
        return;
    };
    let (status, message) = match result {
        Ok(report) if report.ok => ("ok", report.summary()),
        Ok(report) => ("issues", report.summary()),
        Err(err) => ("error", format!("{err:#}")),
    };
    if let Err(err) = audit::append_event(&paths, command, status, &message) {
        warn!(error = %err, "failed to append audit event");
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let (name, result) = match &cli.command {
        Command::ArchiveDownload => ("archive-download", archive_download::run()),
        Command::ArchiveRenormalize => ("archive-renormalize", archive_renormalize::run()),
        Command::CurrentStats => ("current-stats", current_stats::run()),
        Command::Clean {
            kind,
            input,
            output_dir,
            date_stamp,
        } => (
            "clean",
            clean::run(&CleanOptions {
                kind: *kind,
                input: input.clone(),
                output_dir: output_dir.clone(),
                date_stamp: *date_stamp,
            }),
        ),
        Command::Status => ("status", status::run()),
    };

    if !matches!(cli.command, Command::Status) {
        record_audit(name, &result);
    }

    let report = result?;
    print_report(&report, cli.json)?;
    if !report.ok {
        return Err(anyhow!("{} reported issues", report.command));
    }
    Ok(())
}
