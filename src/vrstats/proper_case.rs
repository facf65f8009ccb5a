use crate::vrstats::table::{Cell, Table, read_table, title_case, write_csv};
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Title-case the first column (county or member names in the house and
/// senate sheets).
pub fn proper_case_first_column(table: &mut Table) {
    if table.headers.is_empty() {
        return;
    }
    table.map_column(0, |cell| match cell {
        Cell::Empty => Cell::Empty,
        other => Cell::Text(title_case(&other.text())),
    });
}

pub fn process_file(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut table = read_table(input, 0)?;
    proper_case_first_column(&mut table);

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("input {} has no file name", input.display()))?;
    let output_path = output_dir.join(format!("{stem}.csv"));
    write_csv(&table, &output_path)?;

    info!(input = %input.display(), output = %output_path.display(), "proper-cased first column");
    Ok(output_path)
}
