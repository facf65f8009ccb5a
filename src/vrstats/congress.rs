use crate::vrstats::table::{Cell, Table, read_table, write_csv};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CONGRESS_FILE_NAME: &str = "congress.csv";

const DISTRICT_COLUMN: &str = "DistrictCode";
const COUNTY_COLUMN: &str = "CountyName";
const SUBTOTAL_MARKER: &str = "sub total";
const NUMERIC_COLUMNS: &[&str] = &[
    "Democratic",
    "Republican",
    "Libertarian",
    "Green",
    "No Affiliation",
    "Other",
    "Total",
];

/// District sub-total rows, one per congressional district, sorted by code.
pub fn clean_congress_table(mut table: Table, source: &Path) -> Result<Table> {
    table.retain_columns(|h| !h.trim().is_empty() && !h.starts_with("Unnamed"));
    let district_idx = table.require_column(source, DISTRICT_COLUMN)?;
    let county_idx = table.require_column(source, COUNTY_COLUMN)?;

    // District code only appears on the first row of each block.
    let mut last_code = Cell::Empty;
    for row in &mut table.rows {
        if row[district_idx].is_empty() {
            row[district_idx] = last_code.clone();
        } else {
            last_code = row[district_idx].clone();
        }
    }

    table.rows.retain(|row| {
        row[county_idx]
            .text()
            .to_lowercase()
            .contains(SUBTOTAL_MARKER)
    });
    table.drop_column(COUNTY_COLUMN);

    let district_idx = table.require_column(source, DISTRICT_COLUMN)?;
    table.map_column(district_idx, |cell| Cell::Int(cell.to_int_lenient()));
    for name in NUMERIC_COLUMNS {
        if let Some(idx) = table.column_index(name) {
            table.map_column(idx, |cell| Cell::Int(cell.to_int_lenient()));
        }
    }
    table
        .rows
        .sort_by_key(|row| row[district_idx].to_int_lenient());

    let order = std::iter::once(DISTRICT_COLUMN)
        .chain(NUMERIC_COLUMNS.iter().copied())
        .collect::<Vec<_>>();
    Ok(table.select_columns(&order))
}

pub fn process_file(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let table = clean_congress_table(read_table(input, 0)?, input)?;
    let output_path = output_dir.join(CONGRESS_FILE_NAME);
    write_csv(&table, &output_path)?;

    info!(
        input = %input.display(),
        output = %output_path.display(),
        districts = table.len(),
        "processed congressional district statistics"
    );
    Ok(output_path)
}
