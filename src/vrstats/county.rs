use crate::vrstats::table::{Cell, Table, read_grid, table_from_grid, title_case, write_csv};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

pub const COUNTY_FILE_NAME: &str = "county.csv";
pub const METADATA_FILE_NAME: &str = "metadata.json";
pub const UNKNOWN_DATE: &str = "Unknown";

const HEADER_ROW: usize = 1;
const COUNTY_COLUMN: &str = "CountyName";
const COUNTY_ID_COLUMN: &str = "CountyID";
const TOTAL_COLUMN: &str = "Total";

const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("Dem", "Democrat"),
    ("Rep", "Republican"),
    ("No Aff", "No Affiliation"),
    ("Total Count of All Voters", "Total"),
];

pub const PARTY_COLUMNS: &[&str] = &["Democrat", "Republican", "No Affiliation", "Other"];

static REPORT_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})/(\d{2})/(\d{4})").expect("date pattern compiles"));

/// How the cleaned county file is named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputNaming {
    /// Always `county.csv`, which the totals step reads.
    #[default]
    Fixed,
    /// `county_YYYY_MM_DD.csv` from the report date, or
    /// `county_unknown_date.csv`.
    DateStamped,
}

/// `YYYY_MM_DD` for an `MM/DD/YYYY` report date.
pub fn date_suffix(last_updated: &str) -> String {
    match REPORT_DATE_REGEX.captures(last_updated) {
        Some(caps) => format!("{}_{}_{}", &caps[3], &caps[1], &caps[2]),
        None => "unknown_date".to_string(),
    }
}

pub fn output_file_name(naming: OutputNaming, last_updated: &str) -> String {
    match naming {
        OutputNaming::Fixed => COUNTY_FILE_NAME.to_string(),
        OutputNaming::DateStamped => {
            let (stem, ext) = COUNTY_FILE_NAME
                .rsplit_once('.')
                .unwrap_or((COUNTY_FILE_NAME, "csv"));
            format!("{stem}_{}.{ext}", date_suffix(last_updated))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyMetadata {
    pub last_updated: String,
    pub total_counties: usize,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct CountyOutcome {
    pub output_path: PathBuf,
    pub metadata_path: PathBuf,
    pub last_updated: String,
    pub headers: Vec<String>,
    pub rows: usize,
}

/// `MM/DD/YYYY` stamp from the title cell (A1) of the statewide sheet.
pub fn extract_report_date(grid: &[Vec<Cell>]) -> Option<String> {
    let title = grid.first()?.first()?.text();
    let caps = REPORT_DATE_REGEX.captures(&title)?;
    Some(format!("{}/{}/{}", &caps[1], &caps[2], &caps[3]))
}

fn share_percent(count: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

pub fn clean_county_table(grid: &[Vec<Cell>], source: &Path) -> Result<Table> {
    let mut table = table_from_grid(grid, HEADER_ROW);
    table.retain_columns(|h| !h.trim().is_empty() && !h.starts_with("Unnamed"));

    let county_idx = table.require_column(source, COUNTY_COLUMN)?;
    table
        .rows
        .retain(|row| !row[county_idx].text().to_lowercase().contains("total"));
    table.map_column(county_idx, |cell| Cell::Text(title_case(&cell.text())));

    table.rename_columns(COLUMN_RENAMES);

    let numeric = PARTY_COLUMNS
        .iter()
        .chain([TOTAL_COLUMN, COUNTY_ID_COLUMN].iter())
        .filter_map(|name| table.column_index(name))
        .collect::<Vec<_>>();
    for idx in numeric {
        table.map_column(idx, |cell| Cell::Int(cell.to_int_lenient()));
    }

    if !table.has_column(TOTAL_COLUMN) {
        let parts = PARTY_COLUMNS
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect::<Vec<_>>();
        let totals = table
            .rows
            .iter()
            .map(|row| Cell::Int(parts.iter().map(|i| row[*i].to_int_lenient()).sum()))
            .collect::<Vec<_>>();
        let at = table.headers.len();
        table.insert_column(at, TOTAL_COLUMN, totals);
    }

    let total_idx = table.require_column(source, TOTAL_COLUMN)?;
    let shares = PARTY_COLUMNS
        .iter()
        .filter_map(|party| {
            let idx = table.column_index(party)?;
            let values = table
                .rows
                .iter()
                .map(|row| {
                    Cell::Float(share_percent(
                        row[idx].to_int_lenient(),
                        row[total_idx].to_int_lenient(),
                    ))
                })
                .collect::<Vec<_>>();
            Some((*party, values))
        })
        .collect::<Vec<_>>();
    for (party, values) in shares {
        if let Some(idx) = table.column_index(party) {
            table.insert_column(idx + 1, &format!("{party} Share"), values);
        }
    }

    Ok(table)
}

pub fn write_metadata(path: &Path, metadata: &CountyMetadata) -> Result<()> {
    let data = serde_json::to_string_pretty(metadata)?;
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

/// Clean the statewide county sheet into `county.csv` plus `metadata.json`.
pub fn process_file(input: &Path, output_dir: &Path) -> Result<CountyOutcome> {
    process_file_named(input, output_dir, OutputNaming::Fixed)
}

pub fn process_file_named(
    input: &Path,
    output_dir: &Path,
    naming: OutputNaming,
) -> Result<CountyOutcome> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let grid = read_grid(input)?;
    let last_updated = extract_report_date(&grid).unwrap_or_else(|| UNKNOWN_DATE.to_string());
    let table = clean_county_table(&grid, input)?;

    let file_name = output_file_name(naming, &last_updated);
    let output_path = output_dir.join(&file_name);
    write_csv(&table, &output_path)?;

    let metadata_path = output_dir.join(METADATA_FILE_NAME);
    write_metadata(
        &metadata_path,
        &CountyMetadata {
            last_updated: last_updated.clone(),
            total_counties: table.len(),
            file_name,
        },
    )?;

    info!(
        input = %input.display(),
        output = %output_path.display(),
        date = %last_updated,
        rows = table.len(),
        "processed county statistics"
    );

    Ok(CountyOutcome {
        output_path,
        metadata_path,
        last_updated,
        headers: table.headers.clone(),
        rows: table.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sample_grid() -> Vec<Vec<Cell>> {
        vec![
            vec![text("Voter Registration Statistics as of 03/04/2025")],
            vec![
                text("CountyID"),
                text("CountyName"),
                text("Dem"),
                text("Rep"),
                text("No Aff"),
                text("Other"),
                text("Total Count of All Voters"),
                Cell::Empty,
            ],
            vec![
                Cell::Float(1.0),
                text("ADAMS"),
                text("20,000"),
                Cell::Float(50000.0),
                text("5000"),
                text("25000"),
                text("100,000"),
                Cell::Empty,
            ],
            vec![
                Cell::Float(2.0),
                text("ALLEGHENY"),
                text("600000"),
                text("300000"),
                text("50000"),
                text("50000"),
                text("1000000"),
                Cell::Empty,
            ],
            vec![
                Cell::Empty,
                text("Statewide Totals"),
                text("620000"),
                text("350000"),
                text("55000"),
                text("75000"),
                text("1100000"),
                Cell::Empty,
            ],
        ]
    }

    #[test]
    fn report_date_comes_from_title_cell() {
        assert_eq!(
            extract_report_date(&sample_grid()).as_deref(),
            Some("03/04/2025")
        );
        assert_eq!(extract_report_date(&[vec![text("no date")]]), None);
        assert_eq!(extract_report_date(&[]), None);
    }

    #[test]
    fn cleans_renames_and_adds_shares() {
        let table = clean_county_table(&sample_grid(), Path::new("sample.xls")).expect("clean");
        assert_eq!(
            table.headers,
            vec![
                "CountyID",
                "CountyName",
                "Democrat",
                "Democrat Share",
                "Republican",
                "Republican Share",
                "No Affiliation",
                "No Affiliation Share",
                "Other",
                "Other Share",
                "Total",
            ]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Int(1));
        assert_eq!(table.rows[0][1], text("Adams"));
        assert_eq!(table.rows[0][2], Cell::Int(20000));
        assert_eq!(table.rows[0][3], Cell::Float(20.0));
        assert_eq!(table.rows[0][5], Cell::Float(50.0));
        assert_eq!(table.rows[1][1], text("Allegheny"));
    }

    #[test]
    fn computes_total_when_missing() {
        let grid = vec![
            vec![text("title")],
            vec![text("CountyName"), text("Dem"), text("Rep")],
            vec![text("BUCKS"), text("3"), text("1")],
        ];
        let table = clean_county_table(&grid, Path::new("x.xls")).expect("clean");
        let total_idx = table.column_index("Total").expect("total");
        assert_eq!(table.rows[0][total_idx], Cell::Int(4));
        let share_idx = table.column_index("Democrat Share").expect("share");
        assert_eq!(table.rows[0][share_idx], Cell::Float(75.0));
    }

    #[test]
    fn zero_total_gives_zero_share() {
        assert_eq!(share_percent(5, 0), 0.0);
        assert_eq!(share_percent(1, 3), 33.33);
    }

    #[test]
    fn missing_county_column_is_an_error() {
        let grid = vec![vec![text("title")], vec![text("Name"), text("Dem")]];
        let err = clean_county_table(&grid, Path::new("x.xls")).expect_err("missing column");
        assert!(err.to_string().contains("CountyName"));
    }

    #[test]
    fn date_stamped_name_uses_report_date() {
        assert_eq!(date_suffix("03/04/2025"), "2025_03_04");
        assert_eq!(date_suffix(UNKNOWN_DATE), "unknown_date");
        assert_eq!(output_file_name(OutputNaming::Fixed, "03/04/2025"), "county.csv");
        assert_eq!(
            output_file_name(OutputNaming::DateStamped, "03/04/2025"),
            "county_2025_03_04.csv"
        );
        assert_eq!(
            output_file_name(OutputNaming::DateStamped, UNKNOWN_DATE),
            "county_unknown_date.csv"
        );
    }

    #[test]
    fn date_stamped_run_records_stamped_file_in_metadata() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let input = tmp.path().join("current.csv");
        std::fs::write(
            &input,
            "Statistics as of 11/05/2024,,\nCountyID,CountyName,Dem\n1,ADAMS,10\n",
        )
        .expect("write input");

        let out = process_file_named(&input, tmp.path(), OutputNaming::DateStamped)
            .expect("process");

        assert_eq!(out.output_path, tmp.path().join("county_2024_11_05.csv"));
        assert!(out.output_path.is_file());
        let meta: CountyMetadata = serde_json::from_str(
            &std::fs::read_to_string(&out.metadata_path).expect("read metadata"),
        )
        .expect("parse metadata");
        assert_eq!(meta.file_name, "county_2024_11_05.csv");
        assert_eq!(meta.last_updated, "11/05/2024");
    }
}
