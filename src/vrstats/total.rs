use crate::vrstats::county::{METADATA_FILE_NAME, UNKNOWN_DATE};
use crate::vrstats::table::{Cell, Table, read_table, write_csv};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TOTAL_FILE_NAME: &str = "total.csv";
const LEGACY_METADATA_FILE_NAME: &str = "total_metadata.json";
const PARTY_ORDER: &[&str] = &["Democrat", "Republican", "No Affiliation", "Other", "Total"];

#[derive(Debug, Clone, Serialize)]
pub struct CountyArtifact {
    pub file_name: String,
    pub total_counties: usize,
    pub rows_in_source: usize,
    pub source_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsArtifact {
    pub file_name: String,
    pub parties_included: Vec<String>,
    pub totals_by_party: BTreeMap<String, i64>,
    pub source_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Artifacts {
    pub county: CountyArtifact,
    pub totals: TotalsArtifact,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedMetadata {
    pub last_updated: String,
    pub generated_at_utc: String,
    pub file_name: String,
    pub total_counties: usize,
    pub artifacts: Artifacts,
}

#[derive(Debug, Clone)]
pub struct TotalOutcome {
    pub output_path: PathBuf,
    pub metadata_path: PathBuf,
    pub totals: Vec<(String, i64)>,
}

/// Statewide sum of each party column present, in a fixed party order.
pub fn summarize(table: &Table) -> Vec<(String, i64)> {
    PARTY_ORDER
        .iter()
        .filter_map(|party| {
            let idx = table.column_index(party)?;
            Some((party.to_string(), table.column_sum(idx)))
        })
        .collect()
}

fn summary_table(totals: &[(String, i64)]) -> Table {
    Table {
        headers: vec!["Party".to_string(), "Total".to_string()],
        rows: totals
            .iter()
            .map(|(party, total)| vec![Cell::Text(party.clone()), Cell::Int(*total)])
            .collect(),
    }
}

fn read_existing_metadata(path: &Path) -> Value {
    let Ok(raw) = fs::read_to_string(path) else {
        return Value::Null;
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable metadata");
            Value::Null
        }
    }
}

pub fn consolidate_metadata(
    existing: &Value,
    county_file_name: &str,
    county_rows: usize,
    totals: &[(String, i64)],
    generated_at_utc: String,
) -> ConsolidatedMetadata {
    let source_date = existing
        .get("last_updated")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_DATE)
        .to_string();
    let file_name = existing
        .get("file_name")
        .and_then(Value::as_str)
        .unwrap_or(county_file_name)
        .to_string();
    let total_counties = existing
        .get("total_counties")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(county_rows);

    ConsolidatedMetadata {
        last_updated: source_date.clone(),
        generated_at_utc,
        file_name,
        total_counties,
        artifacts: Artifacts {
            county: CountyArtifact {
                file_name: county_file_name.to_string(),
                total_counties: county_rows,
                rows_in_source: county_rows,
                source_date: source_date.clone(),
            },
            totals: TotalsArtifact {
                file_name: TOTAL_FILE_NAME.to_string(),
                parties_included: totals.iter().map(|(p, _)| p.clone()).collect(),
                totals_by_party: totals.iter().cloned().collect(),
                source_date,
            },
        },
    }
}

/// Sum the cleaned county table into `total.csv` and fold both artifacts
/// into one consolidated `metadata.json`.
pub fn process_file(county_path: &Path, output_dir: &Path) -> Result<TotalOutcome> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let table = read_table(county_path, 0)?;
    if table.is_empty() {
        warn!(path = %county_path.display(), "county table has no rows; totals will be zero");
    }
    let totals = summarize(&table);

    let output_path = output_dir.join(TOTAL_FILE_NAME);
    write_csv(&summary_table(&totals), &output_path)?;
    info!(output = %output_path.display(), parties = totals.len(), "created totals summary");

    let metadata_path = output_dir.join(METADATA_FILE_NAME);
    let county_file_name = county_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let consolidated = consolidate_metadata(
        &read_existing_metadata(&metadata_path),
        county_file_name,
        table.len(),
        &totals,
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    );
    let data = serde_json::to_string_pretty(&consolidated)?;
    fs::write(&metadata_path, data)
        .with_context(|| format!("failed to write {}", metadata_path.display()))?;
    info!(path = %metadata_path.display(), "updated consolidated metadata");

    let legacy = output_dir.join(LEGACY_METADATA_FILE_NAME);
    if legacy.exists() {
        fs::remove_file(&legacy)
            .with_context(|| format!("failed to remove {}", legacy.display()))?;
        info!(path = %legacy.display(), "removed legacy totals metadata");
    }

    Ok(TotalOutcome {
        output_path,
        metadata_path,
        totals,
    })
}
