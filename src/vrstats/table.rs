use crate::error::VrStatsError;
use anyhow::{Context, Result};
use calamine::{DataType, Reader, open_workbook_auto};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Integer value with thousands separators stripped; anything that does
    /// not parse counts as zero.
    pub fn to_int_lenient(&self) -> i64 {
        match self {
            Cell::Int(i) => *i,
            Cell::Float(f) if f.is_finite() => *f as i64,
            Cell::Text(s) => {
                let cleaned = s.replace(',', "");
                let cleaned = cleaned.trim();
                cleaned
                    .parse::<i64>()
                    .ok()
                    .or_else(|| {
                        cleaned
                            .parse::<f64>()
                            .ok()
                            .filter(|f| f.is_finite())
                            .map(|f| f as i64)
                    })
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&DataType> for Cell {
    fn from(value: &DataType) -> Self {
        match value {
            DataType::Empty => Cell::Empty,
            DataType::Int(i) => Cell::Int(*i),
            DataType::Float(f) => Cell::Float(*f),
            DataType::String(s) => Cell::Text(s.clone()),
            DataType::Bool(b) => Cell::Text(b.to_string()),
            other => Cell::Text(format!("{other:?}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn require_column(&self, source: &Path, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            VrStatsError::MissingColumn {
                path: source.display().to_string(),
                column: name.to_string(),
            }
            .into()
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn retain_columns(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let kept = self
            .headers
            .iter()
            .map(|h| keep(h.as_str()))
            .collect::<Vec<_>>();
        let headers = std::mem::take(&mut self.headers);
        self.headers = headers
            .into_iter()
            .zip(kept.iter())
            .filter_map(|(h, k)| k.then_some(h))
            .collect();
        for row in &mut self.rows {
            let cells = std::mem::take(row);
            *row = cells
                .into_iter()
                .zip(kept.iter())
                .filter_map(|(c, k)| k.then_some(c))
                .collect();
        }
    }

    pub fn drop_column(&mut self, name: &str) {
        self.retain_columns(|h| h != name);
    }

    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) {
        for header in &mut self.headers {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == header.as_str()) {
                *header = (*to).to_string();
            }
        }
    }

    pub fn map_column(&mut self, index: usize, mut f: impl FnMut(&Cell) -> Cell) {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }

    pub fn insert_column(&mut self, index: usize, name: &str, values: Vec<Cell>) {
        let index = index.min(self.headers.len());
        self.headers.insert(index, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            let at = index.min(row.len());
            row.insert(at, value);
        }
    }

    /// Keep only `order` columns that exist, in that order.
    pub fn select_columns(&self, order: &[&str]) -> Table {
        let indices = order
            .iter()
            .filter_map(|name| self.column_index(name))
            .collect::<Vec<_>>();
        Table {
            headers: indices.iter().map(|i| self.headers[*i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    indices
                        .iter()
                        .map(|i| row.get(*i).cloned().unwrap_or(Cell::Empty))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn column_sum(&self, index: usize) -> i64 {
        self.rows
            .iter()
            .map(|row| row.get(index).map(Cell::to_int_lenient).unwrap_or(0))
            .sum()
    }
}

/// Build a table from raw rows, using `header_row` as column names and the
/// rows after it as data. Short rows are padded so every row has one cell
/// per header.
pub fn table_from_grid(grid: &[Vec<Cell>], header_row: usize) -> Table {
    let Some(header) = grid.get(header_row) else {
        return Table::default();
    };
    let headers = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = cell.text().trim().to_string();
            if name.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name
            }
        })
        .collect::<Vec<_>>();

    let rows = grid
        .iter()
        .skip(header_row + 1)
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .map(|row| {
            let mut cells = row.iter().take(headers.len()).cloned().collect::<Vec<_>>();
            cells.resize(headers.len(), Cell::Empty);
            cells
        })
        .collect();

    Table { headers, rows }
}

fn read_workbook_grid(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open spreadsheet {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| VrStatsError::EmptyWorkbook {
            path: path.display().to_string(),
        })?
        .with_context(|| format!("failed to read first worksheet of {}", path.display()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(Cell::from).collect())
        .collect())
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("failed to read {}", path.display()))?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

/// Raw cell grid of the first worksheet (or of a CSV file).
pub fn read_grid(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        read_csv_grid(path)
    } else {
        read_workbook_grid(path)
    }
}

pub fn read_table(path: &Path, header_row: usize) -> Result<Table> {
    Ok(table_from_grid(&read_grid(path)?, header_row))
}

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::text))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
