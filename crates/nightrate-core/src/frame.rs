//! In-memory tabular data.
//!
//! A `Frame` is an ordered collection of equally long named columns. Cells
//! are numeric, textual, or missing; preparation (`crate::prepare`) turns a
//! raw frame into a purely numeric one before any model sees it.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// One cell of a tabular dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Parse a raw CSV field. Empty and NaN fields are missing; fields that
    /// parse as f64 are numeric; everything else is text.
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            // "NaN" spellings parse as f64 but carry no value; a NaN cell
            // must drop with the row, not flow into a feature matrix.
            Ok(n) if n.is_nan() => Self::Missing,
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// An ordered, rectangular collection of columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    /// Build a frame from named columns, checking that all columns have the
    /// same length.
    pub fn new(columns: Vec<(String, Vec<Cell>)>) -> CoreResult<Self> {
        let mut out = Vec::with_capacity(columns.len());
        let mut len: Option<usize> = None;
        for (name, cells) in columns {
            match len {
                None => len = Some(cells.len()),
                Some(expected) if expected != cells.len() => {
                    return Err(CoreError::Schema(format!(
                        "column {name:?} has {} rows, expected {expected}",
                        cells.len()
                    )));
                }
                Some(_) => {}
            }
            out.push(Column { name, cells });
        }
        Ok(Self { columns: out })
    }

    /// A frame holding a single numeric column.
    #[must_use]
    pub fn single_numeric(name: &str, values: Vec<f64>) -> Self {
        Self {
            columns: vec![Column {
                name: name.to_string(),
                cells: values.into_iter().map(Cell::Number).collect(),
            }],
        }
    }

    pub fn read_csv(path: &Path) -> CoreResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read CSV text into a frame with per-cell type inference.
    pub fn from_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|h| Column { name: h.to_string(), cells: Vec::new() })
            .collect();

        for record in rdr.records() {
            let record = record?;
            if record.len() != columns.len() {
                return Err(CoreError::Schema(format!(
                    "row has {} fields, expected {}",
                    record.len(),
                    columns.len()
                )));
            }
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                column.cells.push(Cell::infer(field));
            }
        }

        Ok(Self { columns })
    }

    /// Write the frame as CSV: header row plus data rows, no index column.
    pub fn write_csv(&self, path: &Path) -> CoreResult<()> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> CoreResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in 0..self.n_rows() {
            let fields: Vec<String> = self
                .columns
                .iter()
                .map(|c| match &c.cells[row] {
                    Cell::Number(n) => format_number(*n),
                    Cell::Text(s) => s.clone(),
                    Cell::Missing => String::new(),
                })
                .collect();
            wtr.write_record(&fields)?;
        }
        wtr.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> CoreResult<&Column> {
        self.column(name)
            .ok_or_else(|| CoreError::Schema(format!("column {name:?} not found")))
    }

    /// All values of a column as f64, failing on text or missing cells.
    pub fn numeric_column(&self, name: &str) -> CoreResult<Vec<f64>> {
        let column = self.require_column(name)?;
        column
            .cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.as_number().ok_or_else(|| {
                    CoreError::Schema(format!(
                        "column {name:?} row {row} is not numeric: {cell:?}"
                    ))
                })
            })
            .collect()
    }

    /// Remove the named columns. Absent names are ignored.
    pub fn drop_columns(&mut self, names: &[String]) {
        self.columns.retain(|c| !names.contains(&c.name));
    }

    /// Keep only rows for which `keep` returns true, given the row index.
    pub fn retain_rows<F: Fn(usize) -> bool>(&mut self, keep: F) {
        let n = self.n_rows();
        let kept: Vec<usize> = (0..n).filter(|&row| keep(row)).collect();
        for column in &mut self.columns {
            column.cells = kept.iter().map(|&row| column.cells[row].clone()).collect();
        }
    }

    /// Row indices containing at least one missing cell.
    #[must_use]
    pub fn rows_with_missing(&self) -> Vec<usize> {
        (0..self.n_rows())
            .filter(|&row| self.columns.iter().any(|c| c.cells[row].is_missing()))
            .collect()
    }

    /// Replace a column's cells in place.
    pub fn replace_column(&mut self, name: &str, cells: Vec<Cell>) -> CoreResult<()> {
        let n_rows = self.n_rows();
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CoreError::Schema(format!("column {name:?} not found")))?;
        if cells.len() != n_rows {
            return Err(CoreError::Schema(format!(
                "replacement for column {name:?} has {} rows, expected {n_rows}",
                cells.len()
            )));
        }
        column.cells = cells;
        Ok(())
    }
}

/// Format a number the way it was most likely written: integers without a
/// trailing `.0`, everything else with full f64 round-trip precision.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
