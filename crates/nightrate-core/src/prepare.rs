//! Feature preparation.
//!
//! Turns a raw listings frame into a numeric feature matrix:
//! currency columns are parsed to floats, configured identifier columns are
//! dropped, rows with missing values are removed, and every remaining text
//! column is label-encoded against a vocabulary built from observed values.
//! Unseen categories at inference time are out of scope by design.

use crate::error::{CoreError, CoreResult};
use crate::frame::{Cell, Frame};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Parse a currency-formatted string such as `"$1,234.50"` into `1234.5`.
///
/// A malformed value is an error; the caller is expected to abort the whole
/// load rather than recover individual rows.
pub fn parse_currency(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Err("empty after stripping currency symbols".to_string());
    }
    cleaned
        .parse::<f64>()
        .map_err(|e| format!("not a number: {e}"))
}

/// How to turn a raw frame into features and labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareOptions {
    /// Column holding the regression target.
    pub label_column: String,
    /// Columns whose text cells are currency-formatted and must be parsed.
    pub currency_columns: Vec<String>,
    /// Identifier columns to remove before encoding.
    pub drop_columns: Vec<String>,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            label_column: "price".to_string(),
            currency_columns: vec!["price".to_string()],
            drop_columns: vec!["zipcode".to_string()],
        }
    }
}

/// The vocabulary built for one text column: observed value -> dense code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnEncoding {
    pub column: String,
    pub vocabulary: BTreeMap<String, i64>,
}

/// Fully numeric output of preparation.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
    pub feature_names: Vec<String>,
    pub encodings: Vec<ColumnEncoding>,
}

impl Prepared {
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }
}

/// Run the full preparation pipeline over a raw frame.
pub fn prepare(frame: &Frame, options: &PrepareOptions) -> CoreResult<Prepared> {
    let mut frame = frame.clone();

    // Currency parsing first, so malformed values abort before any row is
    // silently dropped for other reasons.
    for name in &options.currency_columns {
        let column = frame.require_column(name)?;
        let mut cells = Vec::with_capacity(column.cells.len());
        for cell in &column.cells {
            let parsed = match cell {
                Cell::Text(raw) => {
                    let value =
                        parse_currency(raw).map_err(|reason| CoreError::Currency {
                            column: name.clone(),
                            value: raw.clone(),
                            reason,
                        })?;
                    Cell::Number(value)
                }
                other => other.clone(),
            };
            cells.push(parsed);
        }
        frame.replace_column(name, cells)?;
    }

    frame.drop_columns(&options.drop_columns);

    let missing = frame.rows_with_missing();
    if !missing.is_empty() {
        tracing::debug!(rows = missing.len(), "dropping rows with missing values");
        frame.retain_rows(|row| !missing.contains(&row));
    }
    if frame.n_rows() == 0 {
        return Err(CoreError::EmptyDataset);
    }

    let encodings = encode_text_columns(&mut frame)?;

    let labels = Array1::from_vec(frame.numeric_column(&options.label_column)?);

    let feature_names: Vec<String> = frame
        .column_names()
        .into_iter()
        .filter(|name| *name != options.label_column)
        .map(str::to_string)
        .collect();
    if feature_names.is_empty() {
        return Err(CoreError::Schema(
            "no feature columns remain after preparation".to_string(),
        ));
    }

    let n_rows = frame.n_rows();
    let mut flat = Vec::with_capacity(n_rows * feature_names.len());
    let columns: Vec<Vec<f64>> = feature_names
        .iter()
        .map(|name| frame.numeric_column(name))
        .collect::<CoreResult<_>>()?;
    for row in 0..n_rows {
        for column in &columns {
            flat.push(column[row]);
        }
    }
    let features = Array2::from_shape_vec((n_rows, feature_names.len()), flat)
        .map_err(|e| CoreError::Schema(format!("feature matrix shape: {e}")))?;

    Ok(Prepared { features, labels, feature_names, encodings })
}

/// Label-encode every text column in place, returning the vocabularies.
///
/// Codes follow the sorted order of observed values, so encoding is
/// deterministic for a given dataset.
fn encode_text_columns(frame: &mut Frame) -> CoreResult<Vec<ColumnEncoding>> {
    let names: Vec<String> = frame
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut encodings = Vec::new();

    for name in names {
        let column = frame.require_column(&name)?;
        let has_text = column.cells.iter().any(|c| matches!(c, Cell::Text(_)));
        if !has_text {
            continue;
        }

        let observed: BTreeSet<String> = column
            .cells
            .iter()
            .filter_map(|c| match c {
                Cell::Text(s) => Some(s.clone()),
                _ => None,
            })
            .collect();
        let vocabulary: BTreeMap<String, i64> = observed
            .into_iter()
            .enumerate()
            .map(|(code, value)| (value, code as i64))
            .collect();

        let cells: Vec<Cell> = column
            .cells
            .iter()
            .map(|c| match c {
                Cell::Text(s) => Cell::Number(vocabulary[s] as f64),
                other => other.clone(),
            })
            .collect();
        frame.replace_column(&name, cells)?;
        encodings.push(ColumnEncoding { column: name, vocabulary });
    }

    Ok(encodings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
price,zipcode,accommodates,neighbourhood,beds
\"$1,100.00\",94110,2,Mission,1
$80.00,94103,4,SoMa,2
$250.50,94110,2,Mission,
$99.00,94103,3,Castro,1
";

    fn frame() -> Frame {
        Frame::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_currency_variants() {
        assert_eq!(parse_currency("$1,234.50").unwrap(), 1234.50);
        assert_eq!(parse_currency("$80.00").unwrap(), 80.0);
        assert_eq!(parse_currency("99").unwrap(), 99.0);
        assert!(parse_currency("$").is_err());
        assert!(parse_currency("abc").is_err());
    }

    #[test]
    fn test_prepare_drops_identifier_and_missing_rows() {
        let prepared = prepare(&frame(), &PrepareOptions::default()).unwrap();
        // Row with a missing `beds` cell is gone.
        assert_eq!(prepared.n_rows(), 3);
        assert!(!prepared.feature_names.contains(&"zipcode".to_string()));
        assert!(!prepared.feature_names.contains(&"price".to_string()));
        assert_eq!(
            prepared.feature_names,
            vec!["accommodates", "neighbourhood", "beds"]
        );
    }

    #[test]
    fn test_prepare_parses_currency_labels() {
        let prepared = prepare(&frame(), &PrepareOptions::default()).unwrap();
        assert_eq!(prepared.labels.to_vec(), vec![1100.0, 80.0, 99.0]);
    }

    #[test]
    fn test_prepare_encodes_text_deterministically() {
        let prepared = prepare(&frame(), &PrepareOptions::default()).unwrap();
        let encoding = prepared
            .encodings
            .iter()
            .find(|e| e.column == "neighbourhood")
            .unwrap();
        // Sorted vocabulary: Castro=0, Mission=1, SoMa=2.
        assert_eq!(encoding.vocabulary["Castro"], 0);
        assert_eq!(encoding.vocabulary["Mission"], 1);
        assert_eq!(encoding.vocabulary["SoMa"], 2);
        let col = prepared.feature_names.iter().position(|n| n == "neighbourhood").unwrap();
        assert_eq!(prepared.features.column(col).to_vec(), vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_prepare_aborts_on_malformed_currency() {
        let csv = "price,beds\n$12x.00,1\n";
        let frame = Frame::from_reader(csv.as_bytes()).unwrap();
        let err = prepare(&frame, &PrepareOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::Currency { .. }));
    }

    #[test]
    fn test_prepare_drops_nan_rows() {
        let csv = "price,beds\n$100.00,NaN\n$80.00,2\n";
        let frame = Frame::from_reader(csv.as_bytes()).unwrap();
        let options = PrepareOptions { drop_columns: vec![], ..PrepareOptions::default() };
        let prepared = prepare(&frame, &options).unwrap();
        assert_eq!(prepared.n_rows(), 1);
        assert_eq!(prepared.labels.to_vec(), vec![80.0]);
        assert_eq!(prepared.features[[0, 0]], 2.0);
    }

    #[test]
    fn test_prepare_rejects_all_missing() {
        let csv = "price,beds\n,\n";
        let frame = Frame::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            prepare(&frame, &PrepareOptions::default()),
            Err(CoreError::EmptyDataset)
        ));
    }
}
