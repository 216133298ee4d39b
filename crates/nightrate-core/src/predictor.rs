//! The prediction seam shared by plain and wrapped models.
//!
//! `ModelArtifact` is the persistable form of a trained model: a forest, a
//! boosted ensemble, or either of those decorated with a per-person
//! post-processing step. The decorated variant goes through the exact same
//! save/load path as a plain model.

use crate::error::{CoreError, CoreResult};
use crate::frame::Frame;
use crate::model::{BoostedRegressor, ForestRegressor};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Anything that can turn a frame of listings into one prediction per row.
pub trait Predictor {
    fn predict(&self, frame: &Frame) -> CoreResult<Vec<f64>>;
}

/// A trained, persistable model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Forest(ForestRegressor),
    Boosted(BoostedRegressor),
    /// Decorates an inner model so predictions become price per person:
    /// the inner output divided by the occupancy column.
    PerPerson {
        inner: Box<ModelArtifact>,
        occupancy_column: String,
    },
}

impl ModelArtifact {
    /// Wrap a model so its output is divided by the given occupancy column.
    #[must_use]
    pub fn per_person(inner: ModelArtifact, occupancy_column: &str) -> Self {
        Self::PerPerson {
            inner: Box::new(inner),
            occupancy_column: occupancy_column.to_string(),
        }
    }

    /// Feature columns the underlying model was trained on.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        match self {
            Self::Forest(m) => &m.feature_names,
            Self::Boosted(m) => &m.feature_names,
            Self::PerPerson { inner, .. } => inner.feature_names(),
        }
    }

    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Assemble the model's feature matrix from a frame, selecting columns by
/// the names stored at fit time. A missing or non-numeric column is an
/// error naming the column.
fn features_from_frame(frame: &Frame, names: &[String]) -> CoreResult<Array2<f64>> {
    let n_rows = frame.n_rows();
    let columns: Vec<Vec<f64>> = names
        .iter()
        .map(|name| frame.numeric_column(name))
        .collect::<CoreResult<_>>()?;

    let mut flat = Vec::with_capacity(n_rows * names.len());
    for row in 0..n_rows {
        for column in &columns {
            flat.push(column[row]);
        }
    }
    Array2::from_shape_vec((n_rows, names.len()), flat)
        .map_err(|e| CoreError::Schema(format!("feature matrix shape: {e}")))
}

impl Predictor for ModelArtifact {
    fn predict(&self, frame: &Frame) -> CoreResult<Vec<f64>> {
        match self {
            Self::Forest(m) => {
                let x = features_from_frame(frame, &m.feature_names)?;
                m.predict(x.view())
            }
            Self::Boosted(m) => {
                let x = features_from_frame(frame, &m.feature_names)?;
                m.predict(x.view())
            }
            Self::PerPerson { inner, occupancy_column } => {
                // Fail fast: a missing column or non-positive occupancy is
                // an error, never a silently wrong per-person price.
                let occupancy = frame.numeric_column(occupancy_column).map_err(|e| {
                    CoreError::Occupancy(format!(
                        "occupancy column {occupancy_column:?} unusable: {e}"
                    ))
                })?;
                if let Some(row) = occupancy.iter().position(|&v| v <= 0.0) {
                    return Err(CoreError::Occupancy(format!(
                        "occupancy column {occupancy_column:?} row {row} is {}, must be > 0",
                        occupancy[row]
                    )));
                }
                let raw = inner.predict(frame)?;
                Ok(raw.iter().zip(&occupancy).map(|(p, occ)| p / occ).collect())
            }
        }
    }
}
