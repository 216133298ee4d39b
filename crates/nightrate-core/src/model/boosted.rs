//! Gradient-boosted trees on squared loss.

use crate::error::{CoreError, CoreResult};
use crate::model::tree::{RegressionTree, TreeParams};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostedParams {
    pub n_stages: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for BoostedParams {
    fn default() -> Self {
        Self { n_stages: 100, learning_rate: 0.1, max_depth: 1, min_samples_leaf: 1 }
    }
}

impl BoostedParams {
    pub fn validate(&self) -> CoreResult<()> {
        if self.n_stages == 0 {
            return Err(CoreError::Schema("n_stages must be >= 1".to_string()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(CoreError::Schema("learning_rate must be > 0".to_string()));
        }
        if self.max_depth == 0 {
            return Err(CoreError::Schema("max_depth must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Stagewise ensemble: start from the target mean, then repeatedly fit a
/// shallow tree to the residuals and step towards it by the learning rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedRegressor {
    pub params: BoostedParams,
    pub feature_names: Vec<String>,
    base: f64,
    stages: Vec<RegressionTree>,
}

impl BoostedRegressor {
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        feature_names: &[String],
        params: &BoostedParams,
    ) -> CoreResult<Self> {
        params.validate()?;
        let n = x.nrows();
        if n == 0 || x.ncols() == 0 {
            return Err(CoreError::EmptyDataset);
        }
        if feature_names.len() != x.ncols() {
            return Err(CoreError::Schema(format!(
                "{} feature names for {} feature columns",
                feature_names.len(),
                x.ncols()
            )));
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
        };
        let base = y.sum() / n as f64;
        let mut current = vec![base; n];
        let mut stages = Vec::with_capacity(params.n_stages);

        for _ in 0..params.n_stages {
            let residuals: Array1<f64> = y
                .iter()
                .zip(&current)
                .map(|(target, pred)| target - pred)
                .collect();
            let tree = RegressionTree::fit(x, residuals.view(), &tree_params);
            for (pred, step) in current.iter_mut().zip(tree.predict(x)) {
                *pred += params.learning_rate * step;
            }
            stages.push(tree);
        }

        tracing::debug!(n_stages = stages.len(), n_rows = n, "fit boosted regressor");
        Ok(Self {
            params: *params,
            feature_names: feature_names.to_vec(),
            base,
            stages,
        })
    }

    pub fn predict(&self, x: ArrayView2<'_, f64>) -> CoreResult<Vec<f64>> {
        if x.ncols() != self.feature_names.len() {
            return Err(CoreError::Schema(format!(
                "model expects {} features, input has {}",
                self.feature_names.len(),
                x.ncols()
            )));
        }
        let mut out = vec![self.base; x.nrows()];
        for tree in &self.stages {
            for (acc, p) in out.iter_mut().zip(tree.predict(x)) {
                *acc += self.params.learning_rate * p;
            }
        }
        Ok(out)
    }
}
