//! Bagged forest of regression trees.

use crate::error::{CoreError, CoreResult};
use crate::model::tree::{RegressionTree, TreeParams};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    /// Random feature subset size per tree. `None` considers every feature,
    /// the regression default; interactions across features stay learnable.
    #[serde(default)]
    pub max_features: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self { n_trees: 200, max_depth: 15, min_samples_leaf: 1, seed: 42, max_features: None }
    }
}

impl ForestParams {
    pub fn validate(&self) -> CoreResult<()> {
        if self.n_trees == 0 {
            return Err(CoreError::Schema("n_trees must be >= 1".to_string()));
        }
        if self.max_depth == 0 {
            return Err(CoreError::Schema("max_depth must be >= 1".to_string()));
        }
        if self.max_features == Some(0) {
            return Err(CoreError::Schema("max_features must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Ensemble of trees fit on bootstrap samples. By default every tree sees
/// all features; `max_features` restricts each tree to a random subset.
/// Prediction is the tree mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    pub params: ForestParams,
    pub feature_names: Vec<String>,
    trees: Vec<RegressionTree>,
}

impl ForestRegressor {
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        feature_names: &[String],
        params: &ForestParams,
    ) -> CoreResult<Self> {
        params.validate()?;
        let n = x.nrows();
        let n_features = x.ncols();
        if n == 0 || n_features == 0 {
            return Err(CoreError::EmptyDataset);
        }
        if feature_names.len() != n_features {
            return Err(CoreError::Schema(format!(
                "{} feature names for {n_features} feature columns",
                feature_names.len()
            )));
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_leaf: params.min_samples_leaf,
        };
        let n_candidates = params.max_features.unwrap_or(n_features).min(n_features);
        let all_features: Vec<usize> = (0..n_features).collect();

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let x_boot = x.select(Axis(0), &sample);
            let y_boot: Array1<f64> = sample.iter().map(|&r| y[r]).collect();

            let tree = if n_candidates == n_features {
                RegressionTree::fit(x_boot.view(), y_boot.view(), &tree_params)
            } else {
                let mut candidates: Vec<usize> = all_features
                    .choose_multiple(&mut rng, n_candidates)
                    .copied()
                    .collect();
                candidates.sort_unstable();
                RegressionTree::fit_with_features(
                    x_boot.view(),
                    y_boot.view(),
                    &tree_params,
                    &candidates,
                )
            };
            trees.push(tree);
        }

        tracing::debug!(n_trees = trees.len(), n_rows = n, "fit forest regressor");
        Ok(Self {
            params: *params,
            feature_names: feature_names.to_vec(),
            trees,
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
        let mut out = vec![0.0; x.nrows()];
        for tree in &self.trees {
            for (acc, p) in out.iter_mut().zip(tree.predict(x)) {
                *acc += p;
            }
        }
        let k = self.trees.len() as f64;
        for acc in &mut out {
            *acc /= k;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn toy() -> (Array2<f64>, Array1<f64>, Vec<String>) {
        let n = 40;
        let mut flat = Vec::new();
        let mut y = Vec::new();
        for i in 0..n {
            let a = f64::from(i % 5);
            let b = f64::from(i % 3);
            flat.extend([a, b]);
            y.push(10.0 * a + b);
        }
        (
            Array2::from_shape_vec((n as usize, 2), flat).unwrap(),
            Array1::from_vec(y),
            vec!["a".to_string(), "b".to_string()],
        )
    }

    #[test]
    fn test_fit_predict_learns_signal() {
        let (x, y, names) = toy();
        let params = ForestParams { n_trees: 25, ..ForestParams::default() };
        let forest = ForestRegressor::fit(x.view(), y.view(), &names, &params).unwrap();
        let predictions = forest.predict(x.view()).unwrap();
        let mse = crate::metrics::mse(&y.to_vec(), &predictions);
        assert!(mse < 20.0, "forest failed to learn, mse = {mse}");
    }

    #[test]
    fn test_default_sees_all_features() {
        // y depends on both columns; trees restricted to one feature each
        // cannot track the weaker signal.
        let (x, y, names) = toy();
        let truth = y.to_vec();

        let full = ForestParams { n_trees: 25, ..ForestParams::default() };
        let forest = ForestRegressor::fit(x.view(), y.view(), &names, &full).unwrap();
        let mse_full = crate::metrics::mse(&truth, &forest.predict(x.view()).unwrap());

        let restricted =
            ForestParams { n_trees: 25, max_features: Some(1), ..ForestParams::default() };
        let forest = ForestRegressor::fit(x.view(), y.view(), &names, &restricted).unwrap();
        let mse_restricted = crate::metrics::mse(&truth, &forest.predict(x.view()).unwrap());

        assert!(mse_full < mse_restricted, "full {mse_full} vs restricted {mse_restricted}");
    }

    #[test]
    fn test_validate_rejects_zero_max_features() {
        let params = ForestParams { max_features: Some(0), ..ForestParams::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_fit_is_deterministic_for_fixed_seed() {
        let (x, y, names) = toy();
        let params = ForestParams { n_trees: 10, ..ForestParams::default() };
        let a = ForestRegressor::fit(x.view(), y.view(), &names, &params).unwrap();
        let b = ForestRegressor::fit(x.view(), y.view(), &names, &params).unwrap();
        assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
    }

    #[test]
    fn test_rejects_mismatched_feature_names() {
        let (x, y, _) = toy();
        let params = ForestParams::default();
        let result =
            ForestRegressor::fit(x.view(), y.view(), &["a".to_string()], &params);
        assert!(result.is_err());
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (x, y, names) = toy();
        let params = ForestParams { n_trees: 3, ..ForestParams::default() };
        let forest = ForestRegressor::fit(x.view(), y.view(), &names, &params).unwrap();
        let narrow = Array2::zeros((2, 1));
        assert!(forest.predict(narrow.view()).is_err());
    }
}
