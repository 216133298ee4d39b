//! CART-style regression tree.
//!
//! Splits minimize the summed squared deviation of the two children,
//! thresholds sit halfway between distinct adjacent feature values.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self { max_depth: 5, min_samples_leaf: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Fit on all features.
    #[must_use]
    pub fn fit(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>, params: &TreeParams) -> Self {
        let features: Vec<usize> = (0..x.ncols()).collect();
        Self::fit_with_features(x, y, params, &features)
    }

    /// Fit considering only the given candidate feature indices, as a
    /// bagged forest does per tree.
    #[must_use]
    pub fn fit_with_features(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        params: &TreeParams,
        features: &[usize],
    ) -> Self {
        let rows: Vec<usize> = (0..x.nrows()).collect();
        let root = grow(x, y, &rows, 0, params, features);
        Self { root }
    }

    #[must_use]
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    #[must_use]
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        (0..x.nrows()).map(|i| self.predict_row(x.row(i))).collect()
    }
}

fn mean(y: ArrayView1<'_, f64>, rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&r| y[r]).sum::<f64>() / rows.len() as f64
}

fn grow(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    rows: &[usize],
    depth: usize,
    params: &TreeParams,
    features: &[usize],
) -> Node {
    let value = mean(y, rows);
    if depth >= params.max_depth || rows.len() < 2 * params.min_samples_leaf {
        return Node::Leaf { value };
    }
    let Some((feature, threshold)) = best_split(x, y, rows, features, params.min_samples_leaf)
    else {
        return Node::Leaf { value };
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
        rows.iter().partition(|&&r| x[[r, feature]] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(grow(x, y, &left_rows, depth + 1, params, features)),
        right: Box::new(grow(x, y, &right_rows, depth + 1, params, features)),
    }
}

/// Best (feature, threshold) over the candidate features, or None when no
/// split separates the rows.
fn best_split(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    rows: &[usize],
    features: &[usize],
    min_samples_leaf: usize,
) -> Option<(usize, f64)> {
    let n = rows.len();
    if n < 2 {
        return None;
    }
    let total_sum: f64 = rows.iter().map(|&r| y[r]).sum();
    let total_sq: f64 = rows.iter().map(|&r| y[r] * y[r]).sum();
    let parent_cost = total_sq - total_sum * total_sum / n as f64;
    if parent_cost <= f64::EPSILON {
        // Constant target, nothing to gain.
        return None;
    }

    let mut best: Option<(usize, f64, f64)> = None;

    for &feature in features {
        let mut ordered: Vec<(f64, f64)> =
            rows.iter().map(|&r| (x[[r, feature]], y[r])).collect();
        ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..n - 1 {
            let (value, target) = ordered[i];
            left_sum += target;
            left_sq += target * target;

            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }
            let next_value = ordered[i + 1].0;
            if next_value <= value {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let cost = (left_sq - left_sum * left_sum / n_left as f64)
                + (right_sq - right_sum * right_sum / n_right as f64);

            if best.map_or(cost < parent_cost, |(_, _, c)| cost < c) {
                let threshold = (value + next_value) / 2.0;
                best = Some((feature, threshold, cost));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_single_split() {
        let x = array![[1.0], [2.0], [10.0], [11.0]];
        let y = array![5.0, 5.0, 20.0, 20.0];
        let tree = RegressionTree::fit(x.view(), y.view(), &TreeParams::default());
        assert_eq!(tree.predict_row(array![1.5].view()), 5.0);
        assert_eq!(tree.predict_row(array![12.0].view()), 20.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![7.0, 7.0, 7.0];
        let tree = RegressionTree::fit(x.view(), y.view(), &TreeParams::default());
        assert_eq!(tree.predict(x.view()), vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_max_depth_zero_predicts_mean() {
        let x = array![[1.0], [2.0]];
        let y = array![0.0, 10.0];
        let params = TreeParams { max_depth: 0, min_samples_leaf: 1 };
        let tree = RegressionTree::fit(x.view(), y.view(), &params);
        assert_eq!(tree.predict_row(array![1.0].view()), 5.0);
    }

    #[test]
    fn test_fit_interpolates_training_data() {
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 1.0]];
        let y = array![1.0, 4.0, 9.0, 16.0];
        let params = TreeParams { max_depth: 8, min_samples_leaf: 1 };
        let tree = RegressionTree::fit(x.view(), y.view(), &params);
        assert_eq!(tree.predict(x.view()), vec![1.0, 4.0, 9.0, 16.0]);
    }

    #[test]
    fn test_serde_round_trip() {
        let x: Array2<f64> = array![[1.0], [2.0], [10.0]];
        let y = array![1.0, 2.0, 10.0];
        let tree = RegressionTree::fit(x.view(), y.view(), &TreeParams::default());
        let json = serde_json::to_string(&tree).unwrap();
        let back: RegressionTree = serde_json::from_str(&json).unwrap();
        assert_eq!(tree.predict(x.view()), back.predict(x.view()));
    }
}
