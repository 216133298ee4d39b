//! Regression error metrics.

use serde::{Deserialize, Serialize};

/// Mean squared error.
#[must_use]
pub fn mse(truth: &[f64], predictions: &[f64]) -> f64 {
    debug_assert_eq!(truth.len(), predictions.len());
    if truth.is_empty() {
        return 0.0;
    }
    truth
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / truth.len() as f64
}

/// Mean absolute error.
#[must_use]
pub fn mae(truth: &[f64], predictions: &[f64]) -> f64 {
    debug_assert_eq!(truth.len(), predictions.len());
    if truth.is_empty() {
        return 0.0;
    }
    truth
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / truth.len() as f64
}

/// Coefficient of determination. Returns 0.0 for a constant target, where
/// the score is undefined.
#[must_use]
pub fn r2(truth: &[f64], predictions: &[f64]) -> f64 {
    debug_assert_eq!(truth.len(), predictions.len());
    if truth.is_empty() {
        return 0.0;
    }
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = truth
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// The three regression metrics tracked for every run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub mse: f64,
    pub mae: f64,
    pub r2: f64,
}

#[must_use]
pub fn evaluate(truth: &[f64], predictions: &[f64]) -> Evaluation {
    Evaluation {
        mse: mse(truth, predictions),
        mae: mae(truth, predictions),
        r2: r2(truth, predictions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let truth = [1.0, 2.0, 3.0];
        let eval = evaluate(&truth, &truth);
        assert_eq!(eval.mse, 0.0);
        assert_eq!(eval.mae, 0.0);
        assert_eq!(eval.r2, 1.0);
    }

    #[test]
    fn test_known_values() {
        let truth = [3.0, -0.5, 2.0, 7.0];
        let pred = [2.5, 0.0, 2.0, 8.0];
        assert!((mse(&truth, &pred) - 0.375).abs() < 1e-12);
        assert!((mae(&truth, &pred) - 0.5).abs() < 1e-12);
        assert!((r2(&truth, &pred) - 0.948_608_137_044_97).abs() < 1e-9);
    }

    #[test]
    fn test_r2_constant_target() {
        assert_eq!(r2(&[2.0, 2.0], &[1.0, 3.0]), 0.0);
    }
}
