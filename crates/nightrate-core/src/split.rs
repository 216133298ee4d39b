//! Deterministic train/test splitting.

use crate::error::{CoreError, CoreResult};
use crate::prepare::Prepared;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row-partitioned features and labels.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Partition rows into train/test subsets by shuffling indices with a
/// seeded RNG. The same seed and input always yield the same partition.
pub fn train_test_split(
    prepared: &Prepared,
    test_fraction: f64,
    seed: u64,
) -> CoreResult<Split> {
    let n = prepared.n_rows();
    if n < 2 {
        return Err(CoreError::Schema(format!(
            "need at least 2 rows to split, got {n}"
        )));
    }
    if !(0.0..1.0).contains(&test_fraction) || test_fraction <= 0.0 {
        return Err(CoreError::Schema(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).round().clamp(1.0, (n - 1) as f64) as usize;
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(Split {
        x_train: prepared.features.select(Axis(0), train_idx),
        x_test: prepared.features.select(Axis(0), test_idx),
        y_train: prepared.labels.select(Axis(0), train_idx),
        y_test: prepared.labels.select(Axis(0), test_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::prepare::{prepare, PrepareOptions};

    fn prepared() -> Prepared {
        let mut csv = String::from("price,accommodates,beds\n");
        for i in 0..20 {
            csv.push_str(&format!("${}.00,{},{}\n", 50 + i, 1 + i % 4, 1 + i % 3));
        }
        let frame = Frame::from_reader(csv.as_bytes()).unwrap();
        let options = PrepareOptions { drop_columns: vec![], ..PrepareOptions::default() };
        prepare(&frame, &options).unwrap()
    }

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(&prepared(), 0.25, 42).unwrap();
        assert_eq!(split.x_test.nrows(), 5);
        assert_eq!(split.x_train.nrows(), 15);
        assert_eq!(split.y_test.len(), 5);
        assert_eq!(split.y_train.len(), 15);
    }

    #[test]
    fn test_split_is_deterministic_for_fixed_seed() {
        let data = prepared();
        let a = train_test_split(&data, 0.25, 42).unwrap();
        let b = train_test_split(&data, 0.25, 42).unwrap();
        assert_eq!(a.x_train, b.x_train);
        assert_eq!(a.y_test, b.y_test);

        let c = train_test_split(&data, 0.25, 7).unwrap();
        assert_ne!(a.y_test, c.y_test);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        assert!(train_test_split(&prepared(), 0.0, 42).is_err());
        assert!(train_test_split(&prepared(), 1.0, 42).is_err());
    }
}
