//! Nightrate Core
//!
//! Data and modeling primitives for the nightly-rate workflow:
//! - Loading tabular listing data (`Frame`)
//! - Featurizing it into numeric matrices (`prepare`)
//! - Deterministic train/test splits (`split`)
//! - Tree-ensemble regressors (`model`)
//! - Regression metrics (`metrics`)
//! - The `Predictor` seam and persistable `ModelArtifact`

pub mod error;
pub mod frame;
pub mod metrics;
pub mod model;
pub mod predictor;
pub mod prepare;
pub mod split;

pub use error::{CoreError, CoreResult};
pub use frame::{Cell, Column, Frame};
pub use metrics::{evaluate, mae, mse, r2, Evaluation};
pub use model::{
    BoostedParams, BoostedRegressor, ForestParams, ForestRegressor, RegressionTree, TreeParams,
};
pub use predictor::{ModelArtifact, Predictor};
pub use prepare::{parse_currency, prepare, ColumnEncoding, PrepareOptions, Prepared};
pub use split::{train_test_split, Split};
