//! Tree-ensemble regressors.
//!
//! All models serialize with serde so a packaged project can reconstruct
//! them without the training code path.

pub mod boosted;
pub mod forest;
pub mod tree;

pub use boosted::{BoostedParams, BoostedRegressor};
pub use forest::{ForestParams, ForestRegressor};
pub use tree::{RegressionTree, TreeParams};
