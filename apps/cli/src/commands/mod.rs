//! Command implementations for the nightrate CLI.

pub mod multistep;
pub mod package;
pub mod predict;
pub mod run_project;
pub mod train;
pub mod wrap;
