//! Nightrate CLI - train, track, package, and serve nightly-rate models.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Nightrate - nightly-rate model workbench
///
/// Covers the local model lifecycle: featurize a listings CSV, train a
/// tree-ensemble regressor, record the run in a tracking store, wrap the
/// model with per-person post-processing, package it into a runnable
/// project, and execute that project in- or out-of-process.
#[derive(Parser, Debug)]
#[command(name = "nightrate", author, version, about = "Nightrate - nightly-rate model workbench")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a forest regressor on a listings CSV and record the run
    Train {
        /// Input CSV with a currency-formatted price column
        #[arg(long)]
        data: PathBuf,

        /// Tracking store root directory
        #[arg(long)]
        store: PathBuf,

        /// Label column (currency-formatted)
        #[arg(long, default_value = "price")]
        label: String,

        /// Identifier columns to drop before encoding
        #[arg(long = "drop", value_name = "COLUMN")]
        drop: Vec<String>,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 200)]
        n_trees: usize,

        /// Maximum tree depth
        #[arg(long, default_value_t = 15)]
        max_depth: usize,

        /// Seed for the train/test split and bagging
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Held-out fraction for evaluation
        #[arg(long, default_value_t = 0.25)]
        test_fraction: f64,
    },

    /// Wrap a recorded model with the per-person post-processing step
    Wrap {
        /// Tracking store root directory
        #[arg(long)]
        store: PathBuf,

        /// Model to wrap, e.g. runs:/<run-id>/rf-model
        #[arg(long)]
        model_uri: String,

        /// Column the predictions are divided by
        #[arg(long, default_value = "accommodates")]
        occupancy_column: String,
    },

    /// Package a recorded model into a self-contained project directory
    Package {
        /// Tracking store root directory
        #[arg(long)]
        store: PathBuf,

        /// Model to package, e.g. runs:/<run-id>/final-model
        #[arg(long)]
        model_uri: String,

        /// Target project directory (must be absent or empty)
        #[arg(long)]
        target: PathBuf,

        /// Replace prior contents of a non-empty target
        #[arg(long)]
        overwrite: bool,

        /// Project name written to the descriptor
        #[arg(long, default_value = "nightrate-project")]
        name: String,
    },

    /// Predict with a packaged model: read a CSV, write predictions CSV
    Predict {
        /// Path to the packaged model.json
        #[arg(long)]
        model_path: PathBuf,

        /// Input CSV path
        #[arg(long)]
        input_path: PathBuf,

        /// Output CSV path
        #[arg(long)]
        output_path: PathBuf,
    },

    /// Run a packaged project out-of-process via its descriptor
    RunProject {
        /// Packaged project directory
        project_dir: PathBuf,

        /// Entry-point parameters as key=value pairs
        #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Log a data artifact, download it back, train a boosted model on it
    Multistep {
        /// Raw (already cleaned) listings CSV
        #[arg(long)]
        data: PathBuf,

        /// Tracking store root directory
        #[arg(long)]
        store: PathBuf,

        /// Scratch directory for artifact downloads
        #[arg(long)]
        scratch: Option<PathBuf>,

        /// Number of boosting stages
        #[arg(long, default_value = "100")]
        n_estimators: String,

        /// Boosting learning rate
        #[arg(long, default_value = ".1")]
        learning_rate: String,

        /// Maximum depth of each stage
        #[arg(long, default_value = "1")]
        max_depth: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber =
        FmtSubscriber::builder().with_max_level(level).without_time().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Train {
            data,
            store,
            label,
            drop,
            n_trees,
            max_depth,
            seed,
            test_fraction,
        } => commands::train::execute(
            &data,
            &store,
            &label,
            drop,
            n_trees,
            max_depth,
            seed,
            test_fraction,
        ),
        Command::Wrap { store, model_uri, occupancy_column } => {
            commands::wrap::execute(&store, &model_uri, &occupancy_column)
        }
        Command::Package { store, model_uri, target, overwrite, name } => {
            commands::package::execute(&store, &model_uri, &target, overwrite, &name)
        }
        Command::Predict { model_path, input_path, output_path } => {
            commands::predict::execute(&model_path, &input_path, &output_path)
        }
        Command::RunProject { project_dir, params } => {
            commands::run_project::execute(&project_dir, &params)
        }
        Command::Multistep { data, store, scratch, n_estimators, learning_rate, max_depth } => {
            commands::multistep::execute(
                &data,
                &store,
                scratch,
                &n_estimators,
                &learning_rate,
                &max_depth,
            )
        }
    }
}
