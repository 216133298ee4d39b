//! Nightrate Tracking
//!
//! A filesystem tracking store for training runs:
//! - Run-scoped logging of params, metrics, and artifacts (`ActiveRun`)
//! - Run manifests with artifact hashes (`RunManifest`)
//! - Model retrieval by `runs:/<run-id>/<artifact-path>` URIs
//! - Artifact download into local scratch directories

pub mod error;
pub mod manifest;
pub mod store;
pub mod uri;

pub use error::{TrackingError, TrackingResult};
pub use manifest::{sha256_file, ArtifactEntry, RunId, RunManifest};
pub use store::{ActiveRun, TrackingStore};
pub use uri::ModelUri;
