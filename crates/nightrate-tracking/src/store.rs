//! The filesystem tracking store.
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/runs/<run_id>/run.json
//! <root>/runs/<run_id>/artifacts/<rel_path>...
//! ```
//!
//! A run is opened with `TrackingStore::start_run`, which hands back an
//! `ActiveRun` context object. Everything logged goes through that object;
//! there is no ambient "current run". `finish` seals the run by writing its
//! manifest and returns the run id.

use crate::error::{TrackingError, TrackingResult};
use crate::manifest::{sha256_file, ArtifactEntry, RunId, RunManifest};
use crate::uri::ModelUri;
use chrono::Utc;
use nightrate_core::ModelArtifact;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "run.json";
pub const MODEL_FILE: &str = "model.json";

#[derive(Debug, Clone)]
pub struct TrackingStore {
    root: PathBuf,
}

impl TrackingStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> TrackingResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join("runs"))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn runs_dir(&self) -> PathBuf {
        self.root.join("runs")
    }

    #[must_use]
    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.runs_dir().join(run_id.as_str())
    }

    #[must_use]
    pub fn artifacts_dir(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join("artifacts")
    }

    /// Begin a named run. The run directory exists from this point; the
    /// manifest is only written by `ActiveRun::finish`.
    pub fn start_run(&self, name: &str) -> TrackingResult<ActiveRun<'_>> {
        let run_id = RunId::new();
        std::fs::create_dir_all(self.artifacts_dir(&run_id))?;
        tracing::info!(run_id = %run_id, name, "started run");
        Ok(ActiveRun {
            store: self,
            run_id,
            name: name.to_string(),
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
        })
    }

    pub fn read_manifest(&self, run_id: &RunId) -> TrackingResult<RunManifest> {
        let path = self.run_dir(run_id).join(MANIFEST_FILE);
        if !path.exists() {
            return Err(TrackingError::RunNotFound(run_id.to_string()));
        }
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// All sealed runs in the store, newest first.
    pub fn list_runs(&self) -> TrackingResult<Vec<RunManifest>> {
        let mut manifests = Vec::new();
        for entry in std::fs::read_dir(self.runs_dir())? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let manifest_path = entry.path().join(MANIFEST_FILE);
            if !manifest_path.exists() {
                // Unfinished or abandoned run.
                continue;
            }
            let bytes = std::fs::read(manifest_path)?;
            manifests.push(serde_json::from_slice::<RunManifest>(&bytes)?);
        }
        manifests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(manifests)
    }

    /// Load a logged model by `runs:/<run-id>/<artifact-path>` URI.
    pub fn load_model(&self, uri: &ModelUri) -> TrackingResult<ModelArtifact> {
        // The manifest must exist: models are only addressable on sealed runs.
        self.read_manifest(&uri.run_id)?;
        let model_path = self
            .artifacts_dir(&uri.run_id)
            .join(&uri.artifact_path)
            .join(MODEL_FILE);
        if !model_path.exists() {
            return Err(TrackingError::ArtifactMissing(uri.to_string()));
        }
        Ok(ModelArtifact::load(&model_path)?)
    }

    /// Copy the artifact at `rel_path` (a file or directory) out of the
    /// store into `dest_dir`, returning the local path of the copy.
    pub fn download_artifacts(
        &self,
        run_id: &RunId,
        rel_path: &str,
        dest_dir: &Path,
    ) -> TrackingResult<PathBuf> {
        let src = self.artifacts_dir(run_id).join(rel_path);
        if !src.exists() {
            return Err(TrackingError::ArtifactMissing(format!(
                "runs:/{run_id}/{rel_path}"
            )));
        }
        std::fs::create_dir_all(dest_dir)?;

        let file_name = src
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(rel_path));
        let dest = dest_dir.join(file_name);
        if src.is_dir() {
            copy_dir(&src, &dest)?;
        } else {
            std::fs::copy(&src, &dest)?;
        }
        tracing::info!(run_id = %run_id, rel_path, dest = %dest.display(), "downloaded artifacts");
        Ok(dest)
    }
}

fn copy_dir(src: &Path, dest: &Path) -> TrackingResult<()> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// An open run. Dropping it without calling `finish` leaves no manifest
/// behind, so the run never becomes visible to readers.
#[derive(Debug)]
pub struct ActiveRun<'a> {
    store: &'a TrackingStore,
    run_id: RunId,
    name: String,
    params: BTreeMap<String, String>,
    metrics: BTreeMap<String, f64>,
    artifacts: Vec<ArtifactEntry>,
}

impl ActiveRun<'_> {
    #[must_use]
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn log_param(&mut self, key: &str, value: impl ToString) {
        self.params.insert(key.to_string(), value.to_string());
    }

    pub fn log_metric(&mut self, key: &str, value: f64) {
        self.metrics.insert(key.to_string(), value);
    }

    /// Copy a file into the run's artifact tree under `rel_dir`, recording
    /// its hash in the manifest.
    pub fn log_artifact(&mut self, src: &Path, rel_dir: &str) -> TrackingResult<()> {
        let file_name = src.file_name().ok_or_else(|| {
            TrackingError::ArtifactMissing(format!("not a file: {}", src.display()))
        })?;
        let dir = self.store.artifacts_dir(&self.run_id).join(rel_dir);
        std::fs::create_dir_all(&dir)?;
        let dest = dir.join(file_name);
        std::fs::copy(src, &dest)?;

        self.artifacts.push(ArtifactEntry {
            rel_path: PathBuf::from(rel_dir).join(file_name),
            sha256: sha256_file(&dest)?,
        });
        Ok(())
    }

    /// Serialize a model under `artifacts/<name>/model.json`, making it
    /// loadable later via `runs:/<run-id>/<name>`.
    pub fn log_model(&mut self, model: &ModelArtifact, name: &str) -> TrackingResult<ModelUri> {
        let dir = self.store.artifacts_dir(&self.run_id).join(name);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(MODEL_FILE);
        model.save(&path)?;

        self.artifacts.push(ArtifactEntry {
            rel_path: PathBuf::from(name).join(MODEL_FILE),
            sha256: sha256_file(&path)?,
        });
        Ok(ModelUri::new(self.run_id.clone(), name))
    }

    /// Seal the run: write the manifest and return the run id.
    pub fn finish(self) -> TrackingResult<RunId> {
        let manifest = RunManifest {
            run_id: self.run_id.clone(),
            name: self.name,
            created_at: Utc::now(),
            params: self.params,
            metrics: self.metrics,
            artifacts: self.artifacts,
        };
        let path = self.store.run_dir(&self.run_id).join(MANIFEST_FILE);
        std::fs::write(&path, serde_json::to_vec_pretty(&manifest)?)?;
        tracing::info!(run_id = %self.run_id, "finished run");
        Ok(self.run_id)
    }
}
