//! `runs:/<run-id>/<artifact-path>` model URIs.

use crate::error::TrackingError;
use crate::manifest::RunId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SCHEME: &str = "runs:/";

/// Address of a logged model inside the tracking store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelUri {
    pub run_id: RunId,
    pub artifact_path: String,
}

impl ModelUri {
    #[must_use]
    pub fn new(run_id: RunId, artifact_path: &str) -> Self {
        Self { run_id, artifact_path: artifact_path.to_string() }
    }
}

impl std::fmt::Display for ModelUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.run_id, self.artifact_path)
    }
}

impl FromStr for ModelUri {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TrackingError::InvalidUri {
            uri: s.to_string(),
            reason: reason.to_string(),
        };

        let rest = s.strip_prefix(SCHEME).ok_or_else(|| invalid("expected runs:/ scheme"))?;
        let (run_id, artifact_path) = rest
            .split_once('/')
            .ok_or_else(|| invalid("expected runs:/<run-id>/<artifact-path>"))?;
        if run_id.is_empty() {
            return Err(invalid("run id is empty"));
        }
        if artifact_path.is_empty() {
            return Err(invalid("artifact path is empty"));
        }
        if artifact_path.split('/').any(|part| part == "..") {
            return Err(invalid("artifact path must not contain .."));
        }
        Ok(Self {
            run_id: RunId(run_id.to_string()),
            artifact_path: artifact_path.to_string(),
        })
    }
}

impl TryFrom<String> for ModelUri {
    type Error = TrackingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelUri> for String {
    fn from(uri: ModelUri) -> Self {
        uri.to_string()
    }
}
