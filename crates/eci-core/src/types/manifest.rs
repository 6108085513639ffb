//! Run manifest: the metadata record written alongside the metric tables.

use serde::{Deserialize, Serialize};

/// Completion status of one model in the run roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

/// Run-level metadata. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunManifest {
    pub seed: Option<u64>,
    #[serde(alias = "window_size")]
    pub window_length: Option<usize>,
    pub stride: Option<usize>,
    pub models: Vec<ModelStatus>,
    /// Model whose sequences form the residualization control group.
    pub control_model: Option<String>,
}

impl RunManifest {
    /// Names of models whose generation finished.
    pub fn completed_models(&self) -> impl Iterator<Item = &str> {
        self.models
            .iter()
            .filter(|m| m.completed)
            .map(|m| m.name.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.models.iter().all(|m| m.completed)
    }
}
