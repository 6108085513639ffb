//! `manifest.json` loading.

use std::path::Path;

use eci_core::constants::MANIFEST_FILE;
use eci_core::errors::StorageError;
use eci_core::types::RunManifest;

/// Load the manifest of the run rooted at `run_dir`.
pub fn load_manifest(run_dir: &Path) -> Result<RunManifest, StorageError> {
    let path = run_dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Err(StorageError::FileNotFound {
            what: "run manifest".to_string(),
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(&path).map_err(|e| StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let manifest: RunManifest = serde_json::from_str(&content).map_err(|e| StorageError::Json {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    if !manifest.is_complete() {
        tracing::warn!(
            completed = manifest.completed_models().count(),
            models = manifest.models.len(),
            "run manifest lists unfinished models"
        );
    }
    Ok(manifest)
}
