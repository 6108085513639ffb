//! A run directory on disk.

use std::path::{Path, PathBuf};

use eci_analysis::WindowSpec;
use eci_core::constants::{EXTERNAL_TABLE_FILE, INTERNAL_TABLE_FILE};
use eci_core::errors::StorageError;
use eci_core::types::RunManifest;

use crate::join::{join_tables, JoinedCohort};
use crate::manifest::load_manifest;
use crate::subsample::SmokeSample;
use crate::tables::{read_external_table, read_internal_table};

#[derive(Debug, Clone)]
pub struct RunDirectory {
    root: PathBuf,
}

impl RunDirectory {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StorageError::FileNotFound {
                what: "run directory".to_string(),
                path: root.display().to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn internal_path(&self) -> PathBuf {
        self.root.join(INTERNAL_TABLE_FILE)
    }

    pub fn external_path(&self) -> PathBuf {
        self.root.join(EXTERNAL_TABLE_FILE)
    }

    pub fn manifest(&self) -> Result<RunManifest, StorageError> {
        load_manifest(&self.root)
    }

    /// Read, optionally subsample, and join both tables.
    pub fn load_cohort(
        &self,
        windows: &WindowSpec,
        smoke: Option<&SmokeSample>,
    ) -> Result<JoinedCohort, StorageError> {
        let mut internal = read_internal_table(&self.internal_path(), windows)?;
        let external = read_external_table(&self.external_path())?;
        if let Some(sample) = smoke {
            internal = sample.apply(internal);
        }
        join_tables(internal, external, windows)
    }
}
