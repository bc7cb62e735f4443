//! File-based persistence for the license state, with atomic writes.
//!
//! Stores the state record under `dirs::data_dir()/<namespace>/license-state.json`.
//! Uses temp file + rename for atomic writes.

use crate::store::format::StateRecord;
use crate::LicenseError;
use std::fs;
use std::path::{Path, PathBuf};

const STATE_FILE_NAME: &str = "license-state.json";

/// File holding the persisted license state of this node.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Create a state file under the platform data dir.
    pub fn new(namespace: &str) -> Result<Self, LicenseError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| LicenseError::StoreIO("Could not find data directory".to_string()))?;
        Self::in_dir(base_dir.join(namespace))
    }

    /// Create a state file inside a specific directory.
    pub fn in_dir(dir: PathBuf) -> Result<Self, LicenseError> {
        fs::create_dir_all(&dir)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to create state dir: {}", e)))?;
        Ok(Self {
            path: dir.join(STATE_FILE_NAME),
        })
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save a record atomically.
    pub fn save(&self, record: &StateRecord) -> Result<(), LicenseError> {
        let temp_path = self.path.with_extension("json.tmp");
        let json = record.to_json()?;

        fs::write(&temp_path, &json)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to write temp file: {}", e)))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to rename state file: {}", e)))?;

        Ok(())
    }

    /// Load the record, `None` if nothing was persisted yet.
    pub fn load(&self) -> Result<Option<StateRecord>, LicenseError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to read state file: {}", e)))?;

        StateRecord::from_json(&json).map(Some)
    }
}
