//! Disk persistence for the search policy.
//!
//! The policy is shared preference state: every rendering surface of one
//! deployment observes the same fuel kind, radius, and sort order. This
//! store keeps it in a small JSON file so a restart comes back with the
//! user's last settings. Preferences never expire.

use std::path::{Path, PathBuf};

use crate::ranker::Policy;

/// Error from the settings store.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Could not serialize the policy
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Could not read or write the settings file
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON-file-backed policy store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Try to load a previously saved policy.
    ///
    /// Returns `None` if the file doesn't exist, can't be read, or doesn't
    /// parse — a corrupt settings file falls back to defaults rather than
    /// blocking startup.
    pub fn load(&self) -> Option<Policy> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Save the policy, creating parent directories if needed.
    pub fn save(&self, policy: &Policy) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(policy)?;
        std::fs::write(&self.path, json)?;

        Ok(())
    }

    /// Get the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
