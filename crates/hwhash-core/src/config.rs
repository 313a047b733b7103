//! Run configuration stored as JSON

use crate::error::{Error, Result};
use crate::scanner::{ScanOptions, DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything needed to run a consolidation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Free-text label used in the output file name
    pub label: String,
    /// Directory containing the exports
    pub root: PathBuf,
    /// Include files from subdirectories
    #[serde(default)]
    pub recursive: bool,
    /// Input file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Where to write the output; defaults to `root`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Skip the confirmation prompt
    #[serde(default)]
    pub assume_yes: bool,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl RunConfig {
    /// Create a config with defaults for everything but label and root
    pub fn new(label: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
            recursive: false,
            extension: default_extension(),
            output_dir: None,
            assume_yes: false,
        }
    }

    /// Load a config file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that cannot produce a usable run
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::InvalidConfig("label cannot be empty".to_string()));
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(Error::InvalidConfig(format!(
                "extension '{}' must be non-empty and given without a leading dot",
                self.extension
            )));
        }
        Ok(())
    }

    /// Directory the consolidated file is written to
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.root)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            extension: self.extension.clone(),
        }
    }
}

/// Check that `path` exists and is a directory
pub fn validate_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        Ok(())
    } else {
        Err(Error::InvalidDirectory(path.to_path_buf()))
    }
}
