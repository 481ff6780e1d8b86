//! Run configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or no
//! file at all) gives the stock behaviour.
//!
//! ```toml
//! extension = "fmg"
//! empty_markers = ["[ERROR]"]
//! report_suffix = ".txt"
//! report_dir = "reports"
//! keep_going = false
//! apply_stray_overrides = false
//! ```

use crate::error::{FmgError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarryConfig {
    /// Extension (without dot) of container files picked up by discovery
    pub extension: String,

    /// Texts treated as equal to an empty string when comparing
    pub empty_markers: Vec<String>,

    /// Appended to a container's file name to name its review file
    pub report_suffix: String,

    /// Directory review files are written to in report mode
    pub report_dir: PathBuf,

    /// Continue with the next file after a per-file failure
    pub keep_going: bool,

    /// In merge mode, also apply overrides for identifiers whose source
    /// text did not change
    pub apply_stray_overrides: bool,
}

impl Default for CarryConfig {
    fn default() -> Self {
        CarryConfig {
            extension: "fmg".to_string(),
            empty_markers: vec!["[ERROR]".to_string()],
            report_suffix: ".txt".to_string(),
            report_dir: PathBuf::from("."),
            keep_going: false,
            apply_stray_overrides: false,
        }
    }
}

impl CarryConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: CarryConfig =
            toml::from_str(text).map_err(|e| FmgError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(FmgError::Config("extension cannot be empty".to_string()));
        }

        if self.report_suffix.is_empty() {
            return Err(FmgError::Config(
                "report_suffix cannot be empty".to_string(),
            ));
        }

        if self.report_suffix.contains(['/', '\\']) {
            return Err(FmgError::Config(format!(
                "report_suffix '{}' must not contain a path separator",
                self.report_suffix
            )));
        }

        Ok(())
    }

    /// Extension without a leading dot
    pub fn extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }

    /// Review file name for a container file name (`item.fmg` -> `item.fmg.txt`)
    pub fn review_file_name(&self, container_name: &str) -> String {
        format!("{}{}", container_name, self.report_suffix)
    }
}
