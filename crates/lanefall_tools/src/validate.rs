//! Data validation utilities.

use std::fs;
use std::path::{Path, PathBuf};

use lanefall_core::data::MatchConfig;

use crate::error::{ToolError, ToolResult};

/// Outcome of validating one or more match files.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Files that passed.
    pub passed: Vec<PathBuf>,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl ValidationReport {
    /// Number of files looked at.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// Whether every file passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turn the report into an error if anything failed.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ValidationFailed`] when any file failed.
    pub fn into_result(self) -> ToolResult<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(ToolError::ValidationFailed {
                failed: self.failed.len(),
                checked: self.checked(),
            })
        }
    }
}

/// Load a match config from a RON file and check it.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or fails
/// [`MatchConfig::validate`].
pub fn load_match_config(path: &Path) -> ToolResult<MatchConfig> {
    let text = fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    let config = MatchConfig::from_ron_str(&text).map_err(|e| ToolError::game(path, e))?;
    config.validate().map_err(|e| ToolError::game(path, e))?;
    Ok(config)
}

/// Validate a single RON file, or every `.ron` file directly inside a
/// directory (in name order).
///
/// Individual file failures are collected in the report rather than
/// returned as errors.
///
/// # Errors
///
/// Returns an error only if the path itself cannot be read.
pub fn validate_path(path: &Path) -> ToolResult<ValidationReport> {
    let files = if path.is_dir() {
        let mut files: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| ToolError::io(path, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut report = ValidationReport::default();
    for file in files {
        match load_match_config(&file) {
            Ok(config) => {
                tracing::info!(
                    path = %file.display(),
                    units = config.units.len(),
                    cards = config.cards.len(),
                    events = config.summon_events.len(),
                    "match config valid"
                );
                report.passed.push(file);
            }
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "match config invalid");
                report.failed.push((file, e.to_string()));
            }
        }
    }
    Ok(report)
}

/// Write the built-in default match as a RON file.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_default_config(path: &Path) -> ToolResult<()> {
    let text = MatchConfig::default()
        .to_ron_string()
        .map_err(|e| ToolError::game(path, e))?;
    fs::write(path, text).map_err(|e| ToolError::io(path, e))
}
