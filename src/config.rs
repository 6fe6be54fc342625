//! Runtime settings.
//!
//! Precedence, lowest first: built-in defaults, a JSON settings file
//! (`--config` or `QCPACK_CONFIG`), then `QCPACK_BOX_CAPACITY`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluator::Thresholds;

pub const CONFIG_ENV: &str = "QCPACK_CONFIG";
pub const DATA_DIR_ENV: &str = "QCPACK_DATA_DIR";
pub const BOX_CAPACITY_ENV: &str = "QCPACK_BOX_CAPACITY";

const DEFAULT_BOX_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Items per box before it is sealed.
    pub box_capacity: usize,
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            box_capacity: DEFAULT_BOX_CAPACITY,
            thresholds: Thresholds::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut settings = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read settings file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(BOX_CAPACITY_ENV) {
            self.box_capacity = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{} must be a positive integer, got '{}'", BOX_CAPACITY_ENV, raw))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.box_capacity == 0 {
            return Err(Error::Config("box_capacity must be at least 1".to_string()));
        }
        self.thresholds.validate()
    }
}

/// Data directory: explicit path, then `QCPACK_DATA_DIR`, then the platform
/// data directory.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let dirs = directories::ProjectDirs::from("", "", "qcpack")
        .ok_or_else(|| Error::Config("could not determine data directory".to_string()))?;
    Ok(dirs.data_dir().to_path_buf())
}
