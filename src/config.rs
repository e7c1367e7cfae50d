//! Gate configuration
//!
//! Where the permission file lives, which origins are trusted and where
//! logs go. Loaded from an optional JSON file, then environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{GateError, GateResult};

/// Default permission file name
const DEFAULT_PERMISSION_FILE: &str = "permission.json";

/// Default logs directory
const DEFAULT_LOG_DIR: &str = "logs";

/// Overrides the permission file path
pub const ENV_PERMISSION_FILE: &str = "GATE_PERMISSION_FILE";

/// Comma-separated trusted origins, replacing the configured list
pub const ENV_TRUSTED_ORIGINS: &str = "GATE_TRUSTED_ORIGINS";

/// Configuration for the permission gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Backing file for recorded decisions
    pub permission_file: PathBuf,
    /// Origins granted every capability
    pub trusted_origins: Vec<String>,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
}

impl GateConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            permission_file: PathBuf::from(DEFAULT_PERMISSION_FILE),
            trusted_origins: Vec::new(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }

    /// Read a JSON configuration file
    ///
    /// Missing fields take their defaults and unknown keys are ignored.
    pub fn from_file(path: impl AsRef<Path>) -> GateResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            GateError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| GateError::Config(format!("invalid {}: {}", path.display(), e)))
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_PERMISSION_FILE).filter(|v| !v.trim().is_empty()) {
            self.permission_file = PathBuf::from(path.trim());
        }
        if let Some(list) = lookup(ENV_TRUSTED_ORIGINS) {
            self.trusted_origins = list
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    /// Set the permission file
    pub fn with_permission_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.permission_file = path.into();
        self
    }

    /// Add a trusted origin
    pub fn with_trusted_origin(mut self, origin: impl Into<String>) -> Self {
        self.trusted_origins.push(origin.into());
        self
    }

    /// Replace the trusted origins
    pub fn with_trusted_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trusted_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Set the logs directory
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new()
    }
}
