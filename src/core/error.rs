//! Error types for the permission gate

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the permission store and its collaborators
#[derive(Debug, Error)]
pub enum GateError {
    /// The backing file does not exist
    #[error("permission file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading a file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The content is not the expected JSON shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the permission file failed after a decision was recorded
    #[error("failed to persist permissions to {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be read or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The prompt collaborator failed to produce an answer
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl GateError {
    /// Wrap an IO error raised while writing `path`
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the backing file was simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias used across the crate
pub type GateResult<T> = Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_display_names_path() {
        let err = GateError::persistence(
            "/tmp/permission.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/permission.json"), "got: {msg}");
        assert!(msg.contains("read-only"), "got: {msg}");
    }

    #[test]
    fn test_is_not_found() {
        assert!(GateError::NotFound(PathBuf::from("x.json")).is_not_found());
        assert!(!GateError::Config("bad".into()).is_not_found());
    }
}
