//! Permission file storage
//!
//! Reads and writes the backing JSON file. The on-disk shape is a nested
//! mapping `{ origin: { capability: "granted" | "denied" } }` with no
//! schema version.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::{GateError, GateResult};

/// A stored decision for an (origin, capability) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionDecision {
    /// The capability is allowed for the origin
    Granted,
    /// The capability is refused for the origin
    Denied,
}

impl PermissionDecision {
    /// Parse the literal stored in the file
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }

    /// The literal written to the file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

/// origin -> capability -> decision
///
/// Ordered maps keep the written file stable between rewrites.
pub type PermissionTable = BTreeMap<String, BTreeMap<String, PermissionDecision>>;

/// Load the record set from `path`.
///
/// Fails with [`GateError::NotFound`] when the file is absent,
/// [`GateError::Io`] when it cannot be read and [`GateError::Json`] when it
/// is not a JSON object. Within a valid object, entries of the wrong shape
/// are skipped.
pub fn load(path: &Path) -> GateResult<PermissionTable> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(GateError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let root: Map<String, Value> = serde_json::from_str(&text)?;
    let mut table = PermissionTable::new();

    for (origin, entry) in root {
        let Value::Object(capabilities) = entry else {
            tracing::debug!("Skipping non-object entry for origin {}", origin);
            continue;
        };

        let mut decisions = BTreeMap::new();
        for (capability, value) in capabilities {
            match value.as_str().and_then(PermissionDecision::parse) {
                Some(decision) => {
                    decisions.insert(capability, decision);
                }
                None => {
                    tracing::debug!(
                        "Skipping unrecognized value for {} / {}: {}",
                        origin,
                        capability,
                        value
                    );
                }
            }
        }

        if !decisions.is_empty() {
            table.insert(origin, decisions);
        }
    }

    Ok(table)
}

/// Write the full record set to `path`.
///
/// The JSON is written to a temp file next to the target and renamed over
/// it, so the file on disk is either the previous or the new record set.
/// Every failure is reported as [`GateError::Persistence`].
pub fn save(path: &Path, table: &PermissionTable) -> GateResult<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    write_atomic(parent, path, table).map_err(|e| GateError::persistence(path, e))?;

    tracing::debug!(
        "Wrote {} origin(s) to {}",
        table.len(),
        path.display()
    );
    Ok(())
}

fn write_atomic(parent: &Path, path: &Path, table: &PermissionTable) -> io::Result<()> {
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut temp, table)?;
    temp.write_all(b"\n")?;
    temp.flush()?;

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
