//! Permission manager implementation
//!
//! Holds the per-(origin, capability) decisions made for the hosted web
//! content, persists them to a JSON file and applies the trusted-origin
//! bypass.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::origin::trusted_forms;
use super::storage::{self, PermissionDecision, PermissionTable};
use crate::config::GateConfig;
use crate::core::GateResult;

/// Persistent store of capability decisions for web origins
///
/// Matching is by exact string on both origin and capability. Absence of a
/// record means the pair is undecided; that state is never written.
#[derive(Debug)]
pub struct PermissionManager {
    /// Backing JSON file
    path: PathBuf,
    /// Origins that are granted every capability
    trusted: HashSet<String>,
    /// Recorded decisions
    records: PermissionTable,
}

impl PermissionManager {
    /// Create a manager backed by `path`, trusting the given origins.
    ///
    /// Existing records are loaded from `path`. A missing, unreadable or
    /// malformed file leaves the manager empty; construction never fails.
    pub fn new<I, S>(path: impl Into<PathBuf>, trusted_origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let path = path.into();
        let trusted: HashSet<String> = trusted_origins
            .into_iter()
            .flat_map(|origin| trusted_forms(origin.as_ref()))
            .collect();

        let records = match storage::load(&path) {
            Ok(records) => {
                tracing::debug!(
                    "Loaded permissions for {} origin(s) from {}",
                    records.len(),
                    path.display()
                );
                records
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("No permission file at {}, starting empty", path.display());
                PermissionTable::new()
            }
            Err(e) => {
                tracing::debug!("Ignoring unreadable permission file: {}", e);
                PermissionTable::new()
            }
        };

        Self {
            path,
            trusted,
            records,
        }
    }

    /// Create a manager from the configured file and trusted origins
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(&config.permission_file, &config.trusted_origins)
    }

    /// Whether `origin` is in the trusted set
    pub fn is_trusted(&self, origin: &str) -> bool {
        self.trusted.contains(origin)
    }

    /// Check whether `capability` is granted for `origin`
    ///
    /// Trusted origins are granted every capability.
    pub fn is_granted(&self, origin: &str, capability: &str) -> bool {
        if self.is_trusted(origin) {
            return true;
        }
        self.decision(origin, capability) == Some(PermissionDecision::Granted)
    }

    /// Check whether `capability` is denied for `origin`
    ///
    /// Never true for a trusted origin, whatever is stored.
    pub fn is_denied(&self, origin: &str, capability: &str) -> bool {
        if self.is_trusted(origin) {
            return false;
        }
        self.decision(origin, capability) == Some(PermissionDecision::Denied)
    }

    /// The stored record for the pair, ignoring trust
    pub fn decision(&self, origin: &str, capability: &str) -> Option<PermissionDecision> {
        self.records
            .get(origin)
            .and_then(|capabilities| capabilities.get(capability))
            .copied()
    }

    /// Grant `capability` to `origin` and persist
    pub fn grant(&mut self, origin: &str, capability: &str) -> GateResult<()> {
        self.record(origin, capability, PermissionDecision::Granted)
    }

    /// Deny `capability` to `origin` and persist
    pub fn deny(&mut self, origin: &str, capability: &str) -> GateResult<()> {
        self.record(origin, capability, PermissionDecision::Denied)
    }

    /// Overwrite the pair, then rewrite the whole file.
    ///
    /// On a write error the in-memory record stays updated.
    fn record(
        &mut self,
        origin: &str,
        capability: &str,
        decision: PermissionDecision,
    ) -> GateResult<()> {
        tracing::info!(
            "Recording {} for {} on {}",
            decision.as_str(),
            capability,
            origin
        );
        self.records
            .entry(origin.to_string())
            .or_default()
            .insert(capability.to_string(), decision);

        storage::save(&self.path, &self.records)
    }

    /// Iterate over the configured trusted origins
    pub fn trusted_origins(&self) -> impl Iterator<Item = &str> {
        self.trusted.iter().map(|s| s.as_str())
    }

    /// All stored records as `(origin, capability, decision)`
    pub fn records(&self) -> impl Iterator<Item = (&str, &str, PermissionDecision)> {
        self.records.iter().flat_map(|(origin, capabilities)| {
            capabilities
                .iter()
                .map(move |(capability, decision)| (origin.as_str(), capability.as_str(), *decision))
        })
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.values().map(|capabilities| capabilities.len()).sum()
    }

    /// Whether no records are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
