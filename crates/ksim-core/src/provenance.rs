//! Provenance and schema descriptors attached to KSIM artefacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information recorded alongside run artefacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Schema of the artefact the provenance is attached to.
    pub schema_version: SchemaVersion,
    /// Master deterministic seed used for all randomness.
    pub seed: u64,
    /// ISO-8601 timestamp recording when the artefact was generated.
    pub created_at: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Creates provenance for the given seed, stamped with this crate's version.
    pub fn for_seed(seed: u64, created_at: impl Into<String>) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert("ksim-core".to_string(), env!("CARGO_PKG_VERSION").to_string());
        Self {
            schema_version: SchemaVersion::default(),
            seed,
            created_at: created_at.into(),
            tool_versions,
        }
    }
}
