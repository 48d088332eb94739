use ksim_core::errors::{ErrorInfo, SimError};
use ksim_core::provenance::SchemaVersion;
use serde::{Deserialize, Serialize};

use crate::history::{Configuration, SpacetimeHistory};
use crate::rule::CellState;

const HISTORY_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serializes the history to a compact binary representation using `bincode`.
pub fn history_to_bytes(history: &SpacetimeHistory) -> Result<Vec<u8>, SimError> {
    bincode::serialize(&SerializableHistory::from_history(history))
        .map_err(|err| SimError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a history from its binary representation.
pub fn history_from_bytes(bytes: &[u8]) -> Result<SpacetimeHistory, SimError> {
    let serializable: SerializableHistory = bincode::deserialize(bytes)
        .map_err(|err| SimError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    serializable.into_history()
}

/// Serializes the history to a JSON string.
pub fn history_to_json(history: &SpacetimeHistory) -> Result<String, SimError> {
    serde_json::to_string_pretty(&SerializableHistory::from_history(history))
        .map_err(|err| SimError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a history from a JSON string.
pub fn history_from_json(json: &str) -> Result<SpacetimeHistory, SimError> {
    let serializable: SerializableHistory = serde_json::from_str(json)
        .map_err(|err| SimError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_history()
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableHistory {
    schema_version: SchemaVersion,
    width: usize,
    rows: Vec<Vec<CellState>>,
}

impl SerializableHistory {
    fn from_history(history: &SpacetimeHistory) -> Self {
        Self {
            schema_version: HISTORY_SCHEMA,
            width: history.width(),
            rows: history.to_matrix(),
        }
    }

    fn into_history(self) -> Result<SpacetimeHistory, SimError> {
        if self.schema_version.major != HISTORY_SCHEMA.major {
            return Err(SimError::Serde(
                ErrorInfo::new("schema-mismatch", "unsupported history schema")
                    .with_context("major", self.schema_version.major),
            ));
        }
        if self.rows.is_empty() {
            return Err(SimError::Serde(ErrorInfo::new(
                "empty-history",
                "history must contain the initial configuration",
            )));
        }
        if let Some(time) = self.rows.iter().position(|row| row.len() != self.width) {
            return Err(SimError::Serde(
                ErrorInfo::new("ragged-history", "row width differs from the declared width")
                    .with_context("time", time)
                    .with_context("width", self.width)
                    .with_context("row_width", self.rows[time].len()),
            ));
        }
        Ok(SpacetimeHistory::from_rows(
            self.rows.into_iter().map(Configuration::new).collect(),
        ))
    }
}
