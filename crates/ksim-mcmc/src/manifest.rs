use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use ksim_core::errors::{ErrorInfo, SimError};
use ksim_core::provenance::RunProvenance;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ChainConfig;
use crate::ensemble::EnsembleRun;

/// Structured manifest describing a completed sampling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Configuration used for the run.
    pub config: ChainConfig,
    /// Seed, timestamp and tool versions.
    pub provenance: RunProvenance,
    /// Optional seed label captured from the configuration.
    pub seed_label: Option<String>,
    /// Hash of the data the chains were conditioned on.
    pub data_hash: String,
    /// Hash of each chain's samples, in chain order.
    pub chain_hashes: Vec<String>,
    /// Point estimate of `e` reported by the run.
    pub estimate: f64,
    /// Artefacts written next to the manifest (relative paths).
    pub artefacts: Vec<PathBuf>,
}

impl RunManifest {
    /// Describes `run`, stamping the current UTC time.
    pub fn new(config: &ChainConfig, run: &EnsembleRun, artefacts: Vec<PathBuf>) -> Self {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        Self {
            config: config.clone(),
            provenance: RunProvenance::for_seed(run.master_seed, created_at),
            seed_label: config.seed_policy.label.clone(),
            data_hash: samples_hash(&run.data),
            chain_hashes: run
                .chains
                .iter()
                .map(|chain| samples_hash(&chain.samples))
                .collect(),
            estimate: run.estimate,
            artefacts,
        }
    }

    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SimError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                SimError::Serde(
                    ErrorInfo::new("manifest-mkdir", err.to_string())
                        .with_context("path", parent.display()),
                )
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SimError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SimError::Serde(
                ErrorInfo::new("manifest-write", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SimError::Serde(
                ErrorInfo::new("manifest-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            SimError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}

/// SHA-256 over the little-endian bit patterns of `values`.
pub fn samples_hash(values: &[f64]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((values.len() as u64).to_le_bytes());
    for value in values {
        hasher.update(value.to_bits().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
