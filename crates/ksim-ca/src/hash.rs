use sha2::{Digest, Sha256};

use crate::history::SpacetimeHistory;

/// Computes the canonical SHA-256 hash of a spacetime history.
///
/// The encoding is the row count followed by each row's length and cells,
/// all little-endian, so equal histories hash equally on every platform.
pub fn canonical_history_hash(history: &SpacetimeHistory) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"ksim-spacetime");
    hasher.update((history.len() as u64).to_le_bytes());
    for row in history {
        hasher.update((row.len() as u64).to_le_bytes());
        for cell in row.as_slice() {
            hasher.update(cell.to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}
