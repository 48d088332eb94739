use ksim_core::derive_substream_seed;

/// Derives the deterministic seed used to synthesize the dataset.
pub fn dataset_seed(master_seed: u64) -> u64 {
    derive_substream_seed(master_seed ^ 0xDA7A_DA7A_DA7A_DA7A, 0)
}

/// Derives the deterministic seed used by a specific chain.
pub fn chain_seed(master_seed: u64, chain_index: usize) -> u64 {
    derive_substream_seed(master_seed, chain_index as u64)
}
