#![deny(missing_docs)]

//! Generalized K-state one-dimensional cellular automaton.
//!
//! A rule number in `[0, K^(K^2))` enumerates every local transition function
//! over the two-cell `(left, center)` neighborhood. [`build_lookup_table`]
//! decodes it once, and [`Automaton`] applies the cached table with
//! wraparound boundaries and synchronous updates, recording every timestep in
//! a [`SpacetimeHistory`].

mod config;
mod engine;
mod hash;
mod history;
mod random;
mod rule;
mod serialization;

pub use config::{AutomatonConfig, InitialCondition};
pub use engine::Automaton;
pub use hash::canonical_history_hash;
pub use history::{Configuration, SpacetimeHistory};
pub use random::{random_binary_configuration, random_configuration};
pub use rule::{
    build_lookup_table, encode_rule_number, max_rule_number, neighborhoods, CellState,
    LookupTable, Neighborhood, MAX_NUM_STATES,
};
pub use serialization::{history_from_bytes, history_from_json, history_to_bytes, history_to_json};
