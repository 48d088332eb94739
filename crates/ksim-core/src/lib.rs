#![deny(missing_docs)]
#![doc = "Shared building blocks for the KSIM cellular automaton and MCMC crates."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, SimError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
