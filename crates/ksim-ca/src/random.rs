use ksim_core::errors::SimError;
use rand::Rng;

use crate::history::Configuration;
use crate::rule::{check_num_states, CellState};

/// Draws `length` independent, uniformly distributed cell states in `[0, num_states)`.
pub fn random_configuration<R: Rng + ?Sized>(
    length: usize,
    num_states: u32,
    rng: &mut R,
) -> Result<Configuration, SimError> {
    check_num_states(num_states)?;
    let cells: Vec<CellState> = (0..length).map(|_| rng.gen_range(0..num_states)).collect();
    Ok(Configuration::new(cells))
}

/// Random bit string of the given length.
pub fn random_binary_configuration<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Configuration {
    Configuration::new((0..length).map(|_| rng.gen_range(0..2)).collect())
}
