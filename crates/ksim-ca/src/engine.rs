use ksim_core::errors::SimError;
use tracing::debug;

use crate::history::{Configuration, SpacetimeHistory};
use crate::rule::{build_lookup_table, check_cells, CellState, LookupTable};

/// One-dimensional K-state cellular automaton with wraparound boundaries.
///
/// The lookup table is decoded once at construction. Every step reads the
/// `(left, center)` neighborhood of each cell from the previous configuration
/// only, so updates are synchronous.
#[derive(Debug, Clone)]
pub struct Automaton {
    rule_number: u64,
    table: LookupTable,
    current: Configuration,
    history: SpacetimeHistory,
}

impl Automaton {
    /// Validates the inputs and builds an automaton at time zero.
    ///
    /// The initial cells are copied; the caller keeps ownership of `initial`.
    pub fn new(rule_number: u64, initial: &[CellState], num_states: u32) -> Result<Self, SimError> {
        check_cells(initial, num_states)?;
        let table = build_lookup_table(rule_number, num_states)?;
        let current = Configuration::new(initial.to_vec());
        debug!(
            rule_number,
            num_states,
            length = initial.len(),
            "automaton constructed"
        );
        Ok(Self {
            rule_number,
            table,
            history: SpacetimeHistory::new(current.clone()),
            current,
        })
    }

    /// Rule number the automaton was built from.
    pub fn rule_number(&self) -> u64 {
        self.rule_number
    }

    /// Number of states each cell can take.
    pub fn num_states(&self) -> u32 {
        self.table.num_states()
    }

    /// Cached transition table.
    pub fn lookup_table(&self) -> &LookupTable {
        &self.table
    }

    /// Configuration at the latest timestep.
    pub fn current(&self) -> &Configuration {
        &self.current
    }

    /// Every configuration since construction.
    pub fn history(&self) -> &SpacetimeHistory {
        &self.history
    }

    /// Number of steps applied so far.
    pub fn steps_evolved(&self) -> usize {
        self.history.len() - 1
    }

    /// Advances the automaton by `time_steps` synchronous updates.
    pub fn evolve(&mut self, time_steps: usize) {
        for _ in 0..time_steps {
            self.step();
        }
        debug!(
            time_steps,
            total_steps = self.steps_evolved(),
            "automaton evolved"
        );
    }

    /// Applies a single synchronous update and records it.
    pub fn step(&mut self) {
        let next = self.next_configuration();
        self.history.push(next.clone());
        self.current = next;
    }

    fn next_configuration(&self) -> Configuration {
        let cells = self.current.as_slice();
        let len = cells.len();
        if len == 0 {
            return Configuration::default();
        }
        let next = (0..len)
            .map(|index| {
                let left = cells[(index + len - 1) % len];
                self.table.lookup(left, cells[index])
            })
            .collect();
        Configuration::new(next)
    }
}
