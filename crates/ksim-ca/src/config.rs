use std::fs;
use std::path::Path;

use ksim_core::errors::{ErrorInfo, SimError};
use ksim_core::RngHandle;
use serde::{Deserialize, Serialize};

use crate::engine::Automaton;
use crate::random::random_configuration;
use crate::rule::CellState;

/// YAML-configurable description of an automaton run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatonConfig {
    /// Rule number in `[0, num_states^(num_states^2))`.
    pub rule_number: u64,
    /// Number of states per cell.
    #[serde(default = "default_num_states")]
    pub num_states: u32,
    /// Number of synchronous updates to apply.
    #[serde(default)]
    pub steps: usize,
    /// How the initial configuration is obtained.
    pub initial: InitialCondition,
    /// Seed for random initial conditions.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_num_states() -> u32 {
    3
}

fn default_seed() -> u64 {
    0x0CA5_EED0_0000_0001
}

/// Source of the initial configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InitialCondition {
    /// Cells supplied verbatim.
    Explicit {
        /// Initial cell states.
        cells: Vec<CellState>,
    },
    /// Uniformly random cells drawn from the configured seed.
    Random {
        /// Number of cells.
        length: usize,
    },
}

impl AutomatonConfig {
    /// Creates a configuration with default states, steps and seed.
    pub fn new(rule_number: u64, initial: InitialCondition) -> Self {
        Self {
            rule_number,
            num_states: default_num_states(),
            steps: 0,
            initial,
            seed: default_seed(),
        }
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SimError> {
        serde_yaml::from_str(yaml)
            .map_err(|err| SimError::Config(ErrorInfo::new("automaton-config-parse", err.to_string())))
    }

    /// Loads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SimError::Config(
                ErrorInfo::new("automaton-config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Resolves the initial cells, drawing them from `seed` when random.
    pub fn initial_cells(&self) -> Result<Vec<CellState>, SimError> {
        match &self.initial {
            InitialCondition::Explicit { cells } => Ok(cells.clone()),
            InitialCondition::Random { length } => {
                let mut rng = RngHandle::from_seed(self.seed);
                random_configuration(*length, self.num_states, &mut rng)
                    .map(|config| config.into_inner())
            }
        }
    }

    /// Builds the automaton and evolves it for the configured number of steps.
    pub fn run(&self) -> Result<Automaton, SimError> {
        let cells = self.initial_cells()?;
        let mut automaton = Automaton::new(self.rule_number, &cells, self.num_states)?;
        automaton.evolve(self.steps);
        Ok(automaton)
    }
}
