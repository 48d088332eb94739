use serde::{Deserialize, Serialize};

use crate::rule::CellState;

/// Spatial state of the automaton at one timestep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Vec<CellState>);

impl Configuration {
    /// Wraps the given cells without validation; the engine validates on construction.
    pub fn new(cells: Vec<CellState>) -> Self {
        Self(cells)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the zero-length configuration.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cells as a slice.
    pub fn as_slice(&self) -> &[CellState] {
        &self.0
    }

    /// Consumes the configuration and returns its cells.
    pub fn into_inner(self) -> Vec<CellState> {
        self.0
    }
}

/// Append-only record of every configuration, indexed by time.
///
/// Row 0 is the initial condition. Rows are only ever appended by the engine
/// and are exposed read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpacetimeHistory {
    rows: Vec<Configuration>,
}

impl SpacetimeHistory {
    pub(crate) fn new(initial: Configuration) -> Self {
        Self {
            rows: vec![initial],
        }
    }

    pub(crate) fn from_rows(rows: Vec<Configuration>) -> Self {
        Self { rows }
    }

    pub(crate) fn push(&mut self, row: Configuration) {
        self.rows.push(row);
    }

    /// Number of recorded timesteps, including the initial condition.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false` for a history produced by the engine.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Configuration after `t` steps.
    pub fn get(&self, t: usize) -> Option<&Configuration> {
        self.rows.get(t)
    }

    /// Most recent configuration.
    pub fn last(&self) -> Option<&Configuration> {
        self.rows.last()
    }

    /// All rows in time order.
    pub fn rows(&self) -> &[Configuration] {
        &self.rows
    }

    /// Iterates over rows in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, Configuration> {
        self.rows.iter()
    }

    /// Spatial width shared by every row.
    pub fn width(&self) -> usize {
        self.rows.first().map(Configuration::len).unwrap_or(0)
    }

    /// Copies the history into a dense `time x space` matrix for plotting.
    pub fn to_matrix(&self) -> Vec<Vec<CellState>> {
        self.rows.iter().map(|row| row.as_slice().to_vec()).collect()
    }
}

impl<'a> IntoIterator for &'a SpacetimeHistory {
    type Item = &'a Configuration;
    type IntoIter = std::slice::Iter<'a, Configuration>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
