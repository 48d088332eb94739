use ksim_core::errors::{ErrorInfo, SimError};
use serde::{Deserialize, Serialize};

/// State of a single cell, always in `[0, num_states)`.
pub type CellState = u32;

/// Largest supported state cardinality.
///
/// The lookup table holds `num_states^2` entries, so this caps it at 16M cells.
pub const MAX_NUM_STATES: u32 = 1 << 12;

/// Two-cell neighborhood consulted when updating a cell: its left neighbor and itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Neighborhood {
    /// State of the cell to the left (wrapping around at index 0).
    pub left: CellState,
    /// State of the cell being updated.
    pub center: CellState,
}

impl Neighborhood {
    /// Creates a neighborhood from its left and center states.
    pub const fn new(left: CellState, center: CellState) -> Self {
        Self { left, center }
    }
}

/// Transition table mapping every [`Neighborhood`] to its next state.
///
/// Entries are stored densely in enumeration order, so the neighborhood
/// `(left, center)` lives at index `left * num_states + center`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupTable {
    num_states: u32,
    outputs: Vec<CellState>,
}

impl LookupTable {
    /// Number of states each cell can take.
    pub fn num_states(&self) -> u32 {
        self.num_states
    }

    /// Number of entries, always `num_states^2`.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns `true` if the table has no entries. Never the case for a built table.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Returns the output for a neighborhood, or `None` if either state is out of range.
    pub fn get(&self, neighborhood: Neighborhood) -> Option<CellState> {
        if neighborhood.left >= self.num_states || neighborhood.center >= self.num_states {
            return None;
        }
        Some(self.lookup(neighborhood.left, neighborhood.center))
    }

    /// Outputs in enumeration order (left-major).
    pub fn outputs(&self) -> &[CellState] {
        &self.outputs
    }

    /// Iterates over `(neighborhood, output)` pairs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (Neighborhood, CellState)> + '_ {
        neighborhoods(self.num_states).zip(self.outputs.iter().copied())
    }

    /// Re-encodes the table into the rule number it was decoded from.
    pub fn rule_number(&self) -> Result<u64, SimError> {
        encode_rule_number(&self.outputs, self.num_states)
    }

    /// Unchecked lookup for states already validated against `num_states`.
    pub(crate) fn lookup(&self, left: CellState, center: CellState) -> CellState {
        self.outputs[left as usize * self.num_states as usize + center as usize]
    }
}

/// Enumerates all neighborhoods over `num_states` states, left component slowest.
pub fn neighborhoods(num_states: u32) -> impl Iterator<Item = Neighborhood> {
    (0..num_states)
        .flat_map(move |left| (0..num_states).map(move |center| Neighborhood::new(left, center)))
}

/// Returns the largest valid rule number for `num_states`, or `None` when
/// `num_states^(num_states^2)` exceeds `u64` and every `u64` is a valid rule.
pub fn max_rule_number(num_states: u32) -> Result<Option<u64>, SimError> {
    let size = table_size(num_states)?;
    let mut count: u64 = 1;
    for _ in 0..size {
        match count.checked_mul(u64::from(num_states)) {
            Some(next) => count = next,
            None => return Ok(None),
        }
    }
    Ok(Some(count - 1))
}

/// Decodes a rule number into the lookup table for `num_states` states.
///
/// The rule number is written in base `num_states`, zero padded to
/// `num_states^2` digits. Its least significant digit is the output for the
/// first neighborhood `(0, 0)`, the next digit for `(0, 1)`, and so on.
pub fn build_lookup_table(rule_number: u64, num_states: u32) -> Result<LookupTable, SimError> {
    let size = table_size(num_states)?;
    if let Some(max) = max_rule_number(num_states)? {
        if rule_number > max {
            return Err(SimError::InvalidArgument(
                ErrorInfo::new(
                    "rule-number-out-of-range",
                    "rule number exceeds num_states^(num_states^2) - 1",
                )
                .with_context("rule_number", rule_number)
                .with_context("num_states", num_states)
                .with_context("max", max),
            ));
        }
    }

    let base = u64::from(num_states);
    let mut remaining = rule_number;
    let mut outputs = Vec::with_capacity(size);
    for _ in 0..size {
        // Each digit is < num_states, which is a u32.
        outputs.push((remaining % base) as CellState);
        remaining /= base;
    }
    Ok(LookupTable {
        num_states,
        outputs,
    })
}

/// Encodes outputs listed in enumeration order back into a rule number.
pub fn encode_rule_number(outputs: &[CellState], num_states: u32) -> Result<u64, SimError> {
    let size = table_size(num_states)?;
    if outputs.len() != size {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("table-size-mismatch", "table must have num_states^2 entries")
                .with_context("expected", size)
                .with_context("actual", outputs.len()),
        ));
    }
    let base = u64::from(num_states);
    let mut rule: u64 = 0;
    for (index, &digit) in outputs.iter().enumerate().rev() {
        if digit >= num_states {
            return Err(SimError::InvalidArgument(
                ErrorInfo::new("state-out-of-range", "table output outside [0, num_states)")
                    .with_context("index", index)
                    .with_context("value", digit)
                    .with_context("num_states", num_states),
            ));
        }
        rule = rule
            .checked_mul(base)
            .and_then(|shifted| shifted.checked_add(u64::from(digit)))
            .ok_or_else(|| {
                SimError::InvalidArgument(
                    ErrorInfo::new("rule-number-overflow", "table does not fit a 64-bit rule number")
                        .with_context("num_states", num_states),
                )
            })?;
    }
    Ok(rule)
}

fn table_size(num_states: u32) -> Result<usize, SimError> {
    if num_states < 2 {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("num-states-too-small", "num_states must be at least 2")
                .with_context("num_states", num_states),
        ));
    }
    if num_states > MAX_NUM_STATES {
        return Err(SimError::InvalidArgument(
            ErrorInfo::new("num-states-too-large", "num_states exceeds the supported maximum")
                .with_context("num_states", num_states)
                .with_context("max", MAX_NUM_STATES),
        ));
    }
    let states = num_states as usize;
    Ok(states * states)
}

pub(crate) fn check_num_states(num_states: u32) -> Result<(), SimError> {
    table_size(num_states).map(|_| ())
}

/// Checks that every cell lies in `[0, num_states)`, naming the first offender.
pub(crate) fn check_cells(cells: &[CellState], num_states: u32) -> Result<(), SimError> {
    check_num_states(num_states)?;
    match cells.iter().position(|&cell| cell >= num_states) {
        Some(index) => Err(SimError::InvalidArgument(
            ErrorInfo::new(
                "state-out-of-range",
                format!(
                    "configuration value {} is outside [0, {}]",
                    cells[index],
                    num_states - 1
                ),
            )
            .with_context("index", index)
            .with_context("value", cells[index])
            .with_context("num_states", num_states),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_state_table_matches_ternary_digits() {
        // 5 is "12" in base 3: (0,0) -> 2, (0,1) -> 1, everything else 0.
        let table = build_lookup_table(5, 3).unwrap();
        assert_eq!(table.outputs(), &[2, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(table.get(Neighborhood::new(0, 0)), Some(2));
        assert_eq!(table.get(Neighborhood::new(0, 1)), Some(1));
        assert_eq!(table.get(Neighborhood::new(2, 2)), Some(0));
        assert_eq!(table.get(Neighborhood::new(3, 0)), None);
    }

    #[test]
    fn max_rule_fills_every_entry_with_top_state() {
        let table = build_lookup_table(3u64.pow(9) - 1, 3).unwrap();
        assert!(table.outputs().iter().all(|&state| state == 2));
    }

    #[test]
    fn max_rule_number_saturates_beyond_u64() {
        assert_eq!(max_rule_number(2).unwrap(), Some(15));
        assert_eq!(max_rule_number(3).unwrap(), Some(19_682));
        assert_eq!(max_rule_number(4).unwrap(), Some(u64::from(u32::MAX)));
        assert_eq!(max_rule_number(6).unwrap(), None);
    }

    #[test]
    fn enumeration_is_left_major() {
        let order: Vec<_> = neighborhoods(2).map(|n| (n.left, n.center)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn check_cells_names_offending_value() {
        let err = check_cells(&[0, 1, 5, 2], 3).unwrap_err();
        assert_eq!(err.code(), "state-out-of-range");
        assert_eq!(err.info().context["value"], "5");
        assert_eq!(err.info().context["index"], "2");
    }
}
