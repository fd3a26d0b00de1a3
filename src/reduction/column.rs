//! GF(2) column arithmetic for boundary matrix reduction

use std::collections::BTreeSet;

/// Sparse GF(2) column: the set of non-zero row indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Column {
    rows: BTreeSet<usize>,
}

impl Column {
    pub(crate) fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut column = Self::default();
        for row in indices {
            column.toggle(row);
        }
        column
    }

    #[cfg(test)]
    pub(crate) fn is_zero(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lowest (maximum) non-zero row
    pub(crate) fn low(&self) -> Option<usize> {
        self.rows.iter().next_back().copied()
    }

    /// Addition over Z/2Z: symmetric difference
    pub(crate) fn add_assign(&mut self, other: &Column) {
        for &row in &other.rows {
            self.toggle(row);
        }
    }

    /// Non-zero rows in increasing order
    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    fn toggle(&mut self, row: usize) {
        if !self.rows.remove(&row) {
            self.rows.insert(row);
        }
    }
}
