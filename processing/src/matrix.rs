//! Dense booking-count grid.

use courtmap_common::booking::Period;

/// Counts indexed by (time-slot row, period column).
///
/// Rows follow the template's slot order (chronological), columns the
/// canonical weekday or month order. Every cell is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageMatrix {
    slots: Vec<u32>,
    periods: Vec<Period>,
    cells: Vec<u32>,
}

impl UsageMatrix {
    /// An all-zero matrix with the given axes.
    pub fn zeros(slots: Vec<u32>, periods: Vec<Period>) -> Self {
        let cells = vec![0; slots.len() * periods.len()];
        Self {
            slots,
            periods,
            cells,
        }
    }

    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn row_count(&self) -> usize {
        self.slots.len()
    }

    pub fn col_count(&self) -> usize {
        self.periods.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.row_count() && col < self.col_count() {
            Some(self.cells[row * self.col_count() + col])
        } else {
            None
        }
    }

    /// Count for a slot/period pair, if both are axes of this matrix.
    pub fn cell(&self, slot: u32, period: Period) -> Option<u32> {
        let row = self.slots.iter().position(|&s| s == slot)?;
        let col = self.periods.iter().position(|&p| p == period)?;
        self.get(row, col)
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: u32) {
        let cols = self.col_count();
        self.cells[row * cols + col] = value;
    }

    /// Row slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        // `max(1)` keeps `chunks` valid for a matrix without columns.
        self.cells.chunks(self.col_count().max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        if self.col_count() == 0 {
            return vec![Vec::new(); self.row_count()];
        }
        self.rows().map(<[u32]>::to_vec).collect()
    }

    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&c| c as u64).sum()
    }

    /// Largest cell value (0 for an empty matrix).
    pub fn max(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_zeros_and_set() {
        let mut m = UsageMatrix::zeros(
            vec![0, 1, 2],
            vec![Period::Day(Weekday::Mon), Period::Day(Weekday::Tue)],
        );
        assert_eq!(m.total(), 0);
        m.set(2, 1, 5);
        assert_eq!(m.get(2, 1), Some(5));
        assert_eq!(m.cell(2, Period::Day(Weekday::Tue)), Some(5));
        assert_eq!(m.cell(2, Period::Day(Weekday::Sun)), None);
        assert_eq!(m.get(3, 0), None);
        assert_eq!(m.to_rows(), vec![vec![0, 0], vec![0, 0], vec![0, 5]]);
        assert_eq!(m.max(), 5);
    }
}
