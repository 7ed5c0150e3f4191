//! Blank templates and alignment of sparse counts onto them.

use courtmap_common::booking::{Grouping, Period};
use courtmap_common::court::SlotClass;
use courtmap_common::error::HeatmapError;

use crate::aggregate::SlotCounts;
use crate::assembler::Selection;
use crate::matrix::UsageMatrix;

/// The exhaustive set of valid (slot, period) cells for a slot class and
/// grouping, independent of any bookings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlankTemplate {
    class: SlotClass,
    grouping: Grouping,
    slots: Vec<u32>,
    periods: Vec<Period>,
}

impl BlankTemplate {
    /// Build a template. Rows are sorted chronologically and columns into
    /// canonical order; periods of the other grouping are ignored.
    ///
    /// The row count must match the class, and a day template must carry
    /// all seven weekdays. Month templates may omit months.
    pub fn new(
        class: SlotClass,
        grouping: Grouping,
        slots: impl IntoIterator<Item = u32>,
        periods: impl IntoIterator<Item = Period>,
    ) -> Result<Self, HeatmapError> {
        let mut slots: Vec<u32> = slots.into_iter().collect();
        slots.sort_unstable();
        slots.dedup();

        let mut periods: Vec<Period> = periods
            .into_iter()
            .filter(|p| p.grouping() == grouping)
            .collect();
        periods.sort_unstable();
        periods.dedup();

        let template = Self {
            class,
            grouping,
            slots,
            periods,
        };

        if template.slots.len() != class.row_count() {
            return Err(HeatmapError::TemplateRowCount {
                template: template.key(),
                expected: class.row_count(),
                actual: template.slots.len(),
            });
        }
        if grouping == Grouping::Day {
            if let Some(missing) = Period::canonical(Grouping::Day)
                .into_iter()
                .find(|p| !template.periods.contains(p))
            {
                return Err(HeatmapError::IncompleteTemplate {
                    template: template.key(),
                    period: missing.to_string(),
                });
            }
        }
        Ok(template)
    }

    /// Every slot and every canonical period of `grouping`.
    pub fn full(class: SlotClass, grouping: Grouping) -> Self {
        Self {
            class,
            grouping,
            slots: (0..class.row_count() as u32).collect(),
            periods: Period::canonical(grouping),
        }
    }

    /// Template name, e.g. `blank_60_month`.
    pub fn key(&self) -> String {
        self.class.template_key(self.grouping)
    }

    pub fn class(&self) -> SlotClass {
        self.class
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
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

    pub fn contains_period(&self, period: Period) -> bool {
        self.periods.binary_search(&period).is_ok()
    }

    fn position(&self, slot: u32, period: Period) -> Option<(usize, usize)> {
        let row = self.slots.binary_search(&slot).ok()?;
        let col = self.periods.binary_search(&period).ok()?;
        Some((row, col))
    }
}

/// Overlay `counts` onto `template`: cells without bookings are zero, and
/// a count for a cell the template lacks is a data-integrity error.
pub fn align(
    counts: &SlotCounts,
    template: &BlankTemplate,
    selection: &Selection,
) -> Result<UsageMatrix, HeatmapError> {
    let mut matrix = UsageMatrix::zeros(template.slots.clone(), template.periods.clone());

    for (&(slot, period), &count) in counts {
        let (row, col) =
            template
                .position(slot, period)
                .ok_or_else(|| HeatmapError::UnknownCell {
                    court: selection.court.display_name().to_string(),
                    grouping: selection.grouping.to_string(),
                    year: selection.year.to_string(),
                    template: template.key(),
                    slot,
                    period: period.to_string(),
                })?;
        matrix.set(row, col, count);
    }

    Ok(matrix)
}
