//! Booking counts per (time slot, period).

use std::collections::HashMap;

use courtmap_common::booking::{BookingRecord, Grouping, Period};

/// Sparse counts keyed by `(time_slot, period)`; unordered.
pub type SlotCounts = HashMap<(u32, Period), u32>;

pub fn count_slots<'a>(
    records: impl IntoIterator<Item = &'a BookingRecord>,
    grouping: Grouping,
) -> SlotCounts {
    let mut counts = SlotCounts::new();
    for record in records {
        *counts
            .entry((record.time_slot, record.period(grouping)))
            .or_insert(0) += 1;
    }
    counts
}
