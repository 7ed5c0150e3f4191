//! Year filter over a court's bookings.

use courtmap_common::booking::{BookingRecord, YearSelector};

use crate::store::CourtDataset;

/// Records of `dataset` booked in the selected year; every record for
/// [`YearSelector::All`]. An empty result is a valid selection.
pub fn filter_year(dataset: &CourtDataset, year: YearSelector) -> Vec<&BookingRecord> {
    dataset
        .records
        .iter()
        .filter(|r| year.matches(r.year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Month, Weekday};
    use courtmap_common::court::Court;

    fn record(year: i32) -> BookingRecord {
        BookingRecord {
            year,
            time_slot: 0,
            day: Weekday::Mon,
            month: Month::January,
        }
    }

    #[test]
    fn test_filter_year() {
        let dataset = CourtDataset {
            court: Court::SquashC,
            records: vec![record(2023), record(2024), record(2024)],
        };
        assert_eq!(filter_year(&dataset, YearSelector::Year(2024)).len(), 2);
        assert_eq!(filter_year(&dataset, YearSelector::All).len(), 3);
        assert!(filter_year(&dataset, YearSelector::Year(2022)).is_empty());
    }
}
