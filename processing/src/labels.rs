//! Row (start time) and column (weekday/month) labels.

use courtmap_common::court::{Court, CourtProfile};
use courtmap_common::error::HeatmapError;

use crate::template::BlankTemplate;

/// `HH:MM` start time of each of `row_count` slots.
///
/// Slot `i` starts at `start + i * slot_minutes`. The count must equal the
/// row count of the court's slot class. Hours are not wrapped at midnight.
pub fn row_labels(
    court: Court,
    profile: &CourtProfile,
    row_count: usize,
) -> Result<Vec<String>, HeatmapError> {
    if row_count != profile.class.row_count() {
        return Err(HeatmapError::LabelMismatch {
            court: court.display_name().to_string(),
            labels: profile.class.row_count(),
            rows: row_count,
        });
    }

    let overflow = || HeatmapError::LabelOverflow {
        court: court.display_name().to_string(),
        rows: row_count,
        start: profile.start_minutes,
        slot_minutes: profile.slot_minutes,
    };

    (0..row_count)
        .map(|i| {
            let offset = u32::try_from(i)
                .ok()
                .and_then(|i| i.checked_mul(profile.slot_minutes))
                .ok_or_else(overflow)?;
            let minutes = profile
                .start_minutes
                .checked_add(offset)
                .ok_or_else(overflow)?;
            Ok(format_clock(minutes))
        })
        .collect()
}

/// Column labels: the canonical order restricted to the template's periods.
pub fn column_labels(template: &BlankTemplate) -> Vec<String> {
    template
        .periods()
        .iter()
        .map(|p| p.short_name().to_string())
        .collect()
}

/// Zero-padded `HH:MM` for minutes since midnight.
pub fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;
    use courtmap_common::booking::{Grouping, Period};
    use courtmap_common::court::{CourtTable, SlotClass};

    #[test]
    fn test_lawn_tennis_quarter_hours() {
        let table = CourtTable::standard();
        let profile = table.profile(Court::LawnTennis1).unwrap();
        let labels = row_labels(Court::LawnTennis1, profile, 52).unwrap();
        assert_eq!(labels.len(), 52);
        assert_eq!(labels[0], "09:00");
        assert_eq!(labels[1], "09:15");
        assert_eq!(labels[4], "10:00");
        assert_eq!(labels[51], "21:45");
    }

    #[test]
    fn test_squash_starts_at_eight() {
        let table = CourtTable::standard();
        let profile = table.profile(Court::SquashD).unwrap();
        let labels = row_labels(Court::SquashD, profile, 60).unwrap();
        assert_eq!(labels[0], "08:00");
        assert_eq!(labels[59], "22:45");
    }

    #[test]
    fn test_real_tennis_hourly() {
        let table = CourtTable::standard();
        let profile = table.profile(Court::RealTennis).unwrap();
        let labels = row_labels(Court::RealTennis, profile, 60).unwrap();
        assert_eq!(&labels[..3], ["08:00", "09:00", "10:00"]);
        assert!(labels.iter().all(|l| l.ends_with(":00")));
    }

    #[test]
    fn test_row_count_mismatch() {
        let profile = CourtProfile::new(SlotClass::Step52, 9, 15);
        let err = row_labels(Court::LawnTennis2, &profile, 60).unwrap_err();
        assert_eq!(
            err,
            HeatmapError::LabelMismatch {
                court: "Lawn Tennis Court 2".into(),
                labels: 52,
                rows: 60
            }
        );
    }

    #[test]
    fn test_overflow() {
        let profile = CourtProfile {
            class: SlotClass::Step60,
            start_minutes: u32::MAX - 10,
            slot_minutes: 15,
        };
        let err = row_labels(Court::SportsHall, &profile, 60).unwrap_err();
        assert!(matches!(err, HeatmapError::LabelOverflow { .. }));
    }

    #[test]
    fn test_month_columns_follow_template() {
        let template = BlankTemplate::new(
            SlotClass::Step60,
            Grouping::Month,
            0..60,
            [
                Period::Month(Month::November),
                Period::Month(Month::February),
                Period::Month(Month::June),
            ],
        )
        .unwrap();
        assert_eq!(column_labels(&template), ["Feb", "Jun", "Nov"]);
    }

    #[test]
    fn test_day_columns() {
        let template = BlankTemplate::full(SlotClass::Step52, Grouping::Day);
        assert_eq!(
            column_labels(&template),
            ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        );
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9 * 60 + 5), "09:05");
    }
}
