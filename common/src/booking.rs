//! Booking records and the selectors used to slice them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Month, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::HeatmapError;

// ── grouping ─────────────────────────────────────────────────────────────

/// Column dimension of the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grouping {
    Day,
    Month,
}

impl Grouping {
    pub const ALL: [Grouping; 2] = [Grouping::Day, Grouping::Month];

    /// Capitalised name, as used in dataset column names and titles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Month => "Month",
        }
    }

    /// Lower-case form used in blank-template file names.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grouping {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            _ => Err(HeatmapError::InvalidParameter {
                name: "group_by",
                value: s.to_string(),
            }),
        }
    }
}

// ── period ───────────────────────────────────────────────────────────────

/// A heatmap column: a weekday or a month, depending on the grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day(Weekday),
    Month(Month),
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

const MONTH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Period {
    /// Canonical column order for a grouping: Monday first, or January first.
    pub fn canonical(grouping: Grouping) -> Vec<Period> {
        match grouping {
            Grouping::Day => WEEKDAYS.iter().copied().map(Period::Day).collect(),
            Grouping::Month => MONTHS.iter().copied().map(Period::Month).collect(),
        }
    }

    /// Parse a short (or full) weekday/month name for the given grouping.
    pub fn parse(grouping: Grouping, name: &str) -> Option<Period> {
        let name = name.trim();
        match grouping {
            Grouping::Day => name.parse::<Weekday>().ok().map(Period::Day),
            Grouping::Month => name.parse::<Month>().ok().map(Period::Month),
        }
    }

    pub fn grouping(&self) -> Grouping {
        match self {
            Self::Day(_) => Grouping::Day,
            Self::Month(_) => Grouping::Month,
        }
    }

    /// Zero-based position in the canonical order.
    pub fn index(&self) -> usize {
        match self {
            Self::Day(d) => d.num_days_from_monday() as usize,
            Self::Month(m) => m.number_from_month() as usize - 1,
        }
    }

    /// `Mon`..`Sun` or `Jan`..`Dec`.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Day(_) => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][self.index()],
            Self::Month(_) => MONTH_SHORT[self.index()],
        }
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.grouping() as u8, self.index()).cmp(&(other.grouping() as u8, other.index()))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ── year selector ────────────────────────────────────────────────────────

/// Either a single booking year or every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YearSelector {
    All,
    Year(i32),
}

impl YearSelector {
    pub fn matches(&self, year: i32) -> bool {
        match self {
            Self::All => true,
            Self::Year(y) => *y == year,
        }
    }

    /// Title fragment: `All Years` or the year itself.
    pub fn title_label(&self) -> String {
        match self {
            Self::All => "All Years".to_string(),
            Self::Year(y) => y.to_string(),
        }
    }
}

impl fmt::Display for YearSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Year(y) => write!(f, "{y}"),
        }
    }
}

impl FromStr for YearSelector {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<i32>()
            .map(Self::Year)
            .map_err(|_| HeatmapError::InvalidParameter {
                name: "year",
                value: s.to_string(),
            })
    }
}

impl Serialize for YearSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── records ──────────────────────────────────────────────────────────────

/// One booking occurrence on a court.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRecord {
    pub year: i32,
    /// Court-specific ordinal of the start slot.
    pub time_slot: u32,
    pub day: Weekday,
    pub month: Month,
}

impl BookingRecord {
    /// The attribute that forms the column for `grouping`.
    pub fn period(&self, grouping: Grouping) -> Period {
        match grouping {
            Grouping::Day => Period::Day(self.day),
            Grouping::Month => Period::Month(self.month),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_day_order() {
        let names: Vec<_> = Period::canonical(Grouping::Day)
            .iter()
            .map(|p| p.short_name())
            .collect();
        assert_eq!(names, ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
    }

    #[test]
    fn test_canonical_month_order() {
        let months = Period::canonical(Grouping::Month);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].short_name(), "Jan");
        assert_eq!(months[11].short_name(), "Dec");
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(
            Period::parse(Grouping::Day, "Tue"),
            Some(Period::Day(Weekday::Tue))
        );
        assert_eq!(
            Period::parse(Grouping::Month, "Sep"),
            Some(Period::Month(Month::September))
        );
        // Month names are not valid day columns and vice versa
        assert_eq!(Period::parse(Grouping::Day, "Jan"), None);
        assert_eq!(Period::parse(Grouping::Month, "Mon"), None);
    }

    #[test]
    fn test_year_selector() {
        assert_eq!("All".parse::<YearSelector>().unwrap(), YearSelector::All);
        assert_eq!("2024".parse::<YearSelector>().unwrap(), YearSelector::Year(2024));
        assert!("twenty".parse::<YearSelector>().is_err());
        assert!(YearSelector::All.matches(1999));
        assert!(!YearSelector::Year(2023).matches(2024));
        assert_eq!(YearSelector::All.title_label(), "All Years");
    }

    #[test]
    fn test_grouping_parse() {
        assert_eq!("Day".parse::<Grouping>().unwrap(), Grouping::Day);
        assert_eq!("month".parse::<Grouping>().unwrap(), Grouping::Month);
        assert!("week".parse::<Grouping>().is_err());
    }

    #[test]
    fn test_record_period() {
        let r = BookingRecord {
            year: 2024,
            time_slot: 3,
            day: Weekday::Wed,
            month: Month::March,
        };
        assert_eq!(r.period(Grouping::Day).short_name(), "Wed");
        assert_eq!(r.period(Grouping::Month).short_name(), "Mar");
    }
}
