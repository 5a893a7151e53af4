//! Lookback windows: turn a coarse timeframe into concrete start/end dates.

use chrono::{Datelike, Local, NaiveDate};

use crate::domain::{DateRange, Timeframe};

/// Date range ending today.
pub fn date_range(timeframe: Timeframe) -> DateRange {
    date_range_from(timeframe, Local::now().date_naive())
}

/// Date range ending on `end`, starting the same calendar day `years` earlier.
///
/// Feb 29 falls back to Feb 28 when the start year is not a leap year; it is
/// never rolled over to Mar 1, so a window ending on Feb 29 starts in February.
pub fn date_range_from(timeframe: Timeframe, end: NaiveDate) -> DateRange {
    let year = end.year() - timeframe.years();
    let start = NaiveDate::from_ymd_opt(year, end.month(), end.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, end.month(), end.day() - 1))
        .unwrap_or(end);
    DateRange { start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_whole_years() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let range = date_range_from(Timeframe::FiveYears, end);
        assert_eq!(range.start_str(), "2020-06-15");
        assert_eq!(range.end_str(), "2025-06-15");

        let range = date_range_from(Timeframe::TenYears, end);
        assert_eq!(range.start_str(), "2015-06-15");
    }

    #[test]
    fn leap_day_clamps() {
        let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let range = date_range_from(Timeframe::OneYear, end);
        assert_eq!(range.start_str(), "2023-02-28");
        assert_eq!(range.start.month(), 2);

        let range = date_range_from(Timeframe::ThreeYears, end);
        assert_eq!(range.start_str(), "2021-02-28");
    }
}
