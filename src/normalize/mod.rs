//! Date bucketing.
//!
//! Raw series arrive with irregular granularity (daily market cap history,
//! quarter-end fundamentals, `YYYY-Q#` revenue periods). Before charting, every
//! point is mapped to a bucket key and each bucket keeps exactly one point:
//! the one whose original date string sorts greatest ("last in period wins").
//! Comparison is plain string order; dates are zero-padded ISO so this is the
//! most recent point of the bucket.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::domain::{DateKey, Interval, NormalizedSeries, RawPoint, Series};

pub mod label;

pub use label::{axis_title, label};

/// Bucket key for a raw date string.
pub fn date_key(date: &str, interval: Interval) -> DateKey {
    let len = interval.key_len();
    let key = date.get(..len).unwrap_or(date);
    DateKey(key.to_string())
}

/// Bucket one series.
pub fn normalize(series: &Series, interval: Interval) -> NormalizedSeries {
    let mut grouped: BTreeMap<DateKey, RawPoint> = BTreeMap::new();
    for point in &series.points {
        match grouped.entry(date_key(&point.date, interval)) {
            Entry::Vacant(slot) => {
                slot.insert(point.clone());
            }
            Entry::Occupied(mut slot) => {
                if point.date >= slot.get().date {
                    slot.insert(point.clone());
                }
            }
        }
    }
    NormalizedSeries {
        ticker: series.ticker.clone(),
        grouped,
    }
}

/// Bucket every series of one metric.
pub fn normalize_all(series: &[Series], interval: Interval) -> Vec<NormalizedSeries> {
    series.iter().map(|s| normalize(s, interval)).collect()
}

impl NormalizedSeries {
    /// Re-emit the retained points, each dated by its bucket key.
    pub fn to_series(&self) -> Series {
        Series {
            ticker: self.ticker.clone(),
            points: self
                .grouped
                .iter()
                .map(|(key, p)| RawPoint::new(key.as_str(), p.value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(&str, Option<f64>)]) -> Series {
        Series {
            ticker: "AAPL".to_string(),
            points: points.iter().map(|(d, v)| RawPoint::new(*d, *v)).collect(),
        }
    }

    #[test]
    fn keys_by_interval() {
        assert_eq!(date_key("2023-01-15", Interval::Annual).as_str(), "2023");
        assert_eq!(date_key("2023-01-15", Interval::Quarter).as_str(), "2023-01");
        assert_eq!(date_key("2023-Q3", Interval::Quarter).as_str(), "2023-Q3");
        assert_eq!(date_key("2023-Q3", Interval::Annual).as_str(), "2023");
        assert_eq!(date_key("23", Interval::Quarter).as_str(), "23");
    }

    #[test]
    fn last_in_period_wins() {
        let s = series(&[("2023-01-31", Some(2.0)), ("2023-01-15", Some(1.0))]);
        let n = normalize(&s, Interval::Quarter);
        assert_eq!(n.grouped.len(), 1);
        let kept = &n.grouped[&DateKey("2023-01".to_string())];
        assert_eq!(kept.date, "2023-01-31");
        assert_eq!(kept.value, Some(2.0));

        let s = series(&[("2023-01-15", Some(1.0)), ("2023-01-31", Some(2.0))]);
        let n = normalize(&s, Interval::Quarter);
        assert_eq!(n.grouped[&DateKey("2023-01".to_string())].date, "2023-01-31");
    }

    #[test]
    fn latest_point_wins_even_without_value() {
        let s = series(&[("2022-03-31", Some(5.0)), ("2022-12-31", None)]);
        let n = normalize(&s, Interval::Annual);
        assert_eq!(n.value_at(&DateKey("2022".to_string())), None);
    }

    #[test]
    fn renormalizing_is_identity() {
        let s = series(&[
            ("2021-03-31", Some(1.0)),
            ("2021-06-30", Some(2.0)),
            ("2021-06-01", Some(9.0)),
            ("2022-12-31", None),
            ("2023-Q1", Some(4.0)),
        ]);
        for interval in [Interval::Quarter, Interval::Annual] {
            let once = normalize(&s, interval);
            let twice = normalize(&once.to_series(), interval);
            assert_eq!(once.grouped.keys().collect::<Vec<_>>(), twice.grouped.keys().collect::<Vec<_>>());
            for (key, point) in &once.grouped {
                assert_eq!(twice.grouped[key].value, point.value);
            }
            assert_eq!(normalize(&twice.to_series(), interval), twice);
        }
    }

    #[test]
    fn annual_scenario_three_keys_per_ticker() {
        let s = series(&[
            ("2021-12-31", Some(1.0)),
            ("2022-12-31", Some(2.0)),
            ("2023-12-31", Some(3.0)),
        ]);
        let n = normalize(&s, Interval::Annual);
        let keys: Vec<&str> = n.grouped.keys().map(DateKey::as_str).collect();
        assert_eq!(keys, vec!["2021", "2022", "2023"]);
    }
}
