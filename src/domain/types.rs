//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed between the fetch worker and the UI thread
//! - exported to CSV
//! - compared cheaply (fingerprints) to decide whether a refetch is needed

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// Requested time granularity for bucketing.
///
/// `Quarter` is what the backend calls its sub-annual interval; the normalizer
/// actually buckets it by year-month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Quarter,
    Annual,
}

impl Interval {
    /// Path segment sent to the backend.
    pub fn as_path(self) -> &'static str {
        match self {
            Interval::Quarter => "quarter",
            Interval::Annual => "annual",
        }
    }

    /// Number of leading date characters that form a bucket key.
    pub fn key_len(self) -> usize {
        match self {
            Interval::Annual => 4,
            Interval::Quarter => 7,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Interval::Quarter => "Quarterly",
            Interval::Annual => "Annual",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Interval::Quarter => Interval::Annual,
            Interval::Annual => Interval::Quarter,
        }
    }
}

/// The two supported chart shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
}

impl ChartType {
    /// Parse either the dashboard labels (`Bar Chart`) or the short forms (`bar`).
    pub fn parse(raw: &str) -> Result<Self, ChartError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bar chart" | "bar" => Ok(ChartType::Bar),
            "line chart" | "line" => Ok(ChartType::Line),
            _ => Err(ChartError::UnsupportedChartType(raw.to_string())),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChartType::Bar => "Bar Chart",
            ChartType::Line => "Line Chart",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ChartType::Bar => ChartType::Line,
            ChartType::Line => ChartType::Bar,
        }
    }
}

/// Coarse lookback windows offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Timeframe {
    #[serde(rename = "1Y")]
    #[value(name = "1Y", alias = "1y")]
    OneYear,
    #[serde(rename = "3Y")]
    #[value(name = "3Y", alias = "3y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    #[value(name = "5Y", alias = "5y")]
    FiveYears,
    #[serde(rename = "10Y")]
    #[value(name = "10Y", alias = "10y")]
    TenYears,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::OneYear,
        Timeframe::ThreeYears,
        Timeframe::FiveYears,
        Timeframe::TenYears,
    ];

    pub fn years(self) -> i32 {
        match self {
            Timeframe::OneYear => 1,
            Timeframe::ThreeYears => 3,
            Timeframe::FiveYears => 5,
            Timeframe::TenYears => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::OneYear => "1Y",
            Timeframe::ThreeYears => "3Y",
            Timeframe::FiveYears => "5Y",
            Timeframe::TenYears => "10Y",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Inclusive date window sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parse ISO `YYYY-MM-DD` start/end strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ChartError> {
        let parse = |raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| ChartError::InvalidDate(raw.to_string()))
        };
        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// One observation as returned by the backend.
///
/// `date` is kept verbatim (ISO date or a period label such as `2023-Q1`);
/// `value` is `None` when the source field was absent or not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub date: String,
    pub value: Option<f64>,
}

impl RawPoint {
    pub fn new(date: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// One fetched series per (ticker, metric).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub ticker: String,
    pub points: Vec<RawPoint>,
}

impl Series {
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            points: Vec::new(),
        }
    }
}

/// Normalized bucket identifier (`YYYY` or `YYYY-MM` / `YYYY-Q#`).
///
/// Keys are zero-padded, so their lexicographic order is chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateKey(pub String);

impl DateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A series after bucketing: exactly one point per key.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub ticker: String,
    pub grouped: BTreeMap<DateKey, RawPoint>,
}

impl NormalizedSeries {
    /// Value retained for `key`, if the bucket exists and holds a number.
    pub fn value_at(&self, key: &DateKey) -> Option<f64> {
        self.grouped
            .get(key)
            .and_then(|p| p.value)
            .filter(|v| v.is_finite())
    }

    /// Finite values across all buckets.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.grouped
            .values()
            .filter_map(|p| p.value)
            .filter(|v| v.is_finite())
    }
}

/// Which of the (at most two) metrics a series belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricSlot {
    Primary,
    Secondary,
}

/// Caller-supplied chart parameters.
///
/// Metric names stay as strings here; resolution (and its `UnknownMetric`
/// failure) happens when the request is submitted to a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub tickers: Vec<String>,
    pub metric: String,
    pub secondary_metric: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub interval: Interval,
    pub chart_type: ChartType,
}

/// Snapshot of the fetch-relevant request parameters.
///
/// Chart type and container size are deliberately absent: changing them only
/// redraws.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    tickers: Vec<String>,
    metric: String,
    secondary_metric: Option<String>,
    start_date: String,
    end_date: String,
    interval: Interval,
}

impl Fingerprint {
    pub fn of(request: &ChartRequest) -> Self {
        Self {
            tickers: request.tickers.clone(),
            metric: request.metric.clone(),
            secondary_metric: request.secondary_metric.clone(),
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
            interval: request.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChartRequest {
        ChartRequest {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
            metric: "Revenues".to_string(),
            secondary_metric: None,
            start_date: "2021-01-01".to_string(),
            end_date: "2024-01-01".to_string(),
            interval: Interval::Annual,
            chart_type: ChartType::Bar,
        }
    }

    #[test]
    fn chart_type_parses_labels_and_short_forms() {
        assert_eq!(ChartType::parse("Bar Chart").unwrap(), ChartType::Bar);
        assert_eq!(ChartType::parse("line").unwrap(), ChartType::Line);
        assert!(matches!(
            ChartType::parse("Area Chart"),
            Err(ChartError::UnsupportedChartType(_))
        ));
    }

    #[test]
    fn fingerprint_ignores_chart_type() {
        let a = request();
        let mut b = request();
        b.chart_type = ChartType::Line;
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));

        b.interval = Interval::Quarter;
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn date_range_rejects_non_iso() {
        assert!(DateRange::parse("2024-01-01", "2024-06-30").is_ok());
        assert_eq!(
            DateRange::parse("01/01/2024", "2024-06-30"),
            Err(ChartError::InvalidDate("01/01/2024".to_string()))
        );
    }

    #[test]
    fn timeframe_cycles() {
        assert_eq!(Timeframe::TenYears.next(), Timeframe::OneYear);
        assert_eq!(Timeframe::OneYear.prev(), Timeframe::TenYears);
    }
}
