//! Synthetic offline data source.
//!
//! Produces deterministic, plausible-looking series so the dashboard and the
//! renderer can be exercised without a backend. The shape of the output mimics
//! the real endpoints:
//!
//! - market cap history is weekly and ignores the interval
//! - revenues come back with `YYYY-Q#` period labels
//! - everything else is one point per fiscal quarter (or year) end

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::fetch::{PointRequest, SeriesSource};
use crate::data::metric::Metric;
use crate::domain::{Interval, RawPoint};
use crate::error::ChartError;

/// Share of points that come back without a value.
const MISSING_PROB: f64 = 0.03;

pub struct SampleSource {
    seed: u64,
}

impl SampleSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl SeriesSource for SampleSource {
    fn fetch_points(&self, request: &PointRequest<'_>) -> Result<Vec<RawPoint>, ChartError> {
        let metric = request.metric.metric;
        let mut rng = StdRng::seed_from_u64(series_seed(self.seed, request.ticker, metric));
        let normal = Normal::new(0.0, 1.0).map_err(|e| ChartError::Parse {
            ticker: request.ticker.to_string(),
            message: format!("noise distribution error: {e}"),
        })?;

        let (level, drift, vol) = profile(metric);
        // Ticker-specific scale so several tickers do not overlap exactly.
        let mut value = level * rng.gen_range(0.5..1.5);

        let dates = observation_dates(metric, request.range.start, request.range.end, request.interval);
        let mut out = Vec::with_capacity(dates.len());
        for date in dates {
            let shock: f64 = normal.sample(&mut rng);
            value += value.abs() * (drift + vol * shock);
            if metric == Metric::NetIncome && rng.gen_bool(0.05) {
                value = -value;
            }

            let label = if metric == Metric::Revenues {
                format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1)
            } else {
                date.format("%Y-%m-%d").to_string()
            };
            let v = (!rng.gen_bool(MISSING_PROB)).then_some(value);
            out.push(RawPoint::new(label, v));
        }
        Ok(out)
    }
}

fn series_seed(seed: u64, ticker: &str, metric: Metric) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    ticker.hash(&mut hasher);
    metric.slug().hash(&mut hasher);
    hasher.finish()
}

/// `(starting level, drift per step, volatility per step)`.
fn profile(metric: Metric) -> (f64, f64, f64) {
    match metric {
        Metric::PriceToEarnings => (25.0, 0.0, 0.06),
        Metric::PriceToSales => (6.0, 0.0, 0.05),
        Metric::MarketCap => (8.0e11, 0.002, 0.02),
        Metric::DividendYield => (1.5, 0.0, 0.04),
        Metric::EarningsPerShare => (4.0, 0.01, 0.08),
        Metric::Revenues => (4.0e10, 0.015, 0.05),
        Metric::NetIncome => (8.0e9, 0.01, 0.12),
    }
}

fn observation_dates(metric: Metric, start: NaiveDate, end: NaiveDate, interval: Interval) -> Vec<NaiveDate> {
    if end < start {
        return Vec::new();
    }
    if metric == Metric::MarketCap {
        let mut out = Vec::new();
        let mut d = start;
        while d <= end {
            out.push(d);
            d += Duration::days(7);
        }
        return out;
    }

    let months: &[u32] = match interval {
        Interval::Annual => &[12],
        Interval::Quarter => &[3, 6, 9, 12],
    };
    let mut out = Vec::new();
    for year in start.year()..=end.year() {
        for &month in months {
            if let Some(d) = month_end(year, month) {
                if d >= start && d <= end {
                    out.push(d);
                }
            }
        }
    }
    out
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|d| d - Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::metric::resolve;
    use crate::domain::DateRange;

    fn fetch(source: &SampleSource, ticker: &str, metric: &str, interval: Interval) -> Vec<RawPoint> {
        let spec = resolve(metric).unwrap();
        let request = PointRequest {
            ticker,
            metric: &spec,
            range: DateRange::parse("2021-01-01", "2023-12-31").unwrap(),
            interval,
        };
        source.fetch_points(&request).unwrap()
    }

    #[test]
    fn deterministic_per_seed() {
        let a = fetch(&SampleSource::new(7), "AAPL", "EPS", Interval::Quarter);
        let b = fetch(&SampleSource::new(7), "AAPL", "EPS", Interval::Quarter);
        let c = fetch(&SampleSource::new(8), "AAPL", "EPS", Interval::Quarter);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn quarter_and_annual_cadence() {
        let source = SampleSource::new(1);
        let quarterly = fetch(&source, "MSFT", "P/E Ratio", Interval::Quarter);
        assert_eq!(quarterly.len(), 12);
        assert_eq!(quarterly[0].date, "2021-03-31");

        let annual = fetch(&source, "MSFT", "P/E Ratio", Interval::Annual);
        let dates: Vec<&str> = annual.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2021-12-31", "2022-12-31", "2023-12-31"]);
    }

    #[test]
    fn revenues_use_period_labels() {
        let points = fetch(&SampleSource::new(1), "AAPL", "Revenues", Interval::Quarter);
        assert_eq!(points[0].date, "2021-Q1");
        assert_eq!(points[11].date, "2023-Q4");
    }

    #[test]
    fn market_cap_is_weekly() {
        let points = fetch(&SampleSource::new(1), "AAPL", "Market Cap", Interval::Annual);
        assert!(points.len() > 150);
    }
}
