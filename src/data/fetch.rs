//! Concurrent per-ticker fetching.
//!
//! One request per (ticker, metric). Requests fan out on the rayon pool and
//! the call returns once every one of them has settled. A failing ticker is
//! logged and contributes an empty series; it never aborts its siblings.

use crate::data::metric::MetricSpec;
use crate::domain::{DateRange, Interval, RawPoint, Series};
use crate::error::ChartError;

/// Parameters of a single backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRequest<'a> {
    pub ticker: &'a str,
    pub metric: &'a MetricSpec,
    pub range: DateRange,
    pub interval: Interval,
}

/// Anything that can produce the raw points of one (ticker, metric) pair.
pub trait SeriesSource: Sync {
    fn fetch_points(&self, request: &PointRequest<'_>) -> Result<Vec<RawPoint>, ChartError>;
}

/// Fetch one series per ticker, in input order.
pub fn fetch_series<S: SeriesSource + ?Sized>(
    source: &S,
    tickers: &[String],
    metric: &MetricSpec,
    range: DateRange,
    interval: Interval,
) -> Vec<Series> {
    use rayon::prelude::*;

    tickers
        .par_iter()
        .map(|ticker| {
            let request = PointRequest {
                ticker: ticker.as_str(),
                metric,
                range,
                interval,
            };
            match source.fetch_points(&request) {
                Ok(points) => {
                    log::debug!("{ticker} {}: {} points", metric.name, points.len());
                    Series {
                        ticker: ticker.clone(),
                        points,
                    }
                }
                Err(err) => {
                    log::warn!("{err}; charting {ticker} without {}", metric.name);
                    Series::empty(ticker.clone())
                }
            }
        })
        .collect()
}

/// Raw series for both metrics of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub primary: Vec<Series>,
    pub secondary: Option<Vec<Series>>,
}

/// Fetch the primary and optional secondary metric concurrently.
pub fn fetch_chart_series<S: SeriesSource + ?Sized>(
    source: &S,
    tickers: &[String],
    primary: &MetricSpec,
    secondary: Option<&MetricSpec>,
    range: DateRange,
    interval: Interval,
) -> ChartSeries {
    let (primary, secondary) = rayon::join(
        || fetch_series(source, tickers, primary, range, interval),
        || secondary.map(|spec| fetch_series(source, tickers, spec, range, interval)),
    );
    ChartSeries { primary, secondary }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::metric::resolve;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source: one point per ticker per year, value = year offset.
    pub(crate) struct FakeSource {
        pub calls: AtomicUsize,
        pub failing: Vec<String>,
    }

    impl FakeSource {
        pub(crate) fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing: Vec::new(),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SeriesSource for FakeSource {
        fn fetch_points(&self, request: &PointRequest<'_>) -> Result<Vec<RawPoint>, ChartError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|t| t == request.ticker) {
                return Err(ChartError::Network {
                    ticker: request.ticker.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            let base = request.ticker.len() as f64 * 100.0;
            Ok(["2021-12-31", "2022-12-31", "2023-12-31"]
                .iter()
                .enumerate()
                .map(|(i, d)| RawPoint::new(*d, Some(base + i as f64)))
                .collect())
        }
    }

    fn range() -> DateRange {
        DateRange::parse("2021-01-01", "2024-01-01").unwrap()
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_series_per_ticker_in_order() {
        let source = FakeSource::new();
        let spec = resolve("Revenues").unwrap();
        let names = tickers(&["MSFT", "AAPL", "GOOGL", "T"]);
        let series = fetch_series(&source, &names, &spec, range(), Interval::Annual);

        let got: Vec<&str> = series.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(got, vec!["MSFT", "AAPL", "GOOGL", "T"]);
        assert!(series.iter().all(|s| s.points.len() == 3));
        assert_eq!(source.calls(), 4);
    }

    #[test]
    fn failing_ticker_yields_empty_series() {
        let mut source = FakeSource::new();
        source.failing.push("BAD".to_string());
        let spec = resolve("EPS").unwrap();
        let names = tickers(&["AAPL", "BAD", "MSFT"]);
        let series = fetch_series(&source, &names, &spec, range(), Interval::Quarter);

        assert_eq!(series.len(), 3);
        assert_eq!(series[1], Series::empty("BAD"));
        assert_eq!(series[0].points.len(), 3);
        assert_eq!(series[2].points.len(), 3);
    }

    #[test]
    fn secondary_metric_fetched_alongside_primary() {
        let source = FakeSource::new();
        let primary = resolve("Revenues").unwrap();
        let secondary = resolve("Net Income").unwrap();
        let names = tickers(&["AAPL", "MSFT"]);

        let both = fetch_chart_series(&source, &names, &primary, Some(&secondary), range(), Interval::Annual);
        assert_eq!(both.primary.len(), 2);
        assert_eq!(both.secondary.as_ref().map(Vec::len), Some(2));
        assert_eq!(source.calls(), 4);

        let only = fetch_chart_series(&source, &names, &primary, None, range(), Interval::Annual);
        assert!(only.secondary.is_none());
        assert_eq!(source.calls(), 6);
    }
}
