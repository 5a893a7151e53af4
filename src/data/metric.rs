//! Metric resolution and response decoding.
//!
//! Every metric maps to one backend path and one list of candidate value
//! fields. Backend versions disagree on field names (`revenue` vs
//! `revenueActual`, `eps` vs `earningsPerShare`), so the decode step tries the
//! candidates in order and picks the payload variant by shape, never by metric
//! name.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::RawPoint;
use crate::error::ChartError;

/// The closed set of metrics the charts understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    PriceToEarnings,
    PriceToSales,
    MarketCap,
    DividendYield,
    EarningsPerShare,
    Revenues,
    NetIncome,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Revenues,
        Metric::PriceToSales,
        Metric::PriceToEarnings,
        Metric::MarketCap,
        Metric::DividendYield,
        Metric::EarningsPerShare,
        Metric::NetIncome,
    ];

    /// Canonical display label (also used as axis title).
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::PriceToEarnings => "Price To Earnings Ratio",
            Metric::PriceToSales => "Price To Sales Ratio",
            Metric::MarketCap => "Market Cap",
            Metric::DividendYield => "Dividend Yield (%)",
            Metric::EarningsPerShare => "Earnings Per Share",
            Metric::Revenues => "Revenues",
            Metric::NetIncome => "Net Income",
        }
    }

    /// Short label for compact UIs.
    pub fn short_name(self) -> &'static str {
        match self {
            Metric::PriceToEarnings => "P/E Ratio",
            Metric::PriceToSales => "P/S Ratio",
            Metric::MarketCap => "Market Cap",
            Metric::DividendYield => "Dividend Yield (%)",
            Metric::EarningsPerShare => "EPS",
            Metric::Revenues => "Revenues",
            Metric::NetIncome => "Net Income",
        }
    }

    /// Command-line slug.
    pub fn slug(self) -> &'static str {
        match self {
            Metric::PriceToEarnings => "pe",
            Metric::PriceToSales => "ps",
            Metric::MarketCap => "market-cap",
            Metric::DividendYield => "dividend-yield",
            Metric::EarningsPerShare => "eps",
            Metric::Revenues => "revenues",
            Metric::NetIncome => "net-income",
        }
    }

    fn endpoint_path(self) -> &'static str {
        match self {
            Metric::PriceToEarnings => "pe",
            Metric::PriceToSales => "ps",
            Metric::MarketCap => "marketCapHistory",
            Metric::DividendYield => "dividendInfo",
            Metric::EarningsPerShare => "eps",
            Metric::Revenues => "revenues",
            Metric::NetIncome => "netIncome",
        }
    }

    /// Value fields to try, most current backend naming first.
    fn value_fields(self) -> &'static [&'static str] {
        match self {
            Metric::PriceToEarnings => &["peRatio"],
            Metric::PriceToSales => &["psRatio"],
            Metric::MarketCap => &["marketCap"],
            Metric::DividendYield => &["yield"],
            Metric::EarningsPerShare => &["eps", "earningsPerShare"],
            Metric::Revenues => &["revenueActual", "revenue"],
            Metric::NetIncome => &["ttmNetIncome", "netIncome"],
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Resolved metric: where to fetch it and how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    pub metric: Metric,
    pub name: &'static str,
    pub endpoint_path: &'static str,
    /// Whether the backend accepts an interval segment for this metric.
    pub interval_sensitive: bool,
}

impl MetricSpec {
    pub fn of(metric: Metric) -> Self {
        Self {
            metric,
            name: metric.display_name(),
            endpoint_path: metric.endpoint_path(),
            interval_sensitive: metric != Metric::MarketCap,
        }
    }

    /// Decode a response body into `(date, value)` points.
    ///
    /// `ticker` is only used to label errors.
    pub fn extract(&self, ticker: &str, payload: Value) -> Result<Vec<RawPoint>, ChartError> {
        let payload: Payload = serde_json::from_value(payload).map_err(|_| ChartError::Parse {
            ticker: ticker.to_string(),
            message: "unrecognized payload shape".to_string(),
        })?;

        let fields = self.metric.value_fields();
        let points = match payload {
            Payload::Periods {
                monthly_revenue_points,
            } => monthly_revenue_points
                .into_iter()
                .map(|r| r.into_point(&["revenueActual", "revenue"]))
                .collect(),
            Payload::Records(records) => {
                records.into_iter().map(|r| r.into_point(fields)).collect()
            }
        };
        Ok(points)
    }
}

/// Resolve a metric by label, short label or slug (case-insensitive).
pub fn resolve(name: &str) -> Result<MetricSpec, ChartError> {
    let wanted = name.trim();
    Metric::ALL
        .into_iter()
        .find(|m| {
            [m.display_name(), m.short_name(), m.slug()]
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(wanted))
                || (*m == Metric::Revenues && wanted.eq_ignore_ascii_case("revenue"))
        })
        .map(MetricSpec::of)
        .ok_or_else(|| ChartError::UnknownMetric(name.to_string()))
}

/// Resolve an optional secondary metric; `None`, `""` and `"None"` mean absent.
pub fn resolve_secondary(name: Option<&str>) -> Result<Option<MetricSpec>, ChartError> {
    match name.map(str::trim) {
        None => Ok(None),
        Some(n) if n.is_empty() || n.eq_ignore_ascii_case("none") => Ok(None),
        Some(n) => resolve(n).map(Some),
    }
}

/// Response shapes the backend is known to produce.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Periods {
        #[serde(rename = "monthlyRevenuePoints")]
        monthly_revenue_points: Vec<Record>,
    },
    Records(Vec<Record>),
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    date: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Record {
    fn into_point(self, fields: &[&str]) -> RawPoint {
        let value = fields
            .iter()
            .filter_map(|f| self.fields.get(*f))
            .find(|v| !v.is_null())
            .and_then(numeric);
        RawPoint {
            date: self.date.unwrap_or_default(),
            value,
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_metric_resolves_by_each_name() {
        for metric in Metric::ALL {
            for name in [metric.display_name(), metric.short_name(), metric.slug()] {
                let spec = resolve(name).unwrap();
                assert_eq!(spec.metric, metric, "{name}");
            }
        }
        assert_eq!(resolve("price to earnings ratio").unwrap().endpoint_path, "pe");
    }

    #[test]
    fn unknown_metric_is_an_error() {
        for name in ["Beta", "", "None", "Revenue Growth"] {
            assert_eq!(resolve(name), Err(ChartError::UnknownMetric(name.to_string())));
        }
    }

    #[test]
    fn secondary_none_means_absent() {
        assert_eq!(resolve_secondary(None).unwrap(), None);
        assert_eq!(resolve_secondary(Some("None")).unwrap(), None);
        assert_eq!(resolve_secondary(Some("  ")).unwrap(), None);
        assert_eq!(
            resolve_secondary(Some("Net Income")).unwrap().map(|s| s.metric),
            Some(Metric::NetIncome)
        );
        assert!(resolve_secondary(Some("Gamma")).is_err());
    }

    #[test]
    fn market_cap_ignores_interval() {
        assert!(!resolve("Market Cap").unwrap().interval_sensitive);
        assert!(resolve("EPS").unwrap().interval_sensitive);
    }

    #[test]
    fn flat_records_use_metric_field() {
        let spec = resolve("Net Income").unwrap();
        let payload = json!([
            {"date": "2023-03-31", "ttmNetIncome": 1.5e9},
            {"date": "2023-06-30", "ttmNetIncome": null},
            {"date": "2023-09-30"},
        ]);
        let points = spec.extract("AAPL", payload).unwrap();
        assert_eq!(
            points,
            vec![
                RawPoint::new("2023-03-31", Some(1.5e9)),
                RawPoint::new("2023-06-30", None),
                RawPoint::new("2023-09-30", None),
            ]
        );
    }

    #[test]
    fn revenue_payload_detected_by_shape() {
        let spec = resolve("Revenues").unwrap();

        let current = json!({"monthlyRevenuePoints": [
            {"date": "2023-Q1", "revenueActual": 100.0},
            {"date": "2023-Q2", "revenueActual": 120.0},
        ]});
        let legacy = json!({"monthlyRevenuePoints": [
            {"date": "2023-Q1", "revenue": 100.0},
            {"date": "2023-Q2", "revenue": 120.0},
        ]});
        let flat = json!([
            {"date": "2023-Q1", "revenue": 100.0},
            {"date": "2023-Q2", "revenue": 120.0},
        ]);

        let expected = vec![
            RawPoint::new("2023-Q1", Some(100.0)),
            RawPoint::new("2023-Q2", Some(120.0)),
        ];
        assert_eq!(spec.extract("AAPL", current).unwrap(), expected);
        assert_eq!(spec.extract("AAPL", legacy).unwrap(), expected);
        assert_eq!(spec.extract("AAPL", flat).unwrap(), expected);
    }

    #[test]
    fn legacy_eps_field_is_accepted() {
        let spec = resolve("Earnings Per Share").unwrap();
        let payload = json!([{"date": "2022-12-31", "earningsPerShare": "6.11"}]);
        let points = spec.extract("AAPL", payload).unwrap();
        assert_eq!(points, vec![RawPoint::new("2022-12-31", Some(6.11))]);
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let spec = resolve("P/E Ratio").unwrap();
        let err = spec.extract("MSFT", json!({"error": "rate limited"})).unwrap_err();
        assert!(matches!(err, ChartError::Parse { ref ticker, .. } if ticker == "MSFT"));
        assert!(spec.extract("MSFT", json!(42)).is_err());
    }

    #[test]
    fn empty_array_gives_no_points() {
        let spec = resolve("Market Cap").unwrap();
        assert!(spec.extract("AAPL", json!([])).unwrap().is_empty());
    }
}
