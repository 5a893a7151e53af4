//! REST backend client.
//!
//! URL layout (relative to the configured base URL):
//!
//! - interval-sensitive metrics: `stocks/{path}/{ticker}/{start}/{end}/{interval}`
//! - market cap history:         `stocks/marketCapHistory/{ticker}/{start}/{end}`

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;

use crate::config::Settings;
use crate::data::fetch::{PointRequest, SeriesSource};
use crate::domain::RawPoint;
use crate::error::{AppError, ChartError};

pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::new(2, format!("Invalid API base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::new(2, format!("API base URL '{base_url}' cannot hold a path.")));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let base = settings.api_base_url.as_deref().ok_or_else(|| {
            AppError::new(
                2,
                "Missing METRIC_CHARTS_API_BASE_URL in environment (.env); pass --api-base-url or --demo.",
            )
        })?;
        Self::new(base, settings.timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the endpoint URL for one request.
    pub fn endpoint(&self, request: &PointRequest<'_>) -> Url {
        let mut url = self.base_url.clone();
        let start = request.range.start_str();
        let end = request.range.end_str();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend([
                "stocks",
                request.metric.endpoint_path,
                request.ticker,
                start.as_str(),
                end.as_str(),
            ]);
            if request.metric.interval_sensitive {
                segments.push(request.interval.as_path());
            }
        }
        url
    }
}

impl SeriesSource for HttpSource {
    fn fetch_points(&self, request: &PointRequest<'_>) -> Result<Vec<RawPoint>, ChartError> {
        let url = self.endpoint(request);
        log::debug!("GET {url}");

        let network = |message: String| ChartError::Network {
            ticker: request.ticker.to_string(),
            message,
        };

        let resp = self.client.get(url).send().map_err(|e| network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(network(format!("status {}", resp.status())));
        }

        let body: serde_json::Value = resp.json().map_err(|e| ChartError::Parse {
            ticker: request.ticker.to_string(),
            message: e.to_string(),
        })?;

        request.metric.extract(request.ticker, body)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::data::metric::resolve;
    use crate::domain::{DateRange, Interval};

    fn source(base: &str) -> HttpSource {
        HttpSource::new(base, Duration::from_secs(1)).unwrap()
    }

    /// Serve one canned HTTP response on a local port; returns the base URL.
    fn serve_once(status: &'static str, content_type: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        });
        format!("http://{addr}/")
    }

    fn fetch(base: &str) -> Result<Vec<RawPoint>, ChartError> {
        let spec = resolve("EPS").unwrap();
        let request = PointRequest {
            ticker: "AAPL",
            metric: &spec,
            range: DateRange::parse("2023-01-01", "2024-01-01").unwrap(),
            interval: Interval::Annual,
        };
        source(base).fetch_points(&request)
    }

    #[test]
    fn server_error_is_network_failure() {
        let base = serve_once("500 Internal Server Error", "text/plain", "boom");
        match fetch(&base) {
            Err(ChartError::Network { ticker, message }) => {
                assert_eq!(ticker, "AAPL");
                assert!(message.contains("500"), "{message}");
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_parse_failure() {
        let base = serve_once("200 OK", "text/html", "<html>maintenance</html>");
        match fetch(&base) {
            Err(ChartError::Parse { ticker, .. }) => assert_eq!(ticker, "AAPL"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn refused_connection_is_network_failure() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        // The listener is dropped, so nothing accepts on `addr`.
        match fetch(&format!("http://{addr}/")) {
            Err(ChartError::Network { ticker, .. }) => assert_eq!(ticker, "AAPL"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn json_records_are_decoded() {
        let base = serve_once(
            "200 OK",
            "application/json",
            r#"[{"date":"2023-09-30","eps":6.13},{"date":"2022-09-24","eps":null}]"#,
        );
        let points = fetch(&base).unwrap();
        assert_eq!(
            points,
            vec![RawPoint::new("2023-09-30", Some(6.13)), RawPoint::new("2022-09-24", None)]
        );
    }

    #[test]
    fn interval_sensitive_endpoint() {
        let spec = resolve("P/E Ratio").unwrap();
        let request = PointRequest {
            ticker: "AAPL",
            metric: &spec,
            range: DateRange::parse("2020-01-01", "2025-01-01").unwrap(),
            interval: Interval::Annual,
        };
        let url = source("https://api.example.com/v1/").endpoint(&request);
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/stocks/pe/AAPL/2020-01-01/2025-01-01/annual"
        );
    }

    #[test]
    fn market_cap_endpoint_has_no_interval() {
        let spec = resolve("Market Cap").unwrap();
        let request = PointRequest {
            ticker: "BRK B",
            metric: &spec,
            range: DateRange::parse("2024-01-01", "2025-01-01").unwrap(),
            interval: Interval::Quarter,
        };
        let url = source("http://localhost:8080").endpoint(&request);
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/stocks/marketCapHistory/BRK%20B/2024-01-01/2025-01-01"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(HttpSource::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpSource::new("mailto:charts@example.com", Duration::from_secs(1)).is_err());
    }
}
