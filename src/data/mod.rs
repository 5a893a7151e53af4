//! Data access: metric resolution, backend client, offline samples.

pub mod client;
pub mod fetch;
pub mod metric;
pub mod range;
pub mod sample;

pub use client::HttpSource;
pub use fetch::{ChartSeries, PointRequest, SeriesSource, fetch_chart_series, fetch_series};
pub use metric::{Metric, MetricSpec, resolve, resolve_secondary};
pub use range::{date_range, date_range_from};
pub use sample::SampleSource;
