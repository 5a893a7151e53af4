//! Command-line parsing for `mchart`.
//!
//! Argument parsing stays separate from the fetch/layout code: this module
//! only turns flags into a `ChartRequest` and `config::Overrides`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Overrides;
use crate::data::{date_range, resolve_secondary};
use crate::domain::{ChartRequest, ChartType, DateRange, Interval, Timeframe};
use crate::error::ChartError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mchart", version, about = "Financial metric charts: fetch, align, plot")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a chart to an SVG file.
    Render(RenderArgs),
    /// Print the aligned values as a table.
    Table(TableArgs),
    /// List the supported metrics.
    Metrics,
    /// Launch the interactive dashboard.
    Tui(ChartArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// Backend root URL (overrides METRIC_CHARTS_API_BASE_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Request timeout in seconds (overrides METRIC_CHARTS_TIMEOUT_SECS).
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Use synthetic offline data instead of the backend.
    #[arg(long, global = true)]
    pub demo: bool,

    /// Log level: error, warn, info, debug, trace (overrides METRIC_CHARTS_LOG).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_base_url: self.api_base_url.clone(),
            timeout_secs: self.timeout,
            log_level: self.log_level.clone(),
            demo: self.demo,
        }
    }
}

/// What to chart.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Tickers, comma separated or repeated (`-t AAPL -t MSFT`).
    #[arg(short = 't', long = "ticker", value_delimiter = ',', default_value = "AAPL,MSFT")]
    pub tickers: Vec<String>,

    /// Primary metric: label ("Price To Sales Ratio"), short label ("P/S Ratio") or slug (`ps`).
    #[arg(short = 'm', long, default_value = "Revenues")]
    pub metric: String,

    /// Secondary metric on the right axis ("None" for no secondary metric).
    #[arg(short = 's', long)]
    pub secondary: Option<String>,

    /// Lookback window ending today; ignored when --start is given.
    #[arg(long, value_enum, default_value_t = Timeframe::FiveYears)]
    pub timeframe: Timeframe,

    /// Explicit start date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start: Option<String>,

    /// Explicit end date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_name = "DATE")]
    pub end: Option<String>,

    /// Bucketing interval.
    #[arg(short = 'i', long, value_enum, default_value_t = Interval::Quarter)]
    pub interval: Interval,

    /// Chart type: "bar" / "Bar Chart" or "line" / "Line Chart".
    #[arg(short = 'c', long = "chart", default_value = "bar")]
    pub chart_type: String,
}

impl ChartArgs {
    /// Date window from --start/--end, falling back to the timeframe.
    pub fn range(&self) -> Result<DateRange, ChartError> {
        let window = date_range(self.timeframe);
        let end = self.end.clone().unwrap_or_else(|| window.end_str());
        match &self.start {
            Some(start) => DateRange::parse(start, &end),
            None if self.end.is_some() => {
                let end = DateRange::parse(&end, &end)?.end;
                Ok(crate::data::date_range_from(self.timeframe, end))
            }
            None => Ok(window),
        }
    }

    pub fn to_request(&self) -> Result<ChartRequest, ChartError> {
        let range = self.range()?;
        let secondary = resolve_secondary(self.secondary.as_deref())?;
        Ok(ChartRequest {
            tickers: normalize_tickers(&self.tickers),
            metric: self.metric.clone(),
            secondary_metric: secondary.map(|m| m.name.to_string()),
            start_date: range.start_str(),
            end_date: range.end_str(),
            interval: self.interval,
            chart_type: ChartType::parse(&self.chart_type)?,
        })
    }
}

/// Upper-case, trim and de-duplicate, keeping first occurrence order.
pub fn normalize_tickers(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for t in raw {
        let t = t.trim().to_ascii_uppercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    /// Output SVG path.
    #[arg(short = 'o', long, default_value = "chart.svg")]
    pub output: PathBuf,

    /// Image width (px).
    #[arg(long, default_value_t = 960)]
    pub width: u32,

    /// Image height (px).
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    #[arg(long, value_enum, default_value_t = ThemeArg::Light)]
    pub theme: ThemeArg,

    /// Also export the aligned data to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub chart: ChartArgs,

    /// Also export the aligned data to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mchart").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn render_args() {
        let cli = parse(&[
            "render", "-t", "aapl,msft", "-t", "AAPL", "-m", "ps", "-s", "None", "--start", "2020-01-01", "--end",
            "2024-12-31", "-i", "annual", "-c", "Line Chart", "--demo",
        ]);
        assert!(cli.global.demo);
        let Command::Render(args) = cli.command else {
            panic!("expected render");
        };
        let req = args.chart.to_request().unwrap();
        assert_eq!(req.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(req.metric, "ps");
        assert_eq!(req.secondary_metric, None);
        assert_eq!(req.start_date, "2020-01-01");
        assert_eq!(req.end_date, "2024-12-31");
        assert_eq!(req.interval, Interval::Annual);
        assert_eq!(req.chart_type, ChartType::Line);
        assert_eq!(args.output, PathBuf::from("chart.svg"));
    }

    #[test]
    fn timeframe_relative_to_end() {
        let cli = parse(&["table", "--timeframe", "3Y", "--end", "2024-02-29"]);
        let Command::Table(args) = cli.command else {
            panic!("expected table");
        };
        let range = args.chart.range().unwrap();
        assert_eq!(range.start_str(), "2021-02-28");
        assert_eq!(range.end_str(), "2024-02-29");
    }

    #[test]
    fn bad_values_surface_as_chart_errors() {
        let cli = parse(&["table", "-c", "pie", "-s", "Beta"]);
        let Command::Table(args) = cli.command else {
            panic!("expected table");
        };
        assert_eq!(args.chart.to_request(), Err(ChartError::UnknownMetric("Beta".to_string())));

        let cli = parse(&["table", "-c", "pie"]);
        let Command::Table(args) = cli.command else {
            panic!("expected table");
        };
        assert_eq!(args.chart.to_request(), Err(ChartError::UnsupportedChartType("pie".to_string())));
    }
}
