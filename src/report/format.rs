//! Formatted terminal output.
//!
//! Formatting lives here so the data and layout code stays free of
//! presentation concerns, and output changes stay localized.

use crate::data::Metric;
use crate::domain::{DateRange, MetricSlot};
use crate::normalize::label;
use crate::render::ChartData;
use crate::scale::{format_abbrev, format_value};

const PERIOD_WIDTH: usize = 10;
const VALUE_WIDTH: usize = 16;

/// Header block: request parameters, periods and value domains.
pub fn format_summary(data: &ChartData, range: &DateRange) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== mchart - {} ===\n", data.primary_metric.name));
    out.push_str(&format!(
        "Tickers: {}\n",
        data.tickers().collect::<Vec<_>>().join(", ")
    ));
    out.push_str(&format!(
        "Range: {} .. {} | interval: {}\n",
        range.start_str(),
        range.end_str(),
        data.interval.display_name()
    ));
    out.push_str(&format!("Periods: {}", data.frame.keys.len()));
    if let (Some(first), Some(last)) = (data.frame.keys.first(), data.frame.keys.last()) {
        out.push_str(&format!(" ({} .. {})", label(first), label(last)));
    }
    out.push('\n');

    out.push_str(&format!(
        "{}: [{}, {}]\n",
        data.primary_metric.name,
        format_abbrev(data.frame.primary.min),
        format_abbrev(data.frame.primary.max)
    ));
    if let (Some(metric), Some(domain)) = (&data.secondary_metric, data.frame.secondary) {
        out.push_str(&format!(
            "{}: [{}, {}]\n",
            metric.name,
            format_abbrev(domain.min),
            format_abbrev(domain.max)
        ));
    }

    out
}

/// One row per period, one column per ticker and metric.
pub fn format_table(data: &ChartData) -> String {
    let mut columns = Vec::new();
    for slot in [MetricSlot::Primary, MetricSlot::Secondary] {
        let (Some(metric), Some(series)) = (data.metric(slot), data.series(slot)) else {
            continue;
        };
        for s in series {
            let header = format!("{} {}", s.ticker, metric.metric.short_name());
            columns.push((truncate(&header, VALUE_WIDTH), s));
        }
    }

    let mut out = String::new();
    let mut header = format!("{:<PERIOD_WIDTH$}", "period");
    let mut rule = format!("{:-<PERIOD_WIDTH$}", "");
    for (title, _) in &columns {
        header.push_str(&format!(" {title:>VALUE_WIDTH$}"));
        rule.push_str(&format!(" {:-<VALUE_WIDTH$}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for key in &data.frame.keys {
        let mut row = format!("{:<PERIOD_WIDTH$}", label(key));
        for (_, series) in &columns {
            row.push_str(&format!(" {:>VALUE_WIDTH$}", format_value(series.value_at(key))));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

/// The supported metrics and the names they answer to.
pub fn format_metrics() -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<26} {:<20} {:<16} {}\n", "metric", "short", "slug", "interval"));
    out.push_str(&format!("{:-<26} {:-<20} {:-<16} {:-<8}\n", "", "", "", ""));
    for metric in Metric::ALL {
        let interval = if metric == Metric::MarketCap { "ignored" } else { "yes" };
        out.push_str(&format!(
            "{:<26} {:<20} {:<16} {interval}\n",
            metric.display_name(),
            metric.short_name(),
            metric.slug()
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::tests::revenues;

    #[test]
    fn table_aligns_periods() {
        let table = format_table(&revenues());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("period"));
        assert!(lines[0].contains("AAPL Revenues"));
        assert!(lines[2].starts_with("2021"));
        assert!(lines[2].contains("365.80B"));
        assert!(lines[4].contains("211.90B"));
    }

    #[test]
    fn summary_lists_domain() {
        let data = revenues();
        let range = DateRange::parse("2021-01-01", "2024-01-01").unwrap();
        let summary = format_summary(&data, &range);
        assert!(summary.contains("Tickers: AAPL, MSFT"));
        assert!(summary.contains("Periods: 3 (2021 .. 2023)"));
        assert!(summary.contains("Revenues: [0, 400.00B]"));
    }

    #[test]
    fn metrics_listing_covers_all() {
        let listing = format_metrics();
        assert_eq!(listing.lines().count(), Metric::ALL.len() + 2);
        assert!(listing.contains("market-cap"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("GOOGL Market Cap", 10), "GOOGL Mar.");
        assert_eq!(truncate("EPS", 10), "EPS");
    }
}
