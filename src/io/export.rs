//! Export the aligned chart data to CSV.
//!
//! Long format, one row per (period, ticker, metric), so the file loads
//! straight into a spreadsheet pivot or a dataframe. Missing values are left
//! empty.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::MetricSlot;
use crate::error::AppError;
use crate::normalize::label;
use crate::render::ChartData;

#[derive(Debug, Serialize)]
struct Row<'a> {
    period: &'a str,
    label: String,
    ticker: &'a str,
    metric: &'a str,
    value: Option<f64>,
}

/// Write `data` to a CSV file.
pub fn write_chart_csv(path: &Path, data: &ChartData) -> Result<(), AppError> {
    let writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let rows = write_rows(writer, data)?;
    log::info!("wrote {rows} rows to {}", path.display());
    Ok(())
}

/// Write `data` as CSV to any writer.
pub fn write_chart_csv_to<W: Write>(out: W, data: &ChartData) -> Result<usize, AppError> {
    write_rows(csv::Writer::from_writer(out), data)
}

fn write_rows<W: Write>(mut writer: csv::Writer<W>, data: &ChartData) -> Result<usize, AppError> {
    let mut rows = 0;
    for key in &data.frame.keys {
        let period_label = label(key);
        for slot in [MetricSlot::Primary, MetricSlot::Secondary] {
            let (Some(metric), Some(series)) = (data.metric(slot), data.series(slot)) else {
                continue;
            };
            for s in series {
                writer
                    .serialize(Row {
                        period: key.as_str(),
                        label: period_label.clone(),
                        ticker: &s.ticker,
                        metric: metric.name,
                        value: s.value_at(key),
                    })
                    .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
                rows += 1;
            }
        }
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::tests::revenues;

    #[test]
    fn long_format_rows() {
        let mut buf = Vec::new();
        let rows = write_chart_csv_to(&mut buf, &revenues()).unwrap();
        assert_eq!(rows, 6);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "period,label,ticker,metric,value");
        let first: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(&first[..4], &["2021", "2021", "AAPL", "Revenues"]);
        assert_eq!(first[4].parse::<f64>().unwrap(), 365.8e9);
        assert_eq!(lines.len(), 7);
    }
}
