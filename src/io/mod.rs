//! File exports.

pub mod export;

pub use export::{write_chart_csv, write_chart_csv_to};
