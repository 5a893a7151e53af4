//! Plain-text reports for the command line.

pub mod format;

pub use format::{format_metrics, format_summary, format_table};
