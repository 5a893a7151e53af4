//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request parameters (`ChartRequest`, `Interval`, `ChartType`, `Timeframe`)
//! - fetched and bucketed data (`RawPoint`, `Series`, `DateKey`, `NormalizedSeries`)
//! - the refetch fingerprint (`Fingerprint`)

pub mod types;

pub use types::*;
