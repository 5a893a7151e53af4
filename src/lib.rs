//! `metric-charts` library crate.
//!
//! The binary (`mchart`) is a thin wrapper around this library so that the
//! fetch, normalize, scale and render stages are testable without a terminal.
//!
//! Data flows one way: `data` fetches raw series, `normalize` buckets them by
//! period, `scale` builds the shared axes, `render` lays out a `Scene`, and
//! `controller` decides when each stage has to run again.

pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod render;
pub mod report;
pub mod scale;
pub mod tui;
