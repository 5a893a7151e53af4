//! Shared "chart pipeline" used by the CLI front-ends.
//!
//! request -> controller (resolve, fetch, normalize, layout) -> scene + data
//!
//! The subcommands then only decide how to present the result (SVG, table,
//! CSV).

use std::sync::Arc;

use crate::cli::ChartArgs;
use crate::config::Settings;
use crate::controller::ChartController;
use crate::data::{HttpSource, SampleSource, SeriesSource};
use crate::domain::DateRange;
use crate::error::{AppError, ChartError};
use crate::render::{ChartData, Size};

/// Seed of the offline sample source.
pub const DEMO_SEED: u64 = 42;

/// A shareable series source (the TUI hands it to worker threads).
pub type SharedSource = Arc<dyn SeriesSource + Send>;

/// The backend client, or the offline sample source under `--demo`.
pub fn open_source(settings: &Settings) -> Result<SharedSource, AppError> {
    if settings.demo {
        log::info!("using offline sample data (seed {DEMO_SEED})");
        return Ok(Arc::new(SampleSource::new(DEMO_SEED)));
    }
    let source = HttpSource::from_settings(settings)?;
    log::info!("using backend {}", source.base_url());
    Ok(Arc::new(source))
}

/// Outputs of one chart run.
#[derive(Debug)]
pub struct ChartRun {
    /// Holds either the laid-out chart or a placeholder scene.
    pub controller: ChartController,
    pub range: Option<DateRange>,
    pub outcome: Result<(), ChartError>,
}

impl ChartRun {
    /// The fetched data, or the error that prevented it (exit code 3 when the
    /// backend returned nothing at all).
    pub fn data(&self) -> Result<&ChartData, AppError> {
        if let Err(err) = &self.outcome {
            return Err(err.clone().into());
        }
        let data = self
            .controller
            .data()
            .ok_or_else(|| AppError::new(3, "No chart data."))?;
        if data.frame.keys.is_empty() {
            return Err(AppError::new(
                3,
                format!("No data returned for {}.", data.tickers().collect::<Vec<_>>().join(", ")),
            ));
        }
        Ok(data)
    }
}

/// Resolve, fetch and lay out the chart described by `args`.
pub fn run_chart<S: SeriesSource + ?Sized>(args: &ChartArgs, source: &S, size: Size) -> ChartRun {
    let mut controller = ChartController::new(size);
    let request = args.to_request();
    let range = request.as_ref().ok().and_then(|r| DateRange::parse(&r.start_date, &r.end_date).ok());

    let outcome = request.and_then(|request| controller.refresh(&request, source));
    if let Err(err) = &outcome {
        // Argument errors never reach the controller; show them all the same.
        controller.show_error(err);
    }

    ChartRun {
        controller,
        range,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};
    use crate::data::fetch::tests::FakeSource;

    fn chart_args(args: &[&str]) -> ChartArgs {
        let cli = Cli::try_parse_from(["mchart", "table"].into_iter().chain(args.iter().copied())).unwrap();
        match cli.command {
            Command::Table(t) => t.chart,
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn runs_against_source() {
        let source = FakeSource::new();
        let run = run_chart(&chart_args(&["-t", "AAPL,MSFT", "-i", "annual"]), &source, Size::new(800, 400));
        assert!(run.outcome.is_ok());
        assert_eq!(run.data().unwrap().frame.keys.len(), 3);
        assert!(run.range.is_some());
    }

    #[test]
    fn chart_type_error_becomes_placeholder() {
        let source = FakeSource::new();
        let run = run_chart(&chart_args(&["-c", "pie"]), &source, Size::new(800, 400));
        assert_eq!(source.calls(), 0);
        assert_eq!(run.controller.scene().message.as_deref(), Some("Unsupported chart type"));
        assert_eq!(run.data().unwrap_err().exit_code(), 2);
    }

    #[test]
    fn empty_backend_is_no_data() {
        let mut source = FakeSource::new();
        source.failing = vec!["AAPL".to_string()];
        let run = run_chart(&chart_args(&["-t", "AAPL"]), &source, Size::new(800, 400));
        assert!(run.outcome.is_ok());
        assert_eq!(run.data().unwrap_err().exit_code(), 3);
    }
}
