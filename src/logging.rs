//! Logger setup (`log` facade, `fern` dispatch).

use std::path::PathBuf;
use std::{fs, io};

use log::LevelFilter;

use crate::error::AppError;

pub const LOG_FILE: &str = "metric-charts.log";

/// Where log records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stderr,
    /// `metric-charts.log` in the working directory. Used while the terminal
    /// is in the alternate screen.
    File,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    SetLog(#[from] log::SetLoggerError),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::new(2, format!("Failed to set up logging: {err}"))
    }
}

pub fn log_path() -> PathBuf {
    PathBuf::from(LOG_FILE)
}

fn file() -> Result<fs::File, Error> {
    Ok(fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(log_path())?)
}

/// Install the global logger. Records from this crate pass at `level`,
/// dependencies only at `warn` and above.
pub fn setup(level: LevelFilter, target: Target) -> Result<(), Error> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Warn.min(level))
        .level_for(env!("CARGO_CRATE_NAME"), level);

    let dispatch = match target {
        Target::Stderr => dispatch.chain(io::stderr()),
        Target::File => dispatch.chain(file()?),
    };
    dispatch.apply()?;
    Ok(())
}
