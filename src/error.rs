//! Error types.
//!
//! - `ChartError` is the library-level taxonomy. Callers match on it to decide
//!   between a placeholder, a partial chart or a silent drop.
//! - `AppError` is what the `mchart` binary reports: a message plus a process
//!   exit code.

/// Failures the charting pipeline can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("Unsupported metric: {0}")]
    UnknownMetric(String),
    #[error("Please select at least one ticker to render the chart.")]
    EmptySelection,
    #[error("Request for {ticker} failed: {message}")]
    Network { ticker: String, message: String },
    #[error("Malformed response for {ticker}: {message}")]
    Parse { ticker: String, message: String },
    #[error("Discarded result of superseded fetch (generation {0})")]
    StaleResult(u64),
    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Unsupported chart type")]
    UnsupportedChartType(String),
}

impl ChartError {
    /// Errors that abort a chart and leave a placeholder in its place.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            ChartError::UnknownMetric(_)
                | ChartError::EmptySelection
                | ChartError::UnsupportedChartType(_)
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ChartError> for AppError {
    fn from(err: ChartError) -> Self {
        let exit_code = match err {
            ChartError::UnknownMetric(_)
            | ChartError::UnsupportedChartType(_)
            | ChartError::InvalidDate(_)
            | ChartError::EmptySelection => 2,
            ChartError::StaleResult(_) => 3,
            ChartError::Network { .. } | ChartError::Parse { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_errors_map_to_exit_codes() {
        let err: AppError = ChartError::UnknownMetric("Beta".to_string()).into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Unsupported metric: Beta");

        let err: AppError = ChartError::Network {
            ticker: "AAPL".to_string(),
            message: "timeout".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn placeholder_errors() {
        assert!(ChartError::EmptySelection.is_placeholder());
        assert!(ChartError::UnsupportedChartType("Pie".to_string()).is_placeholder());
        assert!(!ChartError::StaleResult(3).is_placeholder());
    }
}
