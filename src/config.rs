//! Runtime configuration.
//!
//! Values come from the process environment (optionally seeded from a `.env`
//! file via `dotenvy`) and are overridden by command-line flags.

use std::time::Duration;

use log::LevelFilter;

use crate::error::AppError;

pub const ENV_API_BASE_URL: &str = "METRIC_CHARTS_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "METRIC_CHARTS_TIMEOUT_SECS";
pub const ENV_LOG: &str = "METRIC_CHARTS_LOG";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub demo: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Backend root; required unless `demo` is set.
    pub api_base_url: Option<String>,
    pub timeout: Duration,
    pub log_level: LevelFilter,
    /// Use the offline sample source instead of the backend.
    pub demo: bool,
}

impl Settings {
    /// Load `.env`, read the environment and apply `overrides`.
    pub fn load(overrides: &Overrides) -> Result<Self, AppError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(AppError::new(2, format!("Failed to read .env: {err}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self, AppError> {
        let non_empty = |v: String| {
            let v = v.trim().to_string();
            (!v.is_empty()).then_some(v)
        };

        let api_base_url = overrides
            .api_base_url
            .clone()
            .or_else(|| lookup(ENV_API_BASE_URL))
            .and_then(non_empty);

        let timeout = match overrides.timeout_secs {
            Some(secs) => Duration::from_secs(secs),
            None => match lookup(ENV_TIMEOUT_SECS).and_then(non_empty) {
                Some(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    AppError::new(2, format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'."))
                })?,
                None => DEFAULT_TIMEOUT,
            },
        };

        let log_level = match overrides.log_level.clone().or_else(|| lookup(ENV_LOG)).and_then(non_empty) {
            Some(raw) => raw
                .parse::<LevelFilter>()
                .map_err(|_| AppError::new(2, format!("Unknown log level '{raw}'.")))?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            api_base_url,
            timeout,
            log_level,
            demo: overrides.demo,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::from_lookup(env(&[]), &Overrides::default()).unwrap();
        assert_eq!(s.api_base_url, None);
        assert_eq!(s.timeout, DEFAULT_TIMEOUT);
        assert_eq!(s.log_level, LevelFilter::Info);
        assert!(!s.demo);
    }

    #[test]
    fn flags_override_environment() {
        let vars = env(&[
            (ENV_API_BASE_URL, "https://env.example/api"),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_LOG, "warn"),
        ]);
        let from_env = Settings::from_lookup(&vars, &Overrides::default()).unwrap();
        assert_eq!(from_env.api_base_url.as_deref(), Some("https://env.example/api"));
        assert_eq!(from_env.timeout, Duration::from_secs(30));
        assert_eq!(from_env.log_level, LevelFilter::Warn);

        let overrides = Overrides {
            api_base_url: Some("http://localhost:8080".to_string()),
            timeout_secs: Some(5),
            log_level: Some("debug".to_string()),
            demo: true,
        };
        let s = Settings::from_lookup(&vars, &overrides).unwrap();
        assert_eq!(s.api_base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(s.timeout, Duration::from_secs(5));
        assert_eq!(s.log_level, LevelFilter::Debug);
        assert!(s.demo);
    }

    #[test]
    fn rejects_bad_values() {
        let err = Settings::from_lookup(env(&[(ENV_TIMEOUT_SECS, "soon")]), &Overrides::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(Settings::from_lookup(env(&[(ENV_LOG, "loud")]), &Overrides::default()).is_err());
        let blank = Settings::from_lookup(env(&[(ENV_API_BASE_URL, "  ")]), &Overrides::default()).unwrap();
        assert_eq!(blank.api_base_url, None);
    }
}
