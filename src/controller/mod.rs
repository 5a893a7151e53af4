//! Chart lifecycle: request -> fetch -> normalize -> layout.
//!
//! A `ChartController` owns everything one chart instance needs: the last
//! accepted request fingerprint, a generation counter for in-flight fetches,
//! the cached data and the current scene. Hosts drive it in two ways:
//!
//! - synchronously with `refresh`, which blocks on the fetch
//! - split with `begin` / `FetchJob::run` / `commit`, so the fetch can run on
//!   a worker thread while the host keeps handling input
//!
//! A result is only committed if its generation is still the newest; anything
//! older is dropped. Size and chart-type changes never refetch.

use std::fmt;
use std::time::Instant;

use crate::data::{MetricSpec, SeriesSource, fetch_chart_series, resolve, resolve_secondary};
use crate::domain::{ChartRequest, ChartType, DateRange, Fingerprint, Interval};
use crate::error::ChartError;
use crate::normalize::normalize_all;
use crate::render::{ChartData, Scene, Size};

pub mod resize;

pub use resize::ResizeController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Drawing,
}

/// Result of submitting a request.
#[derive(Debug)]
pub enum Begin {
    /// Same fetch parameters as the last accepted request; nothing to fetch.
    Unchanged,
    Fetch(FetchJob),
}

/// A fetch detached from its controller.
#[derive(Debug, Clone)]
pub struct FetchJob {
    generation: u64,
    tickers: Vec<String>,
    primary: MetricSpec,
    secondary: Option<MetricSpec>,
    range: DateRange,
    interval: Interval,
}

impl FetchJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fetch every series and normalize it.
    pub fn run<S: SeriesSource + ?Sized>(self, source: &S) -> FetchOutcome {
        let started = Instant::now();
        let series = fetch_chart_series(
            source,
            &self.tickers,
            &self.primary,
            self.secondary.as_ref(),
            self.range,
            self.interval,
        );
        let primary = normalize_all(&series.primary, self.interval);
        let secondary = series
            .secondary
            .as_deref()
            .map(|s| normalize_all(s, self.interval));
        let data = ChartData::new(self.primary, self.secondary, self.interval, primary, secondary);
        log::info!(
            "fetch #{}: {} tickers, {} periods in {:?}",
            self.generation,
            self.tickers.len(),
            data.frame.keys.len(),
            started.elapsed()
        );
        FetchOutcome {
            generation: self.generation,
            data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    generation: u64,
    data: ChartData,
}

impl FetchOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

type LoadingCallback = Box<dyn FnMut(bool) + Send>;

pub struct ChartController {
    phase: Phase,
    generation: u64,
    fingerprint: Option<Fingerprint>,
    chart_type: ChartType,
    size: Size,
    data: Option<ChartData>,
    scene: Scene,
    on_loading: Option<LoadingCallback>,
}

impl fmt::Debug for ChartController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartController")
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .field("chart_type", &self.chart_type)
            .field("size", &self.size)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

impl ChartController {
    pub fn new(size: Size) -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            fingerprint: None,
            chart_type: ChartType::Bar,
            size,
            data: None,
            scene: Scene::placeholder(size, ChartError::EmptySelection.to_string()),
            on_loading: None,
        }
    }

    /// Register the host's loading indicator.
    pub fn on_loading(mut self, callback: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_loading = Some(Box::new(callback));
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn data(&self) -> Option<&ChartData> {
        self.data.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Validate `request` and decide whether it needs a fetch.
    ///
    /// Validation failures replace the chart with a placeholder carrying the
    /// error text.
    pub fn begin(&mut self, request: &ChartRequest) -> Result<Begin, ChartError> {
        self.chart_type = request.chart_type;
        match self.prepare(request) {
            Ok(Some(job)) => {
                self.phase = Phase::Fetching;
                self.notify_loading(true);
                Ok(Begin::Fetch(job))
            }
            Ok(None) => {
                self.rebuild_scene();
                Ok(Begin::Unchanged)
            }
            Err(err) => {
                log::debug!("request rejected: {err}");
                self.show_error(&err);
                Err(err)
            }
        }
    }

    /// Drop the current chart and show `err` in its place.
    pub fn show_error(&mut self, err: &ChartError) {
        self.fingerprint = None;
        self.data = None;
        self.scene = Scene::placeholder(self.size, err.to_string());
        if self.phase == Phase::Fetching {
            // Whatever is in flight is now stale.
            self.generation += 1;
            self.phase = Phase::Idle;
            self.notify_loading(false);
        }
    }

    fn prepare(&mut self, request: &ChartRequest) -> Result<Option<FetchJob>, ChartError> {
        if request.tickers.is_empty() || request.metric.trim().is_empty() {
            return Err(ChartError::EmptySelection);
        }
        let primary = resolve(&request.metric)?;
        let secondary = resolve_secondary(request.secondary_metric.as_deref())?;
        let range = DateRange::parse(&request.start_date, &request.end_date)?;

        let fingerprint = Fingerprint::of(request);
        if self.fingerprint.as_ref() == Some(&fingerprint) {
            return Ok(None);
        }

        self.generation += 1;
        self.fingerprint = Some(fingerprint);
        log::debug!(
            "fetch #{} for {} ({}, {})",
            self.generation,
            request.tickers.join(","),
            primary.name,
            secondary.map_or("no secondary", |s| s.name)
        );
        Ok(Some(FetchJob {
            generation: self.generation,
            tickers: request.tickers.clone(),
            primary,
            secondary,
            range,
            interval: request.interval,
        }))
    }

    /// Install a finished fetch, unless a newer one has been started since.
    pub fn commit(&mut self, outcome: FetchOutcome) -> Result<(), ChartError> {
        if outcome.generation != self.generation {
            log::debug!(
                "dropping fetch #{} (current #{})",
                outcome.generation,
                self.generation
            );
            return Err(ChartError::StaleResult(outcome.generation));
        }
        self.phase = Phase::Drawing;
        self.data = Some(outcome.data);
        self.rebuild_scene();
        self.phase = Phase::Idle;
        self.notify_loading(false);
        Ok(())
    }

    /// `begin`, fetch and `commit` in one blocking call.
    pub fn refresh<S: SeriesSource + ?Sized>(
        &mut self,
        request: &ChartRequest,
        source: &S,
    ) -> Result<(), ChartError> {
        match self.begin(request)? {
            Begin::Unchanged => Ok(()),
            Begin::Fetch(job) => self.commit(job.run(source)),
        }
    }

    /// Re-layout for a new container size. Returns whether anything changed.
    pub fn resize(&mut self, size: Size) -> bool {
        if size == self.size {
            return false;
        }
        self.size = size;
        self.rebuild_scene();
        true
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        if chart_type != self.chart_type {
            self.chart_type = chart_type;
            self.rebuild_scene();
        }
    }

    fn rebuild_scene(&mut self) {
        self.scene = match &self.data {
            Some(data) => Scene::build(data, self.chart_type, self.size),
            None => match &self.scene.message {
                Some(message) => Scene::placeholder(self.size, message.clone()),
                None => Scene::placeholder(self.size, ChartError::EmptySelection.to_string()),
            },
        };
    }

    fn notify_loading(&mut self, loading: bool) {
        if let Some(callback) = self.on_loading.as_mut() {
            callback(loading);
        }
    }
}
