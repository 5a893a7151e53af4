//! Backend-independent chart layout.
//!
//! A `Scene` is the chart laid out in pixel space for one container size:
//! bars or polylines, axes, legend and titles. It is rebuilt from cached
//! `ChartData` whenever the size or chart type changes, drawn by
//! `draw::draw_scene` and queried for hover hits.

use std::fmt;

use crate::data::MetricSpec;
use crate::domain::{ChartType, Interval, MetricSlot, NormalizedSeries};
use crate::normalize::{axis_title, label};
use crate::render::curve::{monotone_path, split_gaps};
use crate::scale::{
    BandScale, ChartFrame, DEFAULT_TICKS, LinearScale, PointScale, build_frame, category_ticks,
    format_abbrev,
};

pub const MARGIN_TOP: f64 = 40.0;
pub const MARGIN_BOTTOM: f64 = 60.0;
pub const MARGIN_LEFT: f64 = 60.0;
/// Room for the secondary axis labels.
const RIGHT_AXIS_WIDTH: f64 = 60.0;
const RIGHT_GAP: f64 = 20.0;

const BAR_PADDING: f64 = 0.2;
const GROUP_PADDING: f64 = 0.1;
const LINE_INSET: f64 = 16.0;
const CURVE_SAMPLES: usize = 12;
pub const MARKER_HALF: f64 = 3.0;
const HOVER_SLACK: f64 = 2.0;

const X_TICK_SPACING: f64 = 70.0;
const Y_TICK_SPACING: f64 = 40.0;

pub const LEGEND_ROW: f64 = 18.0;
pub const LEGEND_SWATCH: f64 = 14.0;
/// Rough glyph advance used to size the legend column.
const CHAR_WIDTH: f64 = 7.0;

/// Container size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Inner rectangle that holds the marks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    fn within(size: Size, right_margin: f64) -> Self {
        let left = MARGIN_LEFT;
        let top = MARGIN_TOP;
        Self {
            left,
            top,
            right: (f64::from(size.width) - right_margin).max(left + 1.0),
            bottom: (f64::from(size.height) - MARGIN_BOTTOM).max(top + 1.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Fetched, normalized data of one chart. Independent of size and chart type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub primary_metric: MetricSpec,
    pub secondary_metric: Option<MetricSpec>,
    pub interval: Interval,
    pub primary: Vec<NormalizedSeries>,
    /// Present exactly when `secondary_metric` is.
    pub secondary: Option<Vec<NormalizedSeries>>,
    pub frame: ChartFrame,
}

impl ChartData {
    pub fn new(
        primary_metric: MetricSpec,
        secondary_metric: Option<MetricSpec>,
        interval: Interval,
        primary: Vec<NormalizedSeries>,
        secondary: Option<Vec<NormalizedSeries>>,
    ) -> Self {
        let secondary = secondary_metric.and(secondary);
        let frame = build_frame(&primary, secondary.as_deref());
        Self {
            primary_metric,
            secondary_metric,
            interval,
            primary,
            secondary,
            frame,
        }
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.primary.iter().map(|s| s.ticker.as_str())
    }

    pub fn series(&self, slot: MetricSlot) -> Option<&[NormalizedSeries]> {
        match slot {
            MetricSlot::Primary => Some(&self.primary),
            MetricSlot::Secondary => self.secondary.as_deref(),
        }
    }

    pub fn metric(&self, slot: MetricSlot) -> Option<&MetricSpec> {
        match slot {
            MetricSlot::Primary => Some(&self.primary_metric),
            MetricSlot::Secondary => self.secondary_metric.as_ref(),
        }
    }
}

/// Identity of one drawn value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkId {
    /// Ticker position.
    pub series: usize,
    pub slot: MetricSlot,
    /// Position in `ChartFrame::keys`.
    pub key_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Bar rectangle, `y0 <= y1`.
    Bar { x0: f64, y0: f64, x1: f64, y1: f64 },
    /// Square point marker centred on `(x, y)`.
    Marker { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mark {
    pub id: MarkId,
    pub shape: Shape,
    pub value: f64,
}

impl Mark {
    fn contains(&self, x: f64, y: f64) -> bool {
        match self.shape {
            Shape::Bar { x0, y0, x1, y1 } => x >= x0 && x <= x1 && y >= y0 && y <= y1,
            Shape::Marker { x: cx, y: cy } => {
                let reach = MARKER_HALF + HOVER_SLACK;
                (x - cx).abs() <= reach && (y - cy).abs() <= reach
            }
        }
    }
}

/// One continuous run of a line series. Secondary paths are drawn dashed.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub series: usize,
    pub slot: MetricSlot,
    pub points: Vec<(f64, f64)>,
}

impl Path {
    pub fn dashed(&self) -> bool {
        self.slot == MetricSlot::Secondary
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Axis {
    pub title: String,
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Solid,
    Outlined,
    Dashed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub series: usize,
    pub swatch: Swatch,
    /// Top-left corner of the swatch.
    pub x: f64,
    pub y: f64,
}

/// Hover details of one mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub ticker: String,
    pub period: String,
    pub metric: String,
    pub value: String,
}

impl fmt::Display for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}\n{}: {}", self.ticker, self.period, self.metric, self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub chart_type: ChartType,
    pub plot: PlotArea,
    pub marks: Vec<Mark>,
    pub paths: Vec<Path>,
    pub x_axis: Axis,
    pub left_axis: Axis,
    pub right_axis: Option<Axis>,
    /// Pixel row of the primary zero value, when it lies inside the domain.
    pub zero_line: Option<f64>,
    pub legend: Vec<LegendEntry>,
    /// Set on placeholder scenes instead of any marks.
    pub message: Option<String>,
    tickers: Vec<String>,
    periods: Vec<String>,
    metric_names: [Option<String>; 2],
}

impl Scene {
    /// A scene with no chart, only a centred message.
    pub fn placeholder(size: Size, message: impl Into<String>) -> Self {
        Self {
            size,
            chart_type: ChartType::Bar,
            plot: PlotArea::within(size, RIGHT_GAP),
            marks: Vec::new(),
            paths: Vec::new(),
            x_axis: Axis::default(),
            left_axis: Axis::default(),
            right_axis: None,
            zero_line: None,
            legend: Vec::new(),
            message: Some(message.into()),
            tickers: Vec::new(),
            periods: Vec::new(),
            metric_names: [None, None],
        }
    }

    /// Lay out `data` as `chart_type` for a container of `size`.
    pub fn build(data: &ChartData, chart_type: ChartType, size: Size) -> Self {
        let frame = &data.frame;
        let has_secondary = data.secondary.is_some();

        let legend_items = legend_items(data, chart_type);
        let legend_width = legend_items
            .iter()
            .map(|(label, _, _)| label.chars().count())
            .max()
            .map_or(0.0, |chars| chars as f64 * CHAR_WIDTH + LEGEND_SWATCH + 12.0);
        let axis_room = if has_secondary { RIGHT_AXIS_WIDTH } else { RIGHT_GAP };
        let plot = PlotArea::within(size, legend_width + axis_room);

        let primary_y = LinearScale::new(frame.primary, (plot.bottom, plot.top));
        let secondary_y = frame
            .secondary
            .map(|domain| LinearScale::new(domain, (plot.bottom, plot.top)));

        let n_keys = frame.keys.len();
        let (marks, paths, x_of) = match chart_type {
            ChartType::Bar => {
                let outer = BandScale::new(n_keys, (plot.left, plot.right), BAR_PADDING);
                let (marks, paths) = layout_bars(data, &outer, &primary_y, secondary_y.as_ref());
                let x_of: Box<dyn Fn(usize) -> f64> =
                    Box::new(move |i| outer.position(i) + outer.bandwidth() / 2.0);
                (marks, paths, x_of)
            }
            ChartType::Line => {
                let points = PointScale::new(n_keys, (plot.left + LINE_INSET, plot.right - LINE_INSET));
                let (marks, paths) = layout_lines(data, &points, &primary_y, secondary_y.as_ref());
                let x_of: Box<dyn Fn(usize) -> f64> = Box::new(move |i| points.position(i));
                (marks, paths, x_of)
            }
        };

        let max_x_ticks = ((plot.width() / X_TICK_SPACING).floor() as usize).max(1);
        let category = category_ticks(&frame.keys);
        let stride = category.len().div_ceil(max_x_ticks).max(1);
        let x_axis = Axis {
            title: axis_title(data.interval, &frame.keys).to_string(),
            ticks: category
                .into_iter()
                .step_by(stride)
                .map(|(i, label)| Tick {
                    position: x_of(i),
                    label,
                })
                .collect(),
        };

        let y_count = ((plot.height() / Y_TICK_SPACING) as usize).clamp(2, DEFAULT_TICKS);
        let value_axis = |scale: &LinearScale, title: &str| Axis {
            title: title.to_string(),
            ticks: scale
                .domain
                .ticks(y_count)
                .into_iter()
                .map(|v| Tick {
                    position: scale.map(v),
                    label: format_abbrev(v),
                })
                .collect(),
        };
        let left_axis = value_axis(&primary_y, data.primary_metric.name);
        let right_axis = secondary_y
            .as_ref()
            .zip(data.secondary_metric.as_ref())
            .map(|(scale, metric)| value_axis(scale, metric.name));

        let zero_line = frame.primary.contains(0.0).then(|| primary_y.map(0.0));

        let legend_x = plot.right + axis_room;
        let legend = legend_items
            .into_iter()
            .enumerate()
            .map(|(row, (label, series, swatch))| LegendEntry {
                label,
                series,
                swatch,
                x: legend_x,
                y: plot.top + row as f64 * LEGEND_ROW,
            })
            .collect();

        Self {
            size,
            chart_type,
            plot,
            marks,
            paths,
            x_axis,
            left_axis,
            right_axis,
            zero_line,
            legend,
            message: None,
            tickers: data.tickers().map(str::to_string).collect(),
            periods: frame.keys.iter().map(label).collect(),
            metric_names: [
                Some(data.primary_metric.name.to_string()),
                data.secondary_metric.map(|m| m.name.to_string()),
            ],
        }
    }

    /// Topmost mark under `(x, y)`.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<MarkId> {
        self.marks.iter().rev().find(|m| m.contains(x, y)).map(|m| m.id)
    }

    pub fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.marks.iter().find(|m| m.id == id)
    }

    pub fn tooltip(&self, id: MarkId) -> Option<Tooltip> {
        let mark = self.mark(id)?;
        let metric = match id.slot {
            MetricSlot::Primary => &self.metric_names[0],
            MetricSlot::Secondary => &self.metric_names[1],
        };
        Some(Tooltip {
            ticker: self.tickers.get(id.series)?.clone(),
            period: self.periods.get(id.key_index)?.clone(),
            metric: metric.clone()?,
            value: format_abbrev(mark.value),
        })
    }

    pub fn is_placeholder(&self) -> bool {
        self.message.is_some()
    }
}

fn legend_items(data: &ChartData, chart_type: ChartType) -> Vec<(String, usize, Swatch)> {
    let secondary_swatch = match chart_type {
        ChartType::Bar => Swatch::Outlined,
        ChartType::Line => Swatch::Dashed,
    };
    let mut items = Vec::new();
    for (series, ticker) in data.tickers().enumerate() {
        items.push((
            format!("{ticker} ({})", data.primary_metric.metric.short_name()),
            series,
            Swatch::Solid,
        ));
        if let Some(metric) = &data.secondary_metric {
            items.push((
                format!("{ticker} ({})", metric.metric.short_name()),
                series,
                secondary_swatch,
            ));
        }
    }
    items
}

fn bar(id: MarkId, x0: f64, width: f64, base: f64, top: f64, value: f64) -> Mark {
    Mark {
        id,
        shape: Shape::Bar {
            x0,
            y0: base.min(top),
            x1: x0 + width,
            y1: base.max(top),
        },
        value,
    }
}

fn layout_bars(
    data: &ChartData,
    outer: &BandScale,
    primary_y: &LinearScale,
    secondary_y: Option<&LinearScale>,
) -> (Vec<Mark>, Vec<Path>) {
    let inner = BandScale::new(data.primary.len(), (0.0, outer.bandwidth()), GROUP_PADDING);
    let secondary = data.secondary.as_deref().zip(secondary_y);
    // Primary takes the left half of a sub-band when both metrics are shown.
    let share = if secondary.is_some() { 0.5 } else { 1.0 };
    let width = inner.bandwidth() * share;

    let mut marks = Vec::new();
    for (key_index, key) in data.frame.keys.iter().enumerate() {
        for (series, normalized) in data.primary.iter().enumerate() {
            let x = outer.position(key_index) + inner.position(series);
            if let Some(v) = normalized.value_at(key) {
                let id = MarkId {
                    series,
                    slot: MetricSlot::Primary,
                    key_index,
                };
                marks.push(bar(id, x, width, primary_y.map(0.0), primary_y.map(v), v));
            }
            if let Some((list, scale)) = secondary {
                if let Some(v) = list.get(series).and_then(|s| s.value_at(key)) {
                    let id = MarkId {
                        series,
                        slot: MetricSlot::Secondary,
                        key_index,
                    };
                    marks.push(bar(id, x + width, width, scale.map(0.0), scale.map(v), v));
                }
            }
        }
    }
    (marks, Vec::new())
}

fn layout_lines(
    data: &ChartData,
    xs: &PointScale,
    primary_y: &LinearScale,
    secondary_y: Option<&LinearScale>,
) -> (Vec<Mark>, Vec<Path>) {
    let mut slots = vec![(MetricSlot::Primary, data.primary.as_slice(), primary_y)];
    if let Some((list, scale)) = data.secondary.as_deref().zip(secondary_y) {
        slots.push((MetricSlot::Secondary, list, scale));
    }

    let mut marks = Vec::new();
    let mut paths = Vec::new();
    for (slot, list, scale) in slots {
        for (series, normalized) in list.iter().enumerate() {
            let points: Vec<(f64, Option<f64>)> = data
                .frame
                .keys
                .iter()
                .map(|key| normalized.value_at(key))
                .enumerate()
                .map(|(i, v)| (xs.position(i), v.map(|v| scale.map(v))))
                .collect();

            for run in split_gaps(&points) {
                paths.push(Path {
                    series,
                    slot,
                    points: monotone_path(&run, CURVE_SAMPLES),
                });
            }

            for (key_index, key) in data.frame.keys.iter().enumerate() {
                if let Some(v) = normalized.value_at(key) {
                    marks.push(Mark {
                        id: MarkId {
                            series,
                            slot,
                            key_index,
                        },
                        shape: Shape::Marker {
                            x: xs.position(key_index),
                            y: scale.map(v),
                        },
                        value: v,
                    });
                }
            }
        }
    }
    (marks, paths)
}
