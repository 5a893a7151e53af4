//! Paint a `Scene` on any plotters backend.

use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, DrawingAreaErrorKind};
use plotters::element::{DashedPathElement, PathElement, Rectangle, Text};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, IntoFont, RGBColor, ShapeStyle, TextStyle};
use plotters::prelude::DrawingBackend;

use crate::domain::MetricSlot;
use crate::render::palette::{HIGHLIGHT, Theme, ZERO_LINE, series_color};
use crate::render::scene::{LEGEND_SWATCH, MARKER_HALF, Mark, MarkId, Scene, Shape, Swatch};

pub type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

const TICK_LEN: i32 = 5;
const LINE_WIDTH: u32 = 2;

fn px(v: f64) -> i32 {
    v.round() as i32
}

fn pt((x, y): (f64, f64)) -> (i32, i32) {
    (px(x), px(y))
}

/// Draw `scene`, filling the hovered mark with the highlight colour.
pub fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    theme: &Theme,
    hover: Option<MarkId>,
) -> DrawResult<DB> {
    if let Some(background) = theme.background {
        root.fill(&background)?;
    }

    let text = |h: HPos, v: VPos| -> TextStyle<'static> {
        ("sans-serif", theme.font_size)
            .into_font()
            .color(&theme.text)
            .pos(Pos::new(h, v))
    };

    if let Some(message) = &scene.message {
        let centre = (
            px(f64::from(scene.size.width) / 2.0),
            px(f64::from(scene.size.height) / 2.0),
        );
        root.draw(&Text::new(message.clone(), centre, text(HPos::Center, VPos::Center)))?;
        return Ok(());
    }

    let plot = scene.plot;
    let (left, top, right, bottom) = (px(plot.left), px(plot.top), px(plot.right), px(plot.bottom));

    // Gridlines and left ticks.
    for tick in &scene.left_axis.ticks {
        let y = px(tick.position);
        root.draw(&PathElement::new(vec![(left, y), (right, y)], theme.grid.stroke_width(1)))?;
        root.draw(&PathElement::new(vec![(left - TICK_LEN, y), (left, y)], theme.axis.stroke_width(1)))?;
        root.draw(&Text::new(
            tick.label.clone(),
            (left - TICK_LEN - 3, y),
            text(HPos::Right, VPos::Center),
        ))?;
    }

    if let Some(zero) = scene.zero_line {
        dashed(root, &[(plot.left, zero), (plot.right, zero)], ZERO_LINE.stroke_width(1), 4.0, 4.0)?;
    }

    for mark in scene.marks.iter().filter(|m| matches!(m.shape, Shape::Bar { .. })) {
        draw_mark(root, mark, hover == Some(mark.id))?;
    }

    for path in &scene.paths {
        let style = series_color(path.series).stroke_width(LINE_WIDTH);
        if path.dashed() {
            dashed(root, &path.points, style, 6.0, 4.0)?;
        } else {
            root.draw(&PathElement::new(
                path.points.iter().copied().map(pt).collect::<Vec<_>>(),
                style,
            ))?;
        }
    }

    // Markers sit on top of the lines.
    for mark in scene.marks.iter().filter(|m| matches!(m.shape, Shape::Marker { .. })) {
        draw_mark(root, mark, hover == Some(mark.id))?;
    }

    // Axes.
    let axis = theme.axis.stroke_width(1);
    root.draw(&PathElement::new(vec![(left, top), (left, bottom)], axis))?;
    root.draw(&PathElement::new(vec![(left, bottom), (right, bottom)], axis))?;
    for tick in &scene.x_axis.ticks {
        let x = px(tick.position);
        root.draw(&PathElement::new(vec![(x, bottom), (x, bottom + TICK_LEN)], axis))?;
        root.draw(&Text::new(
            tick.label.clone(),
            (x, bottom + TICK_LEN + 3),
            text(HPos::Center, VPos::Top),
        ))?;
    }
    if let Some(right_axis) = &scene.right_axis {
        root.draw(&PathElement::new(vec![(right, top), (right, bottom)], axis))?;
        for tick in &right_axis.ticks {
            let y = px(tick.position);
            root.draw(&PathElement::new(vec![(right, y), (right + TICK_LEN, y)], axis))?;
            root.draw(&Text::new(
                tick.label.clone(),
                (right + TICK_LEN + 3, y),
                text(HPos::Left, VPos::Center),
            ))?;
        }
        root.draw(&Text::new(
            right_axis.title.clone(),
            (right, top - 12),
            text(HPos::Right, VPos::Bottom),
        ))?;
    }

    // Titles.
    root.draw(&Text::new(
        scene.left_axis.title.clone(),
        (left, top - 12),
        text(HPos::Left, VPos::Bottom),
    ))?;
    root.draw(&Text::new(
        scene.x_axis.title.clone(),
        (px((plot.left + plot.right) / 2.0), bottom + 34),
        text(HPos::Center, VPos::Top),
    ))?;

    for entry in &scene.legend {
        let color = series_color(entry.series);
        let (x, y) = (px(entry.x), px(entry.y));
        let w = px(LEGEND_SWATCH);
        match entry.swatch {
            Swatch::Solid => {
                root.draw(&Rectangle::new([(x, y), (x + w, y + 10)], color.filled()))?;
            }
            Swatch::Outlined => {
                root.draw(&Rectangle::new([(x, y), (x + w, y + 10)], color.mix(0.35).filled()))?;
                root.draw(&Rectangle::new([(x, y), (x + w, y + 10)], color.stroke_width(1)))?;
            }
            Swatch::Dashed => {
                let mid = entry.y + 5.0;
                dashed(
                    root,
                    &[(entry.x, mid), (entry.x + LEGEND_SWATCH, mid)],
                    color.stroke_width(LINE_WIDTH),
                    4.0,
                    2.0,
                )?;
            }
        }
        root.draw(&Text::new(
            entry.label.clone(),
            (x + w + 6, y + 5),
            text(HPos::Left, VPos::Center),
        ))?;
    }

    Ok(())
}

fn draw_mark<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, mark: &Mark, hovered: bool) -> DrawResult<DB> {
    let color: RGBColor = if hovered { HIGHLIGHT } else { series_color(mark.id.series) };
    match mark.shape {
        Shape::Bar { x0, y0, x1, y1 } => {
            let corners = [(px(x0), px(y0)), (px(x1), px(y1))];
            match mark.id.slot {
                MetricSlot::Primary => root.draw(&Rectangle::new(corners, color.filled()))?,
                MetricSlot::Secondary => {
                    let fill = if hovered { color.filled() } else { color.mix(0.35).filled() };
                    root.draw(&Rectangle::new(corners, fill))?;
                    root.draw(&Rectangle::new(corners, color.stroke_width(1)))?;
                }
            }
        }
        // Squares rather than circles: the terminal backend mis-scales circle radii.
        Shape::Marker { x, y } => {
            let corners = [
                (px(x - MARKER_HALF), px(y - MARKER_HALF)),
                (px(x + MARKER_HALF), px(y + MARKER_HALF)),
            ];
            let style = match mark.id.slot {
                MetricSlot::Primary => color.filled(),
                MetricSlot::Secondary if hovered => color.filled(),
                MetricSlot::Secondary => color.stroke_width(1),
            };
            root.draw(&Rectangle::new(corners, style))?;
        }
    }
    Ok(())
}

fn dashed<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[(f64, f64)],
    style: ShapeStyle,
    on: f64,
    off: f64,
) -> DrawResult<DB> {
    root.draw(&DashedPathElement::new(
        points.iter().copied().map(pt).collect::<Vec<_>>(),
        on,
        off,
        style,
    ))?;
    Ok(())
}
