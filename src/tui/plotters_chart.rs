//! Plotters-powered chart widget for Ratatui.
//!
//! The widget paints a prepared `Scene` through `plotters-ratatui-backend`, the
//! same drawing code the SVG export uses. It does no layout of its own: the
//! controller builds the scene for the current size and the widget only
//! reports back the pixel size it was actually given.

use std::cell::Cell;

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::render::{MarkId, Scene, Size, Theme, draw_scene};

pub struct SceneChart<'a> {
    pub scene: &'a Scene,
    pub hover: Option<MarkId>,
    /// Pixel size of the drawing area seen during the last render.
    pub observed: &'a Cell<Option<Size>>,
}

impl<'a> Widget for SceneChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out anything useful below this; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let theme = Theme::terminal();
        let widget = widget_fn(move |root| {
            let (width, height) = root.dim_in_pixel();
            self.observed.set(Some(Size::new(width, height)));
            draw_scene(&root, self.scene, &theme, self.hover)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Map a terminal cell inside `area` to scene pixel coordinates (cell centre).
pub fn cell_to_scene(area: Rect, size: Size, column: u16, row: u16) -> Option<(f64, f64)> {
    let inside = column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height;
    if !inside || area.width == 0 || area.height == 0 {
        return None;
    }
    let fx = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
    let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
    Some((fx * f64::from(size.width), fy * f64::from(size.height)))
}
