//! SVG export.

use std::fmt::Display;
use std::path::Path;

use plotters::prelude::{IntoDrawingArea, SVGBackend};

use crate::error::AppError;
use crate::render::draw::draw_scene;
use crate::render::palette::Theme;
use crate::render::scene::{MarkId, Scene};

fn render_error(err: impl Display) -> AppError {
    AppError::new(4, format!("Failed to render chart: {err}"))
}

/// Render `scene` to an SVG document in memory.
pub fn svg_string(scene: &Scene, theme: &Theme, hover: Option<MarkId>) -> Result<String, AppError> {
    let mut buffer = String::new();
    {
        let size = (scene.size.width, scene.size.height);
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        draw_scene(&root, scene, theme, hover).map_err(render_error)?;
        root.present().map_err(render_error)?;
    }
    Ok(buffer)
}

/// Render `scene` to an SVG file.
pub fn write_svg(path: &Path, scene: &Scene, theme: &Theme) -> Result<(), AppError> {
    let size = (scene.size.width, scene.size.height);
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_scene(&root, scene, theme, None).map_err(render_error)?;
    root.present().map_err(|e| {
        AppError::new(4, format!("Failed to write SVG '{}': {e}", path.display()))
    })?;
    log::info!("wrote {}", path.display());
    Ok(())
}
