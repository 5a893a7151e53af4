//! Chart rendering.
//!
//! Layout (`scene`) is pure and pixel-based; painting (`draw`) goes through
//! plotters so the same scene lands in an SVG file or a terminal buffer.

pub mod curve;
pub mod draw;
pub mod palette;
pub mod scene;
pub mod svg;

pub use draw::draw_scene;
pub use palette::Theme;
pub use scene::{ChartData, MarkId, Scene, Size, Tooltip};
pub use svg::{svg_string, write_svg};
