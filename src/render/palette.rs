//! Colours and per-surface themes.

use plotters::style::RGBColor;

/// d3 "category10".
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Fill of the mark under the pointer.
pub const HIGHLIGHT: RGBColor = RGBColor(0xf4, 0x72, 0xb6);

pub const ZERO_LINE: RGBColor = RGBColor(0x88, 0x88, 0x88);

/// Colour of the ticker at position `index`; wraps after ten tickers.
pub fn series_color(index: usize) -> RGBColor {
    CATEGORY10[index % CATEGORY10.len()]
}

/// Surface-dependent colours. Series colours are shared by every theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// `None` leaves the surface as is (terminal cells keep their background).
    pub background: Option<RGBColor>,
    pub text: RGBColor,
    pub axis: RGBColor,
    pub grid: RGBColor,
    pub font_size: u32,
}

impl Theme {
    /// Exported SVG files.
    pub fn light() -> Self {
        Self {
            background: Some(RGBColor(0xff, 0xff, 0xff)),
            text: RGBColor(0x33, 0x33, 0x33),
            axis: RGBColor(0x55, 0x55, 0x55),
            grid: RGBColor(0xe5, 0xe5, 0xe5),
            font_size: 12,
        }
    }

    /// The dashboard's dark surface.
    pub fn dark() -> Self {
        Self {
            background: Some(RGBColor(0x18, 0x14, 0x25)),
            text: RGBColor(0xe5, 0xe5, 0xe5),
            axis: RGBColor(0xcc, 0xcc, 0xcc),
            grid: RGBColor(0x3a, 0x34, 0x4d),
            font_size: 12,
        }
    }

    /// Terminal rendering: no fill, high-contrast axes.
    pub fn terminal() -> Self {
        Self {
            background: None,
            text: RGBColor(0xff, 0xff, 0xff),
            axis: RGBColor(0xff, 0xff, 0xff),
            grid: RGBColor(0x44, 0x44, 0x44),
            font_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        assert_eq!(series_color(0), RGBColor(0x1f, 0x77, 0xb4));
        assert_eq!(series_color(1), RGBColor(0xff, 0x7f, 0x0e));
        assert_eq!(series_color(10), series_color(0));
    }
}
