//! Page geometry and the footer redaction region

use serde::Deserialize;

/// A page box in PDF user space (points, origin at the bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    /// US Letter size (8.5" × 11")
    pub fn letter() -> Self {
        Self { llx: 0.0, lly: 0.0, urx: 612.0, ury: 792.0 }
    }

    /// Build a box from a `[llx lly urx ury]` array, normalising corner order
    pub fn from_corners(values: [f32; 4]) -> Self {
        Self {
            llx: values[0].min(values[2]),
            lly: values[1].min(values[3]),
            urx: values[0].max(values[2]),
            ury: values[1].max(values[3]),
        }
    }

    pub fn width(&self) -> f32 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f32 {
        self.ury - self.lly
    }
}

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
}

/// Fixed rectangle painted over the timesheet footer on every page.
///
/// Coordinates are measured from the top-left corner of the page box with y
/// growing downwards, the way the timesheet layout was measured. The outline
/// is stroked as well as filled, so the painted band extends `width / 2`
/// beyond the rectangle on every side. The default covers the bottom 36pt of
/// a Letter page.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RedactionRegion {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    /// Stroke width of the outline in points
    #[serde(default = "default_stroke_width")]
    pub width: f32,
}

fn default_stroke_width() -> f32 {
    12.0
}

impl Default for RedactionRegion {
    fn default() -> Self {
        Self {
            x0: -5.0,
            y0: 756.0,
            x1: 725.0,
            y1: 792.0,
            width: default_stroke_width(),
        }
    }
}

impl RedactionRegion {
    /// Rectangle in PDF user space for the given page box, as
    /// `(x, y, width, height)` ready for the `re` operator.
    ///
    /// Nothing is clipped here; anything outside the page is simply not
    /// visible once drawn.
    pub fn to_user_space(&self, page: &PageBox) -> (f32, f32, f32, f32) {
        let left = page.llx + self.x0.min(self.x1);
        let right = page.llx + self.x0.max(self.x1);
        let top = page.ury - self.y0.min(self.y1);
        let bottom = page.ury - self.y0.max(self.y1);

        (left, bottom, right - left, top - bottom)
    }
}
