//! Static drawing widgets: a line from the origin and a rectangle.
//!
//! Both render once at construction and never change afterwards, so
//! `update` always reports no change.

use crate::bitmap::Bitmap;
use crate::geometry::{Point, Rect, Size};

use super::Widget;

/// A line from the widget origin to `(x, y)` inclusive.
pub struct LineWidget {
    image: Bitmap,
}

impl LineWidget {
    /// Draw a line to `to`; the widget is exactly large enough to hold it.
    pub fn new(to: Point, color: bool) -> Self {
        let size = Size::new(to.x.max(0) as u32 + 1, to.y.max(0) as u32 + 1);
        let mut image = Bitmap::new(size, false);
        image.line(Point::new(0, 0), to, color);
        Self { image }
    }
}

impl Widget for LineWidget {
    fn update(&mut self, _reset: bool) -> bool {
        false
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }
}

/// A rectangle from the widget origin to `(x, y)` inclusive.
pub struct RectangleWidget {
    image: Bitmap,
}

impl RectangleWidget {
    /// Draw a rectangle to `to` with the given fill and outline colors.
    pub fn new(to: Point, fill: bool, outline: bool) -> Self {
        let size = Size::new(to.x.max(0) as u32 + 1, to.y.max(0) as u32 + 1);
        let mut image = Bitmap::new(size, false);
        image.rectangle(Rect::new(0, 0, size.width, size.height), fill, outline);
        Self { image }
    }
}

impl Widget for RectangleWidget {
    fn update(&mut self, _reset: bool) -> bool {
        false
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }
}
