//! 1-bit-per-pixel raster with the blit and drawing primitives the
//! widget layer is built on.
//!
//! Dimensions are fixed at construction; content is mutable. Reads
//! outside the bounds are unlit and writes outside the bounds are
//! no-ops, so callers never have to pre-clip.

use crate::geometry::{Point, Rect, Size};

/// A 1-bpp W×H raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    pixels: Vec<bool>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Create a new bitmap with every pixel set to `fill`.
    pub fn new(size: Size, fill: bool) -> Self {
        let len = size.width as usize * size.height as usize;
        Self {
            pixels: vec![fill; len],
            width: size.width,
            height: size.height,
        }
    }

    /// The bitmap dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read the pixel at (x, y). Out-of-bounds reads are unlit.
    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.pixels[self.index(x as u32, y as u32)]
    }

    /// Write the pixel at (x, y). Out-of-bounds writes are no-ops.
    pub fn put(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        self.pixels[idx] = on;
    }

    /// Reset every pixel to unlit.
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Returns true if no pixel is lit.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| !p)
    }

    /// Copy out the region `rect` as a new bitmap.
    ///
    /// The rectangle may extend beyond the source in any direction
    /// (including a negative origin); pixels outside the source read
    /// as unlit.
    pub fn crop(&self, rect: Rect) -> Bitmap {
        let mut out = Bitmap::new(rect.size, false);
        for dy in 0..rect.size.height as i32 {
            for dx in 0..rect.size.width as i32 {
                if self.get(rect.origin.x + dx, rect.origin.y + dy) {
                    out.put(dx, dy, true);
                }
            }
        }
        out
    }

    /// Paste `src` with its top-left corner at `at`, replacing the
    /// covered pixels. Pixels falling outside this bitmap are dropped.
    pub fn paste(&mut self, src: &Bitmap, at: Point) {
        for dy in 0..src.height as i32 {
            for dx in 0..src.width as i32 {
                self.put(at.x + dx, at.y + dy, src.get(dx, dy));
            }
        }
    }

    /// Paste `src` at `at`, combining with the existing content by OR.
    /// Lit pixels in `src` never erase what is already there.
    pub fn paste_or(&mut self, src: &Bitmap, at: Point) {
        for dy in 0..src.height as i32 {
            for dx in 0..src.width as i32 {
                if src.get(dx, dy) {
                    self.put(at.x + dx, at.y + dy, true);
                }
            }
        }
    }

    /// Draw a line from `from` to `to` (inclusive), Bresenham.
    pub fn line(&mut self, from: Point, to: Point, on: bool) {
        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, on);
            if x == to.x && y == to.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Fill the region `rect` with `on`.
    pub fn fill_rect(&mut self, rect: Rect, on: bool) {
        for dy in 0..rect.size.height as i32 {
            for dx in 0..rect.size.width as i32 {
                self.put(rect.origin.x + dx, rect.origin.y + dy, on);
            }
        }
    }

    /// Draw the rectangle `rect`: interior filled with `fill`, border
    /// drawn with `outline`.
    pub fn rectangle(&mut self, rect: Rect, fill: bool, outline: bool) {
        if rect.is_empty() {
            return;
        }
        self.fill_rect(rect, fill);
        let x1 = rect.origin.x;
        let y1 = rect.origin.y;
        let x2 = rect.right() - 1;
        let y2 = rect.bottom() - 1;
        self.line(Point::new(x1, y1), Point::new(x2, y1), outline);
        self.line(Point::new(x1, y2), Point::new(x2, y2), outline);
        self.line(Point::new(x1, y1), Point::new(x1, y2), outline);
        self.line(Point::new(x2, y1), Point::new(x2, y2), outline);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
