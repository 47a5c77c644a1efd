//! Frame packing for the panel bus, plus the ASCII debug renderer.
//!
//! Panels take row-major byte rows: each byte carries eight vertically
//! stacked pixels, LSB on top. Bit `b` of the byte at byte-row `r`,
//! column `c` is the pixel at `(c, r * 8 + b)`; pixels past the bottom
//! of the region pad with zeros.

use crate::bitmap::Bitmap;
use crate::geometry::Rect;

/// Pack the region `region` of `image` into `ceil(h / 8)` byte rows of
/// `w` bytes each.
pub fn pack(image: &Bitmap, region: Rect) -> Vec<Vec<u8>> {
    let img = image.crop(region);
    let width = img.width() as usize;
    let height = img.height();
    let byte_rows = height.div_ceil(8) as usize;

    let mut out = Vec::with_capacity(byte_rows);
    for r in 0..byte_rows {
        let mut row = vec![0u8; width];
        for (c, byte) in row.iter_mut().enumerate() {
            for b in 0..8u32 {
                let y = r as u32 * 8 + b;
                if y < height && img.get(c as i32, y as i32) {
                    *byte |= 1 << b;
                }
            }
        }
        out.push(row);
    }
    out
}

/// Rebuild a bitmap from packed byte rows. The inverse of [`pack`] for
/// regions whose height is a multiple of 8; otherwise the bottom pad
/// rows come back unlit.
pub fn unpack(frame: &[Vec<u8>], width: u32, height: u32) -> Bitmap {
    let mut img = Bitmap::new(crate::geometry::Size::new(width, height), false);
    for (r, row) in frame.iter().enumerate() {
        for (c, byte) in row.iter().enumerate() {
            for b in 0..8u32 {
                if byte & (1 << b) != 0 {
                    img.put(c as i32, (r as u32 * 8 + b) as i32, true);
                }
            }
        }
    }
    img
}

/// Render packed byte rows as text: `*` for lit pixels inside a frame
/// of `|` and `-`. One output line per pixel row.
pub fn render_ascii(frame: &[Vec<u8>], width: u32) -> String {
    let mut out = String::new();
    let border = format!("|{}|\n", "-".repeat(width as usize));
    out.push_str(&border);
    for row in frame {
        for b in 0..8u32 {
            out.push('|');
            for c in 0..width as usize {
                let lit = row.get(c).is_some_and(|byte| byte & (1 << b) != 0);
                out.push(if lit { '*' } else { ' ' });
            }
            out.push_str("|\n");
        }
    }
    out.push_str(&border);
    out
}
