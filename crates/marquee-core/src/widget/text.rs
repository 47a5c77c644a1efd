//! Text widget: a format template fed by transformed variables.
//!
//! Rendering walks the message character by character, painting each
//! line into a scratch strip that is then blitted into the main image
//! at the justification offset. The widget keeps a snapshot of the
//! variable values behind its current image, so `update` is a no-op
//! while nothing it reads has changed.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::bitmap::Bitmap;
use crate::font::FontPack;
use crate::geometry::{Point, Rect, Size};
use crate::transform;
use crate::vars::{Value, VarStore};

use super::Widget;

/// Horizontal justification of each text line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justify {
    /// Lines start at x = 0.
    #[default]
    Left,
    /// Lines are centered in the widget.
    Center,
    /// Lines end at the right edge.
    Right,
}

/// A text widget.
pub struct Text {
    format: String,
    tokens: Vec<String>,
    font: Rc<FontPack>,
    varwidth: bool,
    min_size: Size,
    just: Justify,
    vars: VarStore,
    snapshot: HashMap<String, Value>,
    image: Bitmap,
    natural: Size,
}

impl Text {
    /// Build the widget and render it once.
    ///
    /// The variable snapshot starts empty, so the first `update` call
    /// re-renders and reports a change.
    pub fn new(
        format: impl Into<String>,
        tokens: Vec<String>,
        font: Rc<FontPack>,
        vars: VarStore,
        varwidth: bool,
        min_size: Size,
        just: Justify,
    ) -> Self {
        let mut widget = Self {
            format: format.into(),
            tokens,
            font,
            varwidth,
            min_size,
            just,
            vars,
            snapshot: HashMap::new(),
            image: Bitmap::new(Size::new(0, 0), false),
            natural: Size::new(0, 0),
        };
        widget.render();
        widget
    }

    /// Resolve tokens and fill the format template.
    ///
    /// A missing variable or a template mismatch short-circuits to the
    /// literal `"VarErr"` so the panel shows something diagnosable.
    fn eval_message(&self) -> String {
        let mut params = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            let name = transform::base_name(token);
            match self.vars.get(name) {
                Some(value) => params.push(transform::apply(&value, token).to_string()),
                None => {
                    debug!(variable = name, "variable not found while rendering text");
                    return "VarErr".to_string();
                }
            }
        }
        match transform::format_template(&self.format, &params) {
            Some(msg) => msg,
            None => {
                debug!(format = %self.format, "format template does not match parameters");
                "VarErr".to_string()
            }
        }
    }

    /// Measure `msg`: maximum line width and total height.
    fn measure(&self, msg: &str) -> Size {
        let cell = self.font.cell();
        let mut maxw = 0u32;
        let mut maxh = 0u32;
        let mut cx = 0u32;
        for c in msg.chars() {
            if c == '\n' {
                maxh += cell.height;
                maxw = maxw.max(cx);
                cx = 0;
                continue;
            }
            let glyph = self.font.glyph(c);
            cx += if self.varwidth { glyph.width } else { cell.width };
        }
        maxw = maxw.max(cx);
        maxh += cell.height;
        Size::new(maxw, maxh)
    }

    fn line_offset(&self, maxw: u32, line_width: u32) -> i32 {
        match self.just {
            Justify::Left => 0,
            Justify::Center => (maxw.saturating_sub(line_width) / 2) as i32,
            Justify::Right => maxw.saturating_sub(line_width) as i32,
        }
    }

    /// Record the dereferenced values behind the current render.
    fn snapshot_vars(&mut self) {
        self.snapshot.clear();
        for token in &self.tokens {
            let name = transform::base_name(token);
            match self.vars.get(name) {
                Some(value) => {
                    self.snapshot.insert(name.to_string(), value);
                }
                None => {
                    debug!(variable = name, "cannot snapshot variable missing from store");
                }
            }
        }
    }

    /// Re-render the image.
    fn render(&mut self) {
        let mut msg = self.eval_message();
        if msg.is_empty() {
            msg = " ".to_string();
        }

        let cell = self.font.cell();
        let (fx, fy) = (cell.width, cell.height);
        let natural = self.measure(&msg);
        let framed = natural.max(self.min_size);
        let mut image = Bitmap::new(framed, false);

        let mut strip = Bitmap::new(Size::new(framed.width, fy), false);
        let mut cx = 0u32;
        let mut cy = 0i32;
        for c in msg.chars() {
            if c == '\n' {
                let ax = self.line_offset(framed.width, cx);
                image.paste(&strip, Point::new(ax, cy));
                strip = Bitmap::new(Size::new(framed.width, fy), false);
                cy += fy as i32;
                cx = 0;
                continue;
            }

            let glyph = self.font.glyph(c);
            let (char_img, advance);
            if self.varwidth {
                char_img = glyph.bitmap.clone();
                advance = glyph.width;
            } else {
                // Center the glyph inside its cell; the negative-origin
                // crop pads the left side with unlit pixels.
                let offset = (fx.saturating_sub(glyph.width) / 2) as i32;
                char_img = glyph
                    .bitmap
                    .crop(Rect::new(-offset, 0, fx, fy));
                advance = fx;
            }
            strip.paste(&char_img, Point::new(cx as i32, 0));
            // A one-column gap after the glyph is always cleared.
            strip.fill_rect(
                Rect::new((cx + char_img.width()) as i32, 0, 1, fy),
                false,
            );
            cx += advance;
        }
        let ax = self.line_offset(framed.width, cx);
        image.paste(&strip, Point::new(ax, cy));

        // A fixed frame wins over the natural extent.
        if self.min_size.width > 0 || self.min_size.height > 0 {
            image = image.crop(Rect::new(0, 0, self.min_size.width, self.min_size.height));
        }

        self.natural = natural.max(image.size());
        self.image = image;
    }

    /// Whether any referenced variable differs from the snapshot.
    fn changed(&self) -> bool {
        for token in &self.tokens {
            let name = transform::base_name(token);
            match (self.vars.get(name), self.snapshot.get(name)) {
                (Some(live), Some(seen)) => {
                    if live != *seen {
                        return true;
                    }
                }
                _ => return true,
            }
        }
        false
    }
}

impl Widget for Text {
    fn update(&mut self, _reset: bool) -> bool {
        if !self.changed() {
            return false;
        }
        self.snapshot_vars();
        self.render();
        true
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }

    fn natural_size(&self) -> Size {
        self.natural
    }
}
