//! Popup effect: reveals a tall widget through a short window.
//!
//! The window rests at the top for `duration_s`, slides down one pixel
//! per tick until the bottom is visible, rests there for `popup_s`,
//! then slides back. A stalled caller fast-forwards through the rest
//! phases but the slide still moves one step per tick, so a large gap
//! between calls never compounds into a jump.

use crate::bitmap::Bitmap;
use crate::clock::Clock;
use crate::geometry::Rect;

use super::Widget;

/// A popup wrapper around another widget.
pub struct Popup {
    inner: Box<dyn Widget>,
    display_height: u32,
    duration_s: f64,
    popup_s: f64,
    clock: Clock,
    initialized: bool,
    popped: bool,
    end_at: f64,
    index: u32,
    image: Bitmap,
}

impl Popup {
    /// Wrap `inner`, showing a window `display_height` pixels tall.
    /// Defaults: rest 15 s at the top, 10 s at the bottom.
    pub fn new(inner: Box<dyn Widget>, display_height: u32, clock: Clock) -> Self {
        let image = inner.image().clone();
        Self {
            inner,
            display_height,
            duration_s: 15.0,
            popup_s: 10.0,
            clock,
            initialized: false,
            popped: false,
            end_at: 0.0,
            index: 0,
            image,
        }
    }

    /// Set how long the window rests at the top.
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_s = seconds;
        self
    }

    /// Set how long the window rests at the bottom (popped up).
    #[must_use]
    pub fn with_popup_duration(mut self, seconds: f64) -> Self {
        self.popup_s = seconds;
        self
    }

    /// The window crop at the current index. The last column is left
    /// off, matching the panel layouts this renderer grew up with.
    fn window(&self) -> Bitmap {
        let w = self.inner.size().width.saturating_sub(1);
        self.inner
            .image()
            .crop(Rect::new(0, self.index as i32, w, self.display_height))
    }
}

impl Widget for Popup {
    fn update(&mut self, _reset: bool) -> bool {
        let now = self.clock.now();
        if !self.initialized {
            self.initialized = true;
            self.popped = false;
            self.index = 0;
            self.end_at = now + self.duration_s;
        }

        self.inner.update(false);

        if now < self.end_at {
            self.image = self.window();
            return true;
        }

        if self.popped {
            if self.index > 0 {
                self.index -= 1;
            } else {
                self.popped = false;
                self.end_at = now + self.duration_s;
            }
        } else {
            let limit = self.inner.size().height.saturating_sub(self.display_height);
            if self.index < limit {
                self.index += 1;
            } else {
                self.popped = true;
                self.end_at = now + self.popup_s;
            }
        }

        self.image = self.window();
        true
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }
}
