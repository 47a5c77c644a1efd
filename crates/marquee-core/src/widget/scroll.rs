//! Scroll effect: wraps a widget and slides it past a window.
//!
//! When the inner widget overflows the threshold along the scroll
//! axis, the backing image is the inner image extended by `gap`, and
//! every non-hesitating tick shifts it by `distance` pixels with a
//! wrap: the leading slab is cut off and pasted back at the trailing
//! edge. The `gap` travels with the content, so the ring closes
//! seamlessly after `(inner + gap) / distance` shifts.

use crate::bitmap::Bitmap;
use crate::clock::Clock;
use crate::geometry::{Point, Rect, Size};

use super::{Direction, Widget};

/// When the scroller pauses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hesitate {
    /// Never pause.
    None,
    /// Pause once before the first shift.
    OnStart,
    /// Pause at the start and again every time the ring closes.
    #[default]
    OnLoop,
}

/// A scrolling wrapper around another widget.
pub struct Scroll {
    inner: Box<dyn Widget>,
    direction: Direction,
    distance: u32,
    gap: u32,
    hesitate: Hesitate,
    hesitate_s: f64,
    threshold: u32,
    clock: Clock,
    initialized: bool,
    end_at: f64,
    index: u32,
    should_scroll: bool,
    image: Bitmap,
}

impl Scroll {
    /// Wrap `inner`. Defaults: scroll left, 1 px per tick, 20 px gap,
    /// 2 s hesitation on every loop, threshold 0.
    pub fn new(inner: Box<dyn Widget>, clock: Clock) -> Self {
        let image = inner.image().clone();
        Self {
            inner,
            direction: Direction::Left,
            distance: 1,
            gap: 20,
            hesitate: Hesitate::OnLoop,
            hesitate_s: 2.0,
            threshold: 0,
            clock,
            initialized: false,
            end_at: 0.0,
            index: 0,
            should_scroll: false,
            image,
        }
    }

    /// Set the scroll direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the per-tick shift distance in pixels.
    #[must_use]
    pub fn with_distance(mut self, distance: u32) -> Self {
        self.distance = distance.max(1);
        self
    }

    /// Set the gap between the content's tail and its wrapped head.
    #[must_use]
    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Set the hesitation mode and duration.
    #[must_use]
    pub fn with_hesitate(mut self, hesitate: Hesitate, seconds: f64) -> Self {
        self.hesitate = hesitate;
        self.hesitate_s = seconds;
        self
    }

    /// Scroll only if the inner widget exceeds `threshold` pixels along
    /// the scroll axis.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    fn restart_hesitation(&mut self, now: f64) {
        self.end_at = match self.hesitate {
            Hesitate::OnStart | Hesitate::OnLoop => now + self.hesitate_s,
            Hesitate::None => 0.0,
        };
    }

    /// Decide whether to scroll and rebuild the backing image.
    fn rebuild(&mut self) {
        self.index = 0;
        let size = self.inner.size();
        let natural = self.inner.natural_size();
        let overflow = if self.direction.is_horizontal() {
            size.width.max(natural.width)
        } else {
            size.height.max(natural.height)
        };
        self.should_scroll = overflow > self.threshold;

        if self.should_scroll {
            let backing = if self.direction.is_horizontal() {
                Size::new(size.width + self.gap, size.height)
            } else {
                Size::new(size.width, size.height + self.gap)
            };
            let mut image = Bitmap::new(backing, false);
            image.paste(self.inner.image(), Point::new(0, 0));
            self.image = image;
        } else {
            self.image = self.inner.image().clone();
        }
    }

    /// Shift the ring by one step, wrapping the leading slab to the
    /// trailing edge. Oversized distances clamp to one full revolution
    /// so a stalled caller cannot corrupt the ring.
    fn shift(&mut self) {
        let w = self.image.width();
        let h = self.image.height();
        let axis = if self.direction.is_horizontal() { w } else { h };
        if axis == 0 {
            return;
        }
        let d = self.distance.min(axis);
        let (region, body, body_at, region_at) = match self.direction {
            Direction::Left => (
                Rect::new(0, 0, d, h),
                Rect::new(d as i32, 0, w - d, h),
                Point::new(0, 0),
                Point::new((w - d) as i32, 0),
            ),
            Direction::Right => (
                Rect::new((w - d) as i32, 0, d, h),
                Rect::new(0, 0, w - d, h),
                Point::new(d as i32, 0),
                Point::new(0, 0),
            ),
            Direction::Up => (
                Rect::new(0, 0, w, d),
                Rect::new(0, d as i32, w, h - d),
                Point::new(0, 0),
                Point::new(0, (h - d) as i32),
            ),
            Direction::Down => (
                Rect::new(0, (h - d) as i32, w, d),
                Rect::new(0, 0, w, h - d),
                Point::new(0, d as i32),
                Point::new(0, 0),
            ),
        };
        let slab = self.image.crop(region);
        let rest = self.image.crop(body);
        self.image.paste(&rest, body_at);
        self.image.paste(&slab, region_at);
    }
}

impl Widget for Scroll {
    fn update(&mut self, reset: bool) -> bool {
        let now = self.clock.now();
        let mut changed = false;

        if !self.initialized {
            self.initialized = true;
            changed = true;
            self.restart_hesitation(now);
            self.rebuild();
        }

        if self.inner.update(reset) || reset {
            changed = true;
            self.restart_hesitation(now);
            self.rebuild();
        }

        if now < self.end_at || !self.should_scroll {
            return changed;
        }

        self.shift();
        self.index += self.distance;
        let axis = if self.direction.is_horizontal() {
            self.image.width()
        } else {
            self.image.height()
        };
        if self.index >= axis {
            self.index = 0;
            if self.hesitate == Hesitate::OnLoop {
                self.restart_hesitation(now);
            }
        }
        true
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }
}
