//! Progress bars: the plain track style and the image-masked fill.
//!
//! Value and range endpoints may each be a numeric literal or the name
//! of a store variable; referenced names are captured so `update` can
//! skip re-rendering while none of them move.

use std::collections::HashMap;

use tracing::debug;

use crate::bitmap::Bitmap;
use crate::geometry::{Point, Rect, Size};
use crate::vars::{Value, VarStore};

use super::{Direction, Widget};

/// Visual style of a [`ProgressBar`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarStyle {
    /// Straight track with square end caps.
    #[default]
    Square,
    /// Declared for pages that ask for rounded ends; the track geometry
    /// is shared with [`BarStyle::Square`].
    Rounded,
}

/// A bar endpoint: either a literal number or a variable reference.
#[derive(Clone, Debug, PartialEq)]
pub enum Endpoint {
    /// A fixed number.
    Literal(f64),
    /// The name of a store variable holding the number.
    Var(String),
}

impl Endpoint {
    /// The referenced variable name, when present in `vars`.
    fn tracked_name(&self, vars: &VarStore) -> Option<String> {
        match self {
            Endpoint::Var(name) if vars.contains(name) => Some(name.clone()),
            _ => None,
        }
    }

    /// Current numeric value; a missing or non-numeric variable is 0.
    fn resolve(&self, vars: &VarStore) -> f64 {
        match self {
            Endpoint::Literal(v) => *v,
            Endpoint::Var(name) => vars
                .get(name)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
        }
    }
}

impl From<f64> for Endpoint {
    fn from(v: f64) -> Self {
        Endpoint::Literal(v)
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        Endpoint::Var(name.to_string())
    }
}

/// Normalize value and range: swap an inverted range, clamp an
/// out-of-range value to the low end, and produce the fill fraction.
fn percent(value: f64, low: f64, high: f64) -> f64 {
    let (low, high) = if high < low { (high, low) } else { (low, high) };
    let mut v = value;
    if v < low || v > high {
        debug!(value = v, low, high, "progress value out of range, clamping");
        v = low;
    }
    if high == low {
        debug!(low, high, "degenerate progress range");
        return 0.0;
    }
    (v - low) / (high - low)
}

/// Snapshot the tracked variables of a bar.
fn snapshot_tracked(tracked: &[String], vars: &VarStore) -> HashMap<String, Value> {
    let mut snapshot = HashMap::new();
    for name in tracked {
        if let Some(value) = vars.get(name) {
            snapshot.insert(name.clone(), value);
        }
    }
    snapshot
}

fn tracked_changed(
    tracked: &[String],
    snapshot: &HashMap<String, Value>,
    vars: &VarStore,
) -> bool {
    for name in tracked {
        match (vars.get(name), snapshot.get(name)) {
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

/// The plain progress bar.
pub struct ProgressBar {
    value: Endpoint,
    low: Endpoint,
    high: Endpoint,
    size: Size,
    style: BarStyle,
    vars: VarStore,
    tracked: Vec<String>,
    snapshot: HashMap<String, Value>,
    image: Bitmap,
}

impl ProgressBar {
    /// Build the bar and render it once. The snapshot starts empty, so
    /// the first `update` re-renders and reports a change.
    pub fn new(
        value: Endpoint,
        low: Endpoint,
        high: Endpoint,
        size: Size,
        style: BarStyle,
        vars: VarStore,
    ) -> Self {
        let tracked = [&value, &low, &high]
            .into_iter()
            .filter_map(|e| e.tracked_name(&vars))
            .collect();
        let mut bar = Self {
            value,
            low,
            high,
            size,
            style,
            vars,
            tracked,
            snapshot: HashMap::new(),
            image: Bitmap::new(size, false),
        };
        bar.render();
        bar
    }

    fn render(&mut self) {
        let p = percent(
            self.value.resolve(&self.vars),
            self.low.resolve(&self.vars),
            self.high.resolve(&self.vars),
        );
        let Size { width, height } = self.size;
        let mut image = Bitmap::new(self.size, false);

        match self.style {
            // Rounded pages share the square track geometry.
            BarStyle::Square | BarStyle::Rounded => {
                if height > 2 {
                    let w = width as i32;
                    let h = height as i32;
                    image.line(Point::new(0, 0), Point::new(0, h - 1), true);
                    let filled = ((width.saturating_sub(2)) as f64 * p) as i32;
                    for i in 0..filled {
                        image.line(Point::new(i + 1, 0), Point::new(i + 1, h - 1), true);
                    }
                    // The unfilled part of the track keeps its top and
                    // bottom rails.
                    for i in filled..width.saturating_sub(2) as i32 {
                        image.put(i + 1, 0, true);
                        image.put(i + 1, h - 1, true);
                    }
                    image.line(Point::new(w - 1, 0), Point::new(w - 1, h - 1), true);
                } else {
                    let filled = (width as f64 * p) as i32;
                    for i in 0..filled {
                        image.line(
                            Point::new(i, 0),
                            Point::new(i, height.saturating_sub(1) as i32),
                            true,
                        );
                    }
                }
            }
        }
        self.image = image;
    }
}

impl Widget for ProgressBar {
    fn update(&mut self, _reset: bool) -> bool {
        if !tracked_changed(&self.tracked, &self.snapshot, &self.vars) {
            return false;
        }
        self.snapshot = snapshot_tracked(&self.tracked, &self.vars);
        self.render();
        true
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }
}

/// A progress bar whose shape comes from a mask image.
///
/// A solid rectangle sized by the fill fraction is laid down first and
/// the mask artwork is OR-composited over it, so the mask stays visible
/// at every fill level.
pub struct ProgressImageBar {
    mask: Bitmap,
    value: Endpoint,
    low: Endpoint,
    high: Endpoint,
    direction: Direction,
    vars: VarStore,
    tracked: Vec<String>,
    snapshot: HashMap<String, Value>,
    image: Bitmap,
}

impl ProgressImageBar {
    /// Build the bar and render it once.
    pub fn new(
        mask: Bitmap,
        value: Endpoint,
        low: Endpoint,
        high: Endpoint,
        direction: Direction,
        vars: VarStore,
    ) -> Self {
        let tracked = [&value, &low, &high]
            .into_iter()
            .filter_map(|e| e.tracked_name(&vars))
            .collect();
        let image = Bitmap::new(mask.size(), false);
        let mut bar = Self {
            mask,
            value,
            low,
            high,
            direction,
            vars,
            tracked,
            snapshot: HashMap::new(),
            image,
        };
        bar.render();
        bar
    }

    fn render(&mut self) {
        let p = percent(
            self.value.resolve(&self.vars),
            self.low.resolve(&self.vars),
            self.high.resolve(&self.vars),
        );
        let Size { width, height } = self.mask.size();
        let (fill_w, fill_h) = if self.direction.is_horizontal() {
            ((width as f64 * p) as u32, height)
        } else {
            (width, (height as f64 * p) as u32)
        };
        let at = match self.direction {
            Direction::Right => Point::new(width as i32 - fill_w as i32, 0),
            Direction::Up => Point::new(0, height as i32 - fill_h as i32),
            Direction::Left | Direction::Down => Point::new(0, 0),
        };

        let mut image = Bitmap::new(self.mask.size(), false);
        image.fill_rect(Rect::new(at.x, at.y, fill_w, fill_h), true);
        image.paste_or(&self.mask, Point::new(0, 0));
        self.image = image;
    }
}

impl Widget for ProgressImageBar {
    fn update(&mut self, _reset: bool) -> bool {
        if tracked_changed(&self.tracked, &self.snapshot, &self.vars) {
            self.snapshot = snapshot_tracked(&self.tracked, &self.vars);
            self.render();
        }
        // Always reported as changed: a containing canvas repaints the
        // bar every tick.
        true
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bar(value: f64, size: Size) -> ProgressBar {
        ProgressBar::new(
            Endpoint::Literal(value),
            Endpoint::Literal(0.0),
            Endpoint::Literal(100.0),
            size,
            BarStyle::Square,
            VarStore::new(),
        )
    }

    #[test]
    fn half_full_track_geometry() {
        let b = bar(50.0, Size::new(10, 4));
        let img = b.image();
        // End caps fully lit.
        for y in 0..4 {
            assert!(img.get(0, y));
            assert!(img.get(9, y));
        }
        // Filled columns 1..=4.
        for x in 1..=4 {
            for y in 0..4 {
                assert!(img.get(x, y), "({x},{y}) should be filled");
            }
        }
        // Hollow track columns 5..=8: rails only.
        for x in 5..=8 {
            assert!(img.get(x, 0));
            assert!(img.get(x, 3));
            assert!(!img.get(x, 1));
            assert!(!img.get(x, 2));
        }
    }

    #[test]
    fn empty_and_full() {
        let empty = bar(0.0, Size::new(10, 4));
        assert!(!empty.image().get(1, 1));
        let full = bar(100.0, Size::new(10, 4));
        for x in 1..=8 {
            assert!(full.image().get(x, 1));
        }
    }

    #[test]
    fn short_bar_uses_simple_fill() {
        let b = bar(50.0, Size::new(10, 2));
        let img = b.image();
        for x in 0..5 {
            assert!(img.get(x, 0));
            assert!(img.get(x, 1));
        }
        for x in 5..10 {
            assert!(!img.get(x, 0));
        }
    }

    #[test]
    fn out_of_range_clamps_to_low() {
        let b = bar(150.0, Size::new(10, 4));
        // Clamped to empty.
        assert!(!b.image().get(1, 1));
    }

    #[test]
    fn inverted_range_is_swapped() {
        let b = ProgressBar::new(
            Endpoint::Literal(50.0),
            Endpoint::Literal(100.0),
            Endpoint::Literal(0.0),
            Size::new(10, 4),
            BarStyle::Square,
            VarStore::new(),
        );
        assert!(b.image().get(1, 1));
    }

    #[test]
    fn degenerate_range_renders_empty() {
        let b = ProgressBar::new(
            Endpoint::Literal(5.0),
            Endpoint::Literal(5.0),
            Endpoint::Literal(5.0),
            Size::new(10, 4),
            BarStyle::Square,
            VarStore::new(),
        );
        assert!(!b.image().get(1, 1));
    }

    #[test]
    fn variable_endpoints_drive_updates() {
        let vars = VarStore::new();
        vars.set("weight", 423i64);
        let mut b = ProgressBar::new(
            Endpoint::Var("weight".into()),
            Endpoint::Literal(0.0),
            Endpoint::Literal(846.0),
            Size::new(10, 4),
            BarStyle::Square,
            vars.clone(),
        );
        assert!(b.update(false));
        assert!(!b.update(false));
        vars.set("weight", 100i64);
        assert!(b.update(false));
        assert!(!b.update(false));
    }

    #[test]
    fn missing_variable_reads_zero() {
        let b = ProgressBar::new(
            Endpoint::Var("ghost".into()),
            Endpoint::Literal(0.0),
            Endpoint::Literal(100.0),
            Size::new(10, 4),
            BarStyle::Square,
            VarStore::new(),
        );
        assert!(!b.image().get(1, 1));
    }

    fn cross_mask() -> Bitmap {
        let mut mask = Bitmap::new(Size::new(8, 8), false);
        mask.line(Point::new(0, 4), Point::new(7, 4), true);
        mask.line(Point::new(4, 0), Point::new(4, 7), true);
        mask
    }

    #[test]
    fn image_bar_left_fill() {
        let b = ProgressImageBar::new(
            cross_mask(),
            Endpoint::Literal(50.0),
            Endpoint::Literal(0.0),
            Endpoint::Literal(100.0),
            Direction::Left,
            VarStore::new(),
        );
        let img = b.image();
        // Left half solid, right half shows only the mask artwork.
        assert!(img.get(0, 0));
        assert!(img.get(3, 7));
        assert!(!img.get(7, 0));
        assert!(img.get(7, 4));
    }

    #[test]
    fn image_bar_right_fill_anchors_right() {
        let b = ProgressImageBar::new(
            cross_mask(),
            Endpoint::Literal(25.0),
            Endpoint::Literal(0.0),
            Endpoint::Literal(100.0),
            Direction::Right,
            VarStore::new(),
        );
        let img = b.image();
        assert!(img.get(7, 0));
        assert!(img.get(6, 7));
        assert!(!img.get(0, 0));
    }

    #[test]
    fn image_bar_up_fill_anchors_bottom() {
        let b = ProgressImageBar::new(
            cross_mask(),
            Endpoint::Literal(50.0),
            Endpoint::Literal(0.0),
            Endpoint::Literal(100.0),
            Direction::Up,
            VarStore::new(),
        );
        let img = b.image();
        assert!(img.get(0, 7));
        assert!(!img.get(0, 0));
    }

    #[test]
    fn image_bar_mask_always_visible() {
        let b = ProgressImageBar::new(
            cross_mask(),
            Endpoint::Literal(0.0),
            Endpoint::Literal(0.0),
            Endpoint::Literal(100.0),
            Direction::Left,
            VarStore::new(),
        );
        // Zero fill: the artwork alone.
        assert!(b.image().get(4, 0));
        assert!(b.image().get(0, 4));
        assert!(!b.image().get(0, 0));
    }

    #[test]
    fn image_bar_updates_every_tick() {
        let mut b = ProgressImageBar::new(
            cross_mask(),
            Endpoint::Literal(10.0),
            Endpoint::Literal(0.0),
            Endpoint::Literal(100.0),
            Direction::Left,
            VarStore::new(),
        );
        assert!(b.update(false));
        assert!(b.update(false));
    }

}
