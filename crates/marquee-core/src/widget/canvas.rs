//! Canvas: a composite widget painting children at fixed offsets.
//!
//! Children are shared handles and may appear in several canvases.
//! The canvas repaints only when a child reports a change (or on a
//! forced reset); children are placed in insertion order, so later
//! ones overwrite earlier ones where they overlap.

use crate::bitmap::Bitmap;
use crate::geometry::{Point, Rect, Size};

use super::{Widget, WidgetRef};

struct Child {
    widget: WidgetRef,
    at: Point,
    clip: Size,
}

/// A fixed-size composite widget.
pub struct Canvas {
    image: Bitmap,
    children: Vec<Child>,
}

impl Canvas {
    /// Create an empty canvas of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            image: Bitmap::new(size, false),
            children: Vec::new(),
        }
    }

    /// Add a child at `at`. A non-zero `clip` crops the child image to
    /// that size when placing; `(0, 0)` places the full image.
    ///
    /// Returns the canvas for chaining. The child is painted
    /// immediately.
    pub fn add(&mut self, widget: WidgetRef, at: Point, clip: Size) -> &mut Self {
        self.place(&widget, at, clip);
        self.children.push(Child { widget, at, clip });
        self
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Wipe the canvas to background.
    pub fn clear(&mut self) {
        self.image.clear();
    }

    fn place(&mut self, widget: &WidgetRef, at: Point, clip: Size) {
        let child = widget.borrow();
        if clip.width > 0 || clip.height > 0 {
            let cropped = child.image().crop(Rect::new(0, 0, clip.width, clip.height));
            self.image.paste(&cropped, at);
        } else {
            self.image.paste(child.image(), at);
        }
    }

    fn repaint(&mut self) {
        self.image.clear();
        for i in 0..self.children.len() {
            let (widget, at, clip) = {
                let c = &self.children[i];
                (c.widget.clone(), c.at, c.clip)
            };
            self.place(&widget, at, clip);
        }
    }
}

impl Widget for Canvas {
    fn update(&mut self, reset: bool) -> bool {
        let mut changed = reset;
        for child in &self.children {
            if child.widget.borrow_mut().update(reset) {
                changed = true;
            }
        }
        if changed {
            self.repaint();
        }
        changed
    }

    fn image(&self) -> &Bitmap {
        &self.image
    }

    /// The natural extent of a canvas is the element-wise maximum over
    /// its children's natural extents — a scroller wrapping the canvas
    /// needs to know about overflowing text inside it.
    fn natural_size(&self) -> Size {
        let mut natural = self.size();
        for child in &self.children {
            natural = natural.max(child.widget.borrow().natural_size());
        }
        natural
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::widget::shared;

    /// Test widget with a controllable change flag.
    struct Flip {
        image: Bitmap,
        dirty: bool,
        lit: bool,
    }

    impl Flip {
        fn new(size: Size) -> Self {
            let mut image = Bitmap::new(size, false);
            image.fill_rect(Rect::new(0, 0, size.width, size.height), true);
            Self {
                image,
                dirty: false,
                lit: true,
            }
        }
    }

    impl Widget for Flip {
        fn update(&mut self, reset: bool) -> bool {
            if self.dirty || reset {
                self.lit = !self.lit;
                let value = self.lit;
                self.image
                    .fill_rect(Rect::new(0, 0, self.image.width(), self.image.height()), value);
                self.dirty = false;
                return true;
            }
            false
        }

        fn image(&self) -> &Bitmap {
            &self.image
        }
    }

    #[test]
    fn children_paint_on_add() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        canvas.add(shared(Flip::new(Size::new(3, 3))), Point::new(2, 2), Size::new(0, 0));
        assert!(canvas.image().get(2, 2));
        assert!(canvas.image().get(4, 4));
        assert!(!canvas.image().get(6, 6));
    }

    #[test]
    fn clip_limits_the_child() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        canvas.add(shared(Flip::new(Size::new(5, 5))), Point::new(0, 0), Size::new(2, 2));
        assert!(canvas.image().get(1, 1));
        assert!(!canvas.image().get(3, 3));
    }

    #[test]
    fn unchanged_children_leave_canvas_alone() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        canvas.add(shared(Flip::new(Size::new(3, 3))), Point::new(0, 0), Size::new(0, 0));
        assert!(!canvas.update(false));
    }

    #[test]
    fn changed_child_forces_repaint() {
        let flip = shared(Flip::new(Size::new(3, 3)));
        let mut canvas = Canvas::new(Size::new(10, 10));
        canvas.add(flip.clone(), Point::new(0, 0), Size::new(0, 0));
        assert!(canvas.image().get(0, 0));
        // Child goes dark on forced update.
        assert!(canvas.update(true));
        assert!(!canvas.image().get(0, 0));
    }

    #[test]
    fn reset_repaints_even_without_changes() {
        let mut canvas = Canvas::new(Size::new(4, 4));
        assert!(canvas.update(true));
        assert!(!canvas.update(false));
    }

    #[test]
    fn later_children_overwrite_earlier() {
        // A lit child covered by a dark child at the same spot.
        struct Dark(Bitmap);
        impl Widget for Dark {
            fn update(&mut self, _reset: bool) -> bool {
                false
            }
            fn image(&self) -> &Bitmap {
                &self.0
            }
        }
        let mut canvas = Canvas::new(Size::new(4, 4));
        canvas.add(shared(Flip::new(Size::new(4, 4))), Point::new(0, 0), Size::new(0, 0));
        canvas.add(
            shared(Dark(Bitmap::new(Size::new(4, 4), false))),
            Point::new(0, 0),
            Size::new(0, 0),
        );
        assert!(!canvas.image().get(1, 1));
    }

    #[test]
    fn shared_child_appears_in_two_canvases() {
        let flip = shared(Flip::new(Size::new(2, 2)));
        let mut a = Canvas::new(Size::new(4, 4));
        let mut b = Canvas::new(Size::new(4, 4));
        a.add(flip.clone(), Point::new(0, 0), Size::new(0, 0));
        b.add(flip.clone(), Point::new(2, 2), Size::new(0, 0));
        assert!(a.image().get(0, 0));
        assert!(b.image().get(2, 2));
    }

    #[test]
    fn canvas_size_is_declared_size() {
        let mut canvas = Canvas::new(Size::new(6, 6));
        canvas.add(shared(Flip::new(Size::new(20, 20))), Point::new(0, 0), Size::new(0, 0));
        // Oversized children are clipped by the paste.
        assert_eq!(canvas.size(), Size::new(6, 6));
    }
}
