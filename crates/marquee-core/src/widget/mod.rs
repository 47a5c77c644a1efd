//! The widget contract and built-in widgets.
//!
//! Every visual element — leaf, canvas, or animation wrapper — exposes
//! the same three things: an `update` that refreshes content and says
//! whether anything changed, the current `image`, and its sizes. The
//! sequence and controller layers drive widgets purely through this
//! contract.

pub mod canvas;
pub mod popup;
pub mod progress;
pub mod scroll;
pub mod shapes;
pub mod text;

pub use canvas::Canvas;
pub use popup::Popup;
pub use progress::{BarStyle, Endpoint, ProgressBar, ProgressImageBar};
pub use scroll::{Hesitate, Scroll};
pub use shapes::{LineWidget, RectangleWidget};
pub use text::{Justify, Text};

use std::cell::RefCell;
use std::rc::Rc;

use crate::bitmap::Bitmap;
use crate::geometry::Size;

/// A scroll or fill direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Towards negative x.
    #[default]
    Left,
    /// Towards positive x.
    Right,
    /// Towards negative y.
    Up,
    /// Towards positive y.
    Down,
}

impl Direction {
    /// Whether this direction runs along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// A visual element that renders into a private bitmap.
pub trait Widget {
    /// Refresh content from the variable store. Returns true when the
    /// image changed (or `reset` forced a repaint).
    fn update(&mut self, reset: bool) -> bool;

    /// The current render. Its size always equals [`Widget::size`].
    fn image(&self) -> &Bitmap;

    /// The reported size — by contract, `image().size()`.
    fn size(&self) -> Size {
        self.image().size()
    }

    /// The pre-crop natural size. Differs from [`Widget::size`] only
    /// for text widgets whose content overflows a fixed frame; scroll
    /// wrappers use it to decide whether scrolling is needed.
    fn natural_size(&self) -> Size {
        self.size()
    }
}

/// A shared handle to a widget.
///
/// Children may appear in several canvases at once; a sequence and a
/// canvas may reference the same widget. Handles are single-threaded
/// (`Rc`), matching the engine's cooperative model.
pub type WidgetRef = Rc<RefCell<Box<dyn Widget>>>;

/// Wrap a widget in a shared handle.
pub fn shared(widget: impl Widget + 'static) -> WidgetRef {
    shared_boxed(Box::new(widget))
}

/// Wrap an already-boxed widget in a shared handle.
pub fn shared_boxed(widget: Box<dyn Widget>) -> WidgetRef {
    Rc::new(RefCell::new(widget))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    /// A mock widget for exercising the trait contract.
    struct MockWidget {
        image: Bitmap,
        updates: u32,
    }

    impl MockWidget {
        fn new(size: Size) -> Self {
            Self {
                image: Bitmap::new(size, false),
                updates: 0,
            }
        }
    }

    impl Widget for MockWidget {
        fn update(&mut self, reset: bool) -> bool {
            self.updates += 1;
            if reset {
                self.image.put(0, 0, true);
            }
            reset
        }

        fn image(&self) -> &Bitmap {
            &self.image
        }
    }

    #[test]
    fn size_tracks_image() {
        let w = MockWidget::new(Size::new(12, 7));
        assert_eq!(w.size(), Size::new(12, 7));
        assert_eq!(w.natural_size(), Size::new(12, 7));
    }

    #[test]
    fn shared_handle_is_cloneable() {
        let handle = shared(MockWidget::new(Size::new(4, 4)));
        let other = handle.clone();
        assert!(other.borrow_mut().update(true));
        assert!(handle.borrow().image().get(0, 0));
    }

    #[test]
    fn direction_axis() {
        assert!(Direction::Left.is_horizontal());
        assert!(Direction::Right.is_horizontal());
        assert!(!Direction::Up.is_horizontal());
        assert!(!Direction::Down.is_horizontal());
    }

    #[test]
    fn boxed_widgets_go_through_the_same_contract() {
        let boxed: Box<dyn Widget> = Box::new(MockWidget::new(Size::new(2, 2)));
        let handle = shared_boxed(boxed);
        handle.borrow_mut().update(false);
        assert_eq!(handle.borrow().size(), Size::new(2, 2));
    }
}
