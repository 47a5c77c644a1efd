//! Display controller: multiplexes sequences onto one framebuffer.
//!
//! Each tick, every sequence is polled in declaration order; the
//! widgets of the active ones are composed into a single image (later
//! sequences paint over earlier ones where they overlap) and the
//! result is cropped to the panel. A sequence that displays has its
//! cool-down armed here — on display, not on activation.

use crate::bitmap::Bitmap;
use crate::clock::Clock;
use crate::geometry::{Point, Rect, Size};
use crate::sequence::Sequence;
use crate::vars::VarStore;
use crate::widget::WidgetRef;

/// The top-level render driver.
pub struct DisplayController {
    sequences: Vec<Sequence>,
    panel: Size,
    db: VarStore,
    dbp: VarStore,
    clock: Clock,
}

impl DisplayController {
    /// Create a controller for a panel of the given size.
    pub fn new(panel: Size, db: VarStore, dbp: VarStore, clock: Clock) -> Self {
        Self {
            sequences: Vec::new(),
            panel,
            db,
            dbp,
            clock,
        }
    }

    /// Append a sequence. Declaration order is compose order.
    pub fn add_sequence(&mut self, sequence: Sequence) {
        self.sequences.push(sequence);
    }

    /// Number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// The live variable store.
    pub fn vars(&self) -> &VarStore {
        &self.db
    }

    /// The previous-tick variable store.
    pub fn prev_vars(&self) -> &VarStore {
        &self.dbp
    }

    /// The panel size the output is cropped to.
    pub fn panel(&self) -> Size {
        self.panel
    }

    /// Produce the next frame, or `None` when no sequence is active.
    pub fn next(&mut self) -> Option<Bitmap> {
        let now = self.clock.now();
        let mut active: Vec<(WidgetRef, Point)> = Vec::new();
        for seq in &mut self.sequences {
            if let Some(widget) = seq.get(false) {
                seq.arm_cooling(now);
                active.push((widget, seq.coordinates()));
            }
        }

        let mut img: Option<Bitmap> = None;
        for (widget, at) in active {
            let widget = widget.borrow();
            let wsize = widget.size();
            let needed = Size::new(
                at.x.max(0) as u32 + wsize.width,
                at.y.max(0) as u32 + wsize.height,
            );
            let mut canvas = match img {
                Some(existing) => {
                    let grown = existing.size().max(needed);
                    if grown == existing.size() {
                        existing
                    } else {
                        let mut bigger = Bitmap::new(grown, false);
                        bigger.paste(&existing, Point::new(0, 0));
                        bigger
                    }
                }
                None => Bitmap::new(needed, false),
            };
            canvas.paste(widget.image(), at);
            img = Some(canvas);
        }

        // The crop keeps one extra column and row past the panel; the
        // frame packer downstream expects that inclusive bound.
        img.map(|i| {
            i.crop(Rect::new(
                0,
                0,
                self.panel.width + 1,
                self.panel.height + 1,
            ))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conditional::Conditional;
    use crate::widget::{shared, Widget, WidgetRef};

    struct Solid {
        image: Bitmap,
    }

    impl Solid {
        fn handle(size: Size) -> WidgetRef {
            shared(Self {
                image: Bitmap::new(size, true),
            })
        }
    }

    impl Widget for Solid {
        fn update(&mut self, _reset: bool) -> bool {
            false
        }
        fn image(&self) -> &Bitmap {
            &self.image
        }
    }

    fn controller(panel: Size) -> (DisplayController, Clock) {
        let clock = Clock::manual();
        clock.set(1.0);
        let db = VarStore::new();
        let dbp = VarStore::new();
        let dc = DisplayController::new(panel, db, dbp, clock.clone());
        (dc, clock)
    }

    fn open_sequence(dc: &DisplayController, clock: &Clock, cooling: f64) -> Sequence {
        Sequence::new(
            Conditional::always(),
            dc.vars().clone(),
            dc.prev_vars().clone(),
            cooling,
            0.0,
            Point::new(0, 0),
            clock.clone(),
        )
    }

    #[test]
    fn no_sequences_no_frame() {
        let (mut dc, _clock) = controller(Size::new(100, 16));
        assert!(dc.next().is_none());
    }

    #[test]
    fn single_sequence_composes_and_crops() {
        let (mut dc, clock) = controller(Size::new(100, 16));
        let mut seq = open_sequence(&dc, &clock, 0.0);
        seq.add(Solid::handle(Size::new(200, 40)), 1.0, Conditional::always());
        dc.add_sequence(seq);
        let frame = dc.next().unwrap();
        // Inclusive crop: one extra column and row.
        assert_eq!(frame.size(), Size::new(101, 17));
        assert!(frame.get(0, 0));
    }

    #[test]
    fn small_widget_pads_to_panel() {
        let (mut dc, clock) = controller(Size::new(100, 16));
        let mut seq = open_sequence(&dc, &clock, 0.0);
        seq.add(Solid::handle(Size::new(10, 4)), 1.0, Conditional::always());
        dc.add_sequence(seq);
        let frame = dc.next().unwrap();
        // The inclusive crop pads a small composition to panel size.
        assert_eq!(frame.size(), Size::new(101, 17));
        assert!(frame.get(9, 3));
        assert!(!frame.get(10, 4));
    }

    #[test]
    fn later_sequences_overwrite_earlier() {
        struct Dark(Bitmap);
        impl Widget for Dark {
            fn update(&mut self, _reset: bool) -> bool {
                false
            }
            fn image(&self) -> &Bitmap {
                &self.0
            }
        }

        let (mut dc, clock) = controller(Size::new(20, 8));
        let mut lit = open_sequence(&dc, &clock, 0.0);
        lit.add(Solid::handle(Size::new(8, 8)), 1.0, Conditional::always());
        let mut dark = open_sequence(&dc, &clock, 0.0);
        dark.add(
            shared(Dark(Bitmap::new(Size::new(4, 4), false))),
            1.0,
            Conditional::always(),
        );
        dc.add_sequence(lit);
        dc.add_sequence(dark);
        let frame = dc.next().unwrap();
        // The dark sequence painted over the lit one's corner.
        assert!(!frame.get(0, 0));
        assert!(frame.get(5, 5));
    }

    #[test]
    fn coordinates_offset_the_paste() {
        let (mut dc, clock) = controller(Size::new(20, 8));
        let mut seq = Sequence::new(
            Conditional::always(),
            dc.vars().clone(),
            dc.prev_vars().clone(),
            0.0,
            0.0,
            Point::new(6, 2),
            clock.clone(),
        );
        seq.add(Solid::handle(Size::new(4, 4)), 1.0, Conditional::always());
        dc.add_sequence(seq);
        let frame = dc.next().unwrap();
        assert!(!frame.get(0, 0));
        assert!(frame.get(6, 2));
        assert!(frame.get(9, 5));
        assert!(!frame.get(10, 6));
        assert_eq!(frame.size(), Size::new(21, 9));
    }

    #[test]
    fn display_arms_the_cooldown() {
        let (mut dc, clock) = controller(Size::new(20, 8));
        let mut seq = open_sequence(&dc, &clock, 5.0);
        seq.add(Solid::handle(Size::new(4, 4)), 1.0, Conditional::always());
        dc.add_sequence(seq);
        assert!(dc.next().is_some());
        // Within the item duration the sequence is still current, but
        // once it expires the cool-down keeps the panel dark.
        clock.advance(2.0);
        assert!(dc.next().is_none());
        clock.advance(4.5);
        assert!(dc.next().is_some());
    }

    #[test]
    fn two_sequences_cool_independently() {
        let (mut dc, clock) = controller(Size::new(100, 16));
        for _ in 0..2 {
            let mut seq = open_sequence(&dc, &clock, 5.0);
            seq.add(Solid::handle(Size::new(4, 4)), 1.0, Conditional::always());
            dc.add_sequence(seq);
        }
        assert!(dc.next().is_some());
        clock.advance(2.0);
        // Both armed at t=1; both expired their 1 s item and are now
        // cooling until t=6.
        assert!(dc.next().is_none());
        clock.advance(4.0);
        assert!(dc.next().is_some());
    }
}
