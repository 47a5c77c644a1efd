//! Sequence: a conditionally-gated carousel of widgets.
//!
//! Each tick the controller asks every sequence for its active widget.
//! A sequence answers only while its conditional holds and it is not
//! cooling down; once it answers, it stays answerable for at least its
//! minimum-active time even if the conditional flips mid-display.
//! Items rotate on their own durations, skipping entries whose own
//! conditional is false.

use tracing::debug;

use crate::clock::Clock;
use crate::conditional::Conditional;
use crate::geometry::Point;
use crate::vars::VarStore;
use crate::widget::WidgetRef;

struct Item {
    widget: WidgetRef,
    duration: f64,
    conditional: Conditional,
}

/// An ordered, gated carousel of widgets.
pub struct Sequence {
    items: Vec<Item>,
    conditional: Conditional,
    cooling_period: f64,
    minimum_active: f64,
    coordinates: Point,
    db: VarStore,
    dbp: VarStore,
    clock: Clock,
    current: usize,
    item_end: f64,
    cooling_until: f64,
    pinned_until: f64,
}

impl Sequence {
    /// Create an empty sequence.
    ///
    /// `conditional` gates the whole sequence; `cooling_period` keeps
    /// it off the panel for that long after it displays;
    /// `minimum_active` keeps it on for at least that long once shown;
    /// `coordinates` offset its widgets when the controller composes.
    pub fn new(
        conditional: Conditional,
        db: VarStore,
        dbp: VarStore,
        cooling_period: f64,
        minimum_active: f64,
        coordinates: Point,
        clock: Clock,
    ) -> Self {
        Self {
            items: Vec::new(),
            conditional,
            cooling_period,
            minimum_active,
            coordinates,
            db,
            dbp,
            clock,
            current: 0,
            item_end: 0.0,
            cooling_until: 0.0,
            pinned_until: 0.0,
        }
    }

    /// Append a widget with its display duration and item conditional.
    pub fn add(&mut self, widget: WidgetRef, duration: f64, conditional: Conditional) {
        if self.items.is_empty() {
            self.item_end = self.clock.now() + duration;
        }
        self.items.push(Item {
            widget,
            duration,
            conditional,
        });
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The compose offset for this sequence's widgets.
    pub fn coordinates(&self) -> Point {
        self.coordinates
    }

    /// When the current cool-down expires.
    pub fn cooling_until(&self) -> f64 {
        self.cooling_until
    }

    /// Arm the cool-down unless one is already running. The controller
    /// calls this when the sequence actually displays.
    pub(crate) fn arm_cooling(&mut self, now: f64) {
        if self.cooling_until <= now {
            self.cooling_until = now + self.cooling_period;
        }
    }

    /// Return the currently active widget, or `None` while the
    /// sequence is gated off.
    ///
    /// `restart` rewinds to the first item and clears the cool-down.
    pub fn get(&mut self, restart: bool) -> Option<WidgetRef> {
        let now = self.clock.now();

        // While pinned active, the gates are skipped entirely.
        if self.pinned_until < now
            && (!self.conditional.eval(&self.db, &self.dbp) || self.cooling_until > now)
        {
            return None;
        }

        if self.pinned_until < now {
            self.pinned_until = now + self.minimum_active;
        }

        if self.items.is_empty() {
            return None;
        }

        if restart {
            self.current = 0;
            self.cooling_until = 0.0;
            self.item_end = now + self.items[0].duration;
        }

        let item = &self.items[self.current];
        if self.item_end < now || !item.conditional.eval(&self.db, &self.dbp) {
            // Expired or gated: advance circularly to the next live item.
            self.current = (self.current + 1) % self.items.len();
            for _ in 0..self.items.len() {
                let item = &self.items[self.current];
                if item.conditional.eval(&self.db, &self.dbp) {
                    self.item_end = now + item.duration;
                    let widget = item.widget.clone();
                    widget.borrow_mut().update(true);
                    return Some(widget);
                }
                self.current = (self.current + 1) % self.items.len();
            }
            debug!("no item in the sequence is currently active");
            return None;
        }

        let widget = item.widget.clone();
        widget.borrow_mut().update(false);
        Some(widget)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::geometry::Size;
    use crate::widget::{shared, Widget, WidgetRef};

    struct Dummy {
        image: Bitmap,
        resets: u32,
    }

    impl Dummy {
        fn handle(tag: u32) -> WidgetRef {
            shared(Self {
                image: Bitmap::new(Size::new(tag, 1), false),
                resets: 0,
            })
        }
    }

    impl Widget for Dummy {
        fn update(&mut self, reset: bool) -> bool {
            if reset {
                self.resets += 1;
            }
            reset
        }
        fn image(&self) -> &Bitmap {
            &self.image
        }
    }

    /// Build a wide-open sequence. The clock starts at t = 1 — a
    /// sequence born at the exact epoch is indistinguishable from one
    /// whose timers never ran, which no real clock produces.
    fn sequence(clock: &Clock) -> (Sequence, VarStore, VarStore) {
        clock.set(1.0);
        let db = VarStore::new();
        let dbp = VarStore::new();
        let seq = Sequence::new(
            Conditional::always(),
            db.clone(),
            dbp.clone(),
            0.0,
            0.0,
            Point::new(0, 0),
            clock.clone(),
        );
        (seq, db, dbp)
    }

    #[test]
    fn empty_sequence_yields_nothing() {
        let clock = Clock::manual();
        let (mut seq, _, _) = sequence(&clock);
        assert!(seq.get(false).is_none());
    }

    #[test]
    fn single_item_stays_until_duration() {
        let clock = Clock::manual();
        let (mut seq, _, _) = sequence(&clock);
        seq.add(Dummy::handle(1), 5.0, Conditional::always());
        let first = seq.get(false);
        assert!(first.is_some());
        clock.advance(3.0);
        // Same item while its duration runs.
        let again = seq.get(false);
        assert!(again.is_some());
        assert_eq!(seq.current, 0);
    }

    #[test]
    fn items_rotate_on_expiry() {
        let clock = Clock::manual();
        let (mut seq, _, _) = sequence(&clock);
        seq.add(Dummy::handle(1), 1.0, Conditional::always());
        seq.add(Dummy::handle(2), 1.0, Conditional::always());
        seq.get(false);
        assert_eq!(seq.current, 0);
        clock.advance(1.5);
        let w = seq.get(false);
        assert!(w.is_some());
        assert_eq!(seq.current, 1);
        // The freshly selected item width identifies it.
        assert_eq!(w.map(|w| w.borrow().size().width), Some(2));
    }

    #[test]
    fn rotation_wraps_circularly() {
        let clock = Clock::manual();
        let (mut seq, _, _) = sequence(&clock);
        seq.add(Dummy::handle(1), 1.0, Conditional::always());
        seq.add(Dummy::handle(2), 1.0, Conditional::always());
        seq.get(false);
        clock.advance(1.5);
        seq.get(false);
        clock.advance(1.5);
        seq.get(false);
        assert_eq!(seq.current, 0);
    }

    #[test]
    fn gated_items_are_skipped() {
        let clock = Clock::manual();
        let (mut seq, db, _) = sequence(&clock);
        db.set("show_second", false);
        seq.add(Dummy::handle(1), 1.0, Conditional::always());
        seq.add(
            Dummy::handle(2),
            1.0,
            Conditional::parse("db['show_second']").unwrap(),
        );
        seq.add(Dummy::handle(3), 1.0, Conditional::always());
        seq.get(false);
        clock.advance(1.5);
        let w = seq.get(false);
        // Item 2 is gated off; item 3 follows item 1 directly.
        assert_eq!(w.map(|w| w.borrow().size().width), Some(3));
    }

    #[test]
    fn all_items_gated_yields_none() {
        let clock = Clock::manual();
        let (mut seq, db, _) = sequence(&clock);
        db.set("never", false);
        let gate = Conditional::parse("db['never']").unwrap();
        seq.add(Dummy::handle(1), 1.0, gate.clone());
        seq.add(Dummy::handle(2), 1.0, gate);
        assert!(seq.get(false).is_none());
    }

    #[test]
    fn sequence_conditional_gates_everything() {
        let clock = Clock::manual();
        clock.set(1.0);
        let db = VarStore::new();
        let dbp = VarStore::new();
        db.set("enabled", false);
        let mut seq = Sequence::new(
            Conditional::parse("db['enabled']").unwrap(),
            db.clone(),
            dbp,
            0.0,
            0.0,
            Point::new(0, 0),
            clock.clone(),
        );
        seq.add(Dummy::handle(1), 1.0, Conditional::always());
        assert!(seq.get(false).is_none());
        db.set("enabled", true);
        assert!(seq.get(false).is_some());
    }

    #[test]
    fn cooling_blocks_reentry() {
        let clock = Clock::manual();
        clock.set(1.0);
        let db = VarStore::new();
        let dbp = VarStore::new();
        let mut seq = Sequence::new(
            Conditional::always(),
            db,
            dbp,
            5.0,
            0.0,
            Point::new(0, 0),
            clock.clone(),
        );
        seq.add(Dummy::handle(1), 1.0, Conditional::always());
        assert!(seq.get(false).is_some());
        seq.arm_cooling(clock.now());
        clock.advance(2.0);
        assert!(seq.get(false).is_none());
        clock.advance(3.5);
        assert!(seq.get(false).is_some());
    }

    #[test]
    fn minimum_active_pins_past_conditional_flip() {
        let clock = Clock::manual();
        clock.set(1.0);
        let db = VarStore::new();
        let dbp = VarStore::new();
        db.set("on", true);
        let mut seq = Sequence::new(
            Conditional::parse("db['on']").unwrap(),
            db.clone(),
            dbp,
            0.0,
            10.0,
            Point::new(0, 0),
            clock.clone(),
        );
        seq.add(Dummy::handle(1), 60.0, Conditional::always());
        assert!(seq.get(false).is_some());
        // The conditional flips off, but the minimum keeps it active.
        db.set("on", false);
        clock.advance(5.0);
        assert!(seq.get(false).is_some());
        // Past the minimum the gate applies again.
        clock.advance(6.0);
        assert!(seq.get(false).is_none());
    }

    #[test]
    fn restart_rewinds_and_clears_cooling() {
        let clock = Clock::manual();
        let (mut seq, _, _) = sequence(&clock);
        seq.add(Dummy::handle(1), 1.0, Conditional::always());
        seq.add(Dummy::handle(2), 1.0, Conditional::always());
        seq.get(false);
        clock.advance(1.5);
        seq.get(false);
        assert_eq!(seq.current, 1);
        seq.get(true);
        assert_eq!(seq.current, 0);
        assert_eq!(seq.cooling_until(), 0.0);
    }

    #[test]
    fn newly_selected_item_gets_a_reset_update() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct Counting {
            image: Bitmap,
            resets: Rc<Cell<u32>>,
        }
        impl Widget for Counting {
            fn update(&mut self, reset: bool) -> bool {
                if reset {
                    self.resets.set(self.resets.get() + 1);
                }
                reset
            }
            fn image(&self) -> &Bitmap {
                &self.image
            }
        }

        let resets = Rc::new(Cell::new(0));
        let counting = shared(Counting {
            image: Bitmap::new(Size::new(1, 1), false),
            resets: resets.clone(),
        });

        let clock = Clock::manual();
        let (mut seq, _, _) = sequence(&clock);
        seq.add(counting, 1.0, Conditional::always());
        seq.add(Dummy::handle(2), 1.0, Conditional::always());
        seq.get(false);
        assert_eq!(resets.get(), 0);
        clock.advance(1.5);
        seq.get(false); // rotates to item 2
        clock.advance(1.5);
        seq.get(false); // rotates back to item 1 with a reset update
        assert_eq!(resets.get(), 1);
    }
}
