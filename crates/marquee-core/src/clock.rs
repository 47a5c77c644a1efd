//! Injected monotonic clock.
//!
//! Every `now` read in the engine goes through a [`Clock`] handle so
//! that animation and sequence timing can be driven deterministically
//! in tests. Handles are cheaply cloneable and share their time source.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A monotonic time source reporting seconds since an arbitrary epoch.
#[derive(Clone, Debug)]
pub struct Clock {
    source: Source,
}

#[derive(Clone, Debug)]
enum Source {
    System(Instant),
    Manual(Rc<Cell<f64>>),
}

impl Clock {
    /// A clock backed by [`Instant`]; the epoch is the moment of creation.
    pub fn system() -> Self {
        Self {
            source: Source::System(Instant::now()),
        }
    }

    /// A test clock that only moves when told to. Starts at 0.0.
    pub fn manual() -> Self {
        Self {
            source: Source::Manual(Rc::new(Cell::new(0.0))),
        }
    }

    /// Current time in seconds since the epoch.
    pub fn now(&self) -> f64 {
        match &self.source {
            Source::System(epoch) => epoch.elapsed().as_secs_f64(),
            Source::Manual(t) => t.get(),
        }
    }

    /// Advance a manual clock by `secs`. No-op on a system clock.
    pub fn advance(&self, secs: f64) {
        if let Source::Manual(t) = &self.source {
            t.set(t.get() + secs);
        }
    }

    /// Set a manual clock to an absolute time. No-op on a system clock.
    pub fn set(&self, secs: f64) {
        if let Source::Manual(t) = &self.source {
            t.set(secs);
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_zero() {
        let clock = Clock::manual();
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = Clock::manual();
        clock.advance(1.5);
        clock.advance(0.5);
        assert_eq!(clock.now(), 2.0);
    }

    #[test]
    fn manual_clock_set_absolute() {
        let clock = Clock::manual();
        clock.advance(10.0);
        clock.set(3.0);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn clones_share_the_time_source() {
        let clock = Clock::manual();
        let other = clock.clone();
        clock.advance(5.0);
        assert_eq!(other.now(), 5.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = Clock::system();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn advance_on_system_clock_is_noop() {
        let clock = Clock::system();
        clock.advance(100.0);
        assert!(clock.now() < 50.0);
    }
}
