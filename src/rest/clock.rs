//! Time sources used for staleness checks.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};

/// Source of the current time.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give
/// another to the client.
///
/// # Example
///
/// ```rust
/// use drf_client::rest::{Clock, ManualClock};
/// use chrono::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::seconds(121));
/// assert_eq!(clock.now() - start, Duration::seconds(121));
/// ```
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at the current wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Sets the clock to `time`.
    pub fn set(&self, time: DateTime<Utc>) {
        self.now.set(time);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ManualClock").field(&self.now.get()).finish()
    }
}
