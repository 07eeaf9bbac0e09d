//! Monotonic time sources.
//!
//! Everything in the interaction core is timed in whole milliseconds of
//! uptime, matching the timestamps carried by touch events.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds since an arbitrary, fixed origin.
pub type Millis = u64;

pub trait Clock {
    fn now(&self) -> Millis;
}

/// Wall-clock uptime measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self { SystemClock { origin: Instant::now() } }
}

impl Default for SystemClock {
    fn default() -> Self { Self::new() }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis { self.origin.elapsed().as_millis() as Millis }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<Millis>>);

impl ManualClock {
    pub fn new(start: Millis) -> Self { ManualClock(Rc::new(Cell::new(start))) }

    pub fn set(&self, at: Millis) { self.0.set(at); }

    pub fn advance(&self, by: Millis) { self.0.set(self.0.get() + by); }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis { self.0.get() }
}
