//! A single-threaded delayed-message queue.
//!
//! This is the only scheduling primitive in the crate. Animations are advanced
//! by posting a message for the next frame rather than by sleeping, so the
//! owner decides when due messages are drained (a test steps a manual clock,
//! the binary sleeps until [`RunLoop::next_deadline`]).

use std::collections::BTreeMap;

use super::timer::Millis;

/// Pending messages ordered by due time, then by posting order.
#[derive(Debug)]
pub struct RunLoop<M> {
    pending: BTreeMap<(Millis, u64), M>,
    seq: u64,
}

impl<M> Default for RunLoop<M> {
    fn default() -> Self { Self::new() }
}

impl<M> RunLoop<M> {
    pub fn new() -> Self { RunLoop { pending: BTreeMap::new(), seq: 0 } }

    /// Posts `message` to run at `due`. Messages with the same due time run in
    /// the order they were posted.
    pub fn post_at(&mut self, due: Millis, message: M) {
        self.seq = self.seq.wrapping_add(1);
        self.pending.insert((due, self.seq), message);
    }

    /// Removes every pending message matching `pred`, returning how many were
    /// dropped.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&M) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, m| !pred(m));
        before - self.pending.len()
    }

    /// Takes the earliest message whose due time is at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, M)> {
        let (&(due, _), _) = self.pending.first_key_value()?;
        if due > now {
            return None;
        }
        self.pending.pop_first().map(|((due, _), m)| (due, m))
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.first_key_value().map(|(&(due, _), _)| due)
    }

    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    pub fn clear(&mut self) { self.pending.clear(); }
}
