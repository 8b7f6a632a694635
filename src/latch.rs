//! Countdown latch exit barrier.
//!
//! A [`CountdownLatch`] lets one thread wait until a fixed number of other
//! threads have each signalled completion. The benchmark harness hands one
//! latch to every worker; the driver blocks on it instead of polling, and
//! can bound the wait with [`wait_for`](CountdownLatch::wait_for) to detect
//! a hung run.

use core::fmt;
use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// A one-shot synchronization barrier counting down to zero.
///
/// The count only decreases. Once it reaches zero every current and future
/// waiter is released immediately; extra `count_down` calls are ignored.
pub struct CountdownLatch {
    remaining: Mutex<usize>,
    all_done: Condvar,
}

impl CountdownLatch {
    /// Creates a latch that opens after `count` calls to
    /// [`count_down`](Self::count_down).
    ///
    /// A count of zero creates an already-open latch.
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            all_done: Condvar::new(),
        }
    }

    /// Records one completion. When the count reaches zero all waiters are
    /// woken.
    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.all_done.notify_all();
        }
    }

    /// Returns the current count.
    pub fn count(&self) -> usize {
        *self.remaining.lock()
    }

    /// Blocks until the count reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.all_done.wait(&mut remaining);
        }
    }

    /// Blocks until the count reaches zero or `timeout` elapses.
    ///
    /// Returns `true` if the latch opened, `false` on timeout.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.all_done.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }
}

impl fmt::Debug for CountdownLatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownLatch")
            .field("remaining", &self.count())
            .finish()
    }
}
