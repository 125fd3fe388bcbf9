//! Debouncing on top of a [`Scheduler`]
//!
//! Delays a callback until a quiet period elapses. A new call before the
//! delay expires cancels the previous one, so only the latest callback runs.
//! The widgets use three independent instances: popup visibility (300ms),
//! post-transition reposition (1ms) and search input (300ms).
//!
//! # Example
//! ```ignore
//! let search = Debouncer::new(scheduler, SEARCH_DEBOUNCE_MS);
//! search.debounce(|| run_search("sm")); // cancelled
//! search.debounce(|| run_search("smile")); // runs 300ms later
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::scheduler::{Scheduler, TimerHandle};

pub struct Debouncer {
    scheduler: Rc<dyn Scheduler>,
    pending: Rc<RefCell<Option<TimerHandle>>>,
    delay_ms: u32,
}

impl Debouncer {
    /// Create a new debouncer with specified delay in milliseconds
    pub fn new(scheduler: Rc<dyn Scheduler>, delay_ms: u32) -> Self {
        Self {
            scheduler,
            pending: Rc::new(RefCell::new(None)),
            delay_ms,
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Schedule a callback to run after the delay period
    /// If called again before the delay expires, the previous call is cancelled
    pub fn debounce<F>(&self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel();

        let slot = Rc::clone(&self.pending);
        let handle = self.scheduler.schedule(
            self.delay_ms,
            Box::new(move || {
                // Release the fired handle before running so the callback may re-arm
                let fired = slot.borrow_mut().take();
                drop(fired);
                callback();
            }),
        );
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Cancel any pending debounced call
    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some(handle) = previous {
            handle.cancel();
        }
    }

    /// Whether a debounced call is waiting to run
    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .map_or(false, |handle| !handle.is_cancelled())
    }
}

impl Clone for Debouncer {
    fn clone(&self) -> Self {
        Self {
            scheduler: Rc::clone(&self.scheduler),
            pending: Rc::clone(&self.pending),
            delay_ms: self.delay_ms,
        }
    }
}
