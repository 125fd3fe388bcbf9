//! Timer scheduling behind a trait so widget state machines can be driven
//! by the browser event loop or by a virtual clock in tests.
//!
//! All widget timers are single-shot deferrals. A scheduled task runs at
//! most once and never runs after its handle was cancelled or dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A deferred unit of work
pub type TimerTask = Box<dyn FnOnce() + 'static>;

/// Shared cancellation flag between a handle and its scheduled task
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Handle to a scheduled task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancelToken,
}

impl TimerHandle {
    pub fn new(token: CancelToken) -> Self {
        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

pub trait Scheduler {
    /// Run `task` once after `delay_ms` unless the returned handle is
    /// cancelled or dropped first.
    fn schedule(&self, delay_ms: u32, task: TimerTask) -> TimerHandle;
}

/// Event-loop scheduler used by the mounted components
///
/// In the browser this is a `gloo_timers` timeout; elsewhere it is a Dioxus
/// task sleeping on tokio.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay_ms: u32, task: TimerTask) -> TimerHandle {
        let token = CancelToken::default();
        let watch = token.clone();

        #[cfg(target_family = "wasm")]
        {
            gloo_timers::callback::Timeout::new(delay_ms, move || {
                if !watch.is_cancelled() {
                    task();
                }
            })
            .forget();
        }

        #[cfg(not(target_family = "wasm"))]
        {
            dioxus::prelude::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms as u64)).await;
                if !watch.is_cancelled() {
                    task();
                }
            });
        }

        TimerHandle::new(token)
    }
}

struct PendingTask {
    due: u64,
    seq: u64,
    token: CancelToken,
    task: TimerTask,
}

#[derive(Default)]
struct ManualClock {
    now: u64,
    seq: u64,
    queue: Vec<PendingTask>,
}

/// Deterministic scheduler driven by [`ManualScheduler::advance`]
///
/// Tasks due at the same instant run in scheduling order. Tasks scheduled
/// while advancing run in the same `advance` call if they fall due before
/// its target time.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.clock.borrow().now
    }

    /// Number of tasks still waiting to run
    pub fn pending(&self) -> usize {
        self.clock
            .borrow()
            .queue
            .iter()
            .filter(|p| !p.token.is_cancelled())
            .count()
    }

    /// Move the clock forward by `ms`, running every task that falls due
    pub fn advance(&self, ms: u64) {
        let target = self.now() + ms;

        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                clock.queue.retain(|p| !p.token.is_cancelled());

                let earliest = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(idx, _)| idx);

                match earliest {
                    Some(idx) => {
                        let pending = clock.queue.remove(idx);
                        clock.now = pending.due;
                        Some(pending)
                    }
                    None => None,
                }
            };

            match next {
                Some(pending) => (pending.task)(),
                None => break,
            }
        }

        self.clock.borrow_mut().now = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, task: TimerTask) -> TimerHandle {
        let token = CancelToken::default();
        let mut clock = self.clock.borrow_mut();
        clock.seq += 1;
        let pending = PendingTask {
            due: clock.now + delay_ms as u64,
            seq: clock.seq,
            token: token.clone(),
            task,
        };
        clock.queue.push(pending);
        TimerHandle::new(token)
    }
}
