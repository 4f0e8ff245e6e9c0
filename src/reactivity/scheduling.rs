// ============================================================================
// spark-elements - Poll Scheduling
// Injectable timers and the self-rescheduling watcher poll loop
// ============================================================================
//
// There is no ambient event loop. A component is handed a Scheduler and
// asks it to run a task after a delay; whoever owns the event loop (or a
// test) drives the scheduler. ManualScheduler is a virtual clock advanced
// explicitly, which keeps ticks synchronous and deterministic.
//
// A PollLoop schedules one task at a time. Each task runs the tick, then
// schedules the next one. Stopping cancels the pending task, and dropping
// the loop stops it, so no task outlives its component.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::trace;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Handle for cancelling a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

// =============================================================================
// SCHEDULER
// =============================================================================

/// Runs tasks after a delay.
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskId;

    /// Cancel a task that has not run yet. Returns false if it already ran
    /// or was cancelled.
    fn cancel(&self, id: TaskId) -> bool;
}

// =============================================================================
// MANUAL SCHEDULER
// =============================================================================

/// A scheduler driven by an explicit virtual clock.
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use spark_elements::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// let ran = Rc::new(Cell::new(false));
/// let ran_task = ran.clone();
/// scheduler.schedule(Duration::from_millis(250), Box::new(move || ran_task.set(true)));
///
/// scheduler.advance(Duration::from_millis(249));
/// assert!(!ran.get());
/// scheduler.advance(Duration::from_millis(1));
/// assert!(ran.get());
/// ```
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    /// Keyed by (due time, id): earliest first, ties in scheduling order
    queue: RefCell<BTreeMap<(Duration, u64), Task>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(0),
            queue: RefCell::new(BTreeMap::new()),
        }
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Move the clock forward by `by`, running every task that falls due,
    /// including tasks scheduled by tasks within the window.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let due_now =
                    matches!(queue.first_key_value(), Some((&(due, _), _)) if due <= target);
                if due_now { queue.pop_first() } else { None }
            };
            let Some(((due, _), task)) = next else {
                break;
            };

            self.now.set(due);
            task();
            ran += 1;
        }

        self.now.set(target);
        ran
    }

    /// Run every task due right now without moving the clock.
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Tasks scheduled and not yet run or cancelled.
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// When the earliest pending task falls due.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.borrow().keys().next().map(|&(due, _)| due)
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.queue
            .borrow_mut()
            .insert((self.now.get() + delay, id), task);
        TaskId(id)
    }

    fn cancel(&self, id: TaskId) -> bool {
        let mut queue = self.queue.borrow_mut();
        let key = queue.keys().find(|&&(_, task)| task == id.0).copied();
        match key {
            Some(key) => queue.remove(&key).is_some(),
            None => false,
        }
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now.get())
            .field("pending", &self.pending_count())
            .finish()
    }
}

// =============================================================================
// POLL LOOP
// =============================================================================

type TickFn = Box<dyn FnMut() -> ControlFlow<()>>;

struct PollState {
    scheduler: Rc<dyn Scheduler>,
    interval: Duration,
    tick: RefCell<TickFn>,
    pending: Cell<Option<TaskId>>,
    running: Cell<bool>,
}

impl PollState {
    fn schedule_next(state: &Rc<PollState>) {
        let weak: Weak<PollState> = Rc::downgrade(state);
        let id = state.scheduler.schedule(
            state.interval,
            Box::new(move || {
                if let Some(state) = weak.upgrade() {
                    PollState::run_tick(&state);
                }
            }),
        );
        state.pending.set(Some(id));
    }

    fn run_tick(state: &Rc<PollState>) {
        state.pending.set(None);
        if !state.running.get() {
            return;
        }

        let flow = match state.tick.try_borrow_mut() {
            Ok(mut tick) => (&mut *tick)(),
            Err(_) => ControlFlow::Continue(()),
        };

        // The tick may have stopped the loop
        if flow.is_continue() && state.running.get() {
            PollState::schedule_next(state);
        } else {
            trace!("poll loop finished");
            state.running.set(false);
        }
    }
}

/// Calls `tick` every `interval` until stopped, dropped, or the tick
/// returns `ControlFlow::Break`.
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use std::ops::ControlFlow;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use spark_elements::{ManualScheduler, PollLoop, Scheduler};
///
/// let scheduler = Rc::new(ManualScheduler::new());
/// let ticks = Rc::new(Cell::new(0));
/// let counter = ticks.clone();
///
/// let poll = PollLoop::start(scheduler.clone(), Duration::from_millis(100), move || {
///     counter.set(counter.get() + 1);
///     ControlFlow::Continue(())
/// });
///
/// scheduler.advance(Duration::from_millis(350));
/// assert_eq!(ticks.get(), 3);
///
/// drop(poll);
/// assert_eq!(scheduler.pending_count(), 0);
/// ```
pub struct PollLoop {
    state: Rc<PollState>,
}

impl PollLoop {
    pub fn start<F>(scheduler: Rc<dyn Scheduler>, interval: Duration, tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + 'static,
    {
        let state = Rc::new(PollState {
            scheduler,
            interval,
            tick: RefCell::new(Box::new(tick)),
            pending: Cell::new(None),
            running: Cell::new(true),
        });
        trace!(interval_ms = interval.as_millis() as u64, "poll loop started");
        PollState::schedule_next(&state);
        Self { state }
    }

    /// Stop ticking and cancel the pending task. Idempotent.
    pub fn stop(&self) {
        if self.state.running.replace(false) {
            trace!("poll loop stopped");
        }
        if let Some(id) = self.state.pending.take() {
            self.state.scheduler.cancel(id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn interval(&self) -> Duration {
        self.state.interval
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for PollLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollLoop")
            .field("interval", &self.state.interval)
            .field("running", &self.state.running.get())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
