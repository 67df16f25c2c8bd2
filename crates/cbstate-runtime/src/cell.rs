#![forbid(unsafe_code)]

//! Render-triggering state cells.
//!
//! # Design
//!
//! A [`StateSetter<T>`] is a handle to a shared `StateCell` that owns the
//! value plus a FIFO queue of pending reducers. Every write, literal or
//! functional, is enqueued as a reducer `FnOnce(&T) -> T`. The first write to
//! arrive drains the queue; writes issued while the queue is being drained
//! (from inside a reducer) are appended and applied after the current one.
//!
//! # Invariants
//!
//! 1. Each reducer is applied to the value produced by the reducer before it,
//!    never to a value captured when the write was issued.
//! 2. `commits` increments once per applied reducer, changed or not.
//! 3. `version` increments (and a re-render is requested) only when the new
//!    value differs from the old one. Values that are not equal to themselves
//!    (`f64::NAN`) count as unchanged when replaced by another such value.
//! 4. Readers never observe a half-applied reducer: the value is replaced in
//!    one step after the reducer returns.
//!
//! # Failure Modes
//!
//! - **Reducer panics**: that commit is aborted. The value is left as it was
//!   before the reducer, and writes the reducer itself queued are dropped.
//!   Writes queued by earlier reducers still apply. The first panic payload
//!   is re-raised to the caller that owns the drain once the queue is empty,
//!   and the cell accepts new writes.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

type Reducer<T> = Box<dyn FnOnce(&T) -> T>;

/// Re-render request flag shared by every cell of one scope.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    pending: Cell<bool>,
    requests: Cell<u64>,
}

impl Scheduler {
    pub(crate) fn request(&self) {
        self.pending.set(true);
        self.requests.set(self.requests.get() + 1);
    }

    /// Clear the pending flag, returning whether it was set.
    pub(crate) fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub(crate) fn requests(&self) -> u64 {
        self.requests.get()
    }
}

/// Initial value of a state slot: a value, or a producer run on first render.
pub enum Initial<T> {
    /// Use this value directly.
    Value(T),
    /// Produce the value lazily. Runs at most once per slot.
    Lazy(Box<dyn FnOnce() -> T>),
}

impl<T> Initial<T> {
    /// Defer construction of the initial value until the slot is created.
    pub fn lazy(produce: impl FnOnce() -> T + 'static) -> Self {
        Self::Lazy(Box::new(produce))
    }

    /// Evaluate into the initial value.
    pub fn resolve(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Lazy(produce) => produce(),
        }
    }
}

impl<T> From<T> for Initial<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Initial<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

struct StateCell<T> {
    value: RefCell<T>,
    queue: RefCell<VecDeque<Reducer<T>>>,
    draining: Cell<bool>,
    /// Bumped when a commit changes the value.
    version: Cell<u64>,
    /// Bumped on every applied reducer.
    commits: Cell<u64>,
    scheduler: Rc<Scheduler>,
}

/// Resets the drain flag even when a value comparison unwinds.
struct DrainGuard<'a, T> {
    cell: &'a StateCell<T>,
}

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.cell.queue.borrow_mut().clear();
        }
        self.cell.draining.set(false);
    }
}

/// Equality used to decide whether a commit changed the value.
///
/// `PartialEq`, except that two values which are each unequal to themselves
/// (`NaN`) are the same.
#[allow(clippy::eq_op)]
fn same_value<T: PartialEq>(old: &T, new: &T) -> bool {
    old == new || (old != old && new != new)
}

/// Write handle to a state slot created by
/// [`Scope::use_state`](crate::Scope::use_state).
///
/// Cloning a `StateSetter` creates a new handle to the **same** cell; the
/// handle returned on every render of a slot is the same one.
pub struct StateSetter<T> {
    cell: Rc<StateCell<T>>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("StateSetter");
        match self.cell.value.try_borrow() {
            Ok(value) => out.field("value", &*value),
            Err(_) => out.field("value", &"<committing>"),
        };
        out.field("version", &self.cell.version.get())
            .field("commits", &self.cell.commits.get())
            .finish()
    }
}

impl<T> StateSetter<T> {
    pub(crate) fn new(initial: T, scheduler: Rc<Scheduler>) -> Self {
        Self {
            cell: Rc::new(StateCell {
                value: RefCell::new(initial),
                queue: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
                version: Cell::new(0),
                commits: Cell::new(0),
                scheduler,
            }),
        }
    }

    /// Number of commits that changed the value.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.cell.version.get()
    }

    /// Number of commits applied, including ones that left the value unchanged.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.cell.commits.get()
    }

    /// Whether both handles point at the same cell.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// Access the latest committed value by reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.cell.value.borrow())
    }
}

impl<T: Clone + PartialEq + 'static> StateSetter<T> {
    /// Replace the value.
    pub fn set(&self, value: T) {
        self.commit(Box::new(move |_: &T| value));
    }

    /// Replace the value with `f(latest)`.
    ///
    /// `f` runs when the cell applies it, against the value left by the
    /// previous commit.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.commit(Box::new(f));
    }

    /// Clone of the latest committed value.
    #[must_use]
    pub fn get(&self) -> T {
        self.cell.value.borrow().clone()
    }

    fn commit(&self, reducer: Reducer<T>) {
        let cell = &*self.cell;
        cell.queue.borrow_mut().push_back(reducer);
        if cell.draining.replace(true) {
            // Applied by the drain loop already running further up the stack.
            return;
        }
        let guard = DrainGuard { cell };

        let mut failure = None;
        loop {
            let Some(reducer) = cell.queue.borrow_mut().pop_front() else {
                break;
            };
            let queued = cell.queue.borrow().len();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let current = cell.value.borrow();
                reducer(&*current)
            }));
            let next = match outcome {
                Ok(next) => next,
                Err(payload) => {
                    cell.queue.borrow_mut().truncate(queued);
                    failure.get_or_insert(payload);
                    continue;
                }
            };
            let changed = !same_value(&*cell.value.borrow(), &next);
            drop(cell.value.replace(next));
            cell.commits.set(cell.commits.get() + 1);
            if changed {
                cell.version.set(cell.version.get() + 1);
                cell.scheduler.request();
            }

            #[cfg(feature = "tracing")]
            Self::log_commit(cell.version.get(), cell.commits.get(), changed);
        }

        drop(guard);
        if let Some(payload) = failure {
            panic::resume_unwind(payload);
        }
    }

    #[cfg(feature = "tracing")]
    fn log_commit(version: u64, commits: u64, changed: bool) {
        tracing::debug!(message = "state.commit", version, commits, changed);
    }
}
