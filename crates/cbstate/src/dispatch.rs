#![forbid(unsafe_code)]

//! Update functions returned by the interceptable state hooks.
//!
//! # Design
//!
//! A [`Dispatch`] holds the state cell's setter and a [`Ref`] to the latest
//! interceptor. It never captures the interceptor itself: the ref is read
//! inside the reducer, at commit time, so a handle created on the first
//! render keeps using whatever callback the latest render installed.
//!
//! Resolution of the incoming update and the interception both run inside
//! the reducer handed to the state cell. The cell applies reducers one after
//! another, so each resolution sees the result of the commit before it.
//!
//! # Invariants
//!
//! 1. Exactly one reducer (one commit) per call.
//! 2. Forced calls never touch the interceptor ref.
//! 3. Handles are created once per container; `ptr_eq` holds across renders.
//!
//! # Failure Modes
//!
//! - **Interceptor panics**: the panic unwinds out of the call that triggered
//!   the commit; the stored value keeps its previous value.

use std::fmt;
use std::rc::Rc;

use cbstate_runtime::{Ref, StateSetter};

use crate::intercept::Interceptor;
use crate::update::Update;

pub(crate) type SharedInterceptor<R, W> = Rc<dyn Interceptor<R, W>>;

struct DispatchInner<R, W> {
    state: StateSetter<R>,
    interceptor: Ref<SharedInterceptor<R, W>>,
}

/// The intercepted update function of an interceptable state container.
///
/// Cloning a `Dispatch` creates a new handle to the **same** container.
pub struct Dispatch<R, W> {
    inner: Rc<DispatchInner<R, W>>,
}

impl<R, W> Clone for Dispatch<R, W> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R, W> fmt::Debug for Dispatch<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("commits", &self.inner.state.commits())
            .finish_non_exhaustive()
    }
}

impl<R, W> Dispatch<R, W> {
    pub(crate) fn new(state: StateSetter<R>, interceptor: Ref<SharedInterceptor<R, W>>) -> Self {
        Self {
            inner: Rc::new(DispatchInner { state, interceptor }),
        }
    }

    /// Whether both handles belong to the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Commits applied to the underlying cell so far, forced or not.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.inner.state.commits()
    }
}

impl<R, W> Dispatch<R, W>
where
    R: Clone + PartialEq + 'static,
    W: 'static,
{
    /// Propose `value`; the latest interceptor decides what is stored.
    pub fn set(&self, value: W) {
        self.dispatch(Update::Value(value));
    }

    /// Propose `f(previous)`; the latest interceptor decides what is stored.
    pub fn update(&self, f: impl FnOnce(&R) -> W + 'static) {
        self.dispatch(Update::with(f));
    }

    /// Resolve `update` against the latest value and pass the result through
    /// the latest interceptor.
    pub fn dispatch(&self, update: Update<R, W>) {
        #[cfg(feature = "tracing")]
        log_dispatch(false, update.is_functional());

        let interceptor = self.inner.interceptor.clone();
        self.inner.state.update(move |previous: &R| {
            let proposed = update.resolve(previous);
            let latest = interceptor.current();
            latest.intercept(proposed, previous)
        });
    }

    /// Store `value` without consulting the interceptor.
    pub fn force_set(&self, value: R) {
        self.force(Update::Value(value));
    }

    /// Store `f(previous)` without consulting the interceptor.
    pub fn force_update(&self, f: impl FnOnce(&R) -> R + 'static) {
        self.force(Update::with(f));
    }

    /// Resolve `update` against the latest value and store it directly.
    pub fn force(&self, update: Update<R, R>) {
        commit_forced(&self.inner.state, update);
    }
}

impl<R> Dispatch<R, R>
where
    R: Clone + PartialEq + 'static,
{
    /// Single-entry form for same-type state: `force == true` bypasses the
    /// interceptor, otherwise behaves like [`dispatch`](Self::dispatch).
    pub fn apply(&self, update: Update<R, R>, force: bool) {
        if force {
            self.force(update);
        } else {
            self.dispatch(update);
        }
    }
}

/// The raw update function: every call is a forced write.
///
/// Obtained from the three-value form of the hooks. Its identity is stable
/// for the lifetime of the container, like [`Dispatch`].
pub struct ForceDispatch<R> {
    state: Rc<StateSetter<R>>,
}

impl<R> Clone for ForceDispatch<R> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<R> fmt::Debug for ForceDispatch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForceDispatch")
            .field("commits", &self.state.commits())
            .finish_non_exhaustive()
    }
}

impl<R> ForceDispatch<R> {
    pub(crate) fn new(state: StateSetter<R>) -> Self {
        Self {
            state: Rc::new(state),
        }
    }

    /// Whether both handles belong to the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl<R: Clone + PartialEq + 'static> ForceDispatch<R> {
    /// Store `value`.
    pub fn set(&self, value: R) {
        self.dispatch(Update::Value(value));
    }

    /// Store `f(previous)`.
    pub fn update(&self, f: impl FnOnce(&R) -> R + 'static) {
        self.dispatch(Update::with(f));
    }

    /// Resolve `update` against the latest value and store it.
    pub fn dispatch(&self, update: Update<R, R>) {
        commit_forced(&self.state, update);
    }
}

fn commit_forced<R: Clone + PartialEq + 'static>(state: &StateSetter<R>, update: Update<R, R>) {
    #[cfg(feature = "tracing")]
    log_dispatch(true, update.is_functional());

    state.update(move |previous: &R| update.resolve(previous));
}

#[cfg(feature = "tracing")]
fn log_dispatch(forced: bool, functional: bool) {
    tracing::debug!(message = "callback_state.dispatch", forced, functional);
}
