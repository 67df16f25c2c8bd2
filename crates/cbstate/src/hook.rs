#![forbid(unsafe_code)]

//! The interceptable state hooks.

use std::fmt;
use std::rc::Rc;

use cbstate_runtime::{HookResult, Initial, Scope};

use crate::dispatch::{Dispatch, ForceDispatch, SharedInterceptor};
use crate::intercept::{Interceptor, PassThrough, Reduce};

/// Everything an interceptable state container hands back on a render.
pub struct CallbackState<R, W> {
    /// The stored value as of this render.
    pub value: R,
    /// Intercepted update function.
    pub dispatch: Dispatch<R, W>,
    /// Forced update function.
    pub force: ForceDispatch<R>,
}

impl<R: Clone, W> Clone for CallbackState<R, W> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            dispatch: self.dispatch.clone(),
            force: self.force.clone(),
        }
    }
}

impl<R: fmt::Debug, W> fmt::Debug for CallbackState<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackState")
            .field("value", &self.value)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}

impl<R, W> CallbackState<R, W> {
    /// Two-value form: `(value, update)`.
    pub fn into_pair(self) -> (R, Dispatch<R, W>) {
        (self.value, self.dispatch)
    }

    /// Three-value form: `(value, update, forced update)`.
    pub fn into_parts(self) -> (R, Dispatch<R, W>, ForceDispatch<R>) {
        (self.value, self.dispatch, self.force)
    }
}

/// State whose non-forced writes pass through `interceptor`.
///
/// `initial` (a value or [`Initial::lazy`]) is only used on the first render.
/// `interceptor` is installed on every render; the returned handles always
/// consult the one from the latest render, and are themselves the same
/// handles on every render.
///
/// Every write is a commit; a re-render follows only when the stored value
/// is not `==` to the previous one (`NaN` replaced by `NaN` counts as equal).
pub fn use_interceptable_state<R, W, I>(
    cx: &mut Scope,
    initial: impl Into<Initial<R>>,
    interceptor: I,
) -> HookResult<CallbackState<R, W>>
where
    R: Clone + PartialEq + fmt::Debug + 'static,
    W: 'static,
    I: Interceptor<R, W> + 'static,
{
    let (value, state) = cx.use_state(initial)?;

    let latest: SharedInterceptor<R, W> = Rc::new(interceptor);
    let slot = cx.use_ref(Rc::clone(&latest))?;
    slot.set(latest);

    let (dispatch, force) = cx.use_memo((), move || {
        (Dispatch::new(state.clone(), slot), ForceDispatch::new(state))
    })?;

    cx.use_debug_value(&value);

    Ok(CallbackState {
        value,
        dispatch,
        force,
    })
}

/// `(value, update)` for same-type state.
///
/// `callback(proposed, previous)` returns `Some(stored)` to replace the
/// proposal or `None` to store it unchanged.
///
/// ```
/// use cbstate::{Host, Scope, use_callback_state};
///
/// let mut host = Host::mount(
///     |cx: &mut Scope, _: &()| {
///         // Only even values get through.
///         use_callback_state(cx, 2, |n: &i32, o: &i32| (n % 2 != 0).then_some(*o))
///     },
///     (),
/// )
/// .unwrap();
///
/// host.act(|(_, update)| update.set(3)).unwrap();
/// assert_eq!(host.current().0, 2);
/// host.act(|(_, update)| update.set(4)).unwrap();
/// assert_eq!(host.current().0, 4);
/// ```
pub fn use_callback_state<R, F>(
    cx: &mut Scope,
    initial: impl Into<Initial<R>>,
    callback: F,
) -> HookResult<(R, Dispatch<R, R>)>
where
    R: Clone + PartialEq + fmt::Debug + 'static,
    F: Fn(&R, &R) -> Option<R> + 'static,
{
    Ok(use_interceptable_state(cx, initial, PassThrough::new(callback))?.into_pair())
}

/// `(value, update, forced update)` for same-type state.
pub fn use_callback_state_raw<R, F>(
    cx: &mut Scope,
    initial: impl Into<Initial<R>>,
    callback: F,
) -> HookResult<(R, Dispatch<R, R>, ForceDispatch<R>)>
where
    R: Clone + PartialEq + fmt::Debug + 'static,
    F: Fn(&R, &R) -> Option<R> + 'static,
{
    Ok(use_interceptable_state(cx, initial, PassThrough::new(callback))?.into_parts())
}

/// `(value, update, forced update)` where writes have a different type.
///
/// `callback(input, previous)` must always produce the value to store.
pub fn use_mapped_callback_state<R, W, F>(
    cx: &mut Scope,
    initial: impl Into<Initial<R>>,
    callback: F,
) -> HookResult<(R, Dispatch<R, W>, ForceDispatch<R>)>
where
    R: Clone + PartialEq + fmt::Debug + 'static,
    W: 'static,
    F: Fn(W, &R) -> R + 'static,
{
    Ok(use_interceptable_state(cx, initial, Reduce::new(callback))?.into_parts())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::Update;
    use cbstate_runtime::{HookError, Host, HostConfig};
    use std::cell::RefCell;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    type Calls = Rc<RefCell<Vec<(i32, i32)>>>;

    /// Interceptor that records its arguments, then defers to `inner`.
    struct Spy<F> {
        calls: Calls,
        inner: F,
    }

    impl<F: Fn(i32, &i32) -> i32> Interceptor<i32, i32> for Spy<F> {
        fn intercept(&self, proposed: i32, previous: &i32) -> i32 {
            self.calls.borrow_mut().push((proposed, *previous));
            (self.inner)(proposed, previous)
        }
    }

    fn mount_spy<F>(
        initial: i32,
        inner: F,
    ) -> (Host<(), CallbackState<i32, i32>>, Calls)
    where
        F: Fn(i32, &i32) -> i32 + Clone + 'static,
    {
        let calls: Calls = Rc::default();
        let calls_in = Rc::clone(&calls);
        let host = Host::mount(
            move |cx: &mut Scope, _: &()| {
                let spy = Spy {
                    calls: Rc::clone(&calls_in),
                    inner: inner.clone(),
                };
                use_interceptable_state(cx, initial, spy)
            },
            (),
        )
        .unwrap();
        (host, calls)
    }

    #[test]
    fn callback_not_called_on_mount() {
        let (host, calls) = mount_spy(42, |n, _| n + 1);
        assert_eq!(host.current().value, 42);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn transform_on_write() {
        let (mut host, calls) = mount_spy(42, |n, _| n + 1);
        host.act(|s| s.dispatch.set(10)).unwrap();
        assert_eq!(host.current().value, 11);
        assert_eq!(*calls.borrow(), [(10, 42)]);
    }

    #[test]
    fn veto_keeps_value_but_commits() {
        let (mut host, calls) = mount_spy(5, |_, o| *o);
        for v in [1, 2, 3] {
            host.act(|s| s.dispatch.set(v)).unwrap();
        }
        assert_eq!(host.current().value, 5);
        assert_eq!(calls.borrow().len(), 3);
        assert_eq!(host.current().dispatch.commits(), 3);
        // Value never changed, so nothing re-rendered.
        assert_eq!(host.render_count(), 1);
    }

    #[test]
    fn forced_write_skips_interceptor() {
        let (mut host, calls) = mount_spy(0, |_, o| *o);
        host.act(|s| s.dispatch.force_set(9)).unwrap();
        assert_eq!(host.current().value, 9);
        host.act(|s| s.force.update(|v| v * 2)).unwrap();
        assert_eq!(host.current().value, 18);
        host.act(|s| s.dispatch.apply(Update::value(1), true)).unwrap();
        assert_eq!(host.current().value, 1);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn apply_without_force_intercepts() {
        let (mut host, calls) = mount_spy(0, |n, _| n * 10);
        host.act(|s| s.dispatch.apply(Update::with(|v: &i32| v + 1), false))
            .unwrap();
        assert_eq!(host.current().value, 10);
        assert_eq!(*calls.borrow(), [(1, 0)]);
    }

    #[test]
    fn functional_updates_see_previous_commit() {
        let (mut host, calls) = mount_spy(0, |n, _| n);
        host.act(|s| {
            s.dispatch.update(|v| v + 1);
            s.dispatch.update(|v| v + 1);
            s.dispatch.update(|v| v + 1);
        })
        .unwrap();
        assert_eq!(host.current().value, 3);
        assert_eq!(*calls.borrow(), [(1, 0), (2, 1), (3, 2)]);
    }

    #[test]
    fn handles_stable_across_renders() {
        let (mut host, _) = mount_spy(0, |n, _| n);
        let first = host.current().clone();
        host.act(|s| s.dispatch.set(1)).unwrap();
        host.act(|s| s.dispatch.set(2)).unwrap();
        let last = host.current();
        assert_eq!(host.render_count(), 3);
        assert!(first.dispatch.ptr_eq(&last.dispatch));
        assert!(first.force.ptr_eq(&last.force));
    }

    #[test]
    fn panicking_interceptor_leaves_value() {
        let (mut host, _) = mount_spy(1, |n, _| {
            if n < 0 {
                panic!("negative");
            }
            n
        });
        let outcome = host
            .act(|s| catch_unwind(AssertUnwindSafe(|| s.dispatch.set(-1))))
            .unwrap();
        assert!(outcome.is_err());
        assert_eq!(host.current().value, 1);
        assert_eq!(host.current().dispatch.commits(), 0);

        host.act(|s| s.dispatch.set(7)).unwrap();
        assert_eq!(host.current().value, 7);
    }

    #[test]
    fn debug_value_tracks_state() {
        let config = HostConfig::default().with_debug_values(true);
        let mut host = Host::mount_with_config(
            config,
            |cx: &mut Scope, _: &()| use_callback_state(cx, 1, |_: &i32, _: &i32| None),
            (),
        )
        .unwrap();
        assert_eq!(host.debug_values(), ["1"]);
        host.act(|(_, update)| update.set(2)).unwrap();
        assert_eq!(host.debug_values(), ["2"]);
    }

    #[test]
    fn hook_order_errors_propagate() {
        let mut host = Host::mount(
            |cx: &mut Scope, first: &bool| {
                if *first {
                    let (value, _) = use_callback_state(cx, 0, |_: &i32, _: &i32| None)?;
                    Ok(value)
                } else {
                    let (value, _) = cx.use_state(0)?;
                    Ok(value)
                }
            },
            true,
        )
        .unwrap();
        let err = host.rerender(false).unwrap_err();
        assert!(matches!(err, HookError::HookCountChanged { .. }));
    }
}
