#![forbid(unsafe_code)]

//! Interception callbacks.
//!
//! Every non-forced commit goes through [`Interceptor::intercept`] with the
//! proposed value and the previous stored value. The returned value is what
//! gets stored: return `previous.clone()` to veto, something else to
//! transform, or the proposal to accept.
//!
//! Two adapters cover the two call shapes:
//!
//! - [`PassThrough`]: read and write types coincide. The callback returns
//!   `Option<R>`; `None` accepts the proposal unchanged.
//! - [`Reduce`]: the write type differs (e.g. an input event reduced into a
//!   domain value). The callback must always produce a stored value.
//!
//! Both are called through the same trait method; the difference only exists
//! in which callbacks the type system accepts.

use std::fmt;

/// Decides what a proposed write turns into.
pub trait Interceptor<R, W> {
    /// Map `proposed` (and the current stored value) to the value to store.
    fn intercept(&self, proposed: W, previous: &R) -> R;
}

/// Same-type interceptor where `None` means "store the proposal as is".
pub struct PassThrough<F> {
    callback: F,
}

impl<F> PassThrough<F> {
    /// Wrap a `Fn(&proposed, &previous) -> Option<R>` callback.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<R, F> Interceptor<R, R> for PassThrough<F>
where
    F: Fn(&R, &R) -> Option<R>,
{
    fn intercept(&self, proposed: R, previous: &R) -> R {
        match (self.callback)(&proposed, previous) {
            Some(next) => next,
            None => proposed,
        }
    }
}

impl<F> fmt::Debug for PassThrough<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PassThrough(..)")
    }
}

/// Interceptor that reduces a write of type `W` into a stored `R`.
pub struct Reduce<F> {
    callback: F,
}

impl<F> Reduce<F> {
    /// Wrap a `Fn(proposed, &previous) -> R` callback.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<R, W, F> Interceptor<R, W> for Reduce<F>
where
    F: Fn(W, &R) -> R,
{
    fn intercept(&self, proposed: W, previous: &R) -> R {
        (self.callback)(proposed, previous)
    }
}

impl<F> fmt::Debug for Reduce<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reduce(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_none_keeps_proposal() {
        let accept = PassThrough::new(|_: &i32, _: &i32| None);
        assert_eq!(accept.intercept(5, &1), 5);
    }

    #[test]
    fn pass_through_some_replaces() {
        let reject_odd = PassThrough::new(|n: &i32, o: &i32| (n % 2 != 0).then_some(*o));
        assert_eq!(reject_odd.intercept(3, &2), 2);
        assert_eq!(reject_odd.intercept(4, &2), 4);
    }

    #[test]
    fn reduce_changes_type() {
        let append = Reduce::new(|n: i32, o: &String| format!("{o}{n}"));
        assert_eq!(append.intercept(1, &"-".to_string()), "-1");
    }

    #[test]
    fn usable_as_trait_object() {
        let boxed: Box<dyn Interceptor<u8, u8>> =
            Box::new(PassThrough::new(|n: &u8, _: &u8| Some(n.saturating_mul(2))));
        assert_eq!(boxed.intercept(100, &0), 200);
        assert_eq!(format!("{:?}", Reduce::new(|n: u8, _: &u8| n)), "Reduce(..)");
    }
}
