#![forbid(unsafe_code)]

//! Incoming updates: a literal value or a function of the previous value.

use std::fmt;

/// An update handed to a [`Dispatch`](crate::Dispatch).
///
/// `R` is the stored (read) type, `W` the accepted (write) type. A functional
/// update is resolved against the value current when the commit is applied,
/// not when the update was issued.
pub enum Update<R, W> {
    /// Propose this value.
    Value(W),
    /// Propose `f(previous)`.
    With(Box<dyn FnOnce(&R) -> W>),
}

impl<R, W> Update<R, W> {
    /// A literal update.
    pub fn value(value: W) -> Self {
        Self::Value(value)
    }

    /// A functional update.
    pub fn with(f: impl FnOnce(&R) -> W + 'static) -> Self {
        Self::With(Box::new(f))
    }

    /// Whether this update depends on the previous value.
    #[must_use]
    pub fn is_functional(&self) -> bool {
        matches!(self, Self::With(_))
    }

    /// Produce the proposed value relative to `previous`.
    pub fn resolve(self, previous: &R) -> W {
        match self {
            Self::Value(value) => value,
            Self::With(f) => f(previous),
        }
    }
}

impl<R, W: fmt::Debug> fmt::Debug for Update<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::With(_) => f.write_str("With(..)"),
        }
    }
}
