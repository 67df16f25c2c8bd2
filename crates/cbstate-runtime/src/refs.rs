#![forbid(unsafe_code)]

//! Mutable references that survive re-renders without triggering them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A shared, mutable single-slot cell returned by
/// [`Scope::use_ref`](crate::Scope::use_ref).
///
/// Writing through a `Ref` never requests a re-render. Every render of the
/// same slot returns a handle to the same storage, so closures created on the
/// first render observe values written on later ones.
pub struct Ref<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(current) => f.debug_struct("Ref").field("current", &*current).finish(),
            Err(_) => f.write_str("Ref { <borrowed> }"),
        }
    }
}

impl<T> Ref<T> {
    /// Create a standalone reference.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrite the current value.
    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }

    /// Overwrite the current value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.inner.replace(value)
    }

    /// Access the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if `f` calls [`set`](Self::set) or [`replace`](Self::replace)
    /// on the same reference.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.borrow())
    }

    /// Whether both handles point at the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Ref<T> {
    /// Clone of the current value.
    #[must_use]
    pub fn current(&self) -> T {
        self.inner.borrow().clone()
    }
}
