#![forbid(unsafe_code)]

//! Hook slots addressed by call order.
//!
//! A [`Scope`] belongs to one mounted component. Each hook call claims the next
//! slot; the first render creates the slots, later renders find them again by
//! position. Calling hooks in a different order or number across renders is
//! reported as a [`HookError`] instead of silently reading the wrong slot.

use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

use crate::cell::{Initial, Scheduler, StateSetter};
use crate::config::HostConfig;
use crate::error::{HookError, HookResult};
use crate::refs::Ref;

struct MemoSlot<D, T> {
    deps: D,
    value: T,
}

/// Per-component hook storage. Handed to the component function on every
/// render by [`Host`](crate::Host).
pub struct Scope {
    slots: Vec<Box<dyn Any>>,
    cursor: usize,
    /// Set once the first render completed; slot count is fixed from then on.
    mounted: bool,
    scheduler: Rc<Scheduler>,
    debug_values: Vec<String>,
    capture_debug_values: bool,
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("slots", &self.slots.len())
            .field("cursor", &self.cursor)
            .field("mounted", &self.mounted)
            .field("render_pending", &self.scheduler.is_pending())
            .finish()
    }
}

impl Scope {
    pub(crate) fn new(config: &HostConfig) -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            mounted: false,
            scheduler: Rc::new(Scheduler::default()),
            debug_values: Vec::new(),
            capture_debug_values: config.capture_debug_values,
        }
    }

    pub(crate) fn begin_render(&mut self) {
        self.cursor = 0;
        self.debug_values.clear();
    }

    pub(crate) fn finish_render(&mut self) -> HookResult<()> {
        if self.mounted && self.cursor != self.slots.len() {
            return Err(HookError::HookCountChanged {
                expected: self.slots.len(),
                found: self.cursor,
            });
        }
        self.mounted = true;
        Ok(())
    }

    pub(crate) fn take_render_request(&self) -> bool {
        self.scheduler.take_pending()
    }

    /// Number of hook slots claimed so far.
    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.slots.len()
    }

    /// Whether a state commit asked for a re-render that has not happened yet.
    #[must_use]
    pub fn is_render_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Total re-render requests issued by this scope's state cells.
    #[must_use]
    pub fn render_requests(&self) -> u64 {
        self.scheduler.requests()
    }

    /// Debug values recorded during the latest render.
    #[must_use]
    pub fn debug_values(&self) -> &[String] {
        &self.debug_values
    }

    /// Claim the next slot. Returns its index and whether it must be created.
    fn advance(&mut self) -> HookResult<(usize, bool)> {
        let index = self.cursor;
        self.cursor += 1;
        if index < self.slots.len() {
            return Ok((index, false));
        }
        if self.mounted {
            return Err(HookError::HookCountChanged {
                expected: self.slots.len(),
                found: self.cursor,
            });
        }
        Ok((index, true))
    }

    fn slot_mut<T: 'static>(&mut self, index: usize) -> HookResult<&mut T> {
        self.slots[index]
            .downcast_mut::<T>()
            .ok_or(HookError::SlotTypeMismatch {
                index,
                expected: type_name::<T>(),
            })
    }

    /// Render-triggering state.
    ///
    /// Returns the current value and a setter. `initial` is only used by the
    /// first render; an [`Initial::Lazy`] producer runs exactly once.
    ///
    /// A commit requests a re-render when the new value is not `==` to the
    /// old one. Two values that are each unequal to themselves (`f64::NAN`)
    /// are treated as the same value.
    pub fn use_state<T>(&mut self, initial: impl Into<Initial<T>>) -> HookResult<(T, StateSetter<T>)>
    where
        T: Clone + PartialEq + 'static,
    {
        self.state_slot(initial.into())
    }

    /// [`use_state`](Self::use_state) with an initial value produced by
    /// `produce` on the first render only.
    pub fn use_state_with<T>(
        &mut self,
        produce: impl FnOnce() -> T + 'static,
    ) -> HookResult<(T, StateSetter<T>)>
    where
        T: Clone + PartialEq + 'static,
    {
        self.state_slot(Initial::lazy(produce))
    }

    fn state_slot<T>(&mut self, initial: Initial<T>) -> HookResult<(T, StateSetter<T>)>
    where
        T: Clone + PartialEq + 'static,
    {
        let (index, fresh) = self.advance()?;
        let setter = if fresh {
            let setter = StateSetter::new(initial.resolve(), Rc::clone(&self.scheduler));
            self.slots.push(Box::new(setter.clone()));
            setter
        } else {
            self.slot_mut::<StateSetter<T>>(index)?.clone()
        };
        Ok((setter.get(), setter))
    }

    /// A mutable reference that persists across renders. `initial` is only
    /// used by the first render.
    pub fn use_ref<T: 'static>(&mut self, initial: T) -> HookResult<Ref<T>> {
        let (index, fresh) = self.advance()?;
        if fresh {
            let reference = Ref::new(initial);
            self.slots.push(Box::new(reference.clone()));
            return Ok(reference);
        }
        Ok(self.slot_mut::<Ref<T>>(index)?.clone())
    }

    /// Memoize `compute()` until `deps` changes.
    ///
    /// With `()` as deps the value is computed on the first render and reused
    /// for the lifetime of the scope, which is how stable callback handles
    /// are built.
    pub fn use_memo<D, T>(&mut self, deps: D, compute: impl FnOnce() -> T) -> HookResult<T>
    where
        D: PartialEq + 'static,
        T: Clone + 'static,
    {
        let (index, fresh) = self.advance()?;
        if fresh {
            let value = compute();
            self.slots.push(Box::new(MemoSlot {
                deps,
                value: value.clone(),
            }));
            return Ok(value);
        }
        let slot = self.slot_mut::<MemoSlot<D, T>>(index)?;
        if slot.deps != deps {
            slot.value = compute();
            slot.deps = deps;
        }
        Ok(slot.value.clone())
    }

    /// Expose `value` to host tooling. No effect on behavior.
    pub fn use_debug_value<T: fmt::Debug + ?Sized>(&mut self, value: &T) {
        if self.capture_debug_values {
            self.debug_values.push(format!("{value:?}"));
        }
    }
}
