#![forbid(unsafe_code)]

//! Interceptable state for hook-style components.
//!
//! A container built by [`use_interceptable_state`] (or one of its
//! convenience forms) holds a value across renders. Every write is first
//! resolved (literal, or a function of the previous value), then handed to an
//! interception callback together with the previous value; what the callback
//! returns is stored. A forced write skips the callback entirely.
//!
//! - [`use_callback_state`]: `(value, update)`; callback returns
//!   `Option<R>`, `None` stores the proposal unchanged.
//! - [`use_callback_state_raw`]: same, plus a [`ForceDispatch`].
//! - [`use_mapped_callback_state`]: writes of another type `W` are reduced
//!   into the stored `R`; the callback must always return a value.
//!
//! # Invariants
//!
//! 1. The stored value is always the result of the most recent commit.
//! 2. The callback consulted at commit time is the one passed by the most
//!    recent render, even through handles created on the first render.
//! 3. A forced write never invokes the callback.
//! 4. A `None` from a pass-through callback stores the proposal unchanged.
//! 5. Functional updates resolve against the previous commit, never against a
//!    value captured when the update was issued.
//!
//! # Example
//!
//! ```
//! use cbstate::{Host, Scope, use_mapped_callback_state};
//!
//! // A text field fed with raw key presses.
//! let mut host = Host::mount(
//!     |cx: &mut Scope, _: &()| {
//!         use_mapped_callback_state(cx, String::new(), |key: char, text: &String| {
//!             if key == '\u{8}' {
//!                 let mut next = text.clone();
//!                 next.pop();
//!                 next
//!             } else {
//!                 format!("{text}{key}")
//!             }
//!         })
//!     },
//!     (),
//! )
//! .unwrap();
//!
//! host.act(|(_, keys, _)| {
//!     keys.set('h');
//!     keys.set('i');
//!     keys.set('x');
//!     keys.set('\u{8}');
//! })
//! .unwrap();
//! assert_eq!(host.current().0, "hi");
//!
//! host.act(|(_, _, raw)| raw.set("reset".into())).unwrap();
//! assert_eq!(host.current().0, "reset");
//! ```

mod dispatch;
mod hook;
mod intercept;
mod update;

pub use dispatch::{Dispatch, ForceDispatch};
pub use hook::{
    CallbackState, use_callback_state, use_callback_state_raw, use_interceptable_state,
    use_mapped_callback_state,
};
pub use intercept::{Interceptor, PassThrough, Reduce};
pub use update::Update;

pub use cbstate_runtime::{HookError, HookResult, Host, HostConfig, Initial, Ref, Scope};
