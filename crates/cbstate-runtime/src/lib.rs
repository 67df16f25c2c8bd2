#![forbid(unsafe_code)]

//! Minimal hook runtime for cbstate.
//!
//! This crate provides the primitives a hook-style component is built from:
//!
//! - [`Scope::use_state`]: a render-triggering state cell. Writes go through a
//!   FIFO reducer queue so functional updates always see the latest value.
//!   [`Scope::use_state_with`] builds the initial value lazily.
//! - [`Scope::use_ref`]: a mutable [`Ref`] that survives renders and never
//!   triggers one.
//! - [`Scope::use_memo`]: identity preservation; with `()` deps the value is
//!   built once per component.
//! - [`Scope::use_debug_value`]: purely observational labels for tooling.
//! - [`Host`]: mounts a component function, re-renders it when its state
//!   changes, and exposes the latest output.
//!
//! # Architecture
//!
//! Everything is single-threaded (`Rc`, `RefCell`, `Cell`). A component is a
//! plain function `FnMut(&mut Scope, &P) -> HookResult<O>`; hooks claim slots
//! in call order and report order violations as [`HookError`].
//!
//! # Invariants
//!
//! 1. A slot created on the first render is found at the same position on
//!    every later render, or the render fails.
//! 2. Each state commit is applied against the value left by the previous
//!    commit of the same cell.
//! 3. A re-render is requested only by commits that change a value.
//! 4. A flush never runs more than [`HostConfig::max_flush_passes`] renders.

mod cell;
mod config;
mod error;
mod host;
mod refs;
mod scope;

pub use cell::{Initial, StateSetter};
pub use config::{DEFAULT_MAX_FLUSH_PASSES, HostConfig};
pub use error::{HookError, HookResult};
pub use host::Host;
pub use refs::Ref;
pub use scope::Scope;
