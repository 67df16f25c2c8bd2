#![forbid(unsafe_code)]

//! Errors raised by the hook runtime.
//!
//! Hooks are addressed by call order, so every failure here is a violation of
//! the "same hooks, same order, every render" rule or a render loop that never
//! settles. None of them are raised by state commits themselves.

/// Result alias used by every hook and by component functions.
pub type HookResult<T> = Result<T, HookError>;

/// Errors that can occur while rendering a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The slot at `index` holds a different type than the hook now asks for.
    SlotTypeMismatch {
        /// Position of the hook call within the render.
        index: usize,
        /// Type name the current hook call expected.
        expected: &'static str,
    },
    /// The render called a different number of hooks than the previous one.
    HookCountChanged {
        /// Hooks called by the previous render.
        expected: usize,
        /// Hooks called by this render.
        found: usize,
    },
    /// Re-renders kept being requested past the configured flush limit.
    TooManyRenders {
        /// The limit that was hit.
        limit: usize,
    },
}

impl std::fmt::Display for HookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SlotTypeMismatch { index, expected } => {
                write!(f, "hook slot {} does not hold a {}", index, expected)
            }
            Self::HookCountChanged { expected, found } => write!(
                f,
                "render called {} hooks, previous render called {}",
                found, expected
            ),
            Self::TooManyRenders { limit } => {
                write!(f, "too many re-renders (limit {})", limit)
            }
        }
    }
}

impl std::error::Error for HookError {}
