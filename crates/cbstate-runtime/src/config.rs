#![forbid(unsafe_code)]

//! Host configuration.

/// Default cap on consecutive re-render passes in a single flush.
pub const DEFAULT_MAX_FLUSH_PASSES: usize = 50;

/// Configuration for a [`Host`](crate::Host).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    /// Maximum number of re-render passes a single flush may run before it
    /// gives up with [`HookError::TooManyRenders`](crate::HookError::TooManyRenders).
    pub max_flush_passes: usize,
    /// Whether `use_debug_value` records anything.
    pub capture_debug_values: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: DEFAULT_MAX_FLUSH_PASSES,
            capture_debug_values: cfg!(debug_assertions),
        }
    }
}

impl HostConfig {
    /// Set the flush pass limit. A limit of zero is raised to one.
    #[must_use]
    pub fn with_max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }

    /// Enable or disable debug value capture.
    #[must_use]
    pub fn with_debug_values(mut self, capture: bool) -> Self {
        self.capture_debug_values = capture;
        self
    }
}
