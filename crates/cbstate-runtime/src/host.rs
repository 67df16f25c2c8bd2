#![forbid(unsafe_code)]

//! Mounting and re-rendering components.
//!
//! A [`Host`] owns one component function and its [`Scope`]. It renders the
//! component once on mount, keeps the latest output, and re-renders whenever
//! a state cell of the scope requests it and the host is flushed.
//!
//! # Example
//!
//! ```
//! use cbstate_runtime::{Host, HookResult, Scope, StateSetter};
//!
//! fn counter(cx: &mut Scope, _: &()) -> HookResult<(i32, StateSetter<i32>)> {
//!     cx.use_state(0)
//! }
//!
//! let mut host = Host::mount(counter, ()).unwrap();
//! host.act(|(_, set)| set.update(|v| v + 1)).unwrap();
//! assert_eq!(host.current().0, 1);
//! ```

use crate::config::HostConfig;
use crate::error::{HookError, HookResult};
use crate::scope::Scope;

type Component<P, O> = Box<dyn FnMut(&mut Scope, &P) -> HookResult<O>>;

/// A mounted component: its hook storage, props, and latest output.
pub struct Host<P, O> {
    scope: Scope,
    component: Component<P, O>,
    props: P,
    current: O,
    config: HostConfig,
    renders: u64,
}

impl<P, O: std::fmt::Debug> std::fmt::Debug for Host<P, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("current", &self.current)
            .field("renders", &self.renders)
            .field("scope", &self.scope)
            .finish()
    }
}

impl<P: 'static, O: 'static> Host<P, O> {
    /// Mount `component` with the default configuration.
    pub fn mount(
        component: impl FnMut(&mut Scope, &P) -> HookResult<O> + 'static,
        props: P,
    ) -> HookResult<Self> {
        Self::mount_with_config(HostConfig::default(), component, props)
    }

    /// Mount `component`, render it, and flush any updates issued during
    /// that first render.
    pub fn mount_with_config(
        config: HostConfig,
        component: impl FnMut(&mut Scope, &P) -> HookResult<O> + 'static,
        props: P,
    ) -> HookResult<Self> {
        let mut scope = Scope::new(&config);
        let mut component: Component<P, O> = Box::new(component);
        let current = render_once(&mut scope, &mut component, &props, 1)?;
        let mut host = Self {
            scope,
            component,
            props,
            current,
            config,
            renders: 1,
        };
        host.flush()?;
        Ok(host)
    }
}

impl<P, O> Host<P, O> {
    /// Output of the latest successful render.
    #[must_use]
    pub fn current(&self) -> &O {
        &self.current
    }

    /// Props used by the latest render.
    #[must_use]
    pub fn props(&self) -> &P {
        &self.props
    }

    /// Number of completed renders, including the mount.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Debug values recorded by the latest render.
    #[must_use]
    pub fn debug_values(&self) -> &[String] {
        self.scope.debug_values()
    }

    /// Hook storage of the mounted component.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Render again with new props, then flush.
    ///
    /// The props are kept only if that render succeeds; on error `props()`
    /// and `current()` still belong to the last good render.
    pub fn rerender(&mut self, props: P) -> HookResult<()> {
        let next = self.renders + 1;
        self.current = render_once(&mut self.scope, &mut self.component, &props, next)?;
        self.renders = next;
        self.props = props;
        self.flush()?;
        Ok(())
    }

    /// Run `f` against the current output (typically calling setters it
    /// holds), then flush the re-renders it caused.
    pub fn act<R>(&mut self, f: impl FnOnce(&O) -> R) -> HookResult<R> {
        let result = f(&self.current);
        self.flush()?;
        Ok(result)
    }

    /// Re-render while state commits keep requesting it.
    ///
    /// Returns the number of renders performed.
    pub fn flush(&mut self) -> HookResult<usize> {
        let mut passes = 0;
        while self.scope.take_render_request() {
            if passes == self.config.max_flush_passes {
                let limit = self.config.max_flush_passes;
                #[cfg(feature = "tracing")]
                tracing::warn!(message = "host.flush.limit", limit);
                return Err(HookError::TooManyRenders { limit });
            }
            self.render()?;
            passes += 1;
        }
        Ok(passes)
    }

    fn render(&mut self) -> HookResult<()> {
        let next = self.renders + 1;
        self.current = render_once(&mut self.scope, &mut self.component, &self.props, next)?;
        self.renders = next;
        Ok(())
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn render_once<P, O>(
    scope: &mut Scope,
    component: &mut Component<P, O>,
    props: &P,
    render: u64,
) -> HookResult<O> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("host.render", render).entered();

    scope.begin_render();
    let output = component(scope, props)?;
    scope.finish_render()?;
    Ok(output)
}
