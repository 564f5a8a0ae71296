//! Diagnostic observers for resolution and change detection.
//!
//! Observers receive synchronous callbacks from the registry (provider
//! resolution) and from the scope tree (digest passes and listener
//! invocations). Keep implementations lightweight: they run inline with
//! every digest.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::scope::ScopeId;

/// Observer trait for runtime events.
///
/// Every method has a no-op default so an observer only implements what it
/// needs.
///
/// # Examples
///
/// ```
/// use nglite::{Registry, RuntimeObserver, Factory, Locals};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct Recorder(RefCell<Vec<String>>);
///
/// impl RuntimeObserver for Recorder {
///     fn resolving(&self, name: &str) {
///         self.0.borrow_mut().push(name.to_string());
///     }
/// }
///
/// let recorder = Rc::new(Recorder::default());
/// let registry = Registry::new();
/// registry.add_observer(recorder.clone());
/// registry.register_service("answer", Factory::new(|_| Ok(42u32)));
/// registry.get("answer", &Locals::new()).unwrap();
///
/// assert_eq!(*recorder.0.borrow(), vec!["answer".to_string()]);
/// ```
pub trait RuntimeObserver {
    /// Called before a provider factory runs (cache misses only).
    fn resolving(&self, _name: &str) {}

    /// Called after a provider factory completed successfully.
    fn resolved(&self, _name: &str, _duration: Duration) {}

    /// Called when a name has no provider.
    fn unregistered(&self, _name: &str) {}

    /// Called after each watcher pass of a scope.
    fn digest_pass(&self, _scope: ScopeId, _pass: usize, _dirty: bool) {}

    /// Called before a watcher listener runs.
    fn listener_fired(&self, _scope: ScopeId, _expression: &str) {}

    /// Called when a digest exceeded its pass limit.
    fn digest_diverged(&self, _scope: ScopeId, _passes: usize) {}
}

/// Container for registered observers.
#[derive(Default)]
pub(crate) struct Observers {
    observers: RefCell<Vec<Rc<dyn RuntimeObserver>>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, observer: Rc<dyn RuntimeObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.borrow().is_empty()
    }

    // Snapshot so an observer may register further observers.
    fn each(&self, f: impl Fn(&dyn RuntimeObserver)) {
        if !self.has_observers() {
            return;
        }
        let observers = self.observers.borrow().clone();
        for observer in &observers {
            f(observer.as_ref());
        }
    }

    pub(crate) fn resolving(&self, name: &str) {
        self.each(|o| o.resolving(name));
    }

    pub(crate) fn resolved(&self, name: &str, duration: Duration) {
        self.each(|o| o.resolved(name, duration));
    }

    pub(crate) fn unregistered(&self, name: &str) {
        self.each(|o| o.unregistered(name));
    }

    pub(crate) fn digest_pass(&self, scope: ScopeId, pass: usize, dirty: bool) {
        self.each(|o| o.digest_pass(scope, pass, dirty));
    }

    pub(crate) fn listener_fired(&self, scope: ScopeId, expression: &str) {
        self.each(|o| o.listener_fired(scope, expression));
    }

    pub(crate) fn digest_diverged(&self, scope: ScopeId, passes: usize) {
        self.each(|o| o.digest_diverged(scope, passes));
    }
}

/// Observer that emits every event through `tracing`.
///
/// Events are emitted at `debug` level under the `nglite::observer` target,
/// except divergence which is a `warn`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl RuntimeObserver for TracingObserver {
    fn resolving(&self, name: &str) {
        tracing::debug!(target: "nglite::observer", provider = name, "resolving");
    }

    fn resolved(&self, name: &str, duration: Duration) {
        tracing::debug!(target: "nglite::observer", provider = name, ?duration, "resolved");
    }

    fn unregistered(&self, name: &str) {
        tracing::debug!(target: "nglite::observer", provider = name, "unregistered");
    }

    fn digest_pass(&self, scope: ScopeId, pass: usize, dirty: bool) {
        tracing::debug!(target: "nglite::observer", %scope, pass, dirty, "digest pass");
    }

    fn listener_fired(&self, scope: ScopeId, expression: &str) {
        tracing::debug!(target: "nglite::observer", %scope, expression, "listener fired");
    }

    fn digest_diverged(&self, scope: ScopeId, passes: usize) {
        tracing::warn!(target: "nglite::observer", %scope, passes, "digest diverged");
    }
}

/// Observer that counts events for post-run analysis.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    resolutions: Cell<u64>,
    total_resolution_time: Cell<Duration>,
    unregistered: Cell<u64>,
    digest_passes: Cell<u64>,
    listeners_fired: Cell<u64>,
    divergences: Cell<u64>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of factory executions observed.
    pub fn resolution_count(&self) -> u64 {
        self.resolutions.get()
    }

    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolutions.get();
        if count == 0 {
            return None;
        }
        let total = self.total_resolution_time.get();
        Some(Duration::from_nanos((total.as_nanos() / u128::from(count)) as u64))
    }

    pub fn unregistered_count(&self) -> u64 {
        self.unregistered.get()
    }

    pub fn digest_pass_count(&self) -> u64 {
        self.digest_passes.get()
    }

    pub fn listener_count(&self) -> u64 {
        self.listeners_fired.get()
    }

    pub fn divergence_count(&self) -> u64 {
        self.divergences.get()
    }

    /// Resets all metrics.
    pub fn reset(&self) {
        self.resolutions.set(0);
        self.total_resolution_time.set(Duration::ZERO);
        self.unregistered.set(0);
        self.digest_passes.set(0);
        self.listeners_fired.set(0);
        self.divergences.set(0);
    }
}

impl RuntimeObserver for MetricsObserver {
    fn resolved(&self, _name: &str, duration: Duration) {
        self.resolutions.set(self.resolutions.get() + 1);
        self.total_resolution_time
            .set(self.total_resolution_time.get() + duration);
    }

    fn unregistered(&self, _name: &str) {
        self.unregistered.set(self.unregistered.get() + 1);
    }

    fn digest_pass(&self, _scope: ScopeId, _pass: usize, _dirty: bool) {
        self.digest_passes.set(self.digest_passes.get() + 1);
    }

    fn listener_fired(&self, _scope: ScopeId, _expression: &str) {
        self.listeners_fired.set(self.listeners_fired.get() + 1);
    }

    fn digest_diverged(&self, _scope: ScopeId, _passes: usize) {
        self.divergences.set(self.divergences.get() + 1);
    }
}
