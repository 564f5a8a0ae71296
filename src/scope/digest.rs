//! Watch registration and the fixed-point change detection loop.

use std::rc::Rc;

use crate::error::{RtError, RtResult};
use crate::expr::Expression;
use crate::value::Value;

use super::watcher::{Snapshot, Watcher};
use super::Scope;

/// Outcome of a successful [`Scope::digest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DigestSummary {
    /// Watcher passes run on the scope the digest was started on, including
    /// the final clean pass.
    pub passes: usize,
    /// Listener invocations across the whole subtree.
    pub listeners_fired: usize,
    /// Scopes that reached their fixed point.
    pub scopes_visited: usize,
}

impl Scope {
    /// Registers a watcher.
    ///
    /// The expression is evaluated immediately and the result becomes the
    /// baseline; the listener is not called until a digest sees a different
    /// value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use nglite::{Scope, Value};
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    ///
    /// let scope = Scope::root();
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// let sink = seen.clone();
    /// scope.watch("count", move |value, _| {
    ///     sink.borrow_mut().push(value.clone());
    ///     Ok(())
    /// }).unwrap();
    ///
    /// scope.set("count", 1);
    /// scope.digest().unwrap();
    /// scope.digest().unwrap();
    /// assert_eq!(*seen.borrow(), vec![Value::from(1)]);
    /// ```
    pub fn watch<F>(&self, expression: impl Into<Expression>, listener: F) -> RtResult<()>
    where
        F: Fn(&Value, &Scope) -> RtResult<()> + 'static,
    {
        let expression = expression.into();
        let baseline = self.evaluate_expression(&expression)?;
        tracing::trace!(scope = %self.id(), expression = expression.text(), "watcher registered");
        self.inner.watchers.borrow_mut().push(Watcher {
            expression,
            listener: Rc::new(listener),
            last: Snapshot::capture(&baseline),
        });
        Ok(())
    }

    /// Runs change detection on this scope, then on each child in order.
    ///
    /// Watchers are re-run until a complete pass sees no change. A scope whose
    /// pass number `digest_ttl` is still dirty fails with
    /// [`RtError::DigestDivergence`]; a ttl of `0` never gives up.
    pub fn digest(&self) -> RtResult<DigestSummary> {
        let mut summary = DigestSummary::default();
        let passes = self.digest_subtree(&mut summary)?;
        summary.passes = passes;
        tracing::debug!(
            scope = %self.id(),
            passes = summary.passes,
            listeners = summary.listeners_fired,
            scopes = summary.scopes_visited,
            "digest complete"
        );
        Ok(summary)
    }

    fn digest_subtree(&self, summary: &mut DigestSummary) -> RtResult<usize> {
        let passes = self.digest_local(summary)?;
        summary.scopes_visited += 1;

        // Children may be created or destroyed by listeners; re-read each step.
        let mut index = 0;
        loop {
            let child = self.inner.children.borrow().get(index).cloned();
            let Some(child) = child else { break };
            child.digest_subtree(summary)?;
            index += 1;
        }
        Ok(passes)
    }

    fn digest_local(&self, summary: &mut DigestSummary) -> RtResult<usize> {
        let ttl = self.config().digest_ttl;
        let observers = &self.inner.ctx.observers;
        let mut passes = 0;
        loop {
            let fired = self.watcher_pass()?;
            passes += 1;
            summary.listeners_fired += fired;
            let dirty = fired > 0;
            observers.digest_pass(self.id(), passes, dirty);
            if !dirty {
                return Ok(passes);
            }
            if ttl != 0 && passes >= ttl {
                tracing::warn!(scope = %self.id(), passes, "digest did not stabilize");
                observers.digest_diverged(self.id(), passes);
                return Err(RtError::DigestDivergence {
                    scope: self.id(),
                    passes,
                });
            }
        }
    }

    /// One pass over the watchers in registration order. Returns the number
    /// of listeners fired.
    fn watcher_pass(&self) -> RtResult<usize> {
        let mut fired = 0;
        let mut index = 0;
        loop {
            let (expression, listener) = {
                let watchers = self.inner.watchers.borrow();
                let Some(watcher) = watchers.get(index) else { break };
                (watcher.expression.clone(), watcher.listener.clone())
            };
            index += 1;

            let current = self.evaluate_expression(&expression)?;
            let unchanged = self.inner.watchers.borrow()[index - 1].last.matches(&current);
            if unchanged {
                continue;
            }
            self.inner.watchers.borrow_mut()[index - 1].last = Snapshot::capture(&current);
            fired += 1;
            self.inner.ctx.observers.listener_fired(self.id(), expression.text());
            listener(&current, self)?;
        }
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use std::cell::Cell;

    #[test]
    fn test_clean_digest_runs_one_pass() {
        let scope = Scope::root();
        scope.watch("a", |_, _| Ok(())).unwrap();
        let summary = scope.digest().unwrap();
        assert_eq!(summary.passes, 1);
        assert_eq!(summary.listeners_fired, 0);
        assert_eq!(summary.scopes_visited, 1);
    }

    #[test]
    fn test_watcher_added_by_listener_joins_current_pass() {
        let scope = Scope::root();
        let late = Rc::new(Cell::new(0));
        let counter = late.clone();
        scope
            .watch("a", move |_, s| {
                let counter = counter.clone();
                s.set("b", 1);
                s.watch("b", move |_, _| {
                    counter.set(counter.get() + 1);
                    Ok(())
                })
            })
            .unwrap();
        scope.set("a", 1);
        scope.digest().unwrap();
        // Baseline is taken at registration, after `b` was already set.
        assert_eq!(late.get(), 0);
        assert_eq!(scope.watcher_count(), 2);
    }

    #[test]
    fn test_ttl_bounds_passes() {
        let scope = Scope::root_with_config(RuntimeConfig::default().with_digest_ttl(3));
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        scope.set("n", 0);
        scope
            .watch("n", move |value, s| {
                counter.set(counter.get() + 1);
                s.set("n", value.as_f64().unwrap_or(0.0) + 1.0);
                Ok(())
            })
            .unwrap();
        scope.set("n", 1);
        let err = scope.digest().unwrap_err();
        assert!(matches!(err, RtError::DigestDivergence { passes: 3, .. }));
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn test_listener_error_stops_digest() {
        let scope = Scope::root();
        scope
            .watch("a", |_, _| Err(RtError::custom("listener failed")))
            .unwrap();
        scope.set("a", 1);
        assert!(matches!(scope.digest(), Err(RtError::Custom(_))));
        // The baseline was updated before the listener ran.
        assert_eq!(scope.digest().unwrap().listeners_fired, 0);
    }
}
