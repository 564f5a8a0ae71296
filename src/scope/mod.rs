//! Hierarchical reactive scopes.
//!
//! A scope holds local fields, an ordered list of watchers and an ordered list
//! of child scopes. Reads fall through to the parent chain when a field is not
//! set locally; writes always land on the local scope.
//!
//! Scopes are cheap `Rc` handles. A parent owns its children through its child
//! list; children hold a weak link back to the parent.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::{EvalMode, RuntimeConfig};
use crate::error::{EvalError, RtError, RtResult};
use crate::expr::{self, Expression, Namespace};
use crate::internal::RuntimeContext;
use crate::observer::RuntimeObserver;
use crate::value::{Function, Value};

mod digest;
mod watcher;

pub use digest::DigestSummary;
pub use watcher::Listener;
use watcher::Watcher;

/// Identifier of a scope, unique within its tree. The root is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct ScopeInner {
    id: ScopeId,
    parent: Option<Weak<ScopeInner>>,
    ctx: Rc<RuntimeContext>,
    fields: RefCell<BTreeMap<String, Value>>,
    watchers: RefCell<Vec<Watcher>>,
    children: RefCell<Vec<Scope>>,
    destroyed: Cell<bool>,
}

/// A node in the reactive data tree.
///
/// # Examples
///
/// ```rust
/// use nglite::{Scope, Value};
///
/// let root = Scope::root();
/// root.set("title", "inbox");
///
/// let child = root.new_child();
/// assert_eq!(child.get("title"), Value::from("inbox"));
///
/// child.set("title", "drafts");
/// assert_eq!(child.get("title"), Value::from("drafts"));
/// assert_eq!(root.get("title"), Value::from("inbox"));
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

/// Non-owning handle to a scope.
#[derive(Clone)]
pub struct WeakScope {
    inner: Weak<ScopeInner>,
}

impl WeakScope {
    pub fn upgrade(&self) -> Option<Scope> {
        self.inner.upgrade().map(|inner| Scope { inner })
    }
}

impl Scope {
    /// Creates a standalone root scope with default configuration.
    pub fn root() -> Self {
        Self::root_with_config(RuntimeConfig::default())
    }

    pub fn root_with_config(config: RuntimeConfig) -> Self {
        Self::root_in(Rc::new(RuntimeContext::new(config)))
    }

    pub(crate) fn root_in(ctx: Rc<RuntimeContext>) -> Self {
        let id = ctx.allocate_scope_id();
        Self::with_parts(id, None, ctx)
    }

    fn with_parts(id: ScopeId, parent: Option<Weak<ScopeInner>>, ctx: Rc<RuntimeContext>) -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                id,
                parent,
                ctx,
                fields: RefCell::new(BTreeMap::new()),
                watchers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Configuration shared by this scope's tree.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.ctx.config
    }

    /// Registers an observer for every scope of this tree.
    pub fn add_observer(&self, observer: Rc<dyn RuntimeObserver>) {
        self.inner.ctx.observers.add(observer);
    }

    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    pub fn parent(&self) -> Option<Scope> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Scope { inner })
    }

    /// Children in creation order.
    pub fn children(&self) -> Vec<Scope> {
        self.inner.children.borrow().clone()
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakScope {
        WeakScope {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether the scope is still reachable from its root through child links.
    pub fn is_attached(&self) -> bool {
        let mut current = self.inner.clone();
        loop {
            if current.destroyed.get() {
                return false;
            }
            let Some(parent) = &current.parent else {
                return true;
            };
            match parent.upgrade() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    // ----- Fields -----

    /// Reads a field through the parent chain.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut current = Some(self.inner.clone());
        while let Some(scope) = current {
            if let Some(value) = scope.fields.borrow().get(name) {
                return Some(value.clone());
            }
            current = scope.parent.as_ref().and_then(Weak::upgrade);
        }
        None
    }

    /// Reads a field through the parent chain, `Undefined` when absent.
    pub fn get(&self, name: &str) -> Value {
        self.lookup(name).unwrap_or_default()
    }

    /// Writes a field on this scope, shadowing any inherited value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.fields.borrow_mut().insert(name.into(), value.into());
    }

    /// Removes a local field, uncovering any inherited value.
    pub fn unset(&self, name: &str) -> Option<Value> {
        self.inner.fields.borrow_mut().remove(name)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.inner.fields.borrow().contains_key(name)
    }

    /// Copy of the fields set directly on this scope.
    pub fn own_fields(&self) -> BTreeMap<String, Value> {
        self.inner.fields.borrow().clone()
    }

    /// Calls a function field (own or inherited) with this scope as context.
    pub fn call(&self, name: &str, args: &[Value]) -> RtResult<Value> {
        match self.lookup(name) {
            Some(Value::Function(function)) => function.call(self, args),
            Some(_) => Err(EvalError::NotCallable(name.to_string()).into()),
            None => Err(EvalError::UnknownReference(name.to_string()).into()),
        }
    }

    // ----- Tree -----

    /// Creates a child scope whose reads fall back to this scope.
    pub fn new_child(&self) -> Scope {
        let ctx = self.inner.ctx.clone();
        let id = ctx.allocate_scope_id();
        let child = Self::with_parts(id, Some(Rc::downgrade(&self.inner)), ctx);
        self.inner.children.borrow_mut().push(child.clone());
        tracing::trace!(parent = %self.id(), child = %id, "scope created");
        child
    }

    /// Detaches this scope from its parent's child list.
    ///
    /// The subtree is no longer visited by digests started above it. Destroying
    /// the root or an already destroyed scope does nothing.
    pub fn destroy(&self) {
        if self.is_root() {
            tracing::warn!(scope = %self.id(), "destroy called on root scope; ignored");
            return;
        }
        if self.inner.destroyed.replace(true) {
            return;
        }
        if let Some(parent) = self.parent() {
            parent
                .inner
                .children
                .borrow_mut()
                .retain(|child| !child.ptr_eq(self));
        }
        tracing::trace!(scope = %self.id(), "scope destroyed");
    }

    // ----- Evaluation -----

    /// Evaluates an expression against this scope.
    ///
    /// Closures run with this scope and their errors propagate. Source text
    /// failures (unknown names, syntax errors, type errors) yield
    /// `Value::Undefined` in [`EvalMode::Lenient`] and `RtError::Eval` in
    /// [`EvalMode::Strict`].
    pub fn eval(&self, expression: impl Into<Expression>) -> RtResult<Value> {
        self.evaluate_expression(&expression.into())
    }

    /// Evaluates source text and reports failures as a typed result,
    /// regardless of the configured mode.
    pub fn eval_source(&self, text: &str) -> Result<Value, EvalError> {
        expr::evaluate(&expr::parse(text)?, self)
    }

    pub(crate) fn evaluate_expression(&self, expression: &Expression) -> RtResult<Value> {
        match expression {
            Expression::Callable(f) => f(self),
            Expression::Source(compiled) => {
                let outcome = compiled
                    .ast()
                    .map_err(Clone::clone)
                    .and_then(|ast| expr::evaluate(ast, self));
                match outcome {
                    Ok(value) => Ok(value),
                    Err(error) => match self.config().eval_mode {
                        EvalMode::Lenient => {
                            tracing::trace!(
                                scope = %self.id(),
                                expression = compiled.text(),
                                %error,
                                "expression failed; evaluating to undefined"
                            );
                            Ok(Value::Undefined)
                        }
                        EvalMode::Strict => Err(RtError::Eval(error)),
                    },
                }
            }
        }
    }

    #[cfg(feature = "diagnostics")]
    pub fn debug_tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    #[cfg(feature = "diagnostics")]
    fn write_tree(&self, out: &mut String, depth: usize) {
        let fields: Vec<String> = self.inner.fields.borrow().keys().cloned().collect();
        out.push_str(&format!(
            "{}scope {} [{} watchers] {{{}}}\n",
            "  ".repeat(depth),
            self.id(),
            self.watcher_count(),
            fields.join(", ")
        ));
        for child in self.children() {
            child.write_tree(out, depth + 1);
        }
    }
}

impl Namespace for Scope {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.lookup(name)
    }

    fn assign(&self, name: &str, value: Value) {
        self.set(name, value);
    }

    fn call(&self, function: &Function, args: &[Value]) -> RtResult<Value> {
        function.call(self, args)
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id())
            .field("fields", &self.inner.fields.borrow().keys().collect::<Vec<_>>())
            .field("watchers", &self.watcher_count())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_allocated_per_tree() {
        let root = Scope::root();
        let a = root.new_child();
        let b = a.new_child();
        assert_eq!(root.id(), ScopeId(0));
        assert_eq!(a.id(), ScopeId(1));
        assert_eq!(b.id(), ScopeId(2));

        let other = Scope::root();
        assert_eq!(other.id(), ScopeId(0));
    }

    #[test]
    fn test_unset_uncovers_inherited_value() {
        let root = Scope::root();
        root.set("x", 1);
        let child = root.new_child();
        child.set("x", 2);
        assert_eq!(child.unset("x"), Some(Value::from(2)));
        assert_eq!(child.get("x"), Value::from(1));
    }

    #[test]
    fn test_read_stops_at_dropped_parent() {
        let root = Scope::root();
        root.set("x", 1);
        let child = root.new_child();
        child.destroy();
        drop(root);
        assert_eq!(child.lookup("x"), None);
        assert!(child.parent().is_none());
        assert!(!child.is_attached());
    }

    #[test]
    fn test_call_reports_non_functions() {
        let scope = Scope::root();
        scope.set("n", 1);
        assert!(matches!(
            scope.call("n", &[]),
            Err(RtError::Eval(EvalError::NotCallable(_)))
        ));
        assert!(matches!(
            scope.call("missing", &[]),
            Err(RtError::Eval(EvalError::UnknownReference(_)))
        ));
    }
}
