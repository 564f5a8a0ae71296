//! Per-call dependency overrides.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::registration::AnyRc;
use crate::scope::Scope;

/// Name under which a controller receives its scope.
pub const SCOPE_LOCAL: &str = "$scope";

/// Values that take precedence over registered providers for one resolution.
///
/// # Examples
///
/// ```rust
/// use nglite::{Factory, Locals, Registry, Resolver, Scope};
///
/// let registry = Registry::new();
/// let scope = Scope::root();
/// let factory = Factory::inject(["$scope", "label"], |args| {
///     args.scope(0)?.set("label", args.get::<String>(1)?.as_str());
///     Ok(())
/// });
///
/// let locals = Locals::new()
///     .with_scope(scope.clone())
///     .with("label", String::from("ready"));
/// registry.invoke(&factory, &locals).unwrap();
/// assert_eq!(scope.get("label").as_str(), Some("ready"));
/// ```
#[derive(Clone, Default)]
pub struct Locals {
    values: HashMap<String, AnyRc>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.with_rc(name, Rc::new(value))
    }

    pub fn with_rc(mut self, name: impl Into<String>, value: AnyRc) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Binds `$scope`.
    pub fn with_scope(self, scope: Scope) -> Self {
        self.with(SCOPE_LOCAL, scope)
    }

    pub fn get(&self, name: &str) -> Option<AnyRc> {
        self.values.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Locals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}
