//! Named provider catalogue with a memoizing resolver.
//!
//! The registry is an explicit object: construct one per application and pass
//! it to whatever compiles against it. Resolution is by name. A factory's
//! declared dependencies are resolved in order, each from the caller's
//! [`Locals`] first and otherwise through [`Registry::get`]. Resolved values
//! are cached under their name for the lifetime of the registry; the cache is
//! seeded with `$rootScope`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

use crate::compiler::DirectiveDefinition;
use crate::config::RuntimeConfig;
use crate::descriptors::ProviderDescriptor;
use crate::error::{RtError, RtResult};
use crate::internal::RuntimeContext;
use crate::key::ProviderKind;
use crate::observer::RuntimeObserver;
use crate::registration::{AnyRc, Args, Factory, Registration};
use crate::scope::Scope;
use crate::traits::{Resolver, ResolverCore};

mod locals;
mod module;

pub use locals::{Locals, SCOPE_LOCAL};
pub use module::Module;

/// Name under which the root scope is pre-cached.
pub const ROOT_SCOPE: &str = "$rootScope";

#[cfg(feature = "ahash")]
type Map<K, V> = ahash::AHashMap<K, V>;
#[cfg(not(feature = "ahash"))]
type Map<K, V> = std::collections::HashMap<K, V>;

struct RegistryInner {
    providers: RefCell<Map<String, Registration>>,
    cache: RefCell<Map<String, AnyRc>>,
    ctx: Rc<RuntimeContext>,
    root: Scope,
}

/// Provider catalogue and singleton cache.
///
/// Cloning yields another handle to the same registry.
///
/// # Examples
///
/// ```rust
/// use nglite::{Factory, Locals, Registry, Resolver};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let runs = Rc::new(Cell::new(0));
/// let counter = runs.clone();
///
/// let registry = Registry::new();
/// registry.register_service("config", Factory::new(move |_| {
///     counter.set(counter.get() + 1);
///     Ok(String::from("loaded"))
/// }));
///
/// let a = registry.get_as::<String>("config", &Locals::new()).unwrap();
/// let b = registry.get_as::<String>("config", &Locals::new()).unwrap();
/// assert!(Rc::ptr_eq(&a, &b));
/// assert_eq!(runs.get(), 1);
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Rc<RegistryInner>,
}

/// Non-owning handle to a registry, for closures stored inside it.
#[derive(Clone)]
pub struct WeakRegistry {
    inner: Weak<RegistryInner>,
}

impl WeakRegistry {
    pub fn upgrade(&self) -> Option<Registry> {
        self.inner.upgrade().map(|inner| Registry { inner })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates a registry whose root scope tree uses `config`.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let ctx = Rc::new(RuntimeContext::new(config));
        let root = Scope::root_in(ctx.clone());
        let mut cache = Map::default();
        cache.insert(ROOT_SCOPE.to_string(), Rc::new(root.clone()) as AnyRc);
        Self {
            inner: Rc::new(RegistryInner {
                providers: RefCell::new(Map::default()),
                cache: RefCell::new(cache),
                ctx,
                root,
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.ctx.config
    }

    /// The pre-cached `$rootScope`.
    pub fn root_scope(&self) -> Scope {
        self.inner.root.clone()
    }

    /// Registers an observer for resolution and change detection events.
    pub fn add_observer(&self, observer: Rc<dyn RuntimeObserver>) {
        self.inner.ctx.observers.add(observer);
    }

    pub fn add_module<M: Module>(&self, module: M) -> RtResult<&Self> {
        module.configure(self)?;
        Ok(self)
    }

    pub fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ----- Registration -----

    /// Inserts or replaces the provider stored under `name` as-is.
    ///
    /// The factory is not run and is never wrapped; its kind is read from the
    /// name suffix for introspection only. A value already cached under `name`
    /// stays cached.
    pub fn register(&self, name: impl Into<String>, factory: Factory) {
        let name = name.into();
        let kind = ProviderKind::of(&name);
        self.insert(name, Registration::new(kind, factory));
    }

    pub fn register_service(&self, name: &str, factory: Factory) {
        self.insert(
            ProviderKind::Service.qualify(name),
            Registration::new(ProviderKind::Service, factory),
        );
    }

    /// Registers a directive under `name + "Directive"`. The factory must
    /// produce a [`DirectiveDefinition`].
    pub fn register_directive(&self, name: &str, factory: Factory) {
        self.insert(
            ProviderKind::Directive.qualify(name),
            Registration::new(ProviderKind::Directive, factory),
        );
    }

    /// Registers a controller under `name + "Controller"`.
    ///
    /// Resolving the controller yields `factory` itself, unexecuted; run it
    /// against a scope with [`Registry::instantiate_controller`] or
    /// [`Registry::invoke`].
    pub fn register_controller(&self, name: &str, factory: Factory) {
        self.insert(
            ProviderKind::Controller.qualify(name),
            Registration::controller(factory),
        );
    }

    fn insert(&self, name: String, registration: Registration) {
        tracing::trace!(provider = %name, kind = %registration.kind, "provider registered");
        self.inner.providers.borrow_mut().insert(name, registration);
    }

    // ----- Resolution -----

    /// Returns the cached value for `name`, running its provider on first use.
    ///
    /// An unknown name yields [`RtError::UnregisteredDependency`]. Failed
    /// resolutions are not cached.
    pub fn get(&self, name: &str, locals: &Locals) -> RtResult<AnyRc> {
        if let Some(value) = self.cached(name) {
            return Ok(value);
        }

        let factory = self
            .inner
            .providers
            .borrow()
            .get(name)
            .map(|registration| registration.factory.clone());
        let Some(factory) = factory else {
            tracing::debug!(provider = name, "unregistered dependency");
            self.inner.ctx.observers.unregistered(name);
            return Err(RtError::UnregisteredDependency(name.to_string()));
        };

        self.inner.ctx.observers.resolving(name);
        let start = Instant::now();
        let value = self.invoke(&factory, locals)?;
        let elapsed = start.elapsed();
        self.inner.ctx.observers.resolved(name, elapsed);
        tracing::debug!(provider = name, ?elapsed, "provider resolved");

        self.inner
            .cache
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Calls `factory` with its declared dependencies resolved in order.
    ///
    /// Each dependency comes from `locals` when present there, otherwise from
    /// [`Registry::get`]. A dependency nobody provides is passed as an absent
    /// argument rather than failing the call.
    pub fn invoke(&self, factory: &Factory, locals: &Locals) -> RtResult<AnyRc> {
        let mut entries = Vec::with_capacity(factory.dependencies().len());
        for name in factory.dependencies() {
            let value = match locals.get(name) {
                Some(value) => Some(value),
                None if self.is_resolvable(name) => Some(self.get(name, locals)?),
                None => {
                    tracing::debug!(provider = %name, "dependency absent");
                    self.inner.ctx.observers.unregistered(name);
                    None
                }
            };
            entries.push((name.clone(), value));
        }
        factory.call(&Args::new(entries))
    }

    /// Typed [`Registry::invoke`].
    pub fn invoke_as<T: 'static>(&self, factory: &Factory, locals: &Locals) -> RtResult<Rc<T>> {
        self.invoke(factory, locals)?
            .downcast::<T>()
            .map_err(|_| RtError::type_mismatch::<T>("<invoke>"))
    }

    /// Ordered dependency names `factory` declares.
    pub fn annotate(&self, factory: &Factory) -> Vec<String> {
        factory.dependencies().to_vec()
    }

    /// Resolves the directive registered as `name`.
    pub fn directive(&self, name: &str) -> RtResult<Rc<DirectiveDefinition>> {
        self.get_as::<DirectiveDefinition>(&ProviderKind::Directive.qualify(name), &Locals::new())
    }

    /// Resolves the controller registered as `name` to its unexecuted factory.
    pub fn controller(&self, name: &str) -> RtResult<Factory> {
        self.get_as::<Factory>(&ProviderKind::Controller.qualify(name), &Locals::new())
            .map(|factory| Factory::clone(&factory))
    }

    /// Runs controller `name` with `$scope` bound to `scope`.
    pub fn instantiate_controller(&self, name: &str, scope: &Scope) -> RtResult<AnyRc> {
        let factory = self.controller(name)?;
        tracing::debug!(controller = name, scope = %scope.id(), "instantiating controller");
        self.invoke(&factory, &Locals::new().with_scope(scope.clone()))
    }

    // ----- Introspection -----

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.providers.borrow().contains_key(name)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.inner.cache.borrow().contains_key(name)
    }

    pub(crate) fn is_resolvable(&self, name: &str) -> bool {
        self.is_cached(name) || self.is_registered(name)
    }

    fn cached(&self, name: &str) -> Option<AnyRc> {
        self.inner.cache.borrow().get(name).cloned()
    }

    /// Descriptors for every registered provider, sorted by name.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        let cache = self.inner.cache.borrow();
        let mut descriptors: Vec<ProviderDescriptor> = self
            .inner
            .providers
            .borrow()
            .iter()
            .map(|(name, registration)| ProviderDescriptor {
                name: name.clone(),
                kind: registration.kind,
                dependencies: registration.declared.clone(),
                cached: cache.contains_key(name),
            })
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut out = String::from("Registry {\n");
        for descriptor in self.descriptors() {
            out.push_str(&format!(
                "  {} [{}] <- [{}]{}\n",
                descriptor.name,
                descriptor.kind,
                descriptor.dependencies.join(", "),
                if descriptor.cached { " (cached)" } else { "" }
            ));
        }
        out.push('}');
        out
    }
}

impl ResolverCore for Registry {
    fn resolve_any(&self, name: &str, locals: &Locals) -> RtResult<AnyRc> {
        self.get(name, locals)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.inner.providers.borrow().len())
            .field("cached", &self.inner.cache.borrow().len())
            .field("root", &self.inner.root.id())
            .finish()
    }
}
