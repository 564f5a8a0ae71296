//! Resolver traits for provider resolution.

use std::rc::Rc;

use crate::error::{RtError, RtResult};
use crate::registration::AnyRc;
use crate::registry::Locals;

/// Object-safe resolution by provider name.
///
/// Most callers use [`Resolver`], which adds typed access on top.
pub trait ResolverCore {
    /// Resolves `name`, running and caching its provider on first use.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyRc)` - the cached value
    /// * `Err(RtError::UnregisteredDependency)` - no provider for `name`
    /// * `Err(_)` - the provider (or one of its dependencies) failed
    fn resolve_any(&self, name: &str, locals: &Locals) -> RtResult<AnyRc>;
}

/// Typed resolution built on [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use nglite::{Factory, Locals, Registry, Resolver};
///
/// let registry = Registry::new();
/// registry.register_service("name", Factory::value(String::from("nglite")));
///
/// let name = registry.get_as::<String>("name", &Locals::new()).unwrap();
/// assert_eq!(name.as_str(), "nglite");
///
/// assert!(registry.try_get::<u32>("name").is_none());
/// assert!(registry.try_get::<String>("missing").is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `name` and downcasts the value to `T`.
    fn get_as<T: 'static>(&self, name: &str, locals: &Locals) -> RtResult<Rc<T>> {
        self.resolve_any(name, locals)?
            .downcast::<T>()
            .map_err(|_| RtError::type_mismatch::<T>(name))
    }

    /// Like [`get_as`](Self::get_as) without locals, discarding failures.
    fn try_get<T: 'static>(&self, name: &str) -> Option<Rc<T>> {
        self.get_as::<T>(name, &Locals::new()).ok()
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
