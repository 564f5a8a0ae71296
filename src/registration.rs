//! Provider factories and their resolved arguments.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::{RtError, RtResult};
use crate::key::ProviderKind;
use crate::scope::Scope;

/// Type-erased shared value held by the provider cache.
pub type AnyRc = Rc<dyn Any>;

type FactoryFn = dyn Fn(&Args) -> RtResult<AnyRc>;

/// A provider body together with the ordered names of the dependencies it
/// declares.
///
/// Dependencies are resolved by name, in declaration order, and handed to the
/// body as [`Args`].
///
/// # Examples
///
/// ```rust
/// use nglite::{Factory, Locals, Registry, Resolver};
///
/// let registry = Registry::new();
/// registry.register_service("base", Factory::value(40u32));
/// registry.register_service(
///     "answer",
///     Factory::inject(["base"], |args| Ok(*args.get::<u32>(0)? + 2)),
/// );
///
/// let answer = registry.get_as::<u32>("answer", &Locals::new()).unwrap();
/// assert_eq!(*answer, 42);
/// ```
#[derive(Clone)]
pub struct Factory {
    dependencies: Rc<[String]>,
    body: Rc<FactoryFn>,
}

impl Factory {
    /// Factory without dependencies.
    pub fn new<T, F>(f: F) -> Self
    where
        T: 'static,
        F: Fn(&Args) -> RtResult<T> + 'static,
    {
        Self::inject(std::iter::empty::<&str>(), f)
    }

    /// Factory declaring the names of its dependencies, in argument order.
    pub fn inject<I, S, T, F>(dependencies: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: 'static,
        F: Fn(&Args) -> RtResult<T> + 'static,
    {
        Self::raw(dependencies, move |args| Ok(Rc::new(f(args)?) as AnyRc))
    }

    /// Factory whose body produces the type-erased value directly.
    pub fn raw<I, S, F>(dependencies: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Args) -> RtResult<AnyRc> + 'static,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::<String>::into).collect(),
            body: Rc::new(f),
        }
    }

    /// Factory yielding the same shared value on every call.
    pub fn value<T: 'static>(value: T) -> Self {
        let value: AnyRc = Rc::new(value);
        Self::raw(std::iter::empty::<&str>(), move |_| Ok(value.clone()))
    }

    /// Declared dependency names in argument order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub(crate) fn call(&self, args: &Args) -> RtResult<AnyRc> {
        (self.body)(args)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Positional arguments resolved for a factory call.
///
/// A dependency with no provider is passed as an absent entry; the failure
/// surfaces as [`RtError::UnregisteredDependency`] only when the factory reads
/// it.
pub struct Args {
    entries: Vec<(String, Option<AnyRc>)>,
}

impl Args {
    pub(crate) fn new(entries: Vec<(String, Option<AnyRc>)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dependency name declared at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    /// Untyped argument, `None` when absent or out of range.
    pub fn raw(&self, index: usize) -> Option<&AnyRc> {
        self.entries.get(index).and_then(|(_, value)| value.as_ref())
    }

    /// Typed argument.
    pub fn get<T: 'static>(&self, index: usize) -> RtResult<Rc<T>> {
        let Some((name, value)) = self.entries.get(index) else {
            return Err(RtError::UnregisteredDependency(format!("argument #{}", index)));
        };
        let value = value
            .clone()
            .ok_or_else(|| RtError::UnregisteredDependency(name.clone()))?;
        value
            .downcast::<T>()
            .map_err(|_| RtError::type_mismatch::<T>(name.clone()))
    }

    /// Typed argument, `None` when absent or of another type.
    pub fn get_opt<T: 'static>(&self, index: usize) -> Option<Rc<T>> {
        self.raw(index).cloned().and_then(|value| value.downcast::<T>().ok())
    }

    /// Scope argument, typically declared as `$scope` or `$rootScope`.
    pub fn scope(&self, index: usize) -> RtResult<Scope> {
        self.get::<Scope>(index).map(|scope| Scope::clone(&scope))
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|(name, value)| (name, if value.is_some() { "resolved" } else { "absent" })),
            )
            .finish()
    }
}

/// Catalogue entry for one provider.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) kind: ProviderKind,
    pub(crate) factory: Factory,
    /// Dependencies the user declared; for controllers these belong to the
    /// wrapped factory rather than the registered thunk.
    pub(crate) declared: Vec<String>,
}

impl Registration {
    pub(crate) fn new(kind: ProviderKind, factory: Factory) -> Self {
        let declared = factory.dependencies().to_vec();
        Self {
            kind,
            factory,
            declared,
        }
    }

    /// Wraps a controller so that resolving it yields the factory itself.
    pub(crate) fn controller(factory: Factory) -> Self {
        let declared = factory.dependencies().to_vec();
        Self {
            kind: ProviderKind::Controller,
            factory: Factory::value(factory),
            declared,
        }
    }
}
