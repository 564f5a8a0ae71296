//! Grouped provider registration.

use crate::error::RtResult;

use super::Registry;

/// A bundle of providers registered together.
///
/// # Examples
///
/// ```rust
/// use nglite::{Factory, Module, Registry, RtResult};
///
/// struct Greetings;
///
/// impl Module for Greetings {
///     fn configure(self, registry: &Registry) -> RtResult<()> {
///         registry.register_service("greeting", Factory::value(String::from("hello")));
///         Ok(())
///     }
/// }
///
/// let registry = Registry::new();
/// registry.add_module(Greetings).unwrap();
/// assert!(registry.is_registered("greeting"));
/// ```
pub trait Module {
    /// Registers this module's providers.
    fn configure(self, registry: &Registry) -> RtResult<()>;
}

impl<F> Module for F
where
    F: FnOnce(&Registry) -> RtResult<()>,
{
    fn configure(self, registry: &Registry) -> RtResult<()> {
        self(registry)
    }
}
