//! Provider descriptors for introspection and diagnostics.

use crate::key::ProviderKind;

/// Snapshot of one catalogue entry.
///
/// # Examples
///
/// ```rust
/// use nglite::{Factory, Locals, ProviderKind, Registry};
///
/// let registry = Registry::new();
/// registry.register_service("clock", Factory::value(0u64));
/// registry.register_controller("Main", Factory::inject(["$scope", "clock"], |_| Ok(())));
/// registry.get("clock", &Locals::new()).unwrap();
///
/// let descriptors = registry.descriptors();
/// let main = descriptors.iter().find(|d| d.name == "MainController").unwrap();
/// assert_eq!(main.kind, ProviderKind::Controller);
/// assert_eq!(main.dependencies, vec!["$scope", "clock"]);
/// assert!(!main.cached);
///
/// let clock = descriptors.iter().find(|d| d.name == "clock").unwrap();
/// assert!(clock.cached);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Catalogue name, including any kind suffix
    pub name: String,
    pub kind: ProviderKind,
    /// Declared dependencies in argument order
    pub dependencies: Vec<String>,
    /// Whether a resolved value is memoized
    pub cached: bool,
}

impl ProviderDescriptor {
    /// Name without the kind suffix.
    pub fn short_name(&self) -> &str {
        self.name
            .strip_suffix(self.kind.suffix())
            .unwrap_or(&self.name)
    }
}
