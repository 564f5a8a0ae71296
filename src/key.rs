//! Provider kinds and name qualification.

use std::fmt;

/// Suffix appended to directive names in the provider catalogue.
pub const DIRECTIVE_SUFFIX: &str = "Directive";

/// Suffix appended to controller names in the provider catalogue.
pub const CONTROLLER_SUFFIX: &str = "Controller";

/// Kind of a registered provider.
///
/// All three kinds share one catalogue. Directives and controllers are kept
/// apart from services (and from each other) by a name suffix, so a service
/// `"main"`, a directive `"mainDirective"` and a controller `"mainController"`
/// never collide.
///
/// The kinds differ in what a cached resolution yields:
///
/// - **Service**: the value the factory computed
/// - **Directive**: the [`DirectiveDefinition`](crate::DirectiveDefinition) the factory computed
/// - **Controller**: the user's controller [`Factory`](crate::Factory) itself, unexecuted
///
/// # Examples
///
/// ```rust
/// use nglite::ProviderKind;
///
/// assert_eq!(ProviderKind::Service.qualify("greeter"), "greeter");
/// assert_eq!(ProviderKind::Directive.qualify("ngl-bind"), "ngl-bindDirective");
/// assert_eq!(ProviderKind::Controller.qualify("Main"), "MainController");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Service,
    Directive,
    Controller,
}

impl ProviderKind {
    /// Namespace suffix for this kind (empty for services).
    pub fn suffix(self) -> &'static str {
        match self {
            ProviderKind::Service => "",
            ProviderKind::Directive => DIRECTIVE_SUFFIX,
            ProviderKind::Controller => CONTROLLER_SUFFIX,
        }
    }

    /// Kind implied by a catalogue name's suffix.
    ///
    /// ```rust
    /// use nglite::ProviderKind;
    ///
    /// assert_eq!(ProviderKind::of("fooDirective"), ProviderKind::Directive);
    /// assert_eq!(ProviderKind::of("MainController"), ProviderKind::Controller);
    /// assert_eq!(ProviderKind::of("Directive"), ProviderKind::Service);
    /// ```
    pub fn of(name: &str) -> Self {
        let suffixed = |suffix: &str| name.len() > suffix.len() && name.ends_with(suffix);
        if suffixed(DIRECTIVE_SUFFIX) {
            ProviderKind::Directive
        } else if suffixed(CONTROLLER_SUFFIX) {
            ProviderKind::Controller
        } else {
            ProviderKind::Service
        }
    }

    /// Catalogue name for a provider of this kind.
    pub fn qualify(self, name: &str) -> String {
        let mut qualified = String::with_capacity(name.len() + self.suffix().len());
        qualified.push_str(name);
        qualified.push_str(self.suffix());
        qualified
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Service => f.write_str("service"),
            ProviderKind::Directive => f.write_str("directive"),
            ProviderKind::Controller => f.write_str("controller"),
        }
    }
}
