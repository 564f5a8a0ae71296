//! Directive definitions.

use std::fmt;
use std::rc::Rc;

use crate::error::RtResult;
use crate::scope::Scope;

use super::dom::Element;

/// Link function: the element, the scope it is linked against, and the
/// attribute value (usually an expression).
pub type LinkFn = dyn Fn(&Element, &Scope, &str) -> RtResult<()>;

/// What a directive provider resolves to.
#[derive(Clone)]
pub struct DirectiveDefinition {
    /// Whether the element gets its own child scope before linking.
    pub requires_own_scope: bool,
    pub link: Rc<LinkFn>,
}

impl DirectiveDefinition {
    pub fn new<F>(link: F) -> Self
    where
        F: Fn(&Element, &Scope, &str) -> RtResult<()> + 'static,
    {
        Self {
            requires_own_scope: false,
            link: Rc::new(link),
        }
    }

    pub fn with_own_scope(mut self) -> Self {
        self.requires_own_scope = true;
        self
    }

    pub fn link(&self, element: &Element, scope: &Scope, value: &str) -> RtResult<()> {
        (self.link)(element, scope, value)
    }
}

impl fmt::Debug for DirectiveDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveDefinition")
            .field("requires_own_scope", &self.requires_own_scope)
            .finish_non_exhaustive()
    }
}
