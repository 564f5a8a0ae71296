//! Binds markup to scopes through registered directives.
//!
//! The compiler walks an [`Element`] tree. Every attribute whose name has a
//! directive registered under `name + "Directive"` is linked, in attribute
//! order, with the attribute value. The first directive on an element that
//! requires its own scope gets a fresh child scope; later directives on that
//! element and all descendants link against it.

use std::rc::Rc;

use crate::error::RtResult;
use crate::key::ProviderKind;
use crate::registry::{Locals, Registry, ROOT_SCOPE};
use crate::scope::Scope;
use crate::traits::Resolver;

mod builtins;
mod directive;
mod dom;

pub use builtins::BuiltinDirectives;
pub use directive::{DirectiveDefinition, LinkFn};
pub use dom::{Element, Handler};

/// Walks element trees against a registry.
///
/// # Examples
///
/// ```rust
/// use nglite::{BuiltinDirectives, Compiler, Element, Factory, Registry};
///
/// let registry = Registry::new();
/// registry.add_module(BuiltinDirectives).unwrap();
/// registry.register_controller("Greeter", Factory::inject(["$scope"], |args| {
///     args.scope(0)?.set("name", "world");
///     Ok(())
/// }));
///
/// let label = Element::new("span").with_attribute("ngl-bind", "'hello ' + name");
/// let page = Element::new("div")
///     .with_attribute("ngl-controller", "Greeter")
///     .with_child(label.clone());
///
/// Compiler::new(&registry).bootstrap(&page).unwrap();
/// assert_eq!(label.text(), "hello world");
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: Registry,
}

impl Compiler {
    pub fn new(registry: &Registry) -> Self {
        Self {
            registry: registry.clone(),
        }
    }

    /// Compiles the top-level element against `$rootScope` and returns it.
    pub fn bootstrap(&self, document: &Element) -> RtResult<Scope> {
        let root = self.registry.get_as::<Scope>(ROOT_SCOPE, &Locals::new())?;
        let root = Scope::clone(&root);
        tracing::debug!(tag = %document.tag(), "bootstrapping");
        self.compile(document, &root)?;
        Ok(root)
    }

    /// Links the directives of `element` and its descendants.
    pub fn compile(&self, element: &Element, scope: &Scope) -> RtResult<()> {
        let mut scope = scope.clone();
        let mut own_scope = false;
        for (name, value, definition) in self.element_directives(element)? {
            if definition.requires_own_scope && !own_scope {
                scope = scope.new_child();
                own_scope = true;
            }
            tracing::trace!(directive = %name, scope = %scope.id(), "linking directive");
            definition.link(element, &scope, &value)?;
        }
        for child in element.children() {
            self.compile(&child, &scope)?;
        }
        Ok(())
    }

    fn element_directives(
        &self,
        element: &Element,
    ) -> RtResult<Vec<(String, String, Rc<DirectiveDefinition>)>> {
        let mut directives = Vec::new();
        for (name, value) in element.attributes() {
            if !self
                .registry
                .is_resolvable(&ProviderKind::Directive.qualify(&name))
            {
                continue;
            }
            let definition = self.registry.directive(&name)?;
            directives.push((name, value, definition));
        }
        Ok(directives)
    }
}
