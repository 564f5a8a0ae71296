//! The built-in `ngl-*` directives.

use crate::error::{RtError, RtResult};
use crate::expr::Expression;
use crate::registration::Factory;
use crate::registry::{Module, Registry, WeakRegistry};

use super::directive::DirectiveDefinition;

pub const BIND: &str = "ngl-bind";
pub const MODEL: &str = "ngl-model";
pub const CLICK: &str = "ngl-click";
pub const CONTROLLER: &str = "ngl-controller";

/// Registers `ngl-bind`, `ngl-model`, `ngl-click` and `ngl-controller`.
///
/// - `ngl-bind="expr"` renders the value of `expr` as the element text and
///   keeps it updated.
/// - `ngl-model="field"` writes the control value to `field` and digests on
///   keyup; changes to `field` are written back to the control.
/// - `ngl-click="expr"` evaluates `expr` and digests on click.
/// - `ngl-controller="Name"` gives the element its own scope and runs the
///   controller registered as `Name` with `$scope` bound to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinDirectives;

impl Module for BuiltinDirectives {
    fn configure(self, registry: &Registry) -> RtResult<()> {
        registry.register_directive(BIND, Factory::new(|_| Ok(bind())));
        registry.register_directive(MODEL, Factory::new(|_| Ok(model())));
        registry.register_directive(CLICK, Factory::new(|_| Ok(click())));
        let weak = registry.downgrade();
        registry.register_directive(
            CONTROLLER,
            Factory::new(move |_| Ok(controller(weak.clone()))),
        );
        Ok(())
    }
}

fn bind() -> DirectiveDefinition {
    DirectiveDefinition::new(|element, scope, source| {
        let expression = Expression::parse(source);
        element.set_text(scope.eval(&expression)?.to_string());
        let target = element.clone();
        scope.watch(expression, move |value, _| {
            target.set_text(value.to_string());
            Ok(())
        })
    })
}

fn model() -> DirectiveDefinition {
    DirectiveDefinition::new(|element, scope, field| {
        let weak = scope.downgrade();
        let name = field.to_string();
        element.set_on_keyup(move |el| {
            let Some(scope) = weak.upgrade() else {
                return Ok(());
            };
            scope.set(name.as_str(), el.value());
            scope.digest().map(|_| ())
        });
        let target = element.clone();
        scope.watch(field, move |value, _| {
            target.set_value(value.to_string());
            Ok(())
        })
    })
}

fn click() -> DirectiveDefinition {
    DirectiveDefinition::new(|element, scope, source| {
        let expression = Expression::parse(source);
        let weak = scope.downgrade();
        element.set_on_click(move |_| {
            let Some(scope) = weak.upgrade() else {
                return Ok(());
            };
            scope.eval(&expression)?;
            scope.digest().map(|_| ())
        });
        Ok(())
    })
}

fn controller(registry: WeakRegistry) -> DirectiveDefinition {
    DirectiveDefinition::new(move |_, scope, name| {
        let registry = registry
            .upgrade()
            .ok_or_else(|| RtError::custom("registry dropped before controller link"))?;
        registry.instantiate_controller(name, scope).map(|_| ())
    })
    .with_own_scope()
}
