use nglite::{
    BuiltinDirectives, Compiler, DirectiveDefinition, Element, Factory, Registry, RtError,
    RtResult, Scope, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

fn registry() -> Registry {
    let registry = Registry::new();
    registry.add_module(BuiltinDirectives).unwrap();
    registry.register_controller(
        "MainCtrl",
        Factory::inject(["$scope"], |args| {
            let scope = args.scope(0)?;
            scope.set("bar", 0);
            scope.set(
                "foo",
                Value::function(|scope, _| {
                    let bar = scope.get("bar").as_f64().unwrap_or(0.0);
                    scope.set("bar", bar + 1.0);
                    Ok(Value::Undefined)
                }),
            );
            Ok(())
        }),
    );
    registry
}

#[test]
fn test_bootstrap_counter_page() {
    let registry = registry();
    let label = Element::new("span").with_attribute("ngl-bind", "bar");
    let button = Element::new("button").with_attribute("ngl-click", "foo()");
    let page = Element::new("html").with_child(
        Element::new("div")
            .with_attribute("ngl-controller", "MainCtrl")
            .with_child(label.clone())
            .with_child(button.clone()),
    );

    let root = Compiler::new(&registry).bootstrap(&page).unwrap();
    assert!(root.ptr_eq(&registry.root_scope()));
    assert_eq!(label.text(), "0");

    button.click().unwrap();
    assert_eq!(label.text(), "1");
    button.click().unwrap();
    assert_eq!(label.text(), "2");

    // The controller ran on its own child scope.
    assert_eq!(root.children().len(), 1);
    assert!(!root.has_own("bar"));
}

#[test]
fn test_model_binds_both_ways() {
    let registry = registry();
    let input = Element::new("input").with_attribute("ngl-model", "name");
    let echo = Element::new("p").with_attribute("ngl-bind", "name");
    let page = Element::new("form").with_child(input.clone()).with_child(echo.clone());

    let root = Compiler::new(&registry).bootstrap(&page).unwrap();

    input.type_text("Grace").unwrap();
    assert_eq!(root.get("name"), Value::from("Grace"));
    assert_eq!(echo.text(), "Grace");

    root.set("name", "Ada");
    root.digest().unwrap();
    assert_eq!(input.value(), "Ada");
    assert_eq!(echo.text(), "Ada");
}

#[test]
fn test_unknown_attributes_are_ignored() {
    let registry = registry();
    let page = Element::new("div")
        .with_attribute("class", "wide")
        .with_attribute("ngl-unknown", "x");
    let root = Compiler::new(&registry).bootstrap(&page).unwrap();
    assert!(root.children().is_empty());
    assert_eq!(root.watcher_count(), 0);
}

#[test]
fn test_one_scope_per_element_and_attribute_order() {
    let registry = Registry::new();
    let log: Rc<RefCell<Vec<(String, u64)>>> = Rc::new(RefCell::new(Vec::new()));

    for name in ["first", "second"] {
        let log = log.clone();
        registry.register_directive(
            name,
            Factory::new(move |_| {
                let log = log.clone();
                Ok(DirectiveDefinition::new(move |_, scope, value| {
                    log.borrow_mut().push((value.to_string(), scope.id().0));
                    Ok(())
                })
                .with_own_scope())
            }),
        );
    }

    let child = Element::new("i").with_attribute("first", "c");
    let page = Element::new("div")
        .with_attribute("second", "a")
        .with_attribute("first", "b")
        .with_child(child);

    let root = Scope::root();
    Compiler::new(&registry).compile(&page, &root).unwrap();

    // Both directives on `div` share scope 1; the child element gets scope 2.
    assert_eq!(
        *log.borrow(),
        vec![("a".to_string(), 1), ("b".to_string(), 1), ("c".to_string(), 2)]
    );
}

#[test]
fn test_link_failure_propagates() {
    let registry = Registry::new();
    registry.register_directive(
        "broken",
        Factory::new(|_| {
            Ok(DirectiveDefinition::new(|_, _, _| -> RtResult<()> {
                Err(RtError::custom("link failed"))
            }))
        }),
    );
    let page = Element::new("div").with_attribute("broken", "");
    let result = Compiler::new(&registry).bootstrap(&page);
    assert!(matches!(result, Err(RtError::Custom(msg)) if msg == "link failed"));
}

#[test]
fn test_directive_factory_runs_once() {
    let registry = registry();
    let a = Element::new("b").with_attribute("ngl-bind", "1 + 1");
    let b = Element::new("b").with_attribute("ngl-bind", "2 + 2");
    let page = Element::new("div").with_child(a.clone()).with_child(b.clone());
    Compiler::new(&registry).bootstrap(&page).unwrap();
    assert_eq!(a.text(), "2");
    assert_eq!(b.text(), "4");
    assert!(registry.is_cached("ngl-bindDirective"));
}

#[test]
fn test_missing_controller_fails_link() {
    let registry = registry();
    let page = Element::new("div").with_attribute("ngl-controller", "Nope");
    assert!(matches!(
        Compiler::new(&registry).bootstrap(&page),
        Err(RtError::UnregisteredDependency(name)) if name == "NopeController"
    ));
}
