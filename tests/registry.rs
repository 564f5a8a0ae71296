use nglite::{
    Factory, Locals, ProviderKind, Registry, Resolver, RtError, RtResult, Scope, Value,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn test_singleton_memoization() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();

    let registry = Registry::new();
    registry.register_service(
        "store",
        Factory::new(move |_| {
            counter.set(counter.get() + 1);
            Ok(vec![1u32, 2, 3])
        }),
    );

    let a = registry.get("store", &Locals::new()).unwrap();
    let b = registry.get("store", &Locals::new()).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(runs.get(), 1);
    assert!(registry.is_cached("store"));
}

#[test]
fn test_register_does_not_run_factory() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();

    let registry = Registry::new();
    registry.register(
        "lazy",
        Factory::new(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        }),
    );
    assert!(registry.is_registered("lazy"));
    assert!(!registry.is_cached("lazy"));
    assert_eq!(runs.get(), 0);
}

#[test]
fn test_order_preserving_resolution() {
    let registry = Registry::new();
    registry.register_service("a", Factory::value(String::from("from-registry-a")));
    registry.register_service("b", Factory::value(String::from("from-registry-b")));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let factory = Factory::inject(["b", "a"], move |args| {
        for i in 0..args.len() {
            sink.borrow_mut().push(args.get::<String>(i)?.to_string());
        }
        Ok(())
    });

    assert_eq!(registry.annotate(&factory), vec!["b", "a"]);

    let locals = Locals::new().with("a", String::from("from-locals-a"));
    registry.invoke(&factory, &locals).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec!["from-registry-b".to_string(), "from-locals-a".to_string()]
    );
}

#[test]
fn test_zero_dependency_factory_annotates_empty() {
    let registry = Registry::new();
    let factory = Factory::new(|args| Ok(args.len()));
    assert!(registry.annotate(&factory).is_empty());
    assert_eq!(*registry.invoke_as::<usize>(&factory, &Locals::new()).unwrap(), 0);
}

#[test]
fn test_unregistered_get_reports_error() {
    let registry = Registry::new();
    let err = registry.get("ghost", &Locals::new()).unwrap_err();
    assert!(matches!(err, RtError::UnregisteredDependency(ref name) if name == "ghost"));
    assert_eq!(err.to_string(), "unregistered dependency: ghost");
}

#[test]
fn test_unregistered_dependency_is_absent_until_used() {
    let registry = Registry::new();

    let tolerant = Factory::inject(["ghost"], |args| Ok(args.raw(0).is_none()));
    assert!(*registry.invoke_as::<bool>(&tolerant, &Locals::new()).unwrap());

    let strict = Factory::inject(["ghost"], |args| Ok(*args.get::<u8>(0)?));
    assert!(matches!(
        registry.invoke(&strict, &Locals::new()),
        Err(RtError::UnregisteredDependency(name)) if name == "ghost"
    ));
}

#[test]
fn test_type_mismatch() {
    let registry = Registry::new();
    registry.register_service("n", Factory::value(1u8));
    assert!(matches!(
        registry.get_as::<String>("n", &Locals::new()),
        Err(RtError::TypeMismatch { name, .. }) if name == "n"
    ));
    assert!(registry.try_get::<u8>("n").is_some());
}

#[test]
fn test_kinds_are_namespaced() {
    let registry = Registry::new();
    registry.register_service("main", Factory::value(1u8));
    registry.register_controller("main", Factory::new(|_| Ok(2u8)));

    assert!(registry.is_registered("main"));
    assert!(registry.is_registered(&ProviderKind::Controller.qualify("main")));
    assert_eq!(*registry.get_as::<u8>("main", &Locals::new()).unwrap(), 1);
}

#[test]
fn test_controller_resolves_to_unexecuted_factory() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();

    let registry = Registry::new();
    registry.register_controller(
        "Main",
        Factory::inject(["$scope"], move |args| {
            counter.set(counter.get() + 1);
            args.scope(0)?.set("count", 0);
            Ok(())
        }),
    );

    let first = registry.controller("Main").unwrap();
    let second = registry.controller("Main").unwrap();
    assert_eq!(first.dependencies(), second.dependencies());
    assert_eq!(runs.get(), 0);

    let resolved = registry.get("MainController", &Locals::new()).unwrap();
    let again = registry.get("MainController", &Locals::new()).unwrap();
    assert!(Rc::ptr_eq(&resolved, &again));
    assert!(resolved.downcast_ref::<Factory>().is_some());
    assert_eq!(runs.get(), 0);

    let a = registry.root_scope().new_child();
    let b = registry.root_scope().new_child();
    registry
        .invoke(&first, &Locals::new().with_scope(a.clone()))
        .unwrap();
    registry.instantiate_controller("Main", &b).unwrap();
    assert_eq!(runs.get(), 2);

    assert_eq!(a.get("count"), Value::from(0));
    assert_eq!(b.get("count"), Value::from(0));
    a.set("count", 5);
    assert_eq!(b.get("count"), Value::from(0));
    assert!(!registry.root_scope().has_own("count"));
}

#[test]
fn test_root_scope_injectable() {
    let registry = Registry::new();
    registry.register_service(
        "greeter",
        Factory::inject(["$rootScope"], |args| {
            args.scope(0)?.set("greeting", "hi");
            Ok(())
        }),
    );
    registry.get("greeter", &Locals::new()).unwrap();
    assert_eq!(registry.root_scope().get("greeting"), Value::from("hi"));
}

#[test]
fn test_locals_reach_nested_resolution() {
    let registry = Registry::new();
    registry.register_service(
        "label",
        Factory::inject(["$scope"], |args| Ok(args.scope(0)?.id())),
    );
    let scope = registry.root_scope().new_child();
    let id = registry
        .get_as::<nglite::ScopeId>("label", &Locals::new().with_scope(scope.clone()))
        .unwrap();
    assert_eq!(*id, scope.id());
}

#[test]
fn test_descriptors_and_modules() {
    let registry = Registry::new();
    registry
        .add_module(|r: &Registry| -> RtResult<()> {
            r.register_service("a", Factory::value(1u8));
            r.register_directive("x", Factory::inject(["a"], |_| Ok(())));
            Ok(())
        })
        .unwrap();

    let descriptors = registry.descriptors();
    let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a", "xDirective"]);
    assert_eq!(descriptors[1].kind, ProviderKind::Directive);
    assert_eq!(descriptors[1].dependencies, vec!["a"]);
    assert_eq!(descriptors[1].short_name(), "x");
}

#[test]
fn test_module_errors_propagate() {
    let registry = Registry::new();
    let result = registry.add_module(|_: &Registry| -> RtResult<()> { Err(RtError::custom("bad module")) });
    assert!(matches!(result, Err(RtError::Custom(msg)) if msg == "bad module"));
}

#[test]
fn test_weak_registry_does_not_keep_alive() {
    let registry = Registry::new();
    let weak = registry.downgrade();
    assert!(weak.upgrade().is_some());
    drop(registry);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_registry_scope_shares_config() {
    let registry = Registry::with_config(nglite::RuntimeConfig::default().with_digest_ttl(3));
    let child: Scope = registry.root_scope().new_child();
    assert_eq!(child.config().digest_ttl, 3);
}

#[test]
fn test_raw_registration_kind_follows_name_suffix() {
    let registry = Registry::new();
    registry.register("fooDirective", Factory::value(1u8));
    registry.register("BarController", Factory::value(2u8));
    registry.register("store", Factory::value(3u8));

    let kinds: Vec<(String, ProviderKind)> = registry
        .descriptors()
        .into_iter()
        .map(|descriptor| (descriptor.name, descriptor.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("BarController".to_string(), ProviderKind::Controller),
            ("fooDirective".to_string(), ProviderKind::Directive),
            ("store".to_string(), ProviderKind::Service),
        ]
    );
    // Raw registration never wraps: the factory's own value is resolved.
    assert_eq!(*registry.get_as::<u8>("BarController", &Locals::new()).unwrap(), 2);
}
