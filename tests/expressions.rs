use nglite::{EvalError, EvalMode, Expression, RtError, RuntimeConfig, Scope, Value};

fn strict_root() -> Scope {
    Scope::root_with_config(RuntimeConfig::default().with_eval_mode(EvalMode::Strict))
}

#[test]
fn test_lenient_failures_yield_undefined() {
    let scope = Scope::root();
    assert_eq!(scope.eval("missing + 1").unwrap(), Value::Undefined);
    assert_eq!(scope.eval("1 +").unwrap(), Value::Undefined);
    assert_eq!(scope.eval("a.b.c").unwrap(), Value::Undefined);
    assert_eq!(scope.eval("").unwrap(), Value::Undefined);
}

#[test]
fn test_strict_failures_are_typed() {
    let scope = strict_root();
    assert!(matches!(
        scope.eval("missing"),
        Err(RtError::Eval(EvalError::UnknownReference(name))) if name == "missing"
    ));
    assert!(matches!(
        scope.eval("1 +"),
        Err(RtError::Eval(EvalError::Syntax { .. }))
    ));
    assert!(matches!(
        scope.eval("1 = 2"),
        Err(RtError::Eval(EvalError::InvalidAssignment))
    ));
}

#[test]
fn test_eval_source_ignores_mode() {
    let scope = Scope::root();
    assert_eq!(
        scope.eval_source("nope").unwrap_err(),
        EvalError::UnknownReference("nope".into())
    );
}

#[test]
fn test_reads_resolve_through_chain() {
    let root = Scope::root();
    root.set("price", 4);
    root.set("user", Value::object([("name", Value::from("Ada"))]));
    let child = root.new_child();
    child.set("qty", 3);

    assert_eq!(child.eval("price * qty").unwrap(), Value::from(12));
    assert_eq!(child.eval("'Hi ' + user.name").unwrap(), Value::from("Hi Ada"));
    assert_eq!(child.eval("qty > 2 ? 'bulk' : 'single'").unwrap(), Value::from("bulk"));
}

#[test]
fn test_assignment_lands_on_local_scope() {
    let root = Scope::root();
    root.set("count", 1);
    let child = root.new_child();

    assert_eq!(child.eval("count = count + 1").unwrap(), Value::from(2));
    assert_eq!(child.get("count"), Value::from(2));
    assert_eq!(root.get("count"), Value::from(1));
}

#[test]
fn test_callable_expression_uses_scope() {
    let root = Scope::root();
    root.set("n", 2);
    let child = root.new_child();
    let square = Expression::callable(|scope| {
        let n = scope.get("n").as_f64().unwrap_or(0.0);
        Ok(Value::from(n * n))
    });
    assert_eq!(child.eval(&square).unwrap(), Value::from(4));
    assert_eq!(square.text(), "<callable>");
}

#[test]
fn test_callable_errors_propagate_in_lenient_mode() {
    let scope = Scope::root();
    let failing = Expression::callable(|_| Err(RtError::custom("boom")));
    assert!(matches!(scope.eval(&failing), Err(RtError::Custom(msg)) if msg == "boom"));
}

#[test]
fn test_function_call_failure_is_an_eval_error() {
    let scope = strict_root();
    scope.set("fail", Value::function(|_, _| Err(RtError::custom("inner"))));
    assert!(matches!(
        scope.eval("fail()"),
        Err(RtError::Eval(EvalError::Call(msg))) if msg == "inner"
    ));
    assert_eq!(Scope::root().eval("fail()").unwrap(), Value::Undefined);
}

#[test]
fn test_compiled_expression_is_reusable() {
    let scope = Scope::root();
    let expr = Expression::parse("n + 1");
    scope.set("n", 1);
    assert_eq!(scope.eval(&expr).unwrap(), Value::from(2));
    scope.set("n", 10);
    assert_eq!(scope.eval(&expr).unwrap(), Value::from(11));
    assert_eq!(expr.text(), "n + 1");
}

#[test]
fn test_display_of_results() {
    let scope = Scope::root();
    assert_eq!(scope.eval("10 / 4").unwrap().to_string(), "2.5");
    assert_eq!(scope.eval("[1, null, 'x']").unwrap().to_string(), "1,,x");
    assert_eq!(scope.eval("missing").unwrap().to_string(), "undefined");
}

#[test]
fn test_long_operator_chain_is_a_failure_not_a_crash() {
    let sum = vec!["1"; 20_000].join("+");
    let path = vec!["a"; 20_000].join(".");

    let scope = Scope::root();
    assert_eq!(scope.eval(sum.as_str()).unwrap(), Value::Undefined);
    assert_eq!(scope.eval(path.as_str()).unwrap(), Value::Undefined);

    let strict = strict_root();
    assert!(matches!(
        strict.eval(sum.as_str()),
        Err(RtError::Eval(EvalError::Syntax { .. }))
    ));
}

#[test]
fn test_moderate_chain_still_evaluates() {
    let scope = Scope::root();
    assert_eq!(scope.eval(vec!["1"; 100].join("+").as_str()).unwrap(), Value::from(100));
}
