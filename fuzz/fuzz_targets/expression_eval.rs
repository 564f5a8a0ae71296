#![no_main]

use libfuzzer_sys::fuzz_target;
use nglite::{EvalMode, RuntimeConfig, Scope, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let scope = Scope::root();
    scope.set("n", 3);
    scope.set("s", "text");
    scope.set("xs", vec![Value::from(1), Value::from("two"), Value::Null]);
    scope.set("o", Value::object([("k", Value::from(true))]));

    // Lenient evaluation never fails for source text.
    assert!(scope.eval(source).is_ok());

    let strict = Scope::root_with_config(RuntimeConfig::default().with_eval_mode(EvalMode::Strict));
    let _ = strict.eval(source);
});
