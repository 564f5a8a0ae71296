//! Binds a small counter page and drives it with simulated clicks and typing.
//!
//! Run with `RUST_LOG=nglite=debug cargo run --example counter_page` to see
//! resolution and digest events.

use nglite::{
    BuiltinDirectives, Compiler, Element, Factory, Registry, RtResult, RuntimeConfig,
    TracingObserver, Value,
};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

fn main() -> RtResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Registry::with_config(RuntimeConfig::from_env()?);
    registry.add_observer(Rc::new(TracingObserver::new()));
    registry.add_module(BuiltinDirectives)?;

    registry.register_service("step", Factory::value(1.0f64));
    registry.register_controller(
        "Counter",
        Factory::inject(["$scope", "step"], |args| {
            let scope = args.scope(0)?;
            let step = *args.get::<f64>(1)?;
            scope.set("count", 0);
            scope.set("who", "nobody");
            scope.set(
                "increment",
                Value::function(move |scope, _| {
                    let count = scope.get("count").as_f64().unwrap_or(0.0);
                    scope.set("count", count + step);
                    Ok(Value::Undefined)
                }),
            );
            Ok(())
        }),
    );

    let label = Element::new("span").with_attribute("ngl-bind", "who + ' clicked ' + count + ' times'");
    let input = Element::new("input").with_attribute("ngl-model", "who");
    let button = Element::new("button").with_attribute("ngl-click", "increment()");
    let page = Element::new("html").with_child(
        Element::new("section")
            .with_attribute("ngl-controller", "Counter")
            .with_child(input.clone())
            .with_child(button.clone())
            .with_child(label.clone()),
    );

    Compiler::new(&registry).bootstrap(&page)?;
    println!("{}", label.text());

    input.type_text("Ada")?;
    button.click()?;
    button.click()?;
    println!("{}", label.text());

    Ok(())
}
