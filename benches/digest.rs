use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nglite::*;

// ===== Registry =====

fn bench_cached_get(c: &mut Criterion) {
    let registry = Registry::new();
    registry.register_service("config", Factory::value(42u64));
    let locals = Locals::new();
    let _ = registry.get("config", &locals).unwrap();

    c.bench_function("registry_cached_get", |b| {
        b.iter(|| {
            let v = registry.get_as::<u64>(black_box("config"), &locals).unwrap();
            black_box(v);
        })
    });
}

fn bench_invoke_with_locals(c: &mut Criterion) {
    let registry = Registry::new();
    registry.register_service("a", Factory::value(1u32));
    registry.register_service("b", Factory::value(2u32));
    let factory = Factory::inject(["a", "b", "$scope"], |args| {
        Ok(*args.get::<u32>(0)? + *args.get::<u32>(1)?)
    });
    let locals = Locals::new().with_scope(registry.root_scope());

    c.bench_function("registry_invoke_three_deps", |b| {
        b.iter(|| black_box(registry.invoke(&factory, &locals).unwrap()))
    });
}

// ===== Digest =====

fn bench_clean_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest_clean");
    for watchers in [10usize, 100, 1000] {
        let scope = Scope::root();
        for i in 0..watchers {
            scope.set(format!("f{}", i), i as f64);
            scope.watch(format!("f{}", i), |_, _| Ok(())).unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(watchers), &scope, |b, scope| {
            b.iter(|| black_box(scope.digest().unwrap()))
        });
    }
    group.finish();
}

fn bench_dirty_digest(c: &mut Criterion) {
    let scope = Scope::root();
    scope.set("n", 0);
    scope
        .watch("n", |value, s| {
            s.set("echo", value.clone());
            Ok(())
        })
        .unwrap();
    scope.watch("echo", |_, _| Ok(())).unwrap();
    let mut n = 0.0;

    c.bench_function("digest_dirty_chain", |b| {
        b.iter(|| {
            n += 1.0;
            scope.set("n", n);
            black_box(scope.digest().unwrap())
        })
    });
}

fn bench_deep_tree_digest(c: &mut Criterion) {
    let root = Scope::root();
    root.set("shared", Value::object([("items", Value::from(vec![Value::from(1); 32]))]));
    let mut leaf = root.clone();
    for _ in 0..20 {
        leaf = leaf.new_child();
        leaf.watch("shared.items.length", |_, _| Ok(())).unwrap();
    }

    c.bench_function("digest_tree_depth_20", |b| {
        b.iter(|| black_box(root.digest().unwrap()))
    });
}

// ===== Expressions =====

fn bench_eval(c: &mut Criterion) {
    let scope = Scope::root();
    scope.set("price", 4);
    scope.set("qty", 3);
    let compiled = Expression::parse("qty > 2 ? price * qty * 0.9 : price * qty");

    c.bench_function("eval_compiled", |b| {
        b.iter(|| black_box(scope.eval(&compiled).unwrap()))
    });
    c.bench_function("eval_parse_each_time", |b| {
        b.iter(|| black_box(scope.eval("qty > 2 ? price * qty * 0.9 : price * qty").unwrap()))
    });
}

criterion_group!(
    benches,
    bench_cached_get,
    bench_invoke_with_locals,
    bench_clean_digest,
    bench_dirty_digest,
    bench_deep_tree_digest,
    bench_eval
);
criterion_main!(benches);
