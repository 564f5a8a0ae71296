#![no_main]

use libfuzzer_sys::fuzz_target;
use nglite::{Factory, Locals, Registry, Resolver};

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // Each provider may only depend on providers later in NAMES, so there
    // are no cycles.
    let registry = Registry::new();
    for (i, byte) in data.iter().take(NAMES.len()).enumerate() {
        if byte & 1 == 0 {
            continue;
        }
        let deps: Vec<&str> = NAMES[i + 1..]
            .iter()
            .enumerate()
            .filter(|(j, _)| byte >> (1 + j % 7) & 1 == 1)
            .map(|(_, name)| *name)
            .collect();
        registry.register_service(
            NAMES[i],
            Factory::inject(deps, |args| {
                let mut total = 1u64;
                for i in 0..args.len() {
                    if let Some(v) = args.get_opt::<u64>(i) {
                        total += *v;
                    }
                }
                Ok(total)
            }),
        );
    }

    let target = NAMES[data[data.len() - 1] as usize % NAMES.len()];
    let first = registry.get_as::<u64>(target, &Locals::new());
    let second = registry.get_as::<u64>(target, &Locals::new());
    match (first, second) {
        (Ok(a), Ok(b)) => assert!(std::rc::Rc::ptr_eq(&a, &b)),
        (Err(_), Err(_)) => assert!(!registry.is_registered(target)),
        _ => panic!("resolution is not stable"),
    }
});
