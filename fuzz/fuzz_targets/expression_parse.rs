#![no_main]

use libfuzzer_sys::fuzz_target;
use nglite::expr::parse;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // Parsing must never panic, whatever the input.
        let _ = parse(source);
    }
});
