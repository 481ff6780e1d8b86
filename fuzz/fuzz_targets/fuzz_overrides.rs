#![no_main]
use fmg_carry::{parse_overrides, quote, unquote};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = parse_overrides(data);

    if let Ok(text) = std::str::from_utf8(data) {
        assert_eq!(unquote(&quote(text)).unwrap(), text);
    }
});
