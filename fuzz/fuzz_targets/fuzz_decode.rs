#![no_main]
use fmg_carry::{decode, encode};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

// Arbitrary bytes must decode or fail cleanly; anything that decodes must
// survive a re-encode and decode unchanged.
fuzz_target!(|data: &[u8]| {
    let Ok(fmg) = decode(&mut Cursor::new(data), "fuzz.fmg") else {
        return;
    };

    let mut out = Cursor::new(Vec::new());
    if encode(&fmg, &mut out).is_err() {
        return;
    }
    let again = decode(&mut Cursor::new(out.into_inner()), "fuzz.fmg").unwrap();
    assert_eq!(again, fmg);
});
