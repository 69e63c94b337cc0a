#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding must never panic, and everything it accepts must
    // re-encode to the exact input octets.
    if let Ok(values) = berbind::decode_all(data) {
        let mut reencoded = Vec::new();
        for value in &values {
            reencoded.extend_from_slice(&value.encode());
        }
        assert_eq!(reencoded, data);
    }
});
