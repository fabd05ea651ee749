#![no_main]
use libfuzzer_sys::fuzz_target;

use ssz_dynamic::{deserialize, SszType};

// Fuzz deserialize() for booleans.
fuzz_target!(|data: &[u8]| {
    let _ = deserialize(data, &SszType::Bool);
});
