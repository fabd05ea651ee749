#![no_main]
use libfuzzer_sys::fuzz_target;

use ssz_dynamic::{deserialize, serialize, SszType};

// Fuzz deserialize() for a container mixing fixed and variable fields.
fuzz_target!(|data: &[u8]| {
    let ty = SszType::container(
        "Fuzzed",
        vec![
            ("a", SszType::uint(16).unwrap()),
            ("b", SszType::byte_list()),
            ("c", SszType::list(SszType::uint(32).unwrap()).unwrap()),
        ],
    )
    .unwrap();
    if let Ok(value) = deserialize(data, &ty) {
        let encoded = serialize(&value, &ty).unwrap();
        assert_eq!(encoded, data);
    }
});
