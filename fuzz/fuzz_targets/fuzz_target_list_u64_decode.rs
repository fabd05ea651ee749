#![no_main]
use libfuzzer_sys::fuzz_target;

use ssz_dynamic::{deserialize, serialize, SszType};

// Fuzz deserialize() for List[uint64]; anything that decodes must
// re-encode to the same bytes.
fuzz_target!(|data: &[u8]| {
    let ty = SszType::list(SszType::uint(64).unwrap()).unwrap();
    if let Ok(value) = deserialize(data, &ty) {
        let encoded = serialize(&value, &ty).unwrap();
        assert_eq!(encoded, data);
    }
});
