use ethereum_types::{U128, U256};
use ssz_dynamic::{
    deserialize, serialize, serialized_size, DecodeError, SszType, Value,
};

mod round_trip {
    use super::*;

    fn round_trip(values: Vec<Value>, ty: &SszType) {
        for value in values {
            let encoded = serialize(&value, ty).unwrap();
            assert_eq!(serialized_size(&value, ty).unwrap(), encoded.len());
            assert_eq!(deserialize(&encoded, ty), Ok(value));
        }
    }

    fn uint(bits: usize) -> SszType {
        SszType::uint(bits).unwrap()
    }

    #[test]
    fn bool() {
        round_trip(vec![Value::Bool(true), Value::Bool(false)], &SszType::Bool);
    }

    #[test]
    fn uints() {
        round_trip(
            vec![Value::Uint(0), Value::Uint(1), Value::Uint(255)],
            &uint(8),
        );
        round_trip(
            vec![Value::Uint(0), Value::Uint(0xdead_beef), Value::Uint(u32::MAX as u64)],
            &uint(32),
        );
        round_trip(vec![Value::Uint(u64::MAX)], &uint(64));
        round_trip(
            vec![
                Value::Uint128(U128::zero()),
                Value::Uint128(U128::from(u64::MAX)),
                Value::Uint128(U128::MAX),
            ],
            &uint(128),
        );
        round_trip(
            vec![Value::Uint256(U256::one()), Value::Uint256(U256::MAX)],
            &uint(256),
        );
    }

    #[test]
    fn biased_uint() {
        let ty = SszType::Uint {
            byte_length: 8,
            bias: 1000,
            use_native: true,
        };
        round_trip(
            vec![Value::Uint(0), Value::Uint(5), Value::Uint(u64::MAX - 1000)],
            &ty,
        );
    }

    #[test]
    fn wide_native_uint() {
        let ty = SszType::Uint {
            byte_length: 32,
            bias: 0,
            use_native: true,
        };
        round_trip(
            vec![Value::Uint(0), Value::Uint(12345), Value::Uint(u64::MAX)],
            &ty,
        );
    }

    #[test]
    fn byte_vectors() {
        let ty = SszType::byte_vector(4).unwrap();
        round_trip(
            vec![
                Value::Bytes(vec![0, 0, 0, 0]),
                Value::Bytes(vec![1, 0, 0, 0]),
                Value::Bytes(vec![1, 2, 3, 4]),
            ],
            &ty,
        );
    }

    #[test]
    fn byte_lists() {
        let ty = SszType::byte_list();
        round_trip(
            vec![
                Value::Bytes(vec![]),
                Value::Bytes(vec![255]),
                Value::Bytes(vec![0, 1, 2]),
                Value::Bytes(vec![100; 64]),
            ],
            &ty,
        );
    }

    #[test]
    fn vec_u16() {
        let ty = SszType::list(uint(16)).unwrap();
        for items in [
            vec![],
            vec![255u64],
            vec![0, 1, 2],
            vec![100; 64],
            vec![255, 0, 255],
        ] {
            round_trip(
                vec![Value::List(items.into_iter().map(Value::Uint).collect())],
                &ty,
            );
        }
    }

    #[test]
    fn vec_of_vec_u16() {
        let ty = SszType::list(SszType::list(uint(16)).unwrap()).unwrap();
        let nested = |outer: Vec<Vec<u64>>| {
            Value::List(
                outer
                    .into_iter()
                    .map(|inner| Value::List(inner.into_iter().map(Value::Uint).collect()))
                    .collect(),
            )
        };
        round_trip(
            vec![
                nested(vec![]),
                nested(vec![vec![]]),
                nested(vec![vec![1, 2, 3]]),
                nested(vec![vec![], vec![]]),
                nested(vec![vec![], vec![1, 2, 3]]),
                nested(vec![vec![1, 2, 3], vec![], vec![1, 2, 3]]),
                nested(vec![vec![], vec![1], vec![1, 2, 3]]),
            ],
            &ty,
        );
    }

    #[test]
    fn vector_of_containers() {
        let point = SszType::container(
            "Point",
            vec![("x", uint(16)), ("y", uint(16))],
        )
        .unwrap();
        let ty = SszType::vector(point, 2).unwrap();
        let value = Value::List(vec![
            Value::container([("x", Value::Uint(1)), ("y", Value::Uint(2))]),
            Value::container([("x", Value::Uint(3)), ("y", Value::Uint(4))]),
        ]);
        round_trip(vec![value], &ty);
    }

    #[test]
    fn fixed_len_container() {
        let ty = SszType::container(
            "FixedLen",
            vec![("a", uint(16)), ("b", uint(64)), ("c", uint(32))],
        )
        .unwrap();
        for (a, b, c) in [(0, 0, 0), (1, 1, 1), (1, 0, 1)] {
            round_trip(
                vec![Value::container([
                    ("a", Value::Uint(a)),
                    ("b", Value::Uint(b)),
                    ("c", Value::Uint(c)),
                ])],
                &ty,
            );
        }
    }

    #[test]
    fn variable_len_container() {
        let ty = SszType::container(
            "VariableLen",
            vec![
                ("a", uint(16)),
                ("b", SszType::list(uint(16)).unwrap()),
                ("c", uint(32)),
            ],
        )
        .unwrap();
        for (a, b, c) in [
            (0u64, vec![], 0u64),
            (255, vec![0u64, 1, 2, 3], 99),
            (50, vec![0], 0),
        ] {
            round_trip(
                vec![Value::container([
                    ("a", Value::Uint(a)),
                    ("b", Value::List(b.into_iter().map(Value::Uint).collect())),
                    ("c", Value::Uint(c)),
                ])],
                &ty,
            );
        }
    }

    #[test]
    fn container_of_containers() {
        let inner = SszType::container(
            "Inner",
            vec![
                ("data", SszType::byte_list()),
                ("count", uint(8)),
            ],
        )
        .unwrap();
        let ty = SszType::container(
            "Outer",
            vec![
                ("first", inner.clone()),
                ("second", inner),
                ("tag", SszType::Bool),
            ],
        )
        .unwrap();
        let value = Value::container([
            (
                "first",
                Value::container([
                    ("data", Value::Bytes(vec![1, 2])),
                    ("count", Value::Uint(2)),
                ]),
            ),
            (
                "second",
                Value::container([
                    ("data", Value::Bytes(vec![])),
                    ("count", Value::Uint(0)),
                ]),
            ),
            ("tag", Value::Bool(true)),
        ]);
        round_trip(vec![value], &ty);
    }
}

mod expected_encodings {
    use super::*;

    fn uint(bits: usize) -> SszType {
        SszType::uint(bits).unwrap()
    }

    fn assert_encodes(value: &Value, ty: &SszType, bytes: &[u8]) {
        assert_eq!(serialize(value, ty).unwrap(), bytes);
    }

    #[test]
    fn bool() {
        assert_encodes(&Value::Bool(true), &SszType::Bool, &[0x01]);
        assert_encodes(&Value::Bool(false), &SszType::Bool, &[0x00]);
    }

    #[test]
    fn uint32() {
        assert_encodes(&Value::Uint(0), &uint(32), &[0, 0, 0, 0]);
        assert_encodes(&Value::Uint(1), &uint(32), &[1, 0, 0, 0]);
        assert_encodes(
            &Value::Uint(0xdead_beef),
            &uint(32),
            &[0xef, 0xbe, 0xad, 0xde],
        );
    }

    #[test]
    fn byte_vector() {
        let ty = SszType::byte_vector(2).unwrap();
        assert_encodes(&Value::Bytes(vec![0xab, 0xcd]), &ty, &[0xab, 0xcd]);
        assert!(serialize(&Value::Bytes(vec![0xab]), &ty).is_err());
    }

    #[test]
    fn vector_of_uint32() {
        let ty = SszType::vector(uint(32), 6).unwrap();
        let value = Value::List((0..6).map(Value::Uint).collect());
        assert_encodes(
            &value,
            &ty,
            &[
                0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0,
            ],
        );
    }

    #[test]
    fn empty_list() {
        let ty = SszType::list(uint(32)).unwrap();
        assert_encodes(&Value::List(vec![]), &ty, &[]);
    }

    #[test]
    fn list_of_lists() {
        let ty = SszType::list(SszType::list(uint(32)).unwrap()).unwrap();
        let value = Value::List(vec![
            Value::List(vec![Value::Uint(1)]),
            Value::List(vec![Value::Uint(2), Value::Uint(3)]),
        ]);
        assert_encodes(
            &value,
            &ty,
            &[
                8, 0, 0, 0, // offset of element 0
                12, 0, 0, 0, // offset of element 1
                1, 0, 0, 0, // element 0
                2, 0, 0, 0, 3, 0, 0, 0, // element 1
            ],
        );
    }

    #[test]
    fn fixed_container() {
        let ty = SszType::container(
            "Fixed",
            vec![
                ("a", uint(16)),
                ("b", SszType::Bool),
                ("c", SszType::byte_vector(3).unwrap()),
            ],
        )
        .unwrap();
        let value = Value::container([
            ("a", Value::Uint(0x0102)),
            ("b", Value::Bool(true)),
            ("c", Value::Bytes(vec![0xaa, 0xbb, 0xcc])),
        ]);
        assert_encodes(&value, &ty, &[0x02, 0x01, 0x01, 0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn mixed_container() {
        let ty = SszType::container(
            "Mixed",
            vec![("x", uint(16)), ("y", SszType::list(uint(32)).unwrap())],
        )
        .unwrap();
        let value = Value::container([
            ("x", Value::Uint(0x0102)),
            ("y", Value::List(vec![Value::Uint(9), Value::Uint(10)])),
        ]);
        assert_encodes(
            &value,
            &ty,
            &[
                0x02, 0x01, // x
                6, 0, 0, 0, // offset of y
                9, 0, 0, 0, 10, 0, 0, 0, // y
            ],
        );
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn variable_container_encodings() {
        let ty = SszType::container(
            "VariableLen",
            vec![
                ("a", uint(16)),
                ("b", SszType::list(uint(16)).unwrap()),
                ("c", uint(32)),
            ],
        )
        .unwrap();

        let items: Vec<(u64, Vec<u64>, u64)> = vec![
            (0, vec![], 0),
            (1, vec![0], 1),
            (1, vec![0, 1, 2], 1),
        ];

        let expected_encodings = [
            //  | u16--| vec offset-----| u32------------| vec payload --------|
            vec![00, 00, 10, 00, 00, 00, 00, 00, 00, 00],
            vec![01, 00, 10, 00, 00, 00, 01, 00, 00, 00, 00, 00],
            vec![
                01, 00, 10, 00, 00, 00, 01, 00, 00, 00, 00, 00, 01, 00, 02, 00,
            ],
        ];

        for (i, (a, b, c)) in items.into_iter().enumerate() {
            let value = Value::container([
                ("a", Value::Uint(a)),
                ("b", Value::List(b.into_iter().map(Value::Uint).collect())),
                ("c", Value::Uint(c)),
            ]);
            assert_eq!(
                serialize(&value, &ty).unwrap(),
                expected_encodings[i],
                "Failed on {}",
                i
            );
        }
    }

    #[test]
    fn wide_uint_sentinel() {
        let ty = SszType::Uint {
            byte_length: 16,
            bias: 0,
            use_native: true,
        };
        assert_encodes(&Value::Uint(u64::MAX), &ty, &[0xff; 16]);
    }
}

mod malformed_offsets {
    use super::*;

    fn uint(bits: usize) -> SszType {
        SszType::uint(bits).unwrap()
    }

    fn variable_len() -> SszType {
        SszType::container(
            "VariableLen",
            vec![
                ("a", uint(16)),
                ("b", SszType::list(uint(16)).unwrap()),
                ("c", uint(32)),
            ],
        )
        .unwrap()
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn offset_into_fixed_bytes() {
        let bytes = [
            //  1   2   3   4   5   6   7   8   9   10  11  12  13  14  15
            //      | offset        | u32           | variable
            01, 00, 09, 00, 00, 00, 01, 00, 00, 00, 00, 00, 01, 00, 02, 00,
        ];
        assert_eq!(
            deserialize(&bytes, &variable_len()),
            Err(DecodeError::OffsetIntoFixedPortion(9))
        );
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn first_offset_skips_byte() {
        let bytes = [
            01, 00, 11, 00, 00, 00, 01, 00, 00, 00, 00, 00, 01, 00, 02, 00,
        ];
        assert_eq!(
            deserialize(&bytes, &variable_len()),
            Err(DecodeError::OffsetSkipsVariableBytes(11))
        );
    }

    fn three_variable_len() -> SszType {
        SszType::container(
            "ThreeVariableLen",
            vec![
                ("a", uint(16)),
                ("b", SszType::list(uint(16)).unwrap()),
                ("c", SszType::list(uint(16)).unwrap()),
                ("d", SszType::list(uint(16)).unwrap()),
            ],
        )
        .unwrap()
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn offsets_decreasing() {
        let bytes = [
            //  1   2   3   4   5   6   7   8   9   10  11  12  13  14  15
            //      | offset        | offset        | offset        | variable
            01, 00, 14, 00, 00, 00, 15, 00, 00, 00, 14, 00, 00, 00, 00, 00,
        ];
        assert_eq!(
            deserialize(&bytes, &three_variable_len()),
            Err(DecodeError::OffsetsAreDecreasing(14))
        );
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn offset_out_of_bounds() {
        let bytes = [
            //      | offset        | offset        | offset        | variable
            01, 00, 14, 00, 00, 00, 17, 00, 00, 00, 14, 00, 00, 00, 00, 00,
        ];
        assert_eq!(
            deserialize(&bytes, &three_variable_len()),
            Err(DecodeError::OffsetOutOfBounds(17))
        );
    }

    #[test]
    fn fixed_len_excess_bytes() {
        let fixed = SszType::container(
            "FixedLen",
            vec![("a", uint(16)), ("b", uint(64)), ("c", uint(32))],
        )
        .unwrap();
        let value = Value::container([
            ("a", Value::Uint(1)),
            ("b", Value::Uint(2)),
            ("c", Value::Uint(3)),
        ]);
        let mut bytes = serialize(&value, &fixed).unwrap();
        bytes.push(0);
        assert_eq!(
            deserialize(&bytes, &fixed),
            Err(DecodeError::InvalidByteLength {
                len: 15,
                expected: 14,
            })
        );
    }

    #[test]
    fn vector_wrong_total_length() {
        let ty = SszType::vector(uint(32), 6).unwrap();
        assert_eq!(
            deserialize(&[0; 20], &ty),
            Err(DecodeError::InvalidByteLength {
                len: 20,
                expected: 24,
            })
        );
    }
}

mod properties {
    use super::*;

    fn uint(bits: usize) -> SszType {
        SszType::uint(bits).unwrap()
    }

    #[test]
    fn serialization_is_deterministic() {
        let ty = SszType::container(
            "Deterministic",
            vec![
                ("a", uint(64)),
                ("b", SszType::list(SszType::byte_list()).unwrap()),
            ],
        )
        .unwrap();
        let value = Value::container([
            ("a", Value::Uint(42)),
            (
                "b",
                Value::List(vec![
                    Value::Bytes(vec![1, 2, 3]),
                    Value::Bytes(vec![]),
                    Value::Bytes(vec![9]),
                ]),
            ),
        ]);
        assert_eq!(
            serialize(&value, &ty).unwrap(),
            serialize(&value, &ty).unwrap()
        );
    }

    #[test]
    fn input_field_order_is_irrelevant() {
        let ty = SszType::container(
            "Ordered",
            vec![("a", uint(8)), ("b", uint(16)), ("c", SszType::Bool)],
        )
        .unwrap();
        let forward = Value::container([
            ("a", Value::Uint(1)),
            ("b", Value::Uint(2)),
            ("c", Value::Bool(true)),
        ]);
        let backward = Value::container([
            ("c", Value::Bool(true)),
            ("b", Value::Uint(2)),
            ("a", Value::Uint(1)),
        ]);
        assert_eq!(
            serialize(&forward, &ty).unwrap(),
            serialize(&backward, &ty).unwrap()
        );
    }

    #[test]
    fn fixed_size_is_value_independent() {
        let ty = SszType::vector(uint(64), 3).unwrap();
        let small = Value::List(vec![Value::Uint(0); 3]);
        let large = Value::List(vec![Value::Uint(u64::MAX); 3]);
        assert_eq!(
            serialized_size(&small, &ty).unwrap(),
            serialized_size(&large, &ty).unwrap()
        );
        assert_eq!(serialized_size(&small, &ty).unwrap(), ty.fixed_len().unwrap());
    }

    #[test]
    fn first_offset_equals_fixed_region_length() {
        let ty = SszType::container(
            "Layout",
            vec![
                ("a", uint(32)),
                ("b", SszType::byte_list()),
                ("c", SszType::byte_list()),
            ],
        )
        .unwrap();
        let value = Value::container([
            ("a", Value::Uint(7)),
            ("b", Value::Bytes(vec![1])),
            ("c", Value::Bytes(vec![2, 3])),
        ]);
        let bytes = serialize(&value, &ty).unwrap();

        // Fixed region: 4 (a) + 4 (offset of b) + 4 (offset of c).
        let first = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let second = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        assert_eq!(first, 12);
        assert!(second >= first);
    }
}

mod parsing {
    use super::*;

    #[test]
    fn shorthand_end_to_end() {
        let ty: SszType = "uint32".parse().unwrap();
        assert_eq!(
            serialize(&Value::Uint(0xdead_beef), &ty).unwrap(),
            vec![0xef, 0xbe, 0xad, 0xde]
        );
    }

    #[test]
    fn shorthand_bytes() {
        let ty: SszType = "bytes4".parse().unwrap();
        assert_eq!(ty, SszType::byte_vector(4).unwrap());
        let ty: SszType = "bytes".parse().unwrap();
        assert_eq!(ty, SszType::byte_list());
    }
}
