//! Decoding of SSZ bytes into dynamic values.

use crate::types::{Field, SszType};
use crate::value::Value;
use crate::BYTES_PER_LENGTH_OFFSET;
use ethereum_types::{U128, U256};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

type SmallVec8<T> = SmallVec<[T; 8]>;

/// Returned when SSZ decoding fails.
#[derive(Debug, PartialEq, Clone)]
pub enum DecodeError {
    /// The bytes supplied were too short or too long for the type.
    InvalidByteLength { len: usize, expected: usize },
    /// The given bytes were too short to be read as a length offset.
    InvalidLengthPrefix { len: usize, expected: usize },
    /// An offset points back into the fixed portion, double-decoding
    /// bytes that are also decoded as fixed-length.
    OffsetIntoFixedPortion(usize),
    /// The first offset does not point to the byte that follows the
    /// fixed portion, skipping a variable byte.
    OffsetSkipsVariableBytes(usize),
    /// An offset points to bytes prior to the previous offset.
    OffsetsAreDecreasing(usize),
    /// An offset references byte indices that do not exist in the
    /// source bytes.
    OffsetOutOfBounds(usize),
    /// A variable-element list's fixed portion is not a clean, positive
    /// multiple of `BYTES_PER_LENGTH_OFFSET`.
    InvalidListFixedBytesLen(usize),
    /// An element with a fixed length of zero cannot be counted.
    ZeroLengthItem,
    /// The given bytes were invalid for some value-level reason.
    BytesInvalid(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidByteLength { len, expected } => {
                write!(f, "invalid byte length: {} (expected {})", len, expected)
            }
            Self::InvalidLengthPrefix { len, expected } => {
                write!(f, "invalid length prefix: {} bytes (expected {})", len, expected)
            }
            Self::OffsetIntoFixedPortion(offset) => {
                write!(f, "offset {} points into the fixed portion", offset)
            }
            Self::OffsetSkipsVariableBytes(offset) => {
                write!(f, "first offset {} skips variable bytes", offset)
            }
            Self::OffsetsAreDecreasing(offset) => {
                write!(f, "offset {} is lower than its predecessor", offset)
            }
            Self::OffsetOutOfBounds(offset) => write!(f, "offset {} is out of bounds", offset),
            Self::InvalidListFixedBytesLen(len) => {
                write!(f, "invalid fixed bytes length for a list: {}", len)
            }
            Self::ZeroLengthItem => write!(f, "zero-length items are illegal"),
            Self::BytesInvalid(reason) => write!(f, "bytes invalid: {}", reason),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes `bytes` as a value of `ty`.
///
/// The supplied bytes must be the exact encoding of one value; excess
/// bytes result in an error.
pub fn deserialize(bytes: &[u8], ty: &SszType) -> Result<Value, DecodeError> {
    match ty {
        SszType::Bool => decode_bool(bytes),
        SszType::Uint {
            byte_length,
            bias,
            use_native,
        } => decode_uint(bytes, *byte_length, *bias, *use_native),
        SszType::ByteVector { length } => {
            if bytes.len() != *length {
                return Err(DecodeError::InvalidByteLength {
                    len: bytes.len(),
                    expected: *length,
                });
            }
            Ok(Value::Bytes(bytes.to_vec()))
        }
        SszType::ByteList { max_length } => {
            check_max_len(bytes.len(), *max_length)?;
            Ok(Value::Bytes(bytes.to_vec()))
        }
        SszType::Vector { element, length } => decode_vector(bytes, element, *length),
        SszType::List {
            element,
            max_length,
        } => decode_list(bytes, element, *max_length),
        SszType::Container { fields, .. } => decode_container(bytes, fields),
    }
}

fn decode_bool(bytes: &[u8]) -> Result<Value, DecodeError> {
    if bytes.len() != 1 {
        return Err(DecodeError::InvalidByteLength {
            len: bytes.len(),
            expected: 1,
        });
    }
    match bytes[0] {
        0 => Ok(Value::Bool(false)),
        1 => Ok(Value::Bool(true)),
        byte => Err(DecodeError::BytesInvalid(format!(
            "out-of-range for boolean: {}",
            byte
        ))),
    }
}

fn decode_uint(
    bytes: &[u8],
    byte_length: usize,
    bias: u64,
    use_native: bool,
) -> Result<Value, DecodeError> {
    if bytes.len() != byte_length {
        return Err(DecodeError::InvalidByteLength {
            len: bytes.len(),
            expected: byte_length,
        });
    }
    if byte_length <= 8 {
        let mut array = [0; 8];
        array[..byte_length].copy_from_slice(bytes);
        let raw = u64::from_le_bytes(array);
        let value = raw
            .checked_sub(bias)
            .ok_or_else(|| below_bias(raw, bias))?;
        Ok(Value::Uint(value))
    } else if use_native {
        if bytes.iter().all(|byte| *byte == 0xff) {
            // The all-ones maximum of the width.
            return Ok(Value::Uint(u64::MAX));
        }
        let raw = U256::from_little_endian(bytes);
        let value = raw
            .checked_sub(U256::from(bias))
            .ok_or_else(|| below_bias(raw, bias))?;
        if value > U256::from(u64::MAX) {
            return Err(DecodeError::BytesInvalid(format!(
                "value {} does not fit a native integer",
                value
            )));
        }
        Ok(Value::Uint(value.as_u64()))
    } else if byte_length == 16 {
        let raw = U128::from_little_endian(bytes);
        let value = raw
            .checked_sub(U128::from(bias))
            .ok_or_else(|| below_bias(raw, bias))?;
        Ok(Value::Uint128(value))
    } else if byte_length == 32 {
        let raw = U256::from_little_endian(bytes);
        let value = raw
            .checked_sub(U256::from(bias))
            .ok_or_else(|| below_bias(raw, bias))?;
        Ok(Value::Uint256(value))
    } else {
        Err(DecodeError::BytesInvalid(format!(
            "unsupported uint width: {} bits",
            byte_length * 8
        )))
    }
}

fn below_bias(raw: impl fmt::Display, bias: u64) -> DecodeError {
    DecodeError::BytesInvalid(format!("encoded value {} is below the bias {}", raw, bias))
}

fn decode_vector(bytes: &[u8], element: &SszType, length: usize) -> Result<Value, DecodeError> {
    match element.fixed_len() {
        Some(elem_len) => {
            if elem_len == 0 {
                return Err(DecodeError::ZeroLengthItem);
            }
            let expected = elem_len * length;
            if bytes.len() != expected {
                return Err(DecodeError::InvalidByteLength {
                    len: bytes.len(),
                    expected,
                });
            }
            decode_fixed_elements(bytes, element, elem_len)
        }
        None => Ok(Value::List(decode_variable_elements(
            bytes, element, length,
        )?)),
    }
}

fn decode_list(
    bytes: &[u8],
    element: &SszType,
    max_length: Option<usize>,
) -> Result<Value, DecodeError> {
    if bytes.is_empty() {
        return Ok(Value::List(vec![]));
    }
    match element.fixed_len() {
        Some(elem_len) => {
            if elem_len == 0 {
                return Err(DecodeError::ZeroLengthItem);
            }
            if bytes.len() % elem_len != 0 {
                return Err(DecodeError::InvalidByteLength {
                    len: bytes.len(),
                    expected: (bytes.len() / elem_len + 1) * elem_len,
                });
            }
            check_max_len(bytes.len() / elem_len, max_length)?;
            decode_fixed_elements(bytes, element, elem_len)
        }
        None => {
            // The element count is recovered from the first offset.
            let first_offset = read_offset(bytes)?;
            if first_offset == 0 || first_offset % BYTES_PER_LENGTH_OFFSET != 0 {
                return Err(DecodeError::InvalidListFixedBytesLen(first_offset));
            }
            let count = first_offset / BYTES_PER_LENGTH_OFFSET;
            check_max_len(count, max_length)?;
            Ok(Value::List(decode_variable_elements(
                bytes, element, count,
            )?))
        }
    }
}

fn decode_fixed_elements(
    bytes: &[u8],
    element: &SszType,
    elem_len: usize,
) -> Result<Value, DecodeError> {
    bytes
        .chunks(elem_len)
        .map(|chunk| deserialize(chunk, element))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Decodes `count` variable-size elements laid out as an offset table
/// followed by the element bodies.
fn decode_variable_elements(
    bytes: &[u8],
    element: &SszType,
    count: usize,
) -> Result<Vec<Value>, DecodeError> {
    let num_fixed_bytes = count * BYTES_PER_LENGTH_OFFSET;
    let mut offsets: SmallVec8<usize> = SmallVec::with_capacity(count);
    for i in 0..count {
        let tail = bytes.get(i * BYTES_PER_LENGTH_OFFSET..).unwrap_or(&[]);
        let offset = read_offset(tail)?;
        sanitize_offset(offset, offsets.last().copied(), bytes.len(), num_fixed_bytes)?;
        offsets.push(offset);
    }

    let mut items = Vec::with_capacity(count);
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(bytes.len());
        items.push(deserialize(&bytes[start..end], element)?);
    }
    Ok(items)
}

fn decode_container(bytes: &[u8], fields: &[Field]) -> Result<Value, DecodeError> {
    enum Item<'a> {
        Fixed(&'a [u8]),
        Variable(usize),
    }

    let num_fixed_bytes: usize = fields.iter().map(|f| f.ty.fixed_portion_len()).sum();

    // Walk the fixed region: fixed fields are sliced in place, offset
    // slots are read and checked against the layout invariants.
    let mut items: SmallVec8<Item> = SmallVec::with_capacity(fields.len());
    let mut idx = 0;
    let mut previous_offset = None;
    for field in fields {
        match field.ty.fixed_len() {
            Some(len) => {
                let slice =
                    bytes
                        .get(idx..idx + len)
                        .ok_or(DecodeError::InvalidByteLength {
                            len: bytes.len(),
                            expected: idx + len,
                        })?;
                items.push(Item::Fixed(slice));
                idx += len;
            }
            None => {
                let tail = bytes.get(idx..).unwrap_or(&[]);
                let offset = read_offset(tail)?;
                sanitize_offset(offset, previous_offset, bytes.len(), num_fixed_bytes)?;
                previous_offset = Some(offset);
                items.push(Item::Variable(offset));
                idx += BYTES_PER_LENGTH_OFFSET;
            }
        }
    }

    // A fixed-size container must consume its bytes exactly.
    if previous_offset.is_none() && bytes.len() != num_fixed_bytes {
        return Err(DecodeError::InvalidByteLength {
            len: bytes.len(),
            expected: num_fixed_bytes,
        });
    }

    // Slice variable bodies between consecutive offsets and decode
    // every field.
    let offsets: SmallVec8<usize> = items
        .iter()
        .filter_map(|item| match item {
            Item::Variable(offset) => Some(*offset),
            Item::Fixed(_) => None,
        })
        .collect();

    let mut map = HashMap::with_capacity(fields.len());
    let mut variable_index = 0;
    for (field, item) in fields.iter().zip(&items) {
        let slice = match item {
            Item::Fixed(slice) => *slice,
            Item::Variable(offset) => {
                let end = offsets
                    .get(variable_index + 1)
                    .copied()
                    .unwrap_or(bytes.len());
                variable_index += 1;
                &bytes[*offset..end]
            }
        };
        map.insert(field.name.clone(), deserialize(slice, &field.ty)?);
    }
    Ok(Value::Container(map))
}

fn check_max_len(len: usize, max_length: Option<usize>) -> Result<(), DecodeError> {
    match max_length {
        Some(max) if len > max => Err(DecodeError::BytesInvalid(format!(
            "length {} exceeds maximum {}",
            len, max
        ))),
        _ => Ok(()),
    }
}

/// Reads a `BYTES_PER_LENGTH_OFFSET`-byte little-endian offset from the
/// front of `bytes`.
fn read_offset(bytes: &[u8]) -> Result<usize, DecodeError> {
    let slot =
        bytes
            .get(..BYTES_PER_LENGTH_OFFSET)
            .ok_or(DecodeError::InvalidLengthPrefix {
                len: bytes.len(),
                expected: BYTES_PER_LENGTH_OFFSET,
            })?;
    let mut array = [0; BYTES_PER_LENGTH_OFFSET];
    array.copy_from_slice(slot);
    Ok(u32::from_le_bytes(array) as usize)
}

/// Checks one offset against the layout invariants.
///
/// - `previous_offset`: the previously-read offset, unless this is the
///   aggregate's first. Offsets must not decrease.
/// - `num_bytes`: total length of the aggregate. Offsets must not point
///   past it.
/// - `num_fixed_bytes`: length of the fixed portion. The first offset
///   must point exactly to the byte that follows it.
fn sanitize_offset(
    offset: usize,
    previous_offset: Option<usize>,
    num_bytes: usize,
    num_fixed_bytes: usize,
) -> Result<usize, DecodeError> {
    if offset < num_fixed_bytes {
        Err(DecodeError::OffsetIntoFixedPortion(offset))
    } else if previous_offset.is_none() && offset != num_fixed_bytes {
        Err(DecodeError::OffsetSkipsVariableBytes(offset))
    } else if offset > num_bytes {
        Err(DecodeError::OffsetOutOfBounds(offset))
    } else if previous_offset.map_or(false, |prev| prev > offset) {
        Err(DecodeError::OffsetsAreDecreasing(offset))
    } else {
        Ok(offset)
    }
}
