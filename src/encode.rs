//! Sizing and serialization of dynamic values.

use crate::types::{Field, SszType};
use crate::validate::{validate, ValueError, ValueErrorKind};
use crate::value::Value;
use crate::{BYTES_PER_LENGTH_OFFSET, MAX_LENGTH_VALUE};
use ethereum_types::{U128, U256};

/// Returns the number of bytes [`serialize`] will produce for `value`.
///
/// For fixed-size types this is independent of the value.
pub fn serialized_size(value: &Value, ty: &SszType) -> Result<usize, ValueError> {
    match ty {
        SszType::Bool => Ok(1),
        SszType::Uint { byte_length, .. } => Ok(*byte_length),
        SszType::ByteVector { length } => Ok(*length),
        SszType::ByteList { .. } => {
            let bytes = value
                .as_bytes()
                .ok_or_else(|| ValueError::mismatch("bytes", value))?;
            Ok(bytes.len())
        }
        SszType::Vector { element, length } => match element.fixed_len() {
            Some(elem_len) => Ok(elem_len * length),
            None => {
                let items = value
                    .as_list()
                    .ok_or_else(|| ValueError::mismatch("list", value))?;
                sequence_size(items, element)
            }
        },
        SszType::List { element, .. } => {
            let items = value
                .as_list()
                .ok_or_else(|| ValueError::mismatch("list", value))?;
            match element.fixed_len() {
                Some(elem_len) => Ok(items.len() * elem_len),
                None => sequence_size(items, element),
            }
        }
        SszType::Container { fields, .. } => {
            let map = value
                .as_container()
                .ok_or_else(|| ValueError::mismatch("container", value))?;
            let mut size = 0;
            for field in fields {
                let field_value = map.get(&field.name).ok_or_else(|| {
                    ValueError::new(ValueErrorKind::MissingField(field.name.clone()))
                })?;
                size += match field.ty.fixed_len() {
                    Some(len) => len,
                    None => {
                        BYTES_PER_LENGTH_OFFSET + serialized_size(field_value, &field.ty)?
                    }
                };
            }
            Ok(size)
        }
    }
}

/// Size of a sequence of variable-size elements: one offset slot plus
/// one body per element.
fn sequence_size(items: &[Value], element: &SszType) -> Result<usize, ValueError> {
    let mut size = items.len() * BYTES_PER_LENGTH_OFFSET;
    for item in items {
        size += serialized_size(item, element)?;
    }
    Ok(size)
}

/// Serializes `value` as described by `ty`.
///
/// The value is validated up front; the output buffer is then allocated
/// once, at its exact final size, and filled in a single pass. No
/// partially-written buffer is ever returned.
pub fn serialize(value: &Value, ty: &SszType) -> Result<Vec<u8>, ValueError> {
    validate(value, ty)?;
    let size = serialized_size(value, ty)?;
    let mut buf = vec![0; size];
    let written = write_value(value, ty, &mut buf, 0)?;
    debug_assert_eq!(written, buf.len(), "writer must fill the buffer exactly");
    Ok(buf)
}

/// Writes `value` into `buf` at `start`, returning the post-write index.
fn write_value(
    value: &Value,
    ty: &SszType,
    buf: &mut [u8],
    start: usize,
) -> Result<usize, ValueError> {
    match ty {
        SszType::Bool => {
            let v = value
                .as_bool()
                .ok_or_else(|| ValueError::mismatch("bool", value))?;
            buf[start] = v as u8;
            Ok(start + 1)
        }
        SszType::Uint {
            byte_length,
            bias,
            use_native,
        } => write_uint(value, *byte_length, *bias, *use_native, buf, start),
        SszType::ByteVector { .. } | SszType::ByteList { .. } => {
            let bytes = value
                .as_bytes()
                .ok_or_else(|| ValueError::mismatch("bytes", value))?;
            buf[start..start + bytes.len()].copy_from_slice(bytes);
            Ok(start + bytes.len())
        }
        SszType::Vector { element, .. } | SszType::List { element, .. } => {
            let items = value
                .as_list()
                .ok_or_else(|| ValueError::mismatch("list", value))?;
            write_sequence(items, element, buf, start)
        }
        SszType::Container { fields, .. } => write_container(value, fields, buf, start),
    }
}

fn write_uint(
    value: &Value,
    byte_length: usize,
    bias: u64,
    use_native: bool,
    buf: &mut [u8],
    start: usize,
) -> Result<usize, ValueError> {
    let end = start + byte_length;
    let out_of_range = || ValueError::new(ValueErrorKind::OutOfRange { byte_length });
    match value {
        Value::Uint(v) => {
            if use_native && byte_length > 8 && *v == u64::MAX {
                // All-ones maximum; the bias does not apply.
                for byte in &mut buf[start..end] {
                    *byte = 0xff;
                }
            } else if byte_length <= 8 {
                let encoded = v.checked_add(bias).ok_or_else(out_of_range)?;
                if byte_length < 8 && encoded >= 1u64 << (8 * byte_length) {
                    return Err(out_of_range());
                }
                buf[start..end].copy_from_slice(&encoded.to_le_bytes()[..byte_length]);
            } else {
                // Wide width, native value: zero-extended. The sum of two
                // u64 always fits.
                let encoded = U256::from(*v) + U256::from(bias);
                let mut le = [0; 32];
                encoded.to_little_endian(&mut le);
                buf[start..end].copy_from_slice(&le[..byte_length]);
            }
            Ok(end)
        }
        Value::Uint128(v) if byte_length == 16 => {
            let encoded = v.checked_add(U128::from(bias)).ok_or_else(out_of_range)?;
            let mut le = [0; 16];
            encoded.to_little_endian(&mut le);
            buf[start..end].copy_from_slice(&le);
            Ok(end)
        }
        Value::Uint256(v) if byte_length == 32 => {
            let encoded = v.checked_add(U256::from(bias)).ok_or_else(out_of_range)?;
            let mut le = [0; 32];
            encoded.to_little_endian(&mut le);
            buf[start..end].copy_from_slice(&le);
            Ok(end)
        }
        other => Err(ValueError::mismatch("uint", other)),
    }
}

fn write_sequence(
    items: &[Value],
    element: &SszType,
    buf: &mut [u8],
    start: usize,
) -> Result<usize, ValueError> {
    if element.is_variable_size() {
        // Fixed region of offsets, then the bodies.
        let mut cur = start + items.len() * BYTES_PER_LENGTH_OFFSET;
        for (i, item) in items.iter().enumerate() {
            let slot = start + i * BYTES_PER_LENGTH_OFFSET;
            write_offset(&mut buf[slot..slot + BYTES_PER_LENGTH_OFFSET], cur - start);
            cur = write_value(item, element, buf, cur)?;
        }
        Ok(cur)
    } else {
        let mut cur = start;
        for item in items {
            cur = write_value(item, element, buf, cur)?;
        }
        Ok(cur)
    }
}

fn write_container(
    value: &Value,
    fields: &[Field],
    buf: &mut [u8],
    start: usize,
) -> Result<usize, ValueError> {
    let map = value
        .as_container()
        .ok_or_else(|| ValueError::mismatch("container", value))?;
    let fixed_len: usize = fields.iter().map(|f| f.ty.fixed_portion_len()).sum();

    let mut fixed_idx = start;
    let mut cur = start + fixed_len;
    for field in fields {
        let field_value = map
            .get(&field.name)
            .ok_or_else(|| ValueError::new(ValueErrorKind::MissingField(field.name.clone())))?;
        if field.ty.is_variable_size() {
            write_offset(
                &mut buf[fixed_idx..fixed_idx + BYTES_PER_LENGTH_OFFSET],
                cur - start,
            );
            fixed_idx += BYTES_PER_LENGTH_OFFSET;
            cur = write_value(field_value, &field.ty, buf, cur)?;
        } else {
            fixed_idx = write_value(field_value, &field.ty, buf, fixed_idx)?;
        }
    }
    Ok(cur)
}

/// Writes a little-endian offset, relative to the enclosing aggregate.
fn write_offset(slot: &mut [u8], offset: usize) {
    debug_assert!(offset <= MAX_LENGTH_VALUE);
    slot.copy_from_slice(&(offset as u32).to_le_bytes());
}
