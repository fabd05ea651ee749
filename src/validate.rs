//! Pre-serialization value validation.
//!
//! Validation and serialization are two separate passes: a value that
//! passes [`validate`] cannot make the serializer fail, so any write-side
//! inconsistency is a bug rather than a user error.

use crate::types::{Field, SszType};
use crate::value::Value;
use ethereum_types::{U128, U256};
use std::fmt;

/// Returned when a value does not conform to its type descriptor.
#[derive(Debug, PartialEq, Clone)]
pub struct ValueError {
    /// Dotted field/index trail locating the offending value, empty at
    /// the root.
    pub path: String,
    pub kind: ValueErrorKind,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ValueErrorKind {
    /// The value's variant does not match the descriptor.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A uint does not fit its declared width once the bias is applied.
    OutOfRange { byte_length: usize },
    /// A byte-vector or vector has the wrong length.
    WrongLength { len: usize, expected: usize },
    /// A list is longer than its declared maximum.
    MaxLengthExceeded { len: usize, max: usize },
    /// A declared container field is absent from the value.
    MissingField(String),
    /// The value carries a field the container does not declare.
    UnknownField(String),
    /// The descriptor carries a uint width the codec does not support.
    UnsupportedUintWidth(usize),
}

impl ValueError {
    pub(crate) fn new(kind: ValueErrorKind) -> Self {
        Self {
            path: String::new(),
            kind,
        }
    }

    pub(crate) fn mismatch(expected: &'static str, found: &Value) -> Self {
        Self::new(ValueErrorKind::TypeMismatch {
            expected,
            found: found.kind(),
        })
    }

    /// Prefixes `segment` onto the error's path.
    pub(crate) fn nested(mut self, segment: &str) -> Self {
        if self.path.is_empty() {
            self.path = segment.to_string();
        } else {
            self.path = format!("{}.{}", segment, self.path);
        }
        self
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl fmt::Display for ValueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            Self::OutOfRange { byte_length } => {
                write!(f, "value out of range for uint{}", byte_length * 8)
            }
            Self::WrongLength { len, expected } => {
                write!(f, "length {} does not match expected {}", len, expected)
            }
            Self::MaxLengthExceeded { len, max } => {
                write!(f, "length {} exceeds maximum {}", len, max)
            }
            Self::MissingField(name) => write!(f, "missing field {:?}", name),
            Self::UnknownField(name) => write!(f, "unknown field {:?}", name),
            Self::UnsupportedUintWidth(bits) => {
                write!(f, "unsupported uint width: {} bits", bits)
            }
        }
    }
}

impl std::error::Error for ValueError {}

/// Checks that `value` conforms to `ty`, recursing through aggregates.
pub fn validate(value: &Value, ty: &SszType) -> Result<(), ValueError> {
    match ty {
        SszType::Bool => match value {
            Value::Bool(_) => Ok(()),
            other => Err(ValueError::mismatch("bool", other)),
        },
        SszType::Uint {
            byte_length,
            bias,
            use_native,
        } => validate_uint(value, *byte_length, *bias, *use_native),
        SszType::ByteVector { length } => match value {
            Value::Bytes(bytes) if bytes.len() == *length => Ok(()),
            Value::Bytes(bytes) => Err(ValueError::new(ValueErrorKind::WrongLength {
                len: bytes.len(),
                expected: *length,
            })),
            other => Err(ValueError::mismatch("bytes", other)),
        },
        SszType::ByteList { max_length } => match value {
            Value::Bytes(bytes) => check_max(bytes.len(), *max_length),
            other => Err(ValueError::mismatch("bytes", other)),
        },
        SszType::Vector { element, length } => match value {
            Value::List(items) if items.len() == *length => validate_elements(items, element),
            Value::List(items) => Err(ValueError::new(ValueErrorKind::WrongLength {
                len: items.len(),
                expected: *length,
            })),
            other => Err(ValueError::mismatch("list", other)),
        },
        SszType::List {
            element,
            max_length,
        } => match value {
            Value::List(items) => {
                check_max(items.len(), *max_length)?;
                validate_elements(items, element)
            }
            other => Err(ValueError::mismatch("list", other)),
        },
        SszType::Container { fields, .. } => validate_container(value, fields),
    }
}

fn validate_uint(
    value: &Value,
    byte_length: usize,
    bias: u64,
    use_native: bool,
) -> Result<(), ValueError> {
    let out_of_range = || ValueError::new(ValueErrorKind::OutOfRange { byte_length });
    match (byte_length, use_native) {
        (1..=8, _) => {
            let v = match value {
                Value::Uint(v) => *v,
                other => return Err(ValueError::mismatch("uint", other)),
            };
            let encoded = v.checked_add(bias).ok_or_else(out_of_range)?;
            if byte_length < 8 && encoded >= 1u64 << (8 * byte_length) {
                return Err(out_of_range());
            }
            Ok(())
        }
        (16 | 32, true) => match value {
            // Any native value fits a 16- or 32-byte width with room for
            // the bias; u64::MAX is the all-ones sentinel.
            Value::Uint(_) => Ok(()),
            other => Err(ValueError::mismatch("uint", other)),
        },
        (16, false) => {
            let v = match value {
                Value::Uint128(v) => *v,
                other => return Err(ValueError::mismatch("uint128", other)),
            };
            v.checked_add(U128::from(bias)).ok_or_else(out_of_range)?;
            Ok(())
        }
        (32, false) => {
            let v = match value {
                Value::Uint256(v) => *v,
                other => return Err(ValueError::mismatch("uint256", other)),
            };
            v.checked_add(U256::from(bias)).ok_or_else(out_of_range)?;
            Ok(())
        }
        _ => Err(ValueError::new(ValueErrorKind::UnsupportedUintWidth(
            byte_length * 8,
        ))),
    }
}

fn check_max(len: usize, max_length: Option<usize>) -> Result<(), ValueError> {
    match max_length {
        Some(max) if len > max => {
            Err(ValueError::new(ValueErrorKind::MaxLengthExceeded { len, max }))
        }
        _ => Ok(()),
    }
}

fn validate_elements(items: &[Value], element: &SszType) -> Result<(), ValueError> {
    for (i, item) in items.iter().enumerate() {
        validate(item, element).map_err(|e| e.nested(&i.to_string()))?;
    }
    Ok(())
}

fn validate_container(value: &Value, fields: &[Field]) -> Result<(), ValueError> {
    let map = match value {
        Value::Container(map) => map,
        other => return Err(ValueError::mismatch("container", other)),
    };
    for field in fields {
        let field_value = map
            .get(&field.name)
            .ok_or_else(|| ValueError::new(ValueErrorKind::MissingField(field.name.clone())))?;
        validate(field_value, &field.ty).map_err(|e| e.nested(&field.name))?;
    }
    if let Some(unknown) = map.keys().find(|k| fields.iter().all(|f| &f.name != *k)) {
        return Err(ValueError::new(ValueErrorKind::UnknownField(
            unknown.clone(),
        )));
    }
    Ok(())
}
