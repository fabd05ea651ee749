//! Runtime SSZ type descriptors and the shorthand normalizer.

use crate::{BYTES_PER_LENGTH_OFFSET, MAX_TYPE_DEPTH};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Returned when a type descriptor cannot be built.
#[derive(Debug, PartialEq, Clone)]
pub enum TypeError {
    /// The shorthand string does not name a known type.
    UnknownShorthand(String),
    /// `uintN` with a bit width outside {8, 16, 32, 64, 128, 256}.
    UnsupportedUintWidth(usize),
    /// A container declares the same field name twice.
    DuplicateFieldName(String),
    /// Vectors and byte-vectors must have a positive length.
    ZeroLengthVector,
    /// Sequence element types must not serialize to zero bytes; their
    /// count could not be recovered when decoding.
    ZeroSizedElement,
    /// The descriptor nests deeper than [`MAX_TYPE_DEPTH`].
    MaxDepthExceeded,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownShorthand(s) => write!(f, "unknown type shorthand: {:?}", s),
            Self::UnsupportedUintWidth(bits) => {
                write!(f, "unsupported uint width: {} bits", bits)
            }
            Self::DuplicateFieldName(name) => write!(f, "duplicate field name: {:?}", name),
            Self::ZeroLengthVector => write!(f, "vector length must be positive"),
            Self::ZeroSizedElement => {
                write!(f, "sequence elements must have a positive serialized length")
            }
            Self::MaxDepthExceeded => {
                write!(f, "descriptor nests deeper than {} levels", MAX_TYPE_DEPTH)
            }
        }
    }
}

impl std::error::Error for TypeError {}

/// A named field within a [`SszType::Container`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Arc<SszType>,
}

/// A fully-qualified SSZ type descriptor.
///
/// Descriptors are immutable once built; composites hold their element
/// types behind `Arc` so schemas can share subtrees. The checked
/// constructors ([`SszType::uint`], [`SszType::vector`], ...) and the
/// string parser ([`SszType::parse`]) are the supported ways to build one.
#[derive(Debug, Clone, PartialEq)]
pub enum SszType {
    /// Single-byte boolean.
    Bool,
    /// Little-endian unsigned integer of `byte_length` bytes.
    Uint {
        /// One of 1, 2, 4, 8, 16 or 32.
        byte_length: usize,
        /// Additive bias: added before encoding, subtracted after
        /// decoding.
        bias: u64,
        /// Carry values as native `u64` even when `byte_length` exceeds
        /// eight bytes; `u64::MAX` then stands for the all-ones maximum
        /// of the width.
        use_native: bool,
    },
    /// Fixed-length byte string.
    ByteVector { length: usize },
    /// Variable-length byte string, optionally bounded.
    ByteList { max_length: Option<usize> },
    /// Fixed-length homogeneous sequence.
    Vector {
        element: Arc<SszType>,
        length: usize,
    },
    /// Variable-length homogeneous sequence, optionally bounded.
    List {
        element: Arc<SszType>,
        max_length: Option<usize>,
    },
    /// Record with named fields, serialized in declaration order.
    Container { name: String, fields: Vec<Field> },
}

impl SszType {
    /// Normalizes a primitive shorthand string.
    ///
    /// Accepts `"bool"`, `"uintN"` for `N` in {8, 16, 32, 64, 128, 256},
    /// `"bytes"` (an unbounded byte list) and `"bytesN"` (a byte vector
    /// of `N` bytes).
    pub fn parse(shorthand: &str) -> Result<Self, TypeError> {
        let unknown = || TypeError::UnknownShorthand(shorthand.to_string());
        match shorthand {
            "bool" => Ok(SszType::Bool),
            "bytes" => Ok(SszType::byte_list()),
            _ => {
                if let Some(bits) = shorthand.strip_prefix("uint") {
                    let bits = bits.parse().map_err(|_| unknown())?;
                    Self::uint(bits)
                } else if let Some(length) = shorthand.strip_prefix("bytes") {
                    let length = length.parse().map_err(|_| unknown())?;
                    Self::byte_vector(length)
                } else {
                    Err(unknown())
                }
            }
        }
    }

    /// An unsigned integer type of `bits` bits, with no bias.
    ///
    /// Widths up to 64 bits default to the native `u64` representation;
    /// 128- and 256-bit widths default to `Uint128`/`Uint256` values.
    pub fn uint(bits: usize) -> Result<Self, TypeError> {
        match bits {
            8 | 16 | 32 | 64 | 128 | 256 => Ok(SszType::Uint {
                byte_length: bits / 8,
                bias: 0,
                use_native: bits <= 64,
            }),
            _ => Err(TypeError::UnsupportedUintWidth(bits)),
        }
    }

    /// A byte string of exactly `length` bytes.
    pub fn byte_vector(length: usize) -> Result<Self, TypeError> {
        if length == 0 {
            Err(TypeError::ZeroLengthVector)
        } else {
            Ok(SszType::ByteVector { length })
        }
    }

    /// An unbounded byte list.
    pub fn byte_list() -> Self {
        SszType::ByteList { max_length: None }
    }

    /// A byte list holding at most `max_length` bytes.
    pub fn bounded_byte_list(max_length: usize) -> Self {
        SszType::ByteList {
            max_length: Some(max_length),
        }
    }

    /// A sequence of exactly `length` elements.
    pub fn vector<T: Into<Arc<SszType>>>(element: T, length: usize) -> Result<Self, TypeError> {
        if length == 0 {
            return Err(TypeError::ZeroLengthVector);
        }
        let element = check_element(element.into())?;
        Ok(SszType::Vector { element, length })
    }

    /// An unbounded list.
    pub fn list<T: Into<Arc<SszType>>>(element: T) -> Result<Self, TypeError> {
        let element = check_element(element.into())?;
        Ok(SszType::List {
            element,
            max_length: None,
        })
    }

    /// A list holding at most `max_length` elements.
    pub fn bounded_list<T: Into<Arc<SszType>>>(
        element: T,
        max_length: usize,
    ) -> Result<Self, TypeError> {
        let element = check_element(element.into())?;
        Ok(SszType::List {
            element,
            max_length: Some(max_length),
        })
    }

    /// A container with the given fields, serialized in the given order.
    pub fn container<N, I, K, T>(name: N, fields: I) -> Result<Self, TypeError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Arc<SszType>>,
    {
        let mut out: Vec<Field> = Vec::new();
        for (name, ty) in fields {
            let name = name.into();
            if out.iter().any(|f| f.name == name) {
                return Err(TypeError::DuplicateFieldName(name));
            }
            out.push(Field {
                name,
                ty: ty.into(),
            });
        }
        check_depth(out.iter().map(|f| f.ty.depth()).max().unwrap_or(0))?;
        Ok(SszType::Container {
            name: name.into(),
            fields: out,
        })
    }

    /// Nesting depth of this descriptor; leaves have depth 1.
    pub fn depth(&self) -> usize {
        match self {
            SszType::Bool
            | SszType::Uint { .. }
            | SszType::ByteVector { .. }
            | SszType::ByteList { .. } => 1,
            SszType::Vector { element, .. } | SszType::List { element, .. } => 1 + element.depth(),
            SszType::Container { fields, .. } => {
                1 + fields.iter().map(|f| f.ty.depth()).max().unwrap_or(0)
            }
        }
    }

    /// The serialized length of this type, when the type alone determines
    /// it. Returns `None` for variable-size types.
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            SszType::Bool => Some(1),
            SszType::Uint { byte_length, .. } => Some(*byte_length),
            SszType::ByteVector { length } => Some(*length),
            SszType::ByteList { .. } | SszType::List { .. } => None,
            SszType::Vector { element, length } => {
                element.fixed_len().map(|elem| elem * length)
            }
            SszType::Container { fields, .. } => {
                fields.iter().map(|f| f.ty.fixed_len()).sum()
            }
        }
    }

    /// True if the serialized length depends on the value.
    pub fn is_variable_size(&self) -> bool {
        self.fixed_len().is_none()
    }

    /// The number of bytes this type occupies in the fixed region of an
    /// enclosing aggregate: its own length if fixed-size, otherwise one
    /// offset slot.
    pub fn fixed_portion_len(&self) -> usize {
        self.fixed_len().unwrap_or(BYTES_PER_LENGTH_OFFSET)
    }
}

fn check_depth(child_depth: usize) -> Result<(), TypeError> {
    if child_depth + 1 > MAX_TYPE_DEPTH {
        Err(TypeError::MaxDepthExceeded)
    } else {
        Ok(())
    }
}

/// A sequence element must nest within the depth bound and must occupy
/// at least one byte, or the decoder could not recover element counts.
fn check_element(element: Arc<SszType>) -> Result<Arc<SszType>, TypeError> {
    check_depth(element.depth())?;
    if element.fixed_len() == Some(0) {
        return Err(TypeError::ZeroSizedElement);
    }
    Ok(element)
}

impl FromStr for SszType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SszType::parse(s)
    }
}

impl fmt::Display for SszType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SszType::Bool => write!(f, "bool"),
            SszType::Uint { byte_length, .. } => write!(f, "uint{}", byte_length * 8),
            SszType::ByteVector { length } => write!(f, "bytes{}", length),
            SszType::ByteList { max_length: None } => write!(f, "bytes"),
            SszType::ByteList {
                max_length: Some(max),
            } => write!(f, "bytes[{}]", max),
            SszType::Vector { element, length } => write!(f, "Vector[{}, {}]", element, length),
            SszType::List {
                element,
                max_length: None,
            } => write!(f, "List[{}]", element),
            SszType::List {
                element,
                max_length: Some(max),
            } => write!(f, "List[{}, {}]", element, max),
            SszType::Container { name, .. } => write!(f, "{}", name),
        }
    }
}
