//! Dynamic values for runtime-described SSZ types.

use ethereum_types::{U128, U256};
use std::collections::HashMap;

/// A dynamic value that can inhabit any [`SszType`](crate::SszType).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Native unsigned integer: widths up to eight bytes, and wider
    /// types declared `use_native`.
    Uint(u64),
    /// 16-byte unsigned integer.
    Uint128(U128),
    /// 32-byte unsigned integer.
    Uint256(U256),
    /// Byte strings, both fixed vectors and lists.
    Bytes(Vec<u8>),
    /// Homogeneous sequences, both vectors and lists.
    List(Vec<Value>),
    /// Field name to value. Insertion order is irrelevant; serialization
    /// follows the descriptor's declaration order.
    Container(HashMap<String, Value>),
}

impl Value {
    /// Builds a container value from `(name, value)` pairs.
    pub fn container<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Container(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<U128> {
        match self {
            Value::Uint128(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u256(&self) -> Option<U256> {
        match self {
            Value::Uint256(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Container(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up a container field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_container()?.get(name)
    }

    /// Short name of the value's variant, for diagnostics.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Uint(_) => "uint",
            Value::Uint128(_) => "uint128",
            Value::Uint256(_) => "uint256",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Container(_) => "container",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_uint {
    ($type: ident) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::Uint(v as u64)
            }
        }
    };
}

impl_from_uint!(u8);
impl_from_uint!(u16);
impl_from_uint!(u32);
impl_from_uint!(u64);

impl From<U128> for Value {
    fn from(v: U128) -> Self {
        Value::Uint128(v)
    }
}

impl From<U256> for Value {
    fn from(v: U256) -> Self {
        Value::Uint256(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}
