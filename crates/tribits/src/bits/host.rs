use num_bigint::{BigInt, BigUint};

use super::BitsValue;
use crate::BitsError;

/// Anything that can be turned into a bit vector by [`BitsType::from_py`].
///
/// [`BitsType::from_py`]: super::BitsType::from_py
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostValue {
    /// Every bit unknown.
    Unknown,
    Int(BigInt),
    /// Little-endian two's-complement encoding.
    Bytes(Vec<u8>),
    /// `0b`, `0o`, `0d` or `0h` prefixed digits; `x` digits are unknown.
    Digits(String),
    /// Integer tag of an enumerated value.
    Tag(BigInt),
}

/// Enumerated values that can be lowered to their integer tag.
pub trait IntTag {
    /// `None` when the value itself is not known.
    fn int_tag(&self) -> Option<BigInt>;
}

impl HostValue {
    pub fn tag<T: IntTag + ?Sized>(value: &T) -> Self {
        match value.int_tag() {
            Some(tag) => HostValue::Tag(tag),
            None => HostValue::Unknown,
        }
    }
}

macro_rules! host_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for HostValue {
                fn from(value: $t) -> Self {
                    HostValue::Int(BigInt::from(value))
                }
            }

            impl From<$t> for Operand<'_> {
                fn from(value: $t) -> Self {
                    Operand::Host(HostValue::from(value))
                }
            }
        )*
    };
}

host_value_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Int(BigInt::from(u8::from(value)))
    }
}

impl From<BigInt> for HostValue {
    fn from(value: BigInt) -> Self {
        HostValue::Int(value)
    }
}

impl From<BigUint> for HostValue {
    fn from(value: BigUint) -> Self {
        HostValue::Int(BigInt::from(value))
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::Digits(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::Digits(value)
    }
}

impl From<&[u8]> for HostValue {
    fn from(value: &[u8]) -> Self {
        HostValue::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for HostValue {
    fn from(value: &[u8; N]) -> Self {
        HostValue::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(value: Vec<u8>) -> Self {
        HostValue::Bytes(value)
    }
}

/// Right-hand side of a binary operator: another vector, or a host value
/// normalized through the left operand's type.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Value(&'a BitsValue),
    Host(HostValue),
}

impl Operand<'_> {
    pub fn unknown() -> Self {
        Operand::Host(HostValue::Unknown)
    }

    /// Integer used as a bit index or shift amount; `None` when not definite.
    pub(crate) fn definite_int(&self) -> Result<Option<BigInt>, BitsError> {
        match self {
            Operand::Value(v) => Ok(v.to_int().ok()),
            Operand::Host(HostValue::Int(i) | HostValue::Tag(i)) => Ok(Some(i.clone())),
            Operand::Host(HostValue::Unknown) => Ok(None),
            Operand::Host(other) => Err(BitsError::UnsupportedHostValue {
                detail: format!("{other:?} can not be used as an index or shift amount"),
            }),
        }
    }
}

impl<'a> From<&'a BitsValue> for Operand<'a> {
    fn from(value: &'a BitsValue) -> Self {
        Operand::Value(value)
    }
}

impl From<HostValue> for Operand<'_> {
    fn from(value: HostValue) -> Self {
        Operand::Host(value)
    }
}

impl From<bool> for Operand<'_> {
    fn from(value: bool) -> Self {
        Operand::Host(HostValue::from(value))
    }
}

impl From<BigInt> for Operand<'_> {
    fn from(value: BigInt) -> Self {
        Operand::Host(HostValue::Int(value))
    }
}

impl From<BigUint> for Operand<'_> {
    fn from(value: BigUint) -> Self {
        Operand::Host(HostValue::from(value))
    }
}

impl<'a> From<&'a str> for Operand<'a> {
    fn from(value: &'a str) -> Self {
        Operand::Host(HostValue::from(value))
    }
}
