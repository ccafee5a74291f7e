use num_bigint::{BigInt, BigUint};
use thiserror::Error;

use crate::op::BinaryOp;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitsError {
    /// A value with unknown bits was used where a definite integer is required.
    #[error("Value is not fully defined and can not be converted to a definite integer")]
    Indeterminate,

    #[error("Value {value} is out of range of {ty}")]
    OutOfRange { value: BigInt, ty: String },

    #[error("Negative value {value} for unsigned type {ty}")]
    NegativeUnsigned { value: BigInt, ty: String },

    #[error("Malformed literal `{input}` ({detail})")]
    Format { input: String, detail: String },

    #[error("Validity mask {mask:#x} is out of range for a {width}-bit type")]
    MaskOutOfRange { mask: BigUint, width: usize },

    #[error("Literal `{input}` contains x digits and can not be combined with an explicit validity mask")]
    MaskWithUnknownDigits { input: String },

    #[error("Incompatible operand types for {op}: {lhs} and {rhs}")]
    TypeMismatch { op: BinaryOp, lhs: String, rhs: String },

    #[error("Expected a value of {expected}, found {found}")]
    IncompatibleType { expected: String, found: String },

    #[error("Duplicate tag `{tag}` in enum `{name}`")]
    DuplicateTag { name: String, tag: String },

    #[error("Unsupported host value ({detail})")]
    UnsupportedHostValue { detail: String },

    #[error("Bit index {index} is out of range for a {width}-bit value")]
    IndexOutOfRange { index: BigInt, width: usize },

    #[error("Slice [{hi}:{lo}] is out of range for a {width}-bit value")]
    SliceOutOfRange { hi: usize, lo: usize, width: usize },

    #[error("Unsupported operation: {feature} ({detail})")]
    Unsupported {
        feature: &'static str,
        detail: String,
    },
}

impl BitsError {
    pub(crate) fn unsupported(feature: &'static str, detail: impl Into<String>) -> Self {
        Self::Unsupported {
            feature,
            detail: detail.into(),
        }
    }

    pub(crate) fn format(input: &str, detail: impl Into<String>) -> Self {
        Self::Format {
            input: input.to_string(),
            detail: detail.into(),
        }
    }
}
