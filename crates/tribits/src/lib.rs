//! Fixed-width bit vectors whose every bit is 0, 1 or unknown (X).
//!
//! A [`BitsValue`] pairs a raw bit pattern with a validity mask. Every operator
//! propagates validity the way an HDL simulator treats undefined signals:
//!
//! ```
//! use tribits::{BigInt, BitsType};
//!
//! let u8_t = BitsType::new(8);
//! let a = u8_t.from_py("0b0000xxxx").unwrap();
//! let zero = u8_t.from_py(0).unwrap();
//!
//! // a defined 0 masks out the unknown bits
//! assert_eq!(a.bit_and(&zero).unwrap().to_int().unwrap(), BigInt::from(0));
//! // arithmetic on an unknown operand is unknown as a whole
//! assert!(a.add(1).unwrap().to_int().is_err());
//! ```

mod access;
mod array;
pub mod bit_utils;
mod bits;
mod enum_type;
mod error;
mod op;
pub mod vld_masks;

pub(crate) use fxhash::FxHashMap as HashMap;

pub use access::BitAccess;
pub use array::{ArrayType, ArrayValue};
pub use bits::{BitsType, BitsTypeBuilder, BitsValue, HostValue, IntTag, Operand};
pub use enum_type::{EnumType, EnumValue};
pub use error::BitsError;
pub use num_bigint::{BigInt, BigUint};
pub use op::{BinaryOp, OpKind, UnaryOp};
