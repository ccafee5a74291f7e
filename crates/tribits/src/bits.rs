mod host;
mod ops;
mod ty;
mod value;

pub use host::{HostValue, IntTag, Operand};
pub use ty::{BitsType, BitsTypeBuilder};
pub use value::BitsValue;
