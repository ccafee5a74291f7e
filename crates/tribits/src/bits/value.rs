use std::fmt;

use log::debug;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

use super::{BitsType, HostValue, Operand};
use crate::{
    BitAccess, BitsError,
    bit_utils::{bit_field, get_bit, get_bit_range, mask, set_bit_range, to_signed},
};

/// A fixed-width vector of 0/1/X bits.
///
/// `raw` holds the bit pattern (two's complement for signed types) and `vld`
/// has a 1 for every bit whose `raw` value is known. Equality is structural:
/// two values are equal when type, raw and validity all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitsValue {
    dtype: BitsType,
    raw: BigUint,
    vld: BigUint,
}

impl BitsValue {
    /// Callers guarantee both parts fit in the width of `dtype`.
    pub(crate) fn new_unchecked(dtype: BitsType, raw: BigUint, vld: BigUint) -> Self {
        debug_assert!(raw <= *dtype.all_mask() && vld <= *dtype.all_mask());
        Self { dtype, raw, vld }
    }

    pub fn dtype(&self) -> &BitsType {
        &self.dtype
    }

    pub fn width(&self) -> usize {
        self.dtype.bit_length()
    }

    pub fn raw(&self) -> &BigUint {
        &self.raw
    }

    pub fn vld_mask(&self) -> &BigUint {
        &self.vld
    }

    pub fn is_full_valid(&self) -> bool {
        self.vld == *self.dtype.all_mask()
    }

    /// Structural identity, including unknown bits.
    pub fn is(&self, other: &BitsValue) -> bool {
        self == other
    }

    /// Copy with every bit marked unknown.
    pub fn invalidated(&self) -> BitsValue {
        Self {
            dtype: self.dtype.clone(),
            raw: self.raw.clone(),
            vld: BigUint::zero(),
        }
    }

    /// Raw pattern under this type's signedness, ignoring validity.
    pub(crate) fn signed_value(&self) -> BigInt {
        if self.dtype.is_signed() {
            to_signed(&self.raw, self.width())
        } else {
            BigInt::from(self.raw.clone())
        }
    }

    pub fn to_int(&self) -> Result<BigInt, BitsError> {
        if !self.is_full_valid() {
            return Err(BitsError::Indeterminate);
        }
        Ok(self.signed_value())
    }

    pub fn to_bool(&self) -> Result<bool, BitsError> {
        if !self.is_full_valid() {
            return Err(BitsError::Indeterminate);
        }
        Ok(!self.raw.is_zero())
    }

    /// Same bits and validity under another signedness.
    pub fn cast_sign(&self, signed: Option<bool>) -> BitsValue {
        Self {
            dtype: self.dtype.with_signed(signed),
            raw: self.raw.clone(),
            vld: self.vld.clone(),
        }
    }

    /// Truncate or zero-extend to the width of `ty` and adopt `ty`.
    pub fn cast(&self, ty: &BitsType) -> BitsValue {
        let (raw, vld) = if ty.bit_length() > self.width() {
            self.zext_parts(ty.bit_length())
        } else {
            (&self.raw & ty.all_mask(), &self.vld & ty.all_mask())
        };
        Self::new_unchecked(ty.clone(), raw, vld)
    }

    /// `self` on the MSB side, `other` on the LSB side. The result is unsigned.
    pub fn concat(&self, other: &BitsValue) -> BitsValue {
        let w = other.width();
        BitsValue::new_unchecked(
            BitsType::new(self.width() + w),
            (&self.raw << w) | &other.raw,
            (&self.vld << w) | &other.vld,
        )
    }

    pub fn zext(&self, new_width: usize) -> Result<BitsValue, BitsError> {
        self.check_ext(new_width)?;
        let (raw, vld) = self.zext_parts(new_width);
        Ok(Self::new_unchecked(self.dtype.with_bit_length(new_width), raw, vld))
    }

    pub fn sext(&self, new_width: usize) -> Result<BitsValue, BitsError> {
        self.check_ext(new_width)?;
        let (raw, vld) = self.sext_parts(new_width);
        Ok(Self::new_unchecked(self.dtype.with_bit_length(new_width), raw, vld))
    }

    /// Sign-extend signed values, zero-extend the rest.
    pub fn ext(&self, new_width: usize) -> Result<BitsValue, BitsError> {
        if self.dtype.is_signed() {
            self.sext(new_width)
        } else {
            self.zext(new_width)
        }
    }

    pub fn trunc(&self, new_width: usize) -> Result<BitsValue, BitsError> {
        if new_width == 0 || new_width > self.width() {
            return Err(BitsError::unsupported(
                "truncation",
                format!("can not truncate {} bits to {new_width}", self.width()),
            ));
        }
        let m = mask(new_width);
        Ok(Self::new_unchecked(
            self.dtype.with_bit_length(new_width),
            &self.raw & &m,
            &self.vld & &m,
        ))
    }

    fn check_ext(&self, new_width: usize) -> Result<(), BitsError> {
        if new_width < self.width() {
            return Err(BitsError::unsupported(
                "extension",
                format!("can not extend {} bits to {new_width}", self.width()),
            ));
        }
        Ok(())
    }

    pub(crate) fn zext_parts(&self, new_width: usize) -> (BigUint, BigUint) {
        let field = bit_field(self.width(), new_width);
        (self.raw.clone(), &self.vld | field)
    }

    pub(crate) fn sext_parts(&self, new_width: usize) -> (BigUint, BigUint) {
        let w = self.width();
        let field = bit_field(w, new_width);
        let mut raw = self.raw.clone();
        let mut vld = self.vld.clone();
        if get_bit(&self.raw, w - 1) {
            raw |= &field;
        }
        if get_bit(&self.vld, w - 1) {
            vld |= &field;
        }
        (raw, vld)
    }

    /// Type of a `size`-bit part of this value.
    fn part_type(&self, size: usize) -> BitsType {
        BitsType::builder(size)
            .signedness(self.dtype.signed_flag())
            .build()
    }

    fn bit_index(&self, index: BigInt) -> Result<usize, BitsError> {
        index
            .to_usize()
            .filter(|i| *i < self.width())
            .ok_or(BitsError::IndexOutOfRange {
                index,
                width: self.width(),
            })
    }

    /// Single bit; an indeterminate index gives an unknown bit.
    pub fn index<'o>(&self, index: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        let ty = self.part_type(1);
        let Some(i) = index.into().definite_int()? else {
            debug!("indexing {self} with an indeterminate index");
            return Ok(ty.unknown());
        };
        let i = self.bit_index(i)?;
        Ok(Self::new_unchecked(
            ty,
            get_bit_range(&self.raw, i, 1),
            get_bit_range(&self.vld, i, 1),
        ))
    }

    /// Bits `[hi:lo]`, `hi` exclusive. Defaults select the whole value.
    pub fn slice(
        &self,
        hi: impl Into<Option<usize>>,
        lo: impl Into<Option<usize>>,
    ) -> Result<BitsValue, BitsError> {
        let access = BitAccess::from_slice(hi.into(), lo.into(), self.width())?;
        Ok(self.select(&access))
    }

    pub fn select(&self, access: &BitAccess) -> BitsValue {
        let size = access.width();
        Self::new_unchecked(
            self.part_type(size),
            get_bit_range(&self.raw, access.lsb, size),
            get_bit_range(&self.vld, access.lsb, size),
        )
    }

    /// Assign one bit. Assigning through an indeterminate index invalidates
    /// the whole value.
    pub fn set_index<'i, 'v>(
        &mut self,
        index: impl Into<Operand<'i>>,
        value: impl Into<Operand<'v>>,
    ) -> Result<(), BitsError> {
        let Some(i) = index.into().definite_int()? else {
            debug!("assignment to {self} through an indeterminate index");
            self.raw = BigUint::zero();
            self.vld = BigUint::zero();
            return Ok(());
        };
        let i = self.bit_index(i)?;
        self.store(&BitAccess::new(i, i), value.into())
    }

    /// Assign bits `[hi:lo]`, `hi` exclusive.
    pub fn set_slice<'v>(
        &mut self,
        hi: impl Into<Option<usize>>,
        lo: impl Into<Option<usize>>,
        value: impl Into<Operand<'v>>,
    ) -> Result<(), BitsError> {
        let access = BitAccess::from_slice(hi.into(), lo.into(), self.width())?;
        self.store(&access, value.into())
    }

    fn store(&mut self, access: &BitAccess, value: Operand<'_>) -> Result<(), BitsError> {
        let size = access.width();
        let part = match value {
            Operand::Value(v) if v.width() == size => v.clone(),
            Operand::Value(v) => {
                return Err(BitsError::IncompatibleType {
                    expected: format!("{size}-bit value for {access}"),
                    found: v.dtype().to_string(),
                });
            }
            Operand::Host(h) => self.host_part(size, h)?,
        };
        self.raw = set_bit_range(&self.raw, access.lsb, size, &part.raw);
        self.vld = set_bit_range(&self.vld, access.lsb, size, &part.vld);
        Ok(())
    }

    /// Normalize a host value written into `size` bits. Negative integers are
    /// only accepted by signed receivers and land in two's complement.
    fn host_part(&self, size: usize, value: HostValue) -> Result<BitsValue, BitsError> {
        let negative = matches!(&value, HostValue::Int(i) if i.sign() == Sign::Minus);
        let ty = if negative {
            self.part_type(size)
        } else {
            BitsType::new(size)
        };
        ty.from_py(value)
    }

    /// `self ? a : b`. An indeterminate condition yields `a` with every bit unknown.
    pub fn ternary(&self, a: &BitsValue, b: &BitsValue) -> BitsValue {
        match self.to_bool() {
            Ok(true) => a.clone(),
            Ok(false) => b.clone(),
            Err(_) => {
                debug!("ternary select on indeterminate condition {self}");
                a.invalidated()
            }
        }
    }
}

impl fmt::Display for BitsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_full_valid() {
            write!(f, "<BitsValue {}>", self.signed_value())
        } else {
            write!(f, "<BitsValue {}, mask {:x}>", self.raw, self.vld)
        }
    }
}

fn narrow<T>(
    v: &BitsValue,
    convert: impl FnOnce(&BigInt) -> Option<T>,
    name: &str,
) -> Result<T, BitsError> {
    let value = v.to_int()?;
    convert(&value).ok_or(BitsError::OutOfRange {
        value,
        ty: name.to_string(),
    })
}

impl TryFrom<&BitsValue> for i64 {
    type Error = BitsError;

    fn try_from(v: &BitsValue) -> Result<Self, Self::Error> {
        narrow(v, BigInt::to_i64, "i64")
    }
}

impl TryFrom<&BitsValue> for u64 {
    type Error = BitsError;

    fn try_from(v: &BitsValue) -> Result<Self, Self::Error> {
        narrow(v, BigInt::to_u64, "u64")
    }
}

impl TryFrom<&BitsValue> for bool {
    type Error = BitsError;

    fn try_from(v: &BitsValue) -> Result<Self, Self::Error> {
        v.to_bool()
    }
}

impl TryFrom<&BitsValue> for BigInt {
    type Error = BitsError;

    fn try_from(v: &BitsValue) -> Result<Self, Self::Error> {
        v.to_int()
    }
}
