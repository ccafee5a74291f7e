use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use log::trace;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Num, One, Zero};
use once_cell::sync::Lazy;

use super::{BitsValue, HostValue};
use crate::{
    ArrayType, BitsError,
    bit_utils::{bits_per_digit, get_bit, int_base, mask, to_unsigned},
};

static BIT: Lazy<BitsType> = Lazy::new(|| BitsType::new(1));

#[derive(Debug)]
struct TypeInfo {
    bit_length: usize,
    signed: Option<bool>,
    strict_width: bool,
    strict_sign: bool,
    force_vector: bool,
    name: Option<String>,
    all_mask: BigUint,
}

/// Type of a fixed-width vector whose every bit is 0, 1 or unknown.
///
/// The descriptor is immutable and cheap to clone; all values of a type share
/// one allocation.
///
/// With `strict_width`/`strict_sign` set (the default), operators only accept
/// operands of exactly this width/signedness. An operation is not strict if at
/// least one operand does not have the flag set; the result width/sign is then
/// taken from the strict operand, or from the left one if neither is strict.
#[derive(Debug, Clone)]
pub struct BitsType(Arc<TypeInfo>);

/// Fluent configuration of a [`BitsType`].
#[derive(Debug, Clone)]
pub struct BitsTypeBuilder {
    bit_length: usize,
    signed: Option<bool>,
    strict_width: bool,
    strict_sign: bool,
    force_vector: bool,
    name: Option<String>,
}

impl BitsTypeBuilder {
    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = Some(signed);
        self
    }

    /// Set the tri-state signedness; `None` leaves it unspecified.
    pub fn signedness(mut self, signed: Option<bool>) -> Self {
        self.signed = signed;
        self
    }

    pub fn strict_width(mut self, strict: bool) -> Self {
        self.strict_width = strict;
        self
    }

    pub fn strict_sign(mut self, strict: bool) -> Self {
        self.strict_sign = strict;
        self
    }

    /// Render as a vector even when 1 bit wide (`std_logic_vector(0 downto 0)`).
    pub fn force_vector(mut self, force: bool) -> Self {
        self.force_vector = force;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// # Panics
    ///
    /// Panics if the bit length is 0.
    pub fn build(self) -> BitsType {
        assert!(self.bit_length > 0, "BitsType must be at least 1 bit wide");
        BitsType(Arc::new(TypeInfo {
            all_mask: mask(self.bit_length),
            bit_length: self.bit_length,
            signed: self.signed,
            strict_width: self.strict_width,
            strict_sign: self.strict_sign,
            force_vector: self.force_vector,
            name: self.name,
        }))
    }
}

impl BitsType {
    /// Unsigned, strict type of `bit_length` bits.
    pub fn new(bit_length: usize) -> Self {
        Self::builder(bit_length).build()
    }

    pub fn signed(bit_length: usize) -> Self {
        Self::builder(bit_length).signed(true).build()
    }

    pub fn builder(bit_length: usize) -> BitsTypeBuilder {
        BitsTypeBuilder {
            bit_length,
            signed: Some(false),
            strict_width: true,
            strict_sign: true,
            force_vector: false,
            name: None,
        }
    }

    /// The 1-bit type of comparison results.
    pub fn bit() -> BitsType {
        BIT.clone()
    }

    /// Builder pre-filled with this type's settings.
    pub fn to_builder(&self) -> BitsTypeBuilder {
        BitsTypeBuilder {
            bit_length: self.0.bit_length,
            signed: self.0.signed,
            strict_width: self.0.strict_width,
            strict_sign: self.0.strict_sign,
            force_vector: self.0.force_vector,
            name: self.0.name.clone(),
        }
    }

    pub fn with_bit_length(&self, bit_length: usize) -> BitsType {
        if bit_length == self.bit_length() {
            return self.clone();
        }
        let mut b = self.to_builder();
        b.bit_length = bit_length;
        b.build()
    }

    pub fn with_signed(&self, signed: Option<bool>) -> BitsType {
        if signed == self.signed_flag() {
            return self.clone();
        }
        self.to_builder().signedness(signed).build()
    }

    pub fn bit_length(&self) -> usize {
        self.0.bit_length
    }

    pub fn signed_flag(&self) -> Option<bool> {
        self.0.signed
    }

    pub fn is_signed(&self) -> bool {
        self.0.signed == Some(true)
    }

    pub fn strict_width(&self) -> bool {
        self.0.strict_width
    }

    pub fn strict_sign(&self) -> bool {
        self.0.strict_sign
    }

    pub fn force_vector(&self) -> bool {
        self.0.force_vector
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Mask of every bit of this type (`0b111` for 3 bits).
    pub fn all_mask(&self) -> &BigUint {
        &self.0.all_mask
    }

    /// Inclusive `(min, max)` of the signed or unsigned interpretation.
    pub fn get_domain_range(&self) -> (BigInt, BigInt) {
        if self.is_signed() {
            let half = BigInt::one() << (self.bit_length() - 1);
            (-half.clone(), half - 1)
        } else {
            (BigInt::zero(), BigInt::from(self.all_mask().clone()))
        }
    }

    pub fn array(&self, size: usize) -> ArrayType {
        ArrayType::new(self.clone(), size)
    }

    /// Build a value from a host value; every bit of a defined host value is valid.
    pub fn from_py(&self, value: impl Into<HostValue>) -> Result<BitsValue, BitsError> {
        let (raw, vld) = self.normalize(value.into(), None)?;
        Ok(BitsValue::new_unchecked(self.clone(), raw, vld))
    }

    /// Build a value with an explicit validity mask; bits outside the mask
    /// are not significant.
    pub fn from_py_with_mask(
        &self,
        value: impl Into<HostValue>,
        vld_mask: impl Into<BigUint>,
    ) -> Result<BitsValue, BitsError> {
        let (raw, vld) = self.normalize(value.into(), Some(vld_mask.into()))?;
        Ok(BitsValue::new_unchecked(self.clone(), raw, vld))
    }

    /// Wrap an already validated (raw, validity) pair. Bits above the width
    /// are dropped.
    pub fn from_raw_parts(&self, raw: BigUint, vld: BigUint) -> BitsValue {
        let all = self.all_mask();
        BitsValue::new_unchecked(self.clone(), raw & all, vld & all)
    }

    /// Value with every bit unknown.
    pub fn unknown(&self) -> BitsValue {
        BitsValue::new_unchecked(self.clone(), BigUint::zero(), BigUint::zero())
    }

    fn normalize(
        &self,
        value: HostValue,
        vld_mask: Option<BigUint>,
    ) -> Result<(BigUint, BigUint), BitsError> {
        match value {
            HostValue::Unknown => {
                if vld_mask.is_some_and(|m| !m.is_zero()) {
                    return Err(BitsError::UnsupportedHostValue {
                        detail: "unknown value with a non-zero validity mask".to_string(),
                    });
                }
                Ok((BigUint::zero(), BigUint::zero()))
            }
            HostValue::Int(v) | HostValue::Tag(v) => self.normalize_int(&v, vld_mask),
            HostValue::Bytes(bytes) => {
                let v = if self.is_signed() {
                    BigInt::from_signed_bytes_le(&bytes)
                } else {
                    BigInt::from_bytes_le(Sign::Plus, &bytes)
                };
                self.normalize_int(&v, vld_mask)
            }
            HostValue::Digits(s) => self.normalize_digits(&s, vld_mask),
        }
    }

    fn normalize_digits(
        &self,
        input: &str,
        vld_mask: Option<BigUint>,
    ) -> Result<(BigUint, BigUint), BitsError> {
        let lower = input.to_ascii_lowercase();
        let mut chars = lower.chars();
        if chars.next() != Some('0') {
            return Err(BitsError::format(input, "expected 0<base><digits>"));
        }
        let base = chars
            .next()
            .and_then(int_base)
            .ok_or_else(|| BitsError::format(input, "unknown base, expected one of b, o, d, h"))?;
        let digits = chars.as_str();
        if digits.is_empty() {
            return Err(BitsError::format(input, "no digits"));
        }

        if let Ok(v) = BigUint::from_str_radix(digits, base) {
            return self.normalize_int(&BigInt::from(v), vld_mask);
        }

        if vld_mask.is_some() {
            return Err(BitsError::MaskWithUnknownDigits {
                input: input.to_string(),
            });
        }
        if base == 10 && digits.contains('x') {
            return Err(BitsError::unsupported(
                "decimal literal",
                format!("x digits in `{input}`"),
            ));
        }

        let bits_per_char = bits_per_digit(base);
        let char_mask = mask(bits_per_char);
        let mut val = BigUint::zero();
        let mut vld = BigUint::zero();
        for c in digits.chars() {
            val <<= bits_per_char;
            vld <<= bits_per_char;
            if c == 'x' {
                continue;
            }
            let d = c.to_digit(base).ok_or_else(|| {
                BitsError::format(input, format!("invalid digit '{c}' for base {base}"))
            })?;
            vld |= &char_mask;
            val |= BigUint::from(d);
        }
        trace!("literal {input} parsed digit by digit: val={val:#x} vld={vld:#x}");
        self.normalize_int(&BigInt::from(val), Some(vld))
    }

    fn normalize_int(
        &self,
        val: &BigInt,
        vld_mask: Option<BigUint>,
    ) -> Result<(BigUint, BigUint), BitsError> {
        let all_mask = self.all_mask();
        let w = self.bit_length();
        let vld = match vld_mask {
            None => all_mask.clone(),
            Some(m) if m > *all_mask => {
                return Err(BitsError::MaskOutOfRange { mask: m, width: w });
            }
            Some(m) => m,
        };
        let out_of_range = || BitsError::OutOfRange {
            value: val.clone(),
            ty: self.to_string(),
        };

        let raw = if val.sign() == Sign::Minus {
            if !self.is_signed() {
                return Err(BitsError::NegativeUnsigned {
                    value: val.clone(),
                    ty: self.to_string(),
                });
            }
            let (min, _) = self.get_domain_range();
            if *val < min {
                return Err(out_of_range());
            }
            to_unsigned(val, w)
        } else {
            let magnitude = val.magnitude();
            if magnitude > all_mask {
                return Err(out_of_range());
            }
            // a set sign bit is only an overflow if it is significant
            if self.is_signed() && get_bit(magnitude, w - 1) && get_bit(&vld, w - 1) {
                return Err(out_of_range());
            }
            magnitude.clone()
        };
        Ok((raw & &vld, vld))
    }
}

impl PartialEq for BitsType {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.0, &other.0);
        Arc::ptr_eq(&self.0, &other.0)
            || (a.bit_length == b.bit_length
                && a.name == b.name
                && (a.force_vector == b.force_vector || a.bit_length > 1)
                && a.strict_sign == b.strict_sign
                && a.strict_width == b.strict_width
                && a.signed == b.signed)
    }
}

impl Eq for BitsType {}

impl Hash for BitsType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.bit_length.hash(state);
        self.0.signed.hash(state);
        self.0.name.hash(state);
        self.0.strict_sign.hash(state);
        self.0.strict_width.hash(state);
    }
}

impl fmt::Display for BitsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut constr = Vec::new();
        if let Some(name) = self.name() {
            constr.push(format!("\"{name}\""));
        }
        constr.push(format!("{}bits", self.bit_length()));
        if self.force_vector() {
            constr.push("force_vector".to_string());
        }
        match self.signed_flag() {
            Some(true) => constr.push("signed".to_string()),
            Some(false) => constr.push("unsigned".to_string()),
            None => {}
        }
        if !self.strict_sign() {
            constr.push("strict_sign=false".to_string());
        }
        if !self.strict_width() {
            constr.push("strict_width=false".to_string());
        }
        write!(f, "<Bits, {}>", constr.join(", "))
    }
}
