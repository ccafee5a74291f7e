//! Operator table of [`BitsValue`].
//!
//! Every binary operator goes through [`BitsValue::binary`]: the right operand
//! is normalized and coerced to a common type, then evaluated with the
//! validity policy of the operator's [`OpKind`].

use std::borrow::Cow;

use log::{debug, trace};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

use super::{BitsType, BitsValue, Operand};
use crate::{
    BinaryOp, BitsError, OpKind, UnaryOp,
    bit_utils::{bit_field, get_bit, mask, rotate_left, rotate_right, to_unsigned},
    vld_masks::{vld_mask_for_and, vld_mask_for_or, vld_mask_for_xor},
};

/// Settle one attribute of the common operand type: equal values pass, a strict
/// side wins over a lax one, two strict sides must agree.
fn resolve<T: PartialEq + Copy>(l: T, r: T, l_strict: bool, r_strict: bool) -> Option<T> {
    match (l == r, l_strict, r_strict) {
        (true, _, _) => Some(l),
        (false, true, true) => None,
        (false, false, true) => Some(r),
        (false, _, false) => Some(l),
    }
}

/// Floor division and modulo; the remainder takes the sign of the divisor.
fn floor_div_rem(a: &BigInt, b: &BigInt) -> (BigInt, BigInt) {
    let mut q = a / b;
    let mut r = a % b;
    if !r.is_zero() && (r.sign() == Sign::Minus) != (b.sign() == Sign::Minus) {
        q -= 1;
        r += b;
    }
    (q, r)
}

fn conform<'a>(v: Cow<'a, BitsValue>, target: &BitsType) -> Cow<'a, BitsValue> {
    if v.dtype() == target {
        return v;
    }
    let nw = target.bit_length();
    let (raw, vld) = if nw > v.width() {
        if v.dtype().is_signed() {
            v.sext_parts(nw)
        } else {
            v.zext_parts(nw)
        }
    } else {
        (v.raw() & target.all_mask(), v.vld_mask() & target.all_mask())
    };
    Cow::Owned(BitsValue::new_unchecked(target.clone(), raw, vld))
}

fn eval_bitwise(op: BinaryOp, a: &BitsValue, b: &BitsValue) -> BitsValue {
    let pa = (a.raw(), a.vld_mask());
    let pb = (b.raw(), b.vld_mask());
    let (raw, vld) = match op {
        BinaryOp::And => (a.raw() & b.raw(), vld_mask_for_and(pa, pb)),
        BinaryOp::Or => (a.raw() | b.raw(), vld_mask_for_or(pa, pb)),
        BinaryOp::Xor => (a.raw() ^ b.raw(), vld_mask_for_xor(pa, pb)),
        _ => unreachable!("{op} is not a bitwise operator"),
    };
    BitsValue::new_unchecked(a.dtype().clone(), raw & &vld, vld)
}

fn eval_arith(op: BinaryOp, a: &BitsValue, b: &BitsValue) -> BitsValue {
    let ty = a.dtype();
    if !(a.is_full_valid() && b.is_full_valid()) {
        return ty.unknown();
    }
    let (x, y) = (a.signed_value(), b.signed_value());
    let res = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div | BinaryOp::Rem if y.is_zero() => {
            debug!("{a} {} {b}: division by zero", op.symbol());
            return ty.unknown();
        }
        BinaryOp::Div => floor_div_rem(&x, &y).0,
        BinaryOp::Rem => floor_div_rem(&x, &y).1,
        _ => unreachable!("{op} is not an arithmetic operator"),
    };
    BitsValue::new_unchecked(
        ty.clone(),
        to_unsigned(&res, ty.bit_length()),
        ty.all_mask().clone(),
    )
}

fn eval_compare(op: BinaryOp, a: &BitsValue, b: &BitsValue) -> BitsValue {
    let ord = a.signed_value().cmp(&b.signed_value());
    let res = match op {
        BinaryOp::Eq => ord.is_eq(),
        BinaryOp::Ne => ord.is_ne(),
        BinaryOp::Lt => ord.is_lt(),
        BinaryOp::Le => ord.is_le(),
        BinaryOp::Gt => ord.is_gt(),
        BinaryOp::Ge => ord.is_ge(),
        _ => unreachable!("{op} is not a comparison"),
    };
    let vld = a.is_full_valid() && b.is_full_valid();
    BitsValue::new_unchecked(
        BitsType::bit(),
        BigUint::from(u8::from(res)),
        BigUint::from(u8::from(vld)),
    )
}

/// Evaluate `op` on two operands already coerced to the same type.
fn eval_binary(op: BinaryOp, a: &BitsValue, b: &BitsValue) -> BitsValue {
    match op.kind() {
        OpKind::Bitwise => eval_bitwise(op, a, b),
        OpKind::Arith => eval_arith(op, a, b),
        OpKind::Compare => eval_compare(op, a, b),
        OpKind::Shift => unreachable!("shifts are evaluated by BitsValue::shift"),
    }
}

impl BitsValue {
    /// Apply a binary operator. `rhs` may be another vector or a host value,
    /// which is normalized with this value's type first.
    pub fn binary<'o>(
        &self,
        op: BinaryOp,
        rhs: impl Into<Operand<'o>>,
    ) -> Result<BitsValue, BitsError> {
        let rhs = rhs.into();
        trace!("{self} {} {rhs:?}", op.symbol());
        match op {
            BinaryOp::Shr if self.dtype().is_signed() => return self.shift(BinaryOp::Sar, rhs),
            _ if op.kind() == OpKind::Shift => return self.shift(op, rhs),
            _ => {}
        }
        let (a, b) = self.coerce(op, &rhs)?;
        Ok(eval_binary(op, &a, &b))
    }

    pub fn unary(&self, op: UnaryOp) -> BitsValue {
        let ty = self.dtype();
        match op {
            UnaryOp::BitNot => BitsValue::new_unchecked(
                ty.clone(),
                ty.all_mask() ^ self.raw(),
                self.vld_mask().clone(),
            ),
            UnaryOp::Minus => {
                if !self.is_full_valid() {
                    return ty.unknown();
                }
                BitsValue::new_unchecked(
                    ty.clone(),
                    to_unsigned(&-self.signed_value(), ty.bit_length()),
                    ty.all_mask().clone(),
                )
            }
        }
    }

    /// Bring both operands to one type following the strict width/sign rules.
    fn coerce<'a>(
        &'a self,
        op: BinaryOp,
        rhs: &'a Operand<'_>,
    ) -> Result<(Cow<'a, BitsValue>, Cow<'a, BitsValue>), BitsError> {
        let rhs = match rhs {
            Operand::Value(v) => Cow::Borrowed(*v),
            Operand::Host(h) => Cow::Owned(self.dtype().from_py(h.clone())?),
        };
        let (lt, rt) = (self.dtype(), rhs.dtype());
        if lt == rt {
            return Ok((Cow::Borrowed(self), rhs));
        }
        let mismatch = || BitsError::TypeMismatch {
            op,
            lhs: lt.to_string(),
            rhs: rt.to_string(),
        };

        let width = resolve(
            lt.bit_length(),
            rt.bit_length(),
            lt.strict_width(),
            rt.strict_width(),
        )
        .ok_or_else(mismatch)?;
        let signed = resolve(
            lt.signed_flag(),
            rt.signed_flag(),
            lt.strict_sign(),
            rt.strict_sign(),
        )
        .ok_or_else(mismatch)?;

        let target = if lt.bit_length() == width && lt.signed_flag() == signed {
            lt.clone()
        } else if rt.bit_length() == width && rt.signed_flag() == signed {
            rt.clone()
        } else {
            lt.with_bit_length(width).with_signed(signed)
        };
        Ok((conform(Cow::Borrowed(self), &target), conform(rhs, &target)))
    }

    /// Definite non-negative shift amount, `None` when unknown.
    fn shift_amount(op: BinaryOp, amount: Operand<'_>) -> Result<Option<BigInt>, BitsError> {
        match amount.definite_int()? {
            Some(o) if o.sign() == Sign::Minus => Err(BitsError::unsupported(
                "negative shift amount",
                format!("{op} by {o}"),
            )),
            o => Ok(o),
        }
    }

    /// `Shr` is always logical here; [`BitsValue::binary`] picks `Sar` for signed types.
    fn shift(&self, op: BinaryOp, amount: Operand<'_>) -> Result<BitsValue, BitsError> {
        let ty = self.dtype();
        let w = ty.bit_length();
        let Some(o) = Self::shift_amount(op, amount)? else {
            return Ok(ty.unknown());
        };
        let all = ty.all_mask();
        let (raw, vld) = match op {
            BinaryOp::Rotl | BinaryOp::Rotr => {
                let n = (o % BigInt::from(w)).to_usize().unwrap_or_default();
                let rotate = if op == BinaryOp::Rotl {
                    rotate_left
                } else {
                    rotate_right
                };
                (rotate(self.raw(), n, w), rotate(self.vld_mask(), n, w))
            }
            BinaryOp::Sar => {
                let o = o.to_usize().map_or(w, |o| o.min(w));
                let fill = bit_field(w - o, w);
                let mut raw = self.raw() >> o;
                let mut vld = self.vld_mask() >> o;
                if get_bit(self.raw(), w - 1) {
                    raw |= &fill;
                }
                if get_bit(self.vld_mask(), w - 1) {
                    vld |= &fill;
                }
                (raw, vld)
            }
            _ => match o.to_usize().filter(|o| *o < w) {
                None => (BigUint::zero(), all.clone()),
                Some(0) => (self.raw().clone(), self.vld_mask().clone()),
                Some(o) if op == BinaryOp::Shl => (
                    (self.raw() << o) & all,
                    ((self.vld_mask() << o) | mask(o)) & all,
                ),
                Some(o) => (
                    self.raw() >> o,
                    (self.vld_mask() >> o) | bit_field(w - o, w),
                ),
            },
        };
        Ok(BitsValue::new_unchecked(ty.clone(), raw, vld))
    }

    pub fn add<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Add, rhs)
    }

    pub fn sub<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Sub, rhs)
    }

    /// Product wrapped into the result width.
    pub fn mul<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Mul, rhs)
    }

    /// Quotient rounded towards negative infinity. Division by zero gives an
    /// unknown result.
    pub fn floor_div<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Div, rhs)
    }

    /// Remainder of [`floor_div`](Self::floor_div), with the sign of the divisor.
    pub fn rem<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Rem, rhs)
    }

    pub fn neg(&self) -> BitsValue {
        self.unary(UnaryOp::Minus)
    }

    pub fn bit_and<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn bit_or<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn bit_xor<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Xor, rhs)
    }

    pub fn bit_not(&self) -> BitsValue {
        self.unary(UnaryOp::BitNot)
    }

    pub fn cmp_eq<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn cmp_ne<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Ne, rhs)
    }

    pub fn cmp_lt<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn cmp_le<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Le, rhs)
    }

    pub fn cmp_gt<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn cmp_ge<'o>(&self, rhs: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Ge, rhs)
    }

    /// Shift in defined zeros from the LSB side.
    pub fn shl<'o>(&self, amount: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Shl, amount)
    }

    /// Arithmetic shift for signed types, logical otherwise.
    pub fn shr<'o>(&self, amount: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Shr, amount)
    }

    /// Logical shift regardless of signedness.
    pub fn lshr<'o>(&self, amount: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.shift(BinaryOp::Shr, amount.into())
    }

    /// Replicates the sign bit and its validity.
    pub fn ashr<'o>(&self, amount: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Sar, amount)
    }

    pub fn rotl<'o>(&self, amount: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Rotl, amount)
    }

    pub fn rotr<'o>(&self, amount: impl Into<Operand<'o>>) -> Result<BitsValue, BitsError> {
        self.binary(BinaryOp::Rotr, amount)
    }
}
