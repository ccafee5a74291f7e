//! Result validity of the bitwise operators.
//!
//! A result bit is known when both operand bits are known, or, for AND/OR,
//! when one known operand bit alone decides the result (a known 0 for AND, a
//! known 1 for OR). The whole width is computed at once.

use num_bigint::BigUint;

/// Known bits of `val` that are 0. `vld & !val` without a width-bound `!`.
fn known_zeros(val: &BigUint, vld: &BigUint) -> BigUint {
    vld ^ (vld & val)
}

fn known_ones(val: &BigUint, vld: &BigUint) -> BigUint {
    vld & val
}

// (val, vld)
// (0, 0) & (0, 0) -> (0, 0)
// (0, 1) & (0, 0) -> (0, 1)
// (0, 0) & (0, 1) -> (0, 1)
// (1, 1) & (0, 0) -> (0, 0)
pub fn vld_mask_for_and(a: (&BigUint, &BigUint), b: (&BigUint, &BigUint)) -> BigUint {
    let (a_val, a_vld) = a;
    let (b_val, b_vld) = b;
    (a_vld & b_vld) | known_zeros(a_val, a_vld) | known_zeros(b_val, b_vld)
}

pub fn vld_mask_for_or(a: (&BigUint, &BigUint), b: (&BigUint, &BigUint)) -> BigUint {
    let (a_val, a_vld) = a;
    let (b_val, b_vld) = b;
    (a_vld & b_vld) | known_ones(a_val, a_vld) | known_ones(b_val, b_vld)
}

pub fn vld_mask_for_xor(a: (&BigUint, &BigUint), b: (&BigUint, &BigUint)) -> BigUint {
    a.1 & b.1
}
