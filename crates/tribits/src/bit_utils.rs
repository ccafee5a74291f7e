//! Two-state bit manipulation helpers on arbitrary-width unsigned integers.
//!
//! Nothing here knows about validity; callers apply the same helper to the
//! raw value and to the validity mask when both have to move together.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::BitsError;

/// Mask of `bits` ones (`0b111` for 3).
pub fn mask(bits: usize) -> BigUint {
    (BigUint::one() << bits) - 1u32
}

/// Ones in bits `from..to` (`to` exclusive).
pub fn bit_field(from: usize, to: usize) -> BigUint {
    debug_assert!(from <= to, "bit_field: from must not exceed to");
    mask(to - from) << from
}

pub fn get_bit(val: &BigUint, bit_no: usize) -> bool {
    val.bit(bit_no as u64)
}

/// `len` bits of `val` starting at `start`.
pub fn get_bit_range(val: &BigUint, start: usize, len: usize) -> BigUint {
    (val >> start) & mask(len)
}

pub fn set_bit(val: &BigUint, bit_no: usize) -> BigUint {
    bit_set_to(val, bit_no, true)
}

pub fn clear_bit(val: &BigUint, bit_no: usize) -> BigUint {
    bit_set_to(val, bit_no, false)
}

pub fn toggle_bit(val: &BigUint, bit_no: usize) -> BigUint {
    val ^ (BigUint::one() << bit_no)
}

pub fn bit_set_to(val: &BigUint, bit_no: usize, bit_val: bool) -> BigUint {
    let mut res = val.clone();
    res.set_bit(bit_no as u64, bit_val);
    res
}

/// Replace `len` bits of `val` starting at `start` with the low bits of `new_bits`.
pub fn set_bit_range(val: &BigUint, start: usize, len: usize, new_bits: &BigUint) -> BigUint {
    let field = bit_field(start, start + len);
    let cleared = val - (val & &field);
    cleared | ((new_bits & mask(len)) << start)
}

/// Clear the `lower_bits` least significant bits.
pub fn align(val: &BigUint, lower_bits: usize) -> BigUint {
    (val >> lower_bits) << lower_bits
}

/// Bits of `val` from LSB to MSB.
pub fn iter_bits(val: &BigUint, len: usize) -> impl Iterator<Item = bool> + '_ {
    (0..len).map(move |i| get_bit(val, i))
}

/// Rotate a `width`-bit value left. Only `amount mod width` matters.
pub fn rotate_left(val: &BigUint, amount: usize, width: usize) -> BigUint {
    if width == 0 {
        return val.clone();
    }
    let amount = amount % width;
    if amount == 0 {
        return val.clone();
    }
    ((val << amount) | (val >> (width - amount))) & mask(width)
}

/// Rotate a `width`-bit value right. Only `amount mod width` matters.
pub fn rotate_right(val: &BigUint, amount: usize, width: usize) -> BigUint {
    if width == 0 {
        return val.clone();
    }
    rotate_left(val, width - amount % width, width)
}

pub fn popcount(val: &BigUint) -> u64 {
    val.count_ones()
}

/// Leading zeros of a `width`-bit value; an all-zero value yields `width`.
pub fn count_leading_zeros(val: &BigUint, width: usize) -> usize {
    if val.is_zero() {
        return width;
    }
    width.saturating_sub(val.bits() as usize)
}

/// Trailing zeros of a `width`-bit value; an all-zero value yields `width`.
pub fn count_trailing_zeros(val: &BigUint, width: usize) -> usize {
    match val.trailing_zeros() {
        Some(tz) => (tz as usize).min(width),
        None => width,
    }
}

/// Reinterpret a `width`-bit two's-complement pattern as a signed integer.
pub fn to_signed(val: &BigUint, width: usize) -> BigInt {
    if width > 0 && get_bit(val, width - 1) {
        BigInt::from(val.clone()) - (BigInt::one() << width)
    } else {
        BigInt::from(val.clone())
    }
}

/// Two's-complement pattern of `val` wrapped into `width` bits.
pub fn to_unsigned(val: &BigInt, width: usize) -> BigUint {
    let modulus = BigInt::one() << width;
    let mut wrapped = val % &modulus;
    if wrapped.sign() == Sign::Minus {
        wrapped += &modulus;
    }
    wrapped.to_biguint().unwrap_or_default()
}

/// Keep only the bytes of `val` whose bit in `byte_mask` is set.
pub fn mask_bytes(val: &BigUint, byte_mask: &BigUint, mask_bit_length: usize) -> BigUint {
    let byte = mask(8);
    let mut res = BigUint::zero();
    for (i, enabled) in iter_bits(byte_mask, mask_bit_length).enumerate() {
        if enabled {
            res |= ((val >> (i * 8)) & &byte) << (i * 8);
        }
    }
    res
}

pub fn reverse_bits(val: &BigUint, width: usize) -> BigUint {
    let mut res = BigUint::zero();
    for i in 0..width {
        if get_bit(val, width - i - 1) {
            res.set_bit(i as u64, true);
        }
    }
    res
}

/// Little-endian list of bits to an integer.
pub fn bit_list_to_int(bits: &[bool]) -> BigUint {
    let mut res = BigUint::zero();
    for (i, _) in bits.iter().enumerate().filter(|(_, b)| **b) {
        res.set_bit(i as u64, true);
    }
    res
}

/// Reverse the byte order of a little-endian bit list. The incomplete top
/// byte is zero-padded and becomes the first byte.
pub fn bit_list_reversed_endianity(bits: &[bool]) -> Vec<bool> {
    let mut items = Vec::with_capacity(bits.len().div_ceil(8) * 8);
    for byte in bits.rchunks(8) {
        items.extend_from_slice(byte);
        items.resize(items.len() + 8 - byte.len(), false);
    }
    items
}

/// Reverse the bit order inside every byte of a bit list.
pub fn bit_list_reversed_bits_in_bytes(bits: &[bool]) -> Result<Vec<bool>, BitsError> {
    let bytes = bits.chunks_exact(8);
    if !bytes.remainder().is_empty() {
        return Err(BitsError::unsupported(
            "bit list",
            format!("{} bits is not a whole number of bytes", bits.len()),
        ));
    }
    Ok(bytes.flat_map(|b| b.iter().rev().copied()).collect())
}

/// Radix selected by the character after the leading `0` of a literal.
pub fn int_base(base_char: char) -> Option<u32> {
    match base_char {
        'b' => Some(2),
        'o' => Some(8),
        'd' => Some(10),
        'h' => Some(16),
        _ => None,
    }
}

/// Number of bits one digit of `base` occupies.
pub fn bits_per_digit(base: u32) -> usize {
    (u32::BITS - (base - 1).leading_zeros()) as usize
}
