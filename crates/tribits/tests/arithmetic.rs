use num_traits::{One, Zero};
use test_case::test_case;
use tribits::{
    BigInt, BigUint, BinaryOp, BitsError, BitsType, BitsValue, HostValue, bit_utils::mask,
};

fn ty(width: usize, signed: bool) -> BitsType {
    BitsType::builder(width).signed(signed).build()
}

fn int(v: &BitsValue) -> BigInt {
    v.to_int().expect("value should be fully defined")
}

fn bi(v: i64) -> BigInt {
    BigInt::from(v)
}

/// (min, max, min as value, max as value)
fn min_max(t: &BitsType) -> (BigInt, BigInt, BitsValue, BitsValue) {
    let (lo, hi) = t.get_domain_range();
    let low = t.from_py(lo.clone()).unwrap();
    let up = t.from_py(hi.clone()).unwrap();
    (lo, hi, low, up)
}

#[test]
fn test_4b_sign_cast() {
    let t = BitsType::new(4);
    let v = t.from_py(0xf).unwrap();
    assert_eq!(int(&v), bi(0xf));
    assert_eq!(int(&v.cast_sign(Some(true))), bi(-1));
    assert_eq!(int(&v.cast_sign(Some(true)).cast_sign(Some(false))), bi(0xf));

    let v = t.from_py(0xe).unwrap();
    assert_eq!(int(&v.cast_sign(Some(true))), bi(-2));
    assert_eq!(int(&v.cast_sign(Some(true)).cast_sign(Some(false))), bi(0xe));
}

#[test]
fn test_4b_sext() {
    let t = BitsType::new(4);
    let v = t.from_py(0xf).unwrap();
    assert_eq!(int(&v.sext(4).unwrap()), bi(0x0f));
    assert_eq!(int(&v.sext(5).unwrap()), bi(0x1f));
    assert_eq!(int(&v.sext(6).unwrap()), bi(0x3f));
    assert!(matches!(v.sext(3), Err(BitsError::Unsupported { .. })));

    let v = t.from_py(0b0111).unwrap();
    assert_eq!(int(&v.sext(4).unwrap()), bi(0b0111));
    assert_eq!(int(&v.sext(6).unwrap()), bi(0b0111));
}

#[test]
fn test_signed_sext_keeps_value() {
    let v = BitsType::signed(4).from_py(-1).unwrap();
    let wide = v.sext(8).unwrap();
    assert_eq!(wide.raw(), &BigUint::from(0xffu32));
    assert!(wide.is_full_valid());
    assert_eq!(int(&wide), bi(-1));
}

#[test]
fn test_sext_replicates_unknown_msb() {
    let v = BitsType::new(4).from_py("0bx011").unwrap();
    let wide = v.sext(8).unwrap();
    assert_eq!(wide.vld_mask(), &BigUint::from(0b0000_0111u32));
    assert_eq!(wide.raw(), &BigUint::from(0b0000_0011u32));
}

#[test]
fn test_4b_zext() {
    let t = BitsType::new(4);
    let v = t.from_py(0xf).unwrap();
    assert_eq!(int(&v.zext(4).unwrap()), bi(0xf));
    assert_eq!(int(&v.zext(6).unwrap()), bi(0xf));
    assert!(v.zext(3).is_err());

    let partial = t.from_py("0bx011").unwrap();
    assert_eq!(partial.zext(6).unwrap().vld_mask(), &BigUint::from(0b11_0111u32));
}

#[test]
fn test_ext_picks_by_signedness() {
    let s = BitsType::signed(4).from_py(-2).unwrap();
    assert_eq!(int(&s.ext(8).unwrap()), bi(-2));
    let u = BitsType::new(4).from_py(0xe).unwrap();
    assert_eq!(int(&u.ext(8).unwrap()), bi(0xe));
}

#[test]
fn test_4b_trunc() {
    let v = BitsType::new(4).from_py(0xf).unwrap();
    assert_eq!(int(&v.trunc(3).unwrap()), bi(0b111));
    assert_eq!(int(&v.trunc(2).unwrap()), bi(0b11));
    assert!(v.trunc(5).is_err());
    assert!(v.trunc(0).is_err());

    let (_, _, low, up) = min_max(&BitsType::signed(4));
    assert_eq!(int(&low.trunc(3).unwrap()), bi(0));
    assert_eq!(int(&up.trunc(3).unwrap()), bi(-1));
}

#[test]
fn test_cast() {
    let v = BitsType::new(8).from_py(0xff).unwrap();
    let narrow = v.cast(&BitsType::signed(4));
    assert_eq!(int(&narrow), bi(-1));
    let wide = narrow.cast(&BitsType::new(12));
    assert_eq!(int(&wide), bi(0xf));
    assert_eq!(wide.dtype(), &BitsType::new(12));
}

#[test_case(8, true  ; "int8")]
#[test_case(8, false ; "uint8")]
#[test_case(512, true  ; "int512")]
#[test_case(512, false ; "uint512")]
fn test_add(width: usize, signed: bool) {
    let t = ty(width, signed);
    let (lo, hi, low, up) = min_max(&t);

    if signed {
        assert_eq!(int(&t.from_py(-1).unwrap().add(-1).unwrap()), bi(-2));
        assert_eq!(int(&t.from_py(-1).unwrap().add(0).unwrap()), bi(-1));
        assert_eq!(int(&t.from_py(-1).unwrap().add(1).unwrap()), bi(0));
        assert_eq!(int(&low.add(-1).unwrap()), hi.clone());
        assert_eq!(int(&up.add(-1).unwrap()), &hi - 1);
        assert_eq!(int(&t.from_py(-10).unwrap().add(20).unwrap()), bi(10));
        assert_eq!(int(&t.from_py(10).unwrap().add(-20).unwrap()), bi(-10));
        assert_eq!(int(&up.add(20).unwrap()), &lo + 19);
    } else {
        assert_eq!(int(&up.add(20).unwrap()), bi(19));
    }
    assert_eq!(int(&t.from_py(1).unwrap().add(0).unwrap()), bi(1));
    assert_eq!(int(&low.add(1).unwrap()), &lo + 1);
    assert_eq!(int(&up.add(1).unwrap()), lo);
}

#[test_case(8, true  ; "int8")]
#[test_case(8, false ; "uint8")]
#[test_case(512, true  ; "int512")]
#[test_case(512, false ; "uint512")]
fn test_sub(width: usize, signed: bool) {
    let t = ty(width, signed);
    let (lo, hi, low, up) = min_max(&t);

    if signed {
        assert_eq!(int(&t.from_py(-1).unwrap().sub(-1).unwrap()), bi(0));
        assert_eq!(int(&t.from_py(-1).unwrap().sub(1).unwrap()), bi(-2));
        assert_eq!(int(&low.sub(-1).unwrap()), &lo + 1);
        assert_eq!(int(&up.sub(-1).unwrap()), lo.clone());
        assert_eq!(int(&t.from_py(-10).unwrap().sub(20).unwrap()), bi(-30));
        assert_eq!(int(&t.from_py(10).unwrap().sub(-20).unwrap()), bi(30));
    } else {
        assert_eq!(int(&up.sub(hi.clone()).unwrap()), bi(0));
        assert_eq!(int(&t.from_py(1).unwrap().sub(1).unwrap()), bi(0));
        assert_eq!(int(&t.from_py(10).unwrap().sub(20).unwrap()), &hi - 10 + 1);
    }
    assert_eq!(int(&low.sub(1).unwrap()), hi.clone());
    assert_eq!(int(&t.from_py(1).unwrap().sub(0).unwrap()), bi(1));
    assert_eq!(int(&up.sub(1).unwrap()), hi - 1);
}

#[test_case(8, true  ; "int8")]
#[test_case(8, false ; "uint8")]
#[test_case(512, true  ; "int512")]
#[test_case(512, false ; "uint512")]
fn test_mul(width: usize, signed: bool) {
    let t = ty(width, signed);
    let ut = BitsType::new(width);
    let (_, _, low, up) = min_max(&t);

    let one = t.from_py(1).unwrap();
    assert_eq!(int(&one.mul(&one).unwrap()), bi(1));
    assert_eq!(int(&ut.from_py(0).unwrap().mul(1).unwrap()), bi(0));
    let all = ut.from_py(mask(width)).unwrap();
    assert_eq!(
        int(&all.mul(2).unwrap()),
        BigInt::from((mask(width) << 1) & mask(width))
    );
    assert_eq!(int(&low.mul(2).unwrap()), bi(0));

    if signed {
        let m1 = t.from_py(-1).unwrap();
        assert_eq!(int(&m1.mul(&m1).unwrap()), bi(1));
        assert_eq!(int(&t.from_py(0).unwrap().mul(-1).unwrap()), bi(0));
        assert!(matches!(
            m1.mul(&ut.from_py(2).unwrap()),
            Err(BitsError::TypeMismatch { .. })
        ));
        assert_eq!(int(&up.mul(2).unwrap()), bi(-2));
    }

    let unknown = up.mul(&t.unknown()).unwrap();
    assert!(unknown.to_int().is_err());
    assert!(unknown.vld_mask().is_zero());
    assert!(unknown.raw().is_zero());
}

#[test_case(8, true  ; "int8")]
#[test_case(8, false ; "uint8")]
#[test_case(512, true  ; "int512")]
#[test_case(512, false ; "uint512")]
fn test_neg(width: usize, signed: bool) {
    let t = ty(width, signed);
    let (_, hi, low, up) = min_max(&t);

    if signed {
        assert_eq!(int(&t.from_py(-1).unwrap().neg()), bi(1));
        assert_eq!(int(&t.from_py(2).unwrap().neg()), bi(-2));
        assert_eq!(int(&t.from_py(-2).unwrap().neg()), bi(2));
        assert_eq!(int(&low.neg()), int(&low));
        assert_eq!(int(&up.neg()), -BigInt::from(mask(width - 1)));
    } else {
        assert_eq!(int(&t.from_py(0).unwrap().neg()), bi(0));
        assert_eq!(int(&up.neg()), bi(1));
        assert_eq!(int(&t.from_py(1).unwrap().neg()), hi);
    }
    assert!(t.unknown().neg().to_int().is_err());
}

#[test_case(8, true  ; "int8")]
#[test_case(8, false ; "uint8")]
#[test_case(512, true  ; "int512")]
#[test_case(512, false ; "uint512")]
fn test_div(width: usize, signed: bool) {
    let t = ty(width, signed);
    let v = |n: i64| t.from_py(n).unwrap();

    assert_eq!(int(&v(0).floor_div(&v(1)).unwrap()), bi(0));
    assert_eq!(int(&v(1).floor_div(&v(1)).unwrap()), bi(1));
    assert_eq!(int(&v(8).floor_div(&v(2)).unwrap()), bi(4));
    assert_eq!(int(&v(8).floor_div(2).unwrap()), bi(4));
    assert!(v(8).floor_div(&t.unknown()).unwrap().vld_mask().is_zero());
    assert!(t.unknown().floor_div(2).unwrap().vld_mask().is_zero());
    if signed {
        assert_eq!(int(&v(-1).floor_div(&v(1)).unwrap()), bi(-1));
        assert_eq!(int(&v(1).floor_div(&v(-1)).unwrap()), bi(-1));
        assert_eq!(int(&v(-1).floor_div(&v(-1)).unwrap()), bi(1));
        assert_eq!(int(&v(-7).floor_div(2).unwrap()), bi(-4));
    }
}

#[test_case(8, true  ; "int8")]
#[test_case(8, false ; "uint8")]
fn test_rem(width: usize, signed: bool) {
    let t = ty(width, signed);
    let v = |n: i64| t.from_py(n).unwrap();

    assert_eq!(int(&v(100).rem(7).unwrap()), bi(2));
    assert_eq!(int(&v(42).rem(&v(5)).unwrap()), bi(2));
    if signed {
        assert_eq!(int(&v(-7).rem(2).unwrap()), bi(1));
        assert_eq!(int(&v(7).rem(-2).unwrap()), bi(-1));
    }
}

#[test]
fn test_division_by_zero_is_unknown() {
    let t = BitsType::new(8);
    let q = t.from_py(5).unwrap().floor_div(0).unwrap();
    assert!(q.vld_mask().is_zero());
    let r = t.from_py(5).unwrap().rem(0).unwrap();
    assert!(matches!(r.to_int(), Err(BitsError::Indeterminate)));
}

#[test]
fn test_partial_operand_makes_arith_unknown() {
    let t = BitsType::new(8);
    let partial = t.from_py("0b1111000x").unwrap();
    assert!(partial.add(1).unwrap().vld_mask().is_zero());
    let unknown = t.from_py(HostValue::Unknown).unwrap().add(5).unwrap();
    assert!(unknown.vld_mask().is_zero());
    assert!(unknown.to_int().is_err());
}

#[test]
fn test_width_mismatch_between_strict_types() {
    let a = BitsType::new(8).from_py(1).unwrap();
    let b = BitsType::new(4).from_py(1).unwrap();
    assert!(matches!(a.add(&b), Err(BitsError::TypeMismatch { .. })));
}

#[test_case(BinaryOp::Add ; "add")]
#[test_case(BinaryOp::Sub ; "sub")]
#[test_case(BinaryOp::Mul ; "mul")]
fn test_sign_mismatch_between_strict_types(op: BinaryOp) {
    let u = BitsType::new(8).from_py(200).unwrap();
    let s = BitsType::signed(8).from_py(-1).unwrap();
    assert!(matches!(u.binary(op, &s), Err(BitsError::TypeMismatch { .. })));
    assert!(matches!(s.binary(op, &u), Err(BitsError::TypeMismatch { .. })));
}

#[test]
fn test_lax_sign_adopts_strict_side() {
    let u = BitsType::new(8).from_py(200).unwrap();
    let lax = BitsType::builder(8).signed(true).strict_sign(false).build();
    let m1 = lax.from_py(-1).unwrap();
    // the lax operand is read as unsigned 255
    let prod = u.mul(&m1).unwrap();
    assert_eq!(prod.dtype(), u.dtype());
    assert_eq!(int(&prod), bi((200 * 255) & 0xff));
    assert_eq!(int(&m1.add(&u).unwrap()), bi(199));
}

#[test]
fn test_lax_width_adopts_strict_side() {
    let lax = BitsType::builder(4).strict_width(false).build();
    let a = lax.from_py(0xf).unwrap();
    let b = BitsType::new(8).from_py(1).unwrap();
    let sum = a.add(&b).unwrap();
    assert_eq!(sum.width(), 8);
    assert_eq!(int(&sum), bi(0x10));
    assert_eq!(sum.dtype(), b.dtype());

    let lax8 = BitsType::builder(8).strict_width(false).build();
    let c = lax8.from_py(0xff).unwrap();
    let both_lax = c.add(&a).unwrap();
    assert_eq!(both_lax.dtype(), &lax8);
    assert_eq!(int(&both_lax), bi(0x0e));
}

#[test]
fn test_division_needs_matching_sign() {
    let s = BitsType::signed(8).from_py(-8).unwrap();
    let u = BitsType::new(8).from_py(2).unwrap();
    assert!(matches!(s.floor_div(&u), Err(BitsError::TypeMismatch { .. })));

    let lax = BitsType::builder(8).strict_sign(false).build();
    let two = lax.from_py(2).unwrap();
    assert_eq!(int(&s.floor_div(&two).unwrap()), bi(-4));
    assert!(s.floor_div(&two).unwrap().dtype().is_signed());
}

#[test]
fn test_to_int_of_wide_value() {
    let t = BitsType::new(128);
    let v = t.from_py(u128::MAX).unwrap();
    assert_eq!(int(&v.add(1).unwrap()), BigInt::zero());
    assert_eq!(int(&v), (BigInt::one() << 128) - 1);
}
