//! FPU tests.
//!
//! NaN boxing, canonical NaN results, exception flags, comparisons,
//! conversions, and classification.

use rv5s_core::core::pipeline::signals::AluOp;
use rv5s_core::core::units::fpu::nan_handling::{box_f32, unbox_f32, CANONICAL_NAN_F32};
use rv5s_core::core::units::fpu::{FpFlags, Fpu};

fn exec_d(op: AluOp, a: f64, b: f64) -> (f64, FpFlags) {
    let (bits, flags) = Fpu::execute(op, a.to_bits(), b.to_bits(), true);
    (f64::from_bits(bits), flags)
}

fn exec_s(op: AluOp, a: f32, b: f32) -> (f32, FpFlags) {
    let (bits, flags) = Fpu::execute(op, box_f32(a), box_f32(b), false);
    (unbox_f32(bits), flags)
}

// ══════════════════════════════════════════════════════════
// 1. Arithmetic and flags
// ══════════════════════════════════════════════════════════

#[test]
fn double_arithmetic_basics() {
    assert_eq!(exec_d(AluOp::FAdd, 1.5, 2.5).0, 4.0);
    assert_eq!(exec_d(AluOp::FSub, 1.0, 2.5).0, -1.5);
    assert_eq!(exec_d(AluOp::FMul, 3.0, 0.5).0, 1.5);
    assert_eq!(exec_d(AluOp::FDiv, 7.0, 2.0).0, 3.5);
}

#[test]
fn single_results_are_nan_boxed() {
    let (bits, _) = Fpu::execute(AluOp::FAdd, box_f32(1.0), box_f32(2.0), false);
    assert_eq!(bits >> 32, 0xFFFF_FFFF, "upper half must be all ones");
    assert_eq!(f32::from_bits(bits as u32), 3.0);
}

#[test]
fn division_by_zero_raises_dz() {
    let (res, flags) = exec_d(AluOp::FDiv, 1.0, 0.0);
    assert!(res.is_infinite());
    assert!(flags.contains(FpFlags::DZ));
}

#[test]
fn zero_over_zero_raises_nv_with_canonical_nan() {
    let (res, flags) = exec_d(AluOp::FDiv, 0.0, 0.0);
    assert!(res.is_nan());
    assert!(flags.contains(FpFlags::NV));
}

#[test]
fn sqrt_of_negative_raises_nv() {
    let (res, flags) = exec_d(AluOp::FSqrt, -4.0, 0.0);
    assert!(res.is_nan());
    assert!(flags.contains(FpFlags::NV));
}

#[test]
fn overflow_raises_of() {
    let (res, flags) = exec_s(AluOp::FMul, f32::MAX, 2.0);
    assert!(res.is_infinite());
    assert!(flags.contains(FpFlags::OF));
}

#[test]
fn nan_results_are_canonical() {
    let (bits, _) = Fpu::execute(
        AluOp::FAdd,
        box_f32(f32::INFINITY),
        box_f32(f32::NEG_INFINITY),
        false,
    );
    assert_eq!(bits as u32, CANONICAL_NAN_F32);
}

#[test]
fn improperly_boxed_single_reads_as_nan() {
    // Upper half not all ones: must be treated as canonical NaN.
    let bogus = 1.0_f32.to_bits() as u64;
    let (bits, _) = Fpu::execute(AluOp::FAdd, bogus, box_f32(1.0), false);
    assert!(unbox_f32(bits).is_nan());
}

// ══════════════════════════════════════════════════════════
// 2. Min/max and sign injection
// ══════════════════════════════════════════════════════════

#[test]
fn min_max_handle_nan_and_signed_zero() {
    assert_eq!(exec_d(AluOp::FMin, 1.0, 2.0).0, 1.0);
    assert_eq!(exec_d(AluOp::FMax, 1.0, 2.0).0, 2.0);
    // One NaN operand: the other value wins.
    assert_eq!(exec_d(AluOp::FMin, f64::NAN, 2.0).0, 2.0);
    // -0.0 orders below +0.0.
    assert!(exec_d(AluOp::FMin, 0.0, -0.0).0.is_sign_negative());
    assert!(exec_d(AluOp::FMax, 0.0, -0.0).0.is_sign_positive());
}

#[test]
fn sign_injection_variants() {
    assert_eq!(exec_d(AluOp::FSgnJ, 1.5, -2.0).0, -1.5);
    assert_eq!(exec_d(AluOp::FSgnJN, 1.5, -2.0).0, 1.5);
    assert_eq!(exec_d(AluOp::FSgnJX, -1.5, -2.0).0, 1.5);
}

// ══════════════════════════════════════════════════════════
// 3. Comparisons and classification
// ══════════════════════════════════════════════════════════

#[test]
fn comparisons_return_integer_results() {
    assert_eq!(Fpu::execute(AluOp::FEq, 1.0f64.to_bits(), 1.0f64.to_bits(), true).0, 1);
    assert_eq!(Fpu::execute(AluOp::FLt, 1.0f64.to_bits(), 2.0f64.to_bits(), true).0, 1);
    assert_eq!(Fpu::execute(AluOp::FLe, 2.0f64.to_bits(), 1.0f64.to_bits(), true).0, 0);
}

#[test]
fn comparisons_with_nan_are_false() {
    let nan = f64::NAN.to_bits();
    let one = 1.0f64.to_bits();
    assert_eq!(Fpu::execute(AluOp::FEq, nan, one, true).0, 0);
    let (res, flags) = {
        let (r, f) = Fpu::execute(AluOp::FLt, nan, one, true);
        (r, f)
    };
    assert_eq!(res, 0);
    assert!(flags.contains(FpFlags::NV), "ordered compare on NaN is invalid");
}

#[test]
fn classify_picks_the_right_bit() {
    // Negative infinity -> bit 0; positive normal -> bit 6; quiet NaN -> bit 9.
    assert_eq!(Fpu::execute(AluOp::FClass, f64::NEG_INFINITY.to_bits(), 0, true).0, 1 << 0);
    assert_eq!(Fpu::execute(AluOp::FClass, 1.5f64.to_bits(), 0, true).0, 1 << 6);
    assert_eq!(Fpu::execute(AluOp::FClass, f64::NAN.to_bits(), 0, true).0, 1 << 9);
    assert_eq!(Fpu::execute(AluOp::FClass, (-0.0f64).to_bits(), 0, true).0, 1 << 3);
}

// ══════════════════════════════════════════════════════════
// 4. Conversions and moves
// ══════════════════════════════════════════════════════════

#[test]
fn float_to_int_truncates_and_saturates() {
    let (res, flags) = Fpu::execute(AluOp::FCvtWF, 3.7f64.to_bits(), 0, true);
    assert_eq!(res, 3);
    assert!(flags.contains(FpFlags::NX));

    let (res, _) = Fpu::execute(AluOp::FCvtWF, (-3.7f64).to_bits(), 0, true);
    assert_eq!(res as i64, -3);

    let (res, flags) = Fpu::execute(AluOp::FCvtWF, 1e12f64.to_bits(), 0, true);
    assert_eq!(res as i64, i32::MAX as i64, "out of range saturates");
    assert!(flags.contains(FpFlags::NV));

    let (res, flags) = Fpu::execute(AluOp::FCvtWF, f64::NAN.to_bits(), 0, true);
    assert_eq!(res as i64, i32::MAX as i64);
    assert!(flags.contains(FpFlags::NV));
}

#[test]
fn int_to_float_converts() {
    let (res, _) = Fpu::execute(AluOp::FCvtFW, (-5_i32) as u32 as u64, 0, true);
    assert_eq!(f64::from_bits(res), -5.0);
    let (res, _) = Fpu::execute(AluOp::FCvtFL, 1_000_000_007u64, 0, true);
    assert_eq!(f64::from_bits(res), 1_000_000_007.0);
}

#[test]
fn precision_conversions() {
    let (res, _) = Fpu::execute(AluOp::FCvtDS, box_f32(1.5), 0, false);
    assert_eq!(f64::from_bits(res), 1.5);
    let (res, _) = Fpu::execute(AluOp::FCvtSD, 2.5f64.to_bits(), 0, true);
    assert_eq!(unbox_f32(res), 2.5);
}

#[test]
fn moves_are_raw_bit_copies() {
    // fmv.x.w sign-extends the 32-bit pattern.
    let bits = (-1.0f32).to_bits() as u64;
    let (res, _) = Fpu::execute(AluOp::FMvXF, box_f32(-1.0), 0, false);
    assert_eq!(res, bits | 0xFFFF_FFFF_0000_0000);

    let (res, _) = Fpu::execute(AluOp::FMvFX, 1.0f32.to_bits() as u64, 0, false);
    assert_eq!(unbox_f32(res), 1.0);
}
