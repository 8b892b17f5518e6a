use super::*;
use pretty_assertions::assert_eq;

const INT: NumKind = NumKind::Int {
    bits: 32,
    signed: true,
};
const UINT: NumKind = NumKind::Int {
    bits: 32,
    signed: false,
};
const UBYTE: NumKind = NumKind::Int {
    bits: 8,
    signed: false,
};
const DOUBLE: NumKind = NumKind::Float(FloatKind::Double);

fn int(v: i64) -> Scalar {
    Scalar::Int(INT.normalize(v as u64))
}

#[test]
fn int_arithmetic_wraps_at_width() {
    let max = int(i64::from(i32::MAX));
    assert_eq!(binary(BinaryOp::Add, INT, max, int(1)), Ok(int(i64::from(i32::MIN))));
    assert_eq!(
        binary(BinaryOp::Add, UBYTE, Scalar::Int(250), Scalar::Int(10)),
        Ok(Scalar::Int(4))
    );
    assert_eq!(binary(BinaryOp::Mul, INT, int(3), int(-4)), Ok(int(-12)));
}

#[test]
fn division_truncates_toward_zero() {
    assert_eq!(binary(BinaryOp::Div, INT, int(-7), int(2)), Ok(int(-3)));
    assert_eq!(binary(BinaryOp::Mod, INT, int(-7), int(2)), Ok(int(-1)));
    assert_eq!(
        binary(BinaryOp::Div, UINT, Scalar::Int(UINT.normalize(-7i64 as u64)), Scalar::Int(2)),
        Ok(Scalar::Int(0x7FFF_FFFC))
    );
}

#[test]
fn division_by_zero_is_an_error() {
    assert_eq!(
        binary(BinaryOp::Div, INT, int(1), int(0)),
        Err(ScalarError::DivisionByZero)
    );
    assert_eq!(
        binary(BinaryOp::Mod, UINT, Scalar::Int(1), Scalar::Int(0)),
        Err(ScalarError::DivisionByZero)
    );
    // Floating division follows IEEE instead.
    let inf = binary(BinaryOp::Div, DOUBLE, Scalar::Float(1.0), Scalar::Float(0.0));
    assert_eq!(inf, Ok(Scalar::Float(f64::INFINITY)));
}

#[test]
fn shifts_check_their_range() {
    assert_eq!(binary(BinaryOp::Shl, INT, int(1), int(31)), Ok(int(i64::from(i32::MIN))));
    assert_eq!(
        binary(BinaryOp::Shl, INT, int(1), int(32)),
        Err(ScalarError::ShiftOutOfRange { amount: 32, bits: 32 })
    );
    assert_eq!(binary(BinaryOp::Shr, INT, int(-8), int(1)), Ok(int(-4)));
    assert_eq!(
        binary(BinaryOp::Ushr, INT, int(-1), int(1)),
        Ok(int(i64::from(i32::MAX)))
    );
}

#[test]
fn integer_power() {
    assert_eq!(binary(BinaryOp::Pow, INT, int(3), int(4)), Ok(int(81)));
    assert_eq!(binary(BinaryOp::Pow, INT, int(-1), int(-3)), Ok(int(-1)));
    assert_eq!(
        binary(BinaryOp::Pow, INT, int(2), int(-1)),
        Err(ScalarError::NegativeExponent {
            base: 2,
            exponent: -1
        })
    );
}

#[test]
fn comparisons_respect_signedness() {
    assert_eq!(compare(BinaryOp::Lt, INT, int(-1), int(0)), Ok(true));
    assert_eq!(compare(BinaryOp::Lt, UINT, Scalar::Int(0xFFFF_FFFF), Scalar::Int(0)), Ok(false));
    assert_eq!(
        compare(BinaryOp::Eq, DOUBLE, Scalar::Float(f64::NAN), Scalar::Float(f64::NAN)),
        Ok(false)
    );
    assert_eq!(
        compare(BinaryOp::Is, DOUBLE, Scalar::Float(f64::NAN), Scalar::Float(f64::NAN)),
        Ok(true)
    );
}

#[test]
fn casts_truncate_and_extend() {
    let byte = NumKind::Int {
        bits: 8,
        signed: true,
    };
    assert_eq!(cast(int(300), INT, byte), Scalar::Int(44));
    assert_eq!(cast(int(-1), INT, UBYTE), Scalar::Int(255));
    assert_eq!(cast(Scalar::Int(255), UBYTE, byte), Scalar::Int(u64::MAX));
    assert_eq!(cast(Scalar::Float(-2.9), DOUBLE, INT), int(-2));
    assert_eq!(cast(int(-3), INT, DOUBLE), Scalar::Float(-3.0));
    assert_eq!(cast(Scalar::Float(0.5), DOUBLE, NumKind::Bool), Scalar::Int(1));
}

#[test]
fn unary_operators() {
    assert_eq!(unary(UnaryOp::Neg, INT, int(5)), Ok(int(-5)));
    assert_eq!(unary(UnaryOp::Com, UBYTE, Scalar::Int(0x0F)), Ok(Scalar::Int(0xF0)));
    assert_eq!(unary(UnaryOp::Not, INT, int(0)), Ok(Scalar::Int(1)));
    assert!(unary(UnaryOp::Com, DOUBLE, Scalar::Float(1.0)).is_err());
}

#[test]
fn range_checks() {
    let byte = NumKind::Int {
        bits: 8,
        signed: true,
    };
    assert!(byte.int_fits(int(127).as_bits(), INT));
    assert!(!byte.int_fits(int(128).as_bits(), INT));
    assert!(!UINT.int_fits(int(-1).as_bits(), INT));
    assert_eq!(INT.int_min_max(), Some((int(i64::from(i32::MIN)).as_bits(), 0x7FFF_FFFF)));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn int_add_matches_i32_wrapping(a: i32, b: i32) {
            let got = binary(BinaryOp::Add, INT, int(i64::from(a)), int(i64::from(b)));
            prop_assert_eq!(got, Ok(int(i64::from(a.wrapping_add(b)))));
        }

        #[test]
        fn int_div_matches_i32(a: i32, b in (1i32..1000)) {
            let got = binary(BinaryOp::Div, INT, int(i64::from(a)), int(i64::from(b)));
            prop_assert_eq!(got, Ok(int(i64::from(a / b))));
        }

        #[test]
        fn normalize_is_idempotent(v: u64, bits in prop::sample::select(vec![8u8, 16, 32, 64]), signed: bool) {
            let kind = NumKind::Int { bits, signed };
            prop_assert_eq!(kind.normalize(kind.normalize(v)), kind.normalize(v));
        }
    }
}
