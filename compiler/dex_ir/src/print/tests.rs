use super::*;
use crate::operators::UnaryOp;
use crate::ty::CharWidth;
use crate::Span;
use pretty_assertions::assert_eq;

fn bin(program: &mut Program, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
    program
        .arena
        .alloc_typed(ExprKind::Binary { op, left, right }, Span::DUMMY, TypeId::INT)
}

fn int(program: &mut Program, v: i64) -> ExprId {
    program.int_lit(v as u64, TypeId::INT, Span::DUMMY)
}

#[test]
fn integer_literals_carry_type_suffixes() {
    let mut program = Program::new("m", "m.d", "");
    let cases = [
        (TypeId::INT, 42u64, "42"),
        (TypeId::UINT, 42, "42u"),
        (TypeId::LONG, 42, "42L"),
        (TypeId::ULONG, 42, "42UL"),
        (TypeId::INT, (-7i64) as u64, "-7"),
        (TypeId::INT, i64::from(i32::MIN) as u64, "(-2147483647 - 1)"),
        (TypeId::LONG, i64::MIN as u64, "(-9223372036854775807L - 1)"),
        (TypeId::BOOL, 1, "true"),
        (TypeId::CHAR, u64::from(b'b'), "'b'"),
        (TypeId::CHAR, 0xFF, "cast(char) 255"),
        (TypeId::UBYTE, 200, "cast(ubyte) 200"),
        (TypeId::SHORT, (-3i64) as u64, "cast(short) -3"),
    ];
    for (ty, v, expected) in cases {
        let lit = program.int_lit(v, ty, Span::DUMMY);
        assert_eq!(program.expr_to_string(lit), expected);
    }
}

#[test]
fn floating_literals_always_look_floating() {
    let mut program = Program::new("m", "m.d", "");
    let cases = [
        (TypeId::DOUBLE, 1.0, "1.0"),
        (TypeId::FLOAT, 0.5, "0.5f"),
        (TypeId::REAL, 2.25, "2.25L"),
        (TypeId::DOUBLE, f64::NAN, "double.nan"),
        (TypeId::FLOAT, f64::NEG_INFINITY, "-float.infinity"),
    ];
    for (ty, v, expected) in cases {
        let lit = program.real_lit(v, ty, Span::DUMMY);
        assert_eq!(program.expr_to_string(lit), expected);
    }
}

#[test]
fn strings_are_escaped() {
    let mut program = Program::new("m", "m.d", "");
    let s = program.string_lit("a\"b\\\n", CharWidth::One, false, TypeId::STRING, Span::DUMMY);
    assert_eq!(program.expr_to_string(s), r#""a\"b\\\n""#);
    let w = program.string_lit("hi", CharWidth::Two, true, TypeId::WSTRING, Span::DUMMY);
    assert_eq!(program.expr_to_string(w), r#""hi"w"#);
}

#[test]
fn precedence_drives_parentheses() {
    let mut program = Program::new("m", "m.d", "");
    let (a, b, c) = (int(&mut program, 1), int(&mut program, 2), int(&mut program, 3));
    let sum = bin(&mut program, BinaryOp::Add, a, b);
    let product = bin(&mut program, BinaryOp::Mul, sum, c);
    assert_eq!(program.expr_to_string(product), "(1 + 2) * 3");

    let (d, e, f) = (int(&mut program, 4), int(&mut program, 5), int(&mut program, 6));
    let inner = bin(&mut program, BinaryOp::Sub, e, f);
    let outer = bin(&mut program, BinaryOp::Sub, d, inner);
    assert_eq!(program.expr_to_string(outer), "4 - (5 - 6)");

    let (g, h, k) = (int(&mut program, 2), int(&mut program, 3), int(&mut program, 2));
    let right_pow = bin(&mut program, BinaryOp::Pow, h, k);
    let pow = bin(&mut program, BinaryOp::Pow, g, right_pow);
    assert_eq!(program.expr_to_string(pow), "2 ^^ 3 ^^ 2");
}

#[test]
fn comparisons_under_bitwise_operators_are_parenthesized() {
    let mut program = Program::new("m", "m.d", "");
    let (a, b, c) = (int(&mut program, 1), int(&mut program, 2), int(&mut program, 3));
    let eq = bin(&mut program, BinaryOp::Eq, b, c);
    let and = bin(&mut program, BinaryOp::And, a, eq);
    assert_eq!(program.expr_to_string(and), "1 & (2 == 3)");
}

#[test]
fn nested_negation_does_not_become_decrement() {
    let mut program = Program::new("m", "m.d", "");
    let lit = int(&mut program, -5);
    let neg = program.arena.alloc_typed(
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: lit,
        },
        Span::DUMMY,
        TypeId::INT,
    );
    assert_eq!(program.expr_to_string(neg), "- -5");
}

#[test]
fn halt_prints_as_assert_zero() {
    let mut program = Program::new("m", "m.d", "");
    let halt = program.arena.alloc_typed(ExprKind::Halt, Span::DUMMY, TypeId::VOID);
    assert_eq!(program.expr_to_string(halt), "assert(0)");
}
