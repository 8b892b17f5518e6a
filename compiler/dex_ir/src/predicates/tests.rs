use super::*;
use crate::decl::{Owner, StorageClass, VarDecl, VarId};
use crate::ty::TypeId;
use crate::Span;

fn var(program: &mut Program, ty: TypeId, storage: StorageClass) -> VarId {
    let name = program.intern("v");
    program.decls.add_var(VarDecl {
        name,
        ty,
        init: ExprId::INVALID,
        storage,
        owner: Owner::Module,
        span: Span::DUMMY,
    })
}

fn var_ref(program: &mut Program, v: VarId) -> ExprId {
    let ty = program.decls.var(v).ty;
    program.arena.alloc_typed(ExprKind::Var(v), Span::DUMMY, ty)
}

#[test]
fn variables_are_lvalues_but_manifest_constants_are_not() {
    let mut program = Program::new("m", "m.d", "");
    let plain = var(&mut program, TypeId::INT, StorageClass::empty());
    let manifest = var(&mut program, TypeId::INT, StorageClass::MANIFEST);
    let a = var_ref(&mut program, plain);
    let b = var_ref(&mut program, manifest);
    assert!(program.is_lvalue(a));
    assert!(!program.is_lvalue(b));
}

#[test]
fn literals_and_rvalue_arrays_are_not_lvalues() {
    let mut program = Program::new("m", "m.d", "");
    let one = program.int_lit(1, TypeId::INT, Span::DUMMY);
    let arr_ty = program.types.array(TypeId::INT, 1);
    let elems = program.arena.alloc_list([one]);
    let arr = program.arena.alloc_typed(ExprKind::ArrayLiteral(elems), Span::DUMMY, arr_ty);
    let zero = program.int_lit(0, TypeId::ULONG, Span::DUMMY);
    let index = program.arena.alloc_typed(ExprKind::Index { base: arr, index: zero }, Span::DUMMY, TypeId::INT);
    assert!(!program.is_lvalue(one));
    assert!(!program.is_lvalue(arr));
    assert!(!program.is_lvalue(index));
}

#[test]
fn casts_are_lvalues_only_when_changing_qualifiers() {
    let mut program = Program::new("m", "m.d", "");
    let v = var(&mut program, TypeId::INT, StorageClass::empty());
    let operand = var_ref(&mut program, v);
    let const_int = program.types.const_of(TypeId::INT);
    let requal = program.arena.alloc_typed(
        ExprKind::Cast {
            operand,
            to: const_int,
        },
        Span::DUMMY,
        const_int,
    );
    let widen = program.arena.alloc_typed(
        ExprKind::Cast {
            operand,
            to: TypeId::LONG,
        },
        Span::DUMMY,
        TypeId::LONG,
    );
    assert!(program.is_lvalue(requal));
    assert!(!program.is_lvalue(widen));
}

#[test]
fn is_bool_is_tri_state() {
    let mut program = Program::new("m", "m.d", "");
    let yes = program.int_lit(5, TypeId::INT, Span::DUMMY);
    let no = program.null_lit(TypeId::NULL, Span::DUMMY);
    let v = var(&mut program, TypeId::BOOL, StorageClass::empty());
    let unknown = var_ref(&mut program, v);
    assert_eq!(program.is_bool(yes), Truth::True);
    assert_eq!(program.is_bool(no), Truth::False);
    assert_eq!(program.is_bool(unknown), Truth::Unknown);
}

#[test]
fn assignments_have_side_effects_arithmetic_does_not() {
    let mut program = Program::new("m", "m.d", "");
    let v = var(&mut program, TypeId::INT, StorageClass::empty());
    let target = var_ref(&mut program, v);
    let one = program.int_lit(1, TypeId::INT, Span::DUMMY);
    let assign = program.arena.alloc_typed(
        ExprKind::Assign {
            op: AssignOp::Assign,
            target,
            value: one,
        },
        Span::DUMMY,
        TypeId::INT,
    );
    let neg = program.arena.alloc_typed(
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: target,
        },
        Span::DUMMY,
        TypeId::INT,
    );
    assert!(program.has_side_effects(assign));
    assert!(!program.has_side_effects(neg));
}

#[test]
fn slices_are_array_operands() {
    let mut program = Program::new("m", "m.d", "");
    let slice_ty = program.types.slice(TypeId::INT);
    let v = var(&mut program, slice_ty, StorageClass::empty());
    let base = var_ref(&mut program, v);
    let slice = program.arena.alloc_typed(
        ExprKind::Slice {
            base,
            lower: ExprId::INVALID,
            upper: ExprId::INVALID,
        },
        Span::DUMMY,
        slice_ty,
    );
    assert!(program.is_array_operand(slice));
    assert!(!program.is_array_operand(base));
}

#[test]
fn scalar_literals_and_null_are_constants() {
    let mut program = Program::new("m", "m.d", "");
    let one = program.int_lit(1, TypeId::INT, Span::DUMMY);
    let null = program.null_lit(TypeId::NULL, Span::DUMMY);
    let s = program.string_lit("s", crate::ty::CharWidth::One, true, TypeId::STRING, Span::DUMMY);
    assert!(program.is_const(one));
    assert!(program.is_const(null));
    assert!(!program.is_const(s));
}
