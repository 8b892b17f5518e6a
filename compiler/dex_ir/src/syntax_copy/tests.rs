use super::*;
use crate::decl::{Owner, StorageClass, VarDecl};
use crate::operators::BinaryOp;
use crate::ty::TypeId;
use crate::Span;
use pretty_assertions::assert_eq;

fn local(program: &mut Program, name: &str, init: ExprId) -> VarId {
    let name = program.intern(name);
    program.decls.add_var(VarDecl {
        name,
        ty: TypeId::INT,
        init,
        storage: StorageClass::empty(),
        owner: Owner::Module,
        span: Span::DUMMY,
    })
}

#[test]
fn copy_is_structurally_independent() {
    let mut program = Program::new("m", "m.d", "");
    let x = program.intern("x");
    let ident = program.arena.alloc_kind(ExprKind::Ident(x), Span::new(0, 1));
    let one = program.int_lit(1, TypeId::INT, Span::new(4, 5));
    let add = program.arena.alloc_kind(
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: ident,
            right: one,
        },
        Span::new(0, 5),
    );

    let copy = program.syntax_copy(add).unwrap();
    assert_ne!(copy, add);
    let ExprKind::Binary { op, left, right } = program.arena.kind(copy) else {
        panic!("expected a binary node");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_ne!(left, ident);
    assert_ne!(right, one);
    assert_eq!(program.arena.kind(left), ExprKind::Ident(x));
    assert_eq!(program.arena.expr(right).ty, Some(TypeId::INT));
    assert_eq!(program.arena.span(copy), Span::new(0, 5));
}

#[test]
fn declarations_are_duplicated_and_references_redirected() {
    let mut program = Program::new("m", "m.d", "");
    let init = program.int_lit(3, TypeId::INT, Span::DUMMY);
    let var = local(&mut program, "t", init);
    let decl = program.arena.alloc_kind(ExprKind::Declaration(var), Span::DUMMY);
    let use_var = program.arena.alloc_kind(ExprKind::Var(var), Span::DUMMY);
    let comma = program.arena.alloc_kind(
        ExprKind::Comma {
            left: decl,
            right: use_var,
        },
        Span::DUMMY,
    );

    let copy = program.syntax_copy(comma).unwrap();
    let ExprKind::Comma { left, right } = program.arena.kind(copy) else {
        panic!("expected a comma node");
    };
    let ExprKind::Declaration(new_var) = program.arena.kind(left) else {
        panic!("expected a declaration");
    };
    assert_ne!(new_var, var);
    assert_ne!(program.decls.var(new_var).init, init);
    assert_eq!(program.arena.kind(right), ExprKind::Var(new_var));
}

#[test]
fn error_nodes_cannot_be_copied() {
    let mut program = Program::new("m", "m.d", "");
    let err = program.error_expr(Span::DUMMY);
    let neg = program.arena.alloc_kind(
        ExprKind::Unary {
            op: crate::operators::UnaryOp::Neg,
            operand: err,
        },
        Span::DUMMY,
    );
    assert_eq!(program.syntax_copy(neg), Err(SyntaxCopyError::ErrorNode));
}

#[test]
fn missing_required_child_is_reported() {
    let mut program = Program::new("m", "m.d", "");
    let bad = program.arena.alloc_kind(ExprKind::Deref(ExprId::INVALID), Span::DUMMY);
    assert_eq!(
        program.syntax_copy(bad),
        Err(SyntaxCopyError::InvalidChild { kind: "dereference" })
    );
}

#[test]
fn resolved_types_are_cleared() {
    let mut program = Program::new("m", "m.d", "");
    let s = program.string_lit("hi", crate::ty::CharWidth::One, false, TypeId::STRING, Span::DUMMY);
    let copy = program.syntax_copy(s).unwrap();
    assert_eq!(program.arena.expr(copy).ty, None);
}
