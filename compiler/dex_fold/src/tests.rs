use dex_ir::{ExprId, ExprKind, Owner, Program, StorageClass, TypeId, UnaryOp, VarDecl};
use dex_parse::parse_expression;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

/// Type a parsed tree of literals and operators bottom-up, the way the
/// resolver would for these simple shapes.
fn annotate(program: &mut Program, id: ExprId) -> TypeId {
    if !id.is_valid() {
        return TypeId::VOID;
    }
    if let Some(ty) = program.arena.expr(id).ty {
        return ty;
    }
    let ty = match program.arena.kind(id) {
        ExprKind::String { width, .. } => width.string_type(),
        ExprKind::Binary { op, left, right } => {
            let l = annotate(program, left);
            let r = annotate(program, right);
            if op.yields_bool() {
                TypeId::BOOL
            } else if op == dex_ir::BinaryOp::Cat {
                l
            } else {
                program.types.arithmetic_common(l, r).unwrap_or(TypeId::ERROR)
            }
        }
        ExprKind::Unary { op, operand } => {
            let t = annotate(program, operand);
            if op == UnaryOp::Not {
                TypeId::BOOL
            } else {
                program.types.promote(t)
            }
        }
        ExprKind::Cond {
            cond,
            then_expr,
            else_expr,
        } => {
            annotate(program, cond);
            let t = annotate(program, then_expr);
            let e = annotate(program, else_expr);
            program.types.common_type(t, e).unwrap_or(TypeId::ERROR)
        }
        ExprKind::Comma { left, right } => {
            annotate(program, left);
            annotate(program, right)
        }
        ExprKind::Cast { operand, to } => {
            annotate(program, operand);
            to
        }
        ExprKind::Index { base, index } => {
            let b = annotate(program, base);
            annotate(program, index);
            program.types.elem(b).unwrap_or(TypeId::ERROR)
        }
        _ => TypeId::ERROR,
    };
    program.arena.expr_mut(id).ty = Some(ty);
    ty
}

fn typed(text: &str) -> (Program, ExprId) {
    let mut program = Program::new("test", "test.d", text);
    let id = match parse_expression(&mut program, text, None) {
        Ok(id) => id,
        Err(errors) => panic!("failed to parse `{text}`: {errors:?}"),
    };
    annotate(&mut program, id);
    (program, id)
}

fn fold(text: &str) -> (Program, ExprId) {
    let (mut program, id) = typed(text);
    let folded = optimize(&mut program, id, OptimizeFlags::WANT_VALUE);
    (program, folded)
}

fn signed(value: i64) -> ExprKind {
    ExprKind::Int(value as u64)
}

#[test]
fn folds_integer_arithmetic_with_precedence() {
    let (program, id) = fold("3 + 4 * 2");
    assert_eq!(program.arena.kind(id), ExprKind::Int(11));
    assert_eq!(program.arena.ty(id), TypeId::INT);
}

#[test]
fn mixed_arithmetic_is_done_in_the_common_type() {
    let (program, id) = fold("1 + 2.5");
    assert_eq!(program.arena.ty(id), TypeId::DOUBLE);
    assert_eq!(program.arena.kind(id), ExprKind::Real(3.5f64.to_bits()));
}

#[test]
fn division_by_zero_is_left_for_the_interpreter() {
    let (program, id) = fold("1 / 0");
    assert!(matches!(program.arena.kind(id), ExprKind::Binary { .. }));
}

#[test]
fn folded_children_survive_an_unfoldable_parent() {
    let (program, id) = fold("(2 * 3) / 0");
    let ExprKind::Binary { left, .. } = program.arena.kind(id) else {
        panic!("expected the division to stay");
    };
    assert_eq!(program.arena.kind(left), ExprKind::Int(6));
}

#[test]
fn short_circuit_skips_the_right_operand() {
    let (program, id) = fold("false && (1 / 0 == 1)");
    assert_eq!(program.arena.kind(id), ExprKind::Int(0));
    assert_eq!(program.arena.ty(id), TypeId::BOOL);
}

#[test]
fn or_with_a_true_left_side_is_true() {
    let (program, id) = fold("1 == 1 || 1 / 0 == 1");
    assert_eq!(program.arena.kind(id), ExprKind::Int(1));
}

#[test]
fn conditional_with_known_condition_picks_a_branch() {
    let (program, id) = fold("true ? 1 : 2");
    assert_eq!(program.arena.kind(id), ExprKind::Int(1));
}

#[test]
fn conditional_does_not_fold_the_branch_not_taken() {
    let (program, id) = fold("false ? 1 / 0 : 7");
    assert_eq!(program.arena.kind(id), ExprKind::Int(7));
}

#[test]
fn indexes_a_string_literal() {
    let (program, id) = fold(r#""abc"[1]"#);
    assert_eq!(program.arena.kind(id), ExprKind::Int(u64::from(b'b')));
    assert!(program.types.is_char(program.arena.ty(id)));
}

#[test]
fn string_index_out_of_range_is_not_folded() {
    let (program, id) = fold(r#""abc"[3]"#);
    assert!(matches!(program.arena.kind(id), ExprKind::Index { .. }));
}

#[test]
fn concatenates_string_literals() {
    let (program, id) = fold(r#""ab" ~ "cd""#);
    assert_eq!(program.string_of(id).map(|(text, _)| text), Some("abcd"));
}

#[test]
fn comparison_of_equal_strings_is_true() {
    let (program, id) = fold(r#""ab" == "ab""#);
    assert_eq!(program.arena.kind(id), ExprKind::Int(1));
}

#[test]
fn comma_drops_a_left_side_without_effects() {
    let (program, id) = fold("(1, 2)");
    assert_eq!(program.arena.kind(id), ExprKind::Int(2));
}

#[test]
fn cast_truncates_to_the_target_width() {
    let (program, id) = fold("cast(ubyte) 300");
    assert_eq!(program.arena.kind(id), ExprKind::Int(44));
    assert_eq!(program.arena.ty(id), TypeId::UBYTE);
}

#[test]
fn unary_operators() {
    let (program, id) = fold("-(-5)");
    assert_eq!(program.arena.kind(id), ExprKind::Int(5));
    let (program, id) = fold("~0");
    assert_eq!(program.arena.kind(id), signed(-1));
    let (program, id) = fold("!0");
    assert_eq!(program.arena.kind(id), ExprKind::Int(1));
    assert_eq!(program.arena.ty(id), TypeId::BOOL);
}

#[test]
fn unchanged_tree_is_returned_as_is() {
    let (mut program, id) = typed("7");
    assert_eq!(optimize(&mut program, id, OptimizeFlags::WANT_VALUE), id);
}

#[test]
fn untyped_nodes_are_not_touched() {
    let mut program = Program::new("test", "test.d", "x + 1");
    let id = parse_expression(&mut program, "x + 1", None).unwrap_or_else(|e| panic!("{e:?}"));
    assert_eq!(optimize(&mut program, id, OptimizeFlags::WANT_VALUE), id);
}

fn constant(program: &mut Program, value: u64, storage: StorageClass, ty: TypeId) -> dex_ir::VarId {
    let span = dex_ir::Span::new(0, 1);
    let init = program.int_lit(value, TypeId::INT, span);
    let name = program.intern("N");
    program.decls.add_var(VarDecl {
        name,
        ty,
        init,
        storage,
        owner: Owner::Module,
        span,
    })
}

#[test]
fn manifest_constant_is_expanded_at_the_use_site() {
    let mut program = Program::new("test", "test.d", "N + 1");
    let var = constant(&mut program, 41, StorageClass::MANIFEST, TypeId::INT);
    let use_span = dex_ir::Span::new(10, 11);
    let left = program.arena.alloc_typed(ExprKind::Var(var), use_span, TypeId::INT);
    let right = program.int_lit(1, TypeId::INT, use_span);
    let sum = program.arena.alloc_typed(
        ExprKind::Binary {
            op: dex_ir::BinaryOp::Add,
            left,
            right,
        },
        use_span,
        TypeId::INT,
    );
    let folded = optimize(&mut program, sum, OptimizeFlags::WANT_VALUE);
    assert_eq!(program.arena.kind(folded), ExprKind::Int(42));

    let expanded = optimize(&mut program, left, OptimizeFlags::WANT_VALUE);
    assert_eq!(program.arena.span(expanded), use_span);
}

#[test]
fn const_variable_needs_expand_vars() {
    let mut program = Program::new("test", "test.d", "N");
    let ty = program.types.const_of(TypeId::INT);
    let var = constant(&mut program, 3, StorageClass::CONST, ty);
    let span = dex_ir::Span::new(0, 1);
    let id = program.arena.alloc_typed(ExprKind::Var(var), span, ty);

    assert_eq!(optimize(&mut program, id, OptimizeFlags::WANT_VALUE), id);
    let (folded, truth) = fold_condition(&mut program, id);
    assert_eq!(program.arena.kind(folded), ExprKind::Int(3));
    assert_eq!(truth, dex_ir::Truth::True);
}

#[test]
fn mutable_variable_is_never_expanded() {
    let mut program = Program::new("test", "test.d", "N");
    let var = constant(&mut program, 3, StorageClass::empty(), TypeId::INT);
    let span = dex_ir::Span::new(0, 1);
    let id = program.arena.alloc_typed(ExprKind::Var(var), span, TypeId::INT);
    let flags = OptimizeFlags::WANT_VALUE | OptimizeFlags::EXPAND_VARS;
    assert_eq!(optimize(&mut program, id, flags), id);
}

#[test]
fn literal_trees() {
    let (program, id) = typed("[1, 2]");
    assert!(is_literal_tree(&program, id));
    let (program, id) = typed("1 + 2");
    assert!(!is_literal_tree(&program, id));
}

#[derive(Clone, Debug)]
enum Tree {
    Leaf(i32),
    Node(char, Box<Tree>, Box<Tree>),
}

impl Tree {
    fn render(&self) -> String {
        match self {
            Tree::Leaf(v) => v.to_string(),
            Tree::Node(op, l, r) => format!("({} {op} {})", l.render(), r.render()),
        }
    }

    fn eval(&self) -> i32 {
        match self {
            Tree::Leaf(v) => *v,
            Tree::Node('+', l, r) => l.eval().wrapping_add(r.eval()),
            Tree::Node('-', l, r) => l.eval().wrapping_sub(r.eval()),
            Tree::Node(_, l, r) => l.eval().wrapping_mul(r.eval()),
        }
    }
}

fn tree() -> impl Strategy<Value = Tree> {
    let leaf = (0..1000i32).prop_map(Tree::Leaf);
    leaf.prop_recursive(4, 16, 2, |inner| {
        (prop::sample::select(vec!['+', '-', '*']), inner.clone(), inner)
            .prop_map(|(op, l, r)| Tree::Node(op, Box::new(l), Box::new(r)))
    })
}

proptest! {
    #[test]
    fn folding_matches_wrapping_int_arithmetic(t in tree()) {
        let (program, id) = fold(&t.render());
        prop_assert_eq!(program.arena.kind(id), signed(i64::from(t.eval())));
    }
}
