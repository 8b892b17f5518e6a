//! Tree traversal.
//!
//! # Design
//!
//! `children` lists the immediate sub-expressions of a node in evaluation
//! order; every traversal in the compiler is built on it, so adding a
//! variant means updating one match here rather than one per analysis.
//!
//! The `Visitor` trait follows the usual `visit_*`/`walk_*` split. Visits
//! return `ControlFlow` so an analysis can stop at the first hit (escape,
//! purity and throw checks all only need one witness).
//!
//! # Example
//!
//! ```text
//! let has_call = apply(program, id, &mut |p, e| match p.arena.kind(e) {
//!     ExprKind::Call { .. } => ControlFlow::Break(()),
//!     _ => ControlFlow::Continue(()),
//! })
//! .is_break();
//! ```

use std::ops::ControlFlow;

use smallvec::SmallVec;

use crate::expr::{ExprId, ExprKind};
use crate::stmt::{StmtId, StmtKind};
use crate::Program;

/// Immediate sub-expressions of `id`, in evaluation order. Absent optional
/// children (`ExprId::INVALID`) are skipped.
pub fn children(program: &Program, id: ExprId) -> SmallVec<[ExprId; 4]> {
    let arena = &program.arena;
    let mut out: SmallVec<[ExprId; 4]> = SmallVec::new();
    let push = |e: ExprId, out: &mut SmallVec<[ExprId; 4]>| {
        if e.is_valid() {
            out.push(e);
        }
    };
    match arena.kind(id) {
        ExprKind::Error
        | ExprKind::Int(_)
        | ExprKind::Real(_)
        | ExprKind::Complex { .. }
        | ExprKind::String { .. }
        | ExprKind::Null
        | ExprKind::Ident(_)
        | ExprKind::Dollar
        | ExprKind::Var(_)
        | ExprKind::Func { .. }
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::SymOff { .. }
        | ExprKind::OverloadSet(_)
        | ExprKind::FuncLiteral(_)
        | ExprKind::TypeExpr(_)
        | ExprKind::ScopeExpr(_)
        | ExprKind::TemplateExpr(_)
        | ExprKind::DefaultInit(_)
        | ExprKind::IsType { .. }
        | ExprKind::Halt => {}
        ExprKind::ArrayLiteral(elems) => out.extend_from_slice(arena.list(elems)),
        ExprKind::AssocArrayLiteral { keys, values } => {
            for (&k, &v) in arena.list(keys).iter().zip(arena.list(values)) {
                out.push(k);
                out.push(v);
            }
        }
        ExprKind::StructLiteral { elements, .. } => {
            for &e in arena.list(elements) {
                push(e, &mut out);
            }
        }
        ExprKind::Tuple { prelude, elements } => {
            push(prelude, &mut out);
            out.extend_from_slice(arena.list(elements));
        }
        ExprKind::AddrOf(e)
        | ExprKind::Deref(e)
        | ExprKind::BoolCast(e)
        | ExprKind::ArrayLength(e)
        | ExprKind::Delete(e)
        | ExprKind::Mixin(e)
        | ExprKind::Import(e)
        | ExprKind::Typeid(e)
        | ExprKind::Unary { operand: e, .. }
        | ExprKind::PreIncDec { operand: e, .. }
        | ExprKind::PostIncDec { operand: e, .. }
        | ExprKind::Cast { operand: e, .. }
        | ExprKind::Vector { operand: e, .. }
        | ExprKind::DotId { base: e, .. }
        | ExprKind::DotVar { base: e, .. }
        | ExprKind::DotFunc { base: e, .. }
        | ExprKind::DotTemplate { base: e, .. } => push(e, &mut out),
        ExprKind::Slice { base, lower, upper } => {
            push(base, &mut out);
            push(lower, &mut out);
            push(upper, &mut out);
        }
        ExprKind::MultiIndex { base, indices } => {
            push(base, &mut out);
            out.extend_from_slice(arena.list(indices));
        }
        ExprKind::Call { callee, args } => {
            push(callee, &mut out);
            out.extend_from_slice(arena.list(args));
        }
        ExprKind::Assert { cond, msg } => {
            push(cond, &mut out);
            push(msg, &mut out);
        }
        ExprKind::New { args, .. } | ExprKind::NewAnonClass { args, .. } | ExprKind::Traits { args, .. } => {
            out.extend_from_slice(arena.list(args));
        }
        ExprKind::Binary { left, right, .. } | ExprKind::Comma { left, right } | ExprKind::Dot { left, right } => {
            push(left, &mut out);
            push(right, &mut out);
        }
        ExprKind::Index { base, index } => {
            push(base, &mut out);
            push(index, &mut out);
        }
        ExprKind::Cond {
            cond,
            then_expr,
            else_expr,
        } => {
            push(cond, &mut out);
            push(then_expr, &mut out);
            push(else_expr, &mut out);
        }
        // The right side is evaluated first.
        ExprKind::Assign { target, value, .. } => {
            push(value, &mut out);
            push(target, &mut out);
        }
        ExprKind::Remove { aa, key } => {
            push(aa, &mut out);
            push(key, &mut out);
        }
        ExprKind::Declaration(var) => push(program.decls.var(var).init, &mut out),
    }
    out
}

/// Expressions held directly by a statement (not by nested statements).
pub fn stmt_exprs(program: &Program, id: StmtId) -> SmallVec<[ExprId; 4]> {
    let mut out: SmallVec<[ExprId; 4]> = SmallVec::new();
    let mut push = |e: ExprId| {
        if e.is_valid() {
            out.push(e);
        }
    };
    match program.arena.stmt(id).kind {
        StmtKind::Empty
        | StmtKind::Block(_)
        | StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Goto(_)
        | StmtKind::Labeled { .. } => {}
        StmtKind::Expr(e) | StmtKind::Return(e) | StmtKind::Throw(e) => push(e),
        StmtKind::Decl(var) => push(program.decls.var(var).init),
        StmtKind::If { cond, .. }
        | StmtKind::StaticIf { cond, .. }
        | StmtKind::While { cond, .. }
        | StmtKind::DoWhile { cond, .. }
        | StmtKind::Switch { cond, .. } => push(cond),
        StmtKind::For { cond, step, .. } => {
            push(cond);
            push(step);
        }
        StmtKind::Foreach { aggregate, .. } => push(aggregate),
        StmtKind::ForeachRange { lower, upper, .. } => {
            push(lower);
            push(upper);
        }
        StmtKind::StaticAssert { cond, msg } => {
            push(cond);
            push(msg);
        }
    }
    out
}

/// Immediate sub-statements of `id`.
pub fn stmt_children(program: &Program, id: StmtId) -> SmallVec<[StmtId; 4]> {
    let arena = &program.arena;
    let mut out: SmallVec<[StmtId; 4]> = SmallVec::new();
    match arena.stmt(id).kind {
        StmtKind::Block(list) => out.extend_from_slice(arena.stmt_list(list)),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        }
        | StmtKind::StaticIf {
            then_branch,
            else_branch,
            ..
        } => {
            out.push(then_branch);
            if else_branch.is_valid() {
                out.push(else_branch);
            }
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::Foreach { body, .. }
        | StmtKind::ForeachRange { body, .. }
        | StmtKind::Labeled { body, .. } => out.push(body),
        StmtKind::For { init, body, .. } => {
            if init.is_valid() {
                out.push(init);
            }
            out.push(body);
        }
        StmtKind::Switch { cases, .. } => {
            for case in arena.cases(cases) {
                out.extend_from_slice(arena.stmt_list(case.body));
            }
        }
        StmtKind::Empty
        | StmtKind::Expr(_)
        | StmtKind::Decl(_)
        | StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Goto(_)
        | StmtKind::Return(_)
        | StmtKind::Throw(_)
        | StmtKind::StaticAssert { .. } => {}
    }
    out
}

/// Tree visitor.
///
/// Override `visit_*` to act on specific nodes; call the matching `walk_*`
/// to continue into children.
pub trait Visitor {
    type Break;

    fn visit_expr(&mut self, program: &Program, id: ExprId) -> ControlFlow<Self::Break> {
        walk_expr(self, program, id)
    }

    fn visit_stmt(&mut self, program: &Program, id: StmtId) -> ControlFlow<Self::Break> {
        walk_stmt(self, program, id)
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, program: &Program, id: ExprId) -> ControlFlow<V::Break> {
    for child in children(program, id) {
        visitor.visit_expr(program, child)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, program: &Program, id: StmtId) -> ControlFlow<V::Break> {
    for e in stmt_exprs(program, id) {
        visitor.visit_expr(program, e)?;
    }
    for s in stmt_children(program, id) {
        visitor.visit_stmt(program, s)?;
    }
    ControlFlow::Continue(())
}

struct Preorder<'f, F> {
    f: &'f mut F,
}

impl<B, F> Visitor for Preorder<'_, F>
where
    F: FnMut(&Program, ExprId) -> ControlFlow<B>,
{
    type Break = B;

    fn visit_expr(&mut self, program: &Program, id: ExprId) -> ControlFlow<B> {
        (self.f)(program, id)?;
        walk_expr(self, program, id)
    }
}

/// Call `f` on `id` and every sub-expression in preorder, stopping at the
/// first `Break`.
pub fn apply<B, F>(program: &Program, id: ExprId, f: &mut F) -> ControlFlow<B>
where
    F: FnMut(&Program, ExprId) -> ControlFlow<B>,
{
    Preorder { f }.visit_expr(program, id)
}

/// Like [`apply`], over every expression reachable from statement `id`.
pub fn apply_stmt<B, F>(program: &Program, id: StmtId, f: &mut F) -> ControlFlow<B>
where
    F: FnMut(&Program, ExprId) -> ControlFlow<B>,
{
    Preorder { f }.visit_stmt(program, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::BinaryOp;
    use crate::ty::TypeId;
    use crate::Span;

    fn sum(program: &mut Program, a: u64, b: u64) -> ExprId {
        let left = program.int_lit(a, TypeId::INT, Span::DUMMY);
        let right = program.int_lit(b, TypeId::INT, Span::DUMMY);
        program.arena.alloc_typed(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left,
                right,
            },
            Span::DUMMY,
            TypeId::INT,
        )
    }

    #[test]
    fn preorder_visits_parent_first() {
        let mut program = Program::new("m", "m.d", "");
        let inner = sum(&mut program, 1, 2);
        let three = program.int_lit(3, TypeId::INT, Span::DUMMY);
        let outer = program.arena.alloc_typed(
            ExprKind::Binary {
                op: BinaryOp::Mul,
                left: inner,
                right: three,
            },
            Span::DUMMY,
            TypeId::INT,
        );
        let mut seen = Vec::new();
        let flow: ControlFlow<()> = apply(&program, outer, &mut |p: &Program, e| {
            seen.push(p.arena.kind(e).name());
            ControlFlow::Continue(())
        });
        assert!(flow.is_continue());
        assert_eq!(
            seen,
            ["binary expression", "binary expression", "integer literal", "integer literal", "integer literal"]
        );
    }

    #[test]
    fn apply_stops_at_first_break() {
        let mut program = Program::new("m", "m.d", "");
        let e = sum(&mut program, 7, 8);
        let mut visited = 0;
        let flow = apply(&program, e, &mut |p: &Program, id| {
            visited += 1;
            match p.arena.kind(id) {
                ExprKind::Int(v) => ControlFlow::Break(v),
                _ => ControlFlow::Continue(()),
            }
        });
        assert_eq!(flow, ControlFlow::Break(7));
        assert_eq!(visited, 2);
    }

    #[test]
    fn skipped_struct_fields_are_not_children() {
        let mut program = Program::new("m", "m.d", "");
        let one = program.int_lit(1, TypeId::INT, Span::DUMMY);
        let elements = program.arena.alloc_list([ExprId::INVALID, one]);
        let lit = program.arena.alloc_kind(
            ExprKind::StructLiteral {
                agg: crate::decl::AggId::new(0),
                elements,
            },
            Span::DUMMY,
        );
        assert_eq!(children(&program, lit).as_slice(), &[one]);
    }
}
