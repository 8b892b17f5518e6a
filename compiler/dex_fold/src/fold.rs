//! The folding traversal.
//!
//! Children are folded first; the node is then handed to the literal rules
//! in [`crate::literal`]. A node whose children did not change is returned
//! as is, otherwise a copy with the new children is allocated.

use dex_ir::{BinaryOp, ExprId, ExprKind, Program, Qualifier, TypeId, UnaryOp, VarId};
use dex_stack::ensure_sufficient_stack;

use crate::literal;
use crate::OptimizeFlags;

pub(crate) struct Folder<'p> {
    program: &'p mut Program,
    flags: OptimizeFlags,
}

impl<'p> Folder<'p> {
    pub(crate) fn new(program: &'p mut Program, flags: OptimizeFlags) -> Self {
        Folder { program, flags }
    }

    pub(crate) fn fold(&mut self, id: ExprId) -> ExprId {
        if !id.is_valid() {
            return id;
        }
        ensure_sufficient_stack(|| self.fold_inner(id))
    }

    fn rebuild(&mut self, id: ExprId, kind: ExprKind, changed: bool) -> ExprId {
        if !changed {
            return id;
        }
        let mut expr = *self.program.arena.expr(id);
        expr.kind = kind;
        self.program.arena.alloc(expr)
    }

    /// Truth value of `id` if it is known and `id` can be dropped.
    fn known_truth(&self, id: ExprId) -> Option<bool> {
        if self.program.has_side_effects(id) {
            return None;
        }
        self.program.is_bool(id).known()
    }

    fn fold_list(&mut self, ids: Vec<ExprId>) -> (Vec<ExprId>, bool) {
        let mut changed = false;
        let folded = ids
            .into_iter()
            .map(|e| {
                let f = self.fold(e);
                changed |= f != e;
                f
            })
            .collect();
        (folded, changed)
    }

    fn fold_inner(&mut self, id: ExprId) -> ExprId {
        let expr = *self.program.arena.expr(id);
        let Some(ty) = expr.ty else {
            return id;
        };
        if self.program.types.is_error(ty) {
            return id;
        }
        let span = expr.span;
        match expr.kind {
            ExprKind::Var(var) => self.expand_var(id, var),
            ExprKind::Unary { op, operand } => {
                let o = self.fold(operand);
                if let Some(folded) = literal::unary(self.program, op, o, ty, span) {
                    return folded;
                }
                if op == UnaryOp::Not {
                    if let Some(b) = self.known_truth(o) {
                        return self.program.bool_lit(!b, span);
                    }
                }
                self.rebuild(id, ExprKind::Unary { op, operand: o }, o != operand)
            }
            ExprKind::BoolCast(operand) => {
                let o = self.fold(operand);
                match self.known_truth(o) {
                    Some(b) => self.program.bool_lit(b, span),
                    None => self.rebuild(id, ExprKind::BoolCast(o), o != operand),
                }
            }
            ExprKind::Cast { operand, to } => {
                let o = self.fold(operand);
                match literal::cast(self.program, o, to, span) {
                    Some(folded) => folded,
                    None => self.rebuild(id, ExprKind::Cast { operand: o, to }, o != operand),
                }
            }
            ExprKind::Binary {
                op: op @ (BinaryOp::AndAnd | BinaryOp::OrOr),
                left,
                right,
            } => self.fold_logical(id, op, left, right),
            ExprKind::Binary { op, left, right } => {
                let l = self.fold(left);
                let r = self.fold(right);
                if let Some(folded) = literal::binary(self.program, op, l, r, ty, span) {
                    tracing::debug!(op = op.as_symbol(), "folded binary expression");
                    return folded;
                }
                self.rebuild(id, ExprKind::Binary { op, left: l, right: r }, l != left || r != right)
            }
            ExprKind::Comma { left, right } => {
                let l = self.fold(left);
                let r = self.fold(right);
                if !self.program.has_side_effects(l) {
                    return r;
                }
                self.rebuild(id, ExprKind::Comma { left: l, right: r }, l != left || r != right)
            }
            ExprKind::Dot { left, right } => {
                let r = self.fold(right);
                if !self.program.has_side_effects(left) {
                    return r;
                }
                self.rebuild(id, ExprKind::Dot { left, right: r }, r != right)
            }
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                let c = self.fold(cond);
                if let Some(b) = self.known_truth(c) {
                    tracing::debug!(taken = b, "folded conditional");
                    return self.fold(if b { then_expr } else { else_expr });
                }
                let t = self.fold(then_expr);
                let e = self.fold(else_expr);
                self.rebuild(
                    id,
                    ExprKind::Cond {
                        cond: c,
                        then_expr: t,
                        else_expr: e,
                    },
                    c != cond || t != then_expr || e != else_expr,
                )
            }
            ExprKind::Index { base, index } => {
                let b = self.fold(base);
                let i = self.fold(index);
                match literal::index(self.program, b, i, ty, span) {
                    Some(folded) => folded,
                    None => self.rebuild(id, ExprKind::Index { base: b, index: i }, b != base || i != index),
                }
            }
            ExprKind::Slice { base, lower, upper } => {
                let b = self.fold(base);
                let lo = self.fold(lower);
                let hi = self.fold(upper);
                match literal::slice(self.program, b, lo, hi, ty, span) {
                    Some(folded) => folded,
                    None => self.rebuild(
                        id,
                        ExprKind::Slice {
                            base: b,
                            lower: lo,
                            upper: hi,
                        },
                        b != base || lo != lower || hi != upper,
                    ),
                }
            }
            ExprKind::ArrayLength(base) => {
                let b = self.fold(base);
                match literal::length(self.program, b, ty, span) {
                    Some(folded) => folded,
                    None => self.rebuild(id, ExprKind::ArrayLength(b), b != base),
                }
            }
            ExprKind::DotVar { base, var } => {
                let b = self.fold(base);
                match literal::field(self.program, b, var, span) {
                    Some(folded) => folded,
                    None => self.rebuild(id, ExprKind::DotVar { base: b, var }, b != base),
                }
            }
            ExprKind::ArrayLiteral(elems) => {
                let (folded, changed) = self.fold_list(self.program.arena.list_vec(elems));
                if !changed {
                    return id;
                }
                let range = self.program.arena.alloc_list(folded);
                self.rebuild(id, ExprKind::ArrayLiteral(range), true)
            }
            ExprKind::AssocArrayLiteral { keys, values } => {
                let (k, kc) = self.fold_list(self.program.arena.list_vec(keys));
                let (v, vc) = self.fold_list(self.program.arena.list_vec(values));
                if !kc && !vc {
                    return id;
                }
                let keys = self.program.arena.alloc_list(k);
                let values = self.program.arena.alloc_list(v);
                self.rebuild(id, ExprKind::AssocArrayLiteral { keys, values }, true)
            }
            ExprKind::StructLiteral { agg, elements } => {
                let (folded, changed) = self.fold_list(self.program.arena.list_vec(elements));
                if !changed {
                    return id;
                }
                let elements = self.program.arena.alloc_list(folded);
                self.rebuild(id, ExprKind::StructLiteral { agg, elements }, true)
            }
            ExprKind::Tuple { prelude, elements } => {
                let p = self.fold(prelude);
                let (folded, changed) = self.fold_list(self.program.arena.list_vec(elements));
                if !changed && p == prelude {
                    return id;
                }
                let elements = self.program.arena.alloc_list(folded);
                self.rebuild(id, ExprKind::Tuple { prelude: p, elements }, true)
            }
            ExprKind::Call { callee, args } => {
                let (folded, changed) = self.fold_list(self.program.arena.list_vec(args));
                if !changed {
                    return id;
                }
                let args = self.program.arena.alloc_list(folded);
                self.rebuild(id, ExprKind::Call { callee, args }, true)
            }
            ExprKind::New { ty: new_ty, args } => {
                let (folded, changed) = self.fold_list(self.program.arena.list_vec(args));
                if !changed {
                    return id;
                }
                let args = self.program.arena.alloc_list(folded);
                self.rebuild(id, ExprKind::New { ty: new_ty, args }, true)
            }
            ExprKind::MultiIndex { base, indices } => {
                let b = self.fold(base);
                let (folded, changed) = self.fold_list(self.program.arena.list_vec(indices));
                if !changed && b == base {
                    return id;
                }
                let indices = self.program.arena.alloc_list(folded);
                self.rebuild(id, ExprKind::MultiIndex { base: b, indices }, true)
            }
            ExprKind::Assign { op, target, value } => {
                let t = self.fold_lvalue(target);
                let v = self.fold(value);
                self.rebuild(id, ExprKind::Assign { op, target: t, value: v }, t != target || v != value)
            }
            ExprKind::PreIncDec { op, operand } => {
                let o = self.fold_lvalue(operand);
                self.rebuild(id, ExprKind::PreIncDec { op, operand: o }, o != operand)
            }
            ExprKind::PostIncDec { op, operand } => {
                let o = self.fold_lvalue(operand);
                self.rebuild(id, ExprKind::PostIncDec { op, operand: o }, o != operand)
            }
            ExprKind::AddrOf(operand) => {
                let o = self.fold_lvalue(operand);
                self.rebuild(id, ExprKind::AddrOf(o), o != operand)
            }
            ExprKind::Delete(operand) => {
                let o = self.fold_lvalue(operand);
                self.rebuild(id, ExprKind::Delete(o), o != operand)
            }
            ExprKind::Deref(operand) => {
                let o = self.fold(operand);
                self.rebuild(id, ExprKind::Deref(o), o != operand)
            }
            ExprKind::Vector { operand, to } => {
                let o = self.fold(operand);
                self.rebuild(id, ExprKind::Vector { operand: o, to }, o != operand)
            }
            ExprKind::Remove { aa, key } => {
                let a = self.fold_lvalue(aa);
                let k = self.fold(key);
                self.rebuild(id, ExprKind::Remove { aa: a, key: k }, a != aa || k != key)
            }
            ExprKind::Assert { cond, msg } => {
                let c = self.fold(cond);
                let m = self.fold(msg);
                self.rebuild(id, ExprKind::Assert { cond: c, msg: m }, c != cond || m != msg)
            }
            ExprKind::Error
            | ExprKind::Int(_)
            | ExprKind::Real(_)
            | ExprKind::Complex { .. }
            | ExprKind::String { .. }
            | ExprKind::Null
            | ExprKind::Ident(_)
            | ExprKind::Dollar
            | ExprKind::Func { .. }
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::SymOff { .. }
            | ExprKind::OverloadSet(_)
            | ExprKind::FuncLiteral(_)
            | ExprKind::TypeExpr(_)
            | ExprKind::ScopeExpr(_)
            | ExprKind::TemplateExpr(_)
            | ExprKind::Mixin(_)
            | ExprKind::Import(_)
            | ExprKind::DotId { .. }
            | ExprKind::DotFunc { .. }
            | ExprKind::DotTemplate { .. }
            | ExprKind::NewAnonClass { .. }
            | ExprKind::DefaultInit(_)
            | ExprKind::Typeid(_)
            | ExprKind::Traits { .. }
            | ExprKind::IsType { .. }
            | ExprKind::Declaration(_)
            | ExprKind::Halt => id,
        }
    }

    /// `&&` and `||`. The right operand is dropped only when the left one
    /// decides the result, which is exactly when it would not run.
    fn fold_logical(&mut self, id: ExprId, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.program.arena.span(id);
        let l = self.fold(left);
        let decides = op == BinaryOp::OrOr;
        match self.known_truth(l) {
            Some(b) if b == decides => return self.program.bool_lit(decides, span),
            Some(_) => {
                let r = self.fold(right);
                if let Some(b) = self.known_truth(r) {
                    return self.program.bool_lit(b, span);
                }
                if self.program.types.is_bool(self.program.arena.ty(r)) {
                    return r;
                }
                return self.program.arena.alloc_typed(ExprKind::BoolCast(r), span, TypeId::BOOL);
            }
            None => {}
        }
        let r = self.fold(right);
        self.rebuild(id, ExprKind::Binary { op, left: l, right: r }, l != left || r != right)
    }

    /// Fold the rvalue parts of an lvalue (indices, slice bounds, pointer
    /// operands) and leave the designated storage alone.
    fn fold_lvalue(&mut self, id: ExprId) -> ExprId {
        if !id.is_valid() {
            return id;
        }
        match self.program.arena.kind(id) {
            ExprKind::Index { base, index } => {
                let b = self.fold_lvalue(base);
                let i = self.fold(index);
                self.rebuild(id, ExprKind::Index { base: b, index: i }, b != base || i != index)
            }
            ExprKind::Slice { base, lower, upper } => {
                let b = self.fold_lvalue(base);
                let lo = self.fold(lower);
                let hi = self.fold(upper);
                self.rebuild(
                    id,
                    ExprKind::Slice {
                        base: b,
                        lower: lo,
                        upper: hi,
                    },
                    b != base || lo != lower || hi != upper,
                )
            }
            ExprKind::DotVar { base, var } => {
                let b = self.fold_lvalue(base);
                self.rebuild(id, ExprKind::DotVar { base: b, var }, b != base)
            }
            ExprKind::ArrayLength(base) => {
                let b = self.fold_lvalue(base);
                self.rebuild(id, ExprKind::ArrayLength(b), b != base)
            }
            ExprKind::Cast { operand, to } => {
                let o = self.fold_lvalue(operand);
                self.rebuild(id, ExprKind::Cast { operand: o, to }, o != operand)
            }
            ExprKind::Comma { left, right } => {
                let l = self.fold(left);
                let r = self.fold_lvalue(right);
                self.rebuild(id, ExprKind::Comma { left: l, right: r }, l != left || r != right)
            }
            ExprKind::Deref(pointer) => {
                let p = self.fold(pointer);
                self.rebuild(id, ExprKind::Deref(p), p != pointer)
            }
            _ => id,
        }
    }

    fn expand_var(&mut self, id: ExprId, var: VarId) -> ExprId {
        let decl = self.program.decls.var(var);
        let constant = self.program.types.qualifier(decl.ty) != Qualifier::Mutable
            && !decl.is_parameter()
            && !decl.is_field()
            && !decl.is_ref();
        let expand = decl.is_manifest() || (self.flags.contains(OptimizeFlags::EXPAND_VARS) && constant);
        let init = decl.init;
        let name = decl.name;
        if !expand || !literal::is_literal_tree(self.program, init) {
            return id;
        }
        tracing::debug!(name = self.program.text(name), "expanded constant");
        let span = self.program.arena.span(id);
        let ty = self.program.arena.ty(id);
        literal::relocate(self.program, init, ty, span)
    }
}
