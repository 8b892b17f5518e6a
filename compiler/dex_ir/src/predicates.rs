//! Classification predicates over resolved nodes.
//!
//! All predicates are pure functions of the tree: nothing is cached on the
//! nodes, so rewriting a child never leaves a stale answer behind.

use std::ops::ControlFlow;

use crate::decl::FuncAttrs;
use crate::expr::{ExprId, ExprKind, Truth};
use crate::operators::{AssignOp, UnaryOp};
use crate::ty::TypeKind;
use crate::visitor::apply;
use crate::Program;

impl Program {
    /// Does `id` designate a storage location?
    ///
    /// Array and struct rvalues never are. A cast is only when it changes
    /// nothing but qualifiers, so the result still aliases the operand's
    /// storage. Error nodes answer `true` to suppress follow-on diagnostics.
    pub fn is_lvalue(&self, id: ExprId) -> bool {
        match self.arena.kind(id) {
            ExprKind::Error | ExprKind::Deref(_) | ExprKind::Assign { .. } => true,
            ExprKind::Var(var) => !self.decls.var(var).is_manifest(),
            ExprKind::This => self.types.is_struct(self.arena.ty(id)),
            ExprKind::Index { base, .. } => {
                let base_ty = self.arena.ty(base);
                self.types.is_slice(base_ty)
                    || self.types.is_pointer(base_ty)
                    || self.types.is_assoc_array(base_ty)
                    || self.is_lvalue(base)
            }
            ExprKind::DotVar { base, .. } => {
                let base_ty = self.arena.ty(base);
                self.types.is_class(base_ty) || self.types.is_pointer(base_ty) || self.is_lvalue(base)
            }
            ExprKind::ArrayLength(base) => self.is_lvalue(base),
            ExprKind::Cast { operand, to } => {
                self.types.strip(to) == self.types.strip(self.arena.ty(operand)) && self.is_lvalue(operand)
            }
            ExprKind::Comma { right, .. } | ExprKind::Dot { right, .. } => self.is_lvalue(right),
            ExprKind::Cond {
                then_expr,
                else_expr,
                ..
            } => self.is_lvalue(then_expr) && self.is_lvalue(else_expr),
            ExprKind::PreIncDec { operand, .. } => self.is_lvalue(operand),
            ExprKind::Call { callee, .. } => self.returns_ref(callee),
            ExprKind::Int(_)
            | ExprKind::Real(_)
            | ExprKind::Complex { .. }
            | ExprKind::String { .. }
            | ExprKind::Null
            | ExprKind::ArrayLiteral(_)
            | ExprKind::AssocArrayLiteral { .. }
            | ExprKind::StructLiteral { .. }
            | ExprKind::Tuple { .. }
            | ExprKind::Ident(_)
            | ExprKind::Dollar
            | ExprKind::Func { .. }
            | ExprKind::Super
            | ExprKind::SymOff { .. }
            | ExprKind::OverloadSet(_)
            | ExprKind::FuncLiteral(_)
            | ExprKind::TypeExpr(_)
            | ExprKind::ScopeExpr(_)
            | ExprKind::TemplateExpr(_)
            | ExprKind::AddrOf(_)
            | ExprKind::Unary { .. }
            | ExprKind::BoolCast(_)
            | ExprKind::Vector { .. }
            | ExprKind::Slice { .. }
            | ExprKind::MultiIndex { .. }
            | ExprKind::Delete(_)
            | ExprKind::Mixin(_)
            | ExprKind::Import(_)
            | ExprKind::Assert { .. }
            | ExprKind::DotId { .. }
            | ExprKind::DotFunc { .. }
            | ExprKind::DotTemplate { .. }
            | ExprKind::New { .. }
            | ExprKind::NewAnonClass { .. }
            | ExprKind::Binary { .. }
            | ExprKind::PostIncDec { .. }
            | ExprKind::Remove { .. }
            | ExprKind::DefaultInit(_)
            | ExprKind::Typeid(_)
            | ExprKind::Traits { .. }
            | ExprKind::IsType { .. }
            | ExprKind::Declaration(_)
            | ExprKind::Halt => false,
        }
    }

    fn returns_ref(&self, callee: ExprId) -> bool {
        match self.arena.kind(callee) {
            ExprKind::Func { func, .. } | ExprKind::DotFunc { func, .. } | ExprKind::FuncLiteral(func) => {
                self.decls.func(func).attrs.contains(FuncAttrs::REF_RETURN)
            }
            _ => false,
        }
    }

    /// A compile-time scalar constant: numeric literal, `null` or a static
    /// address.
    pub fn is_const(&self, id: ExprId) -> bool {
        matches!(
            self.arena.kind(id),
            ExprKind::Int(_) | ExprKind::Real(_) | ExprKind::Complex { .. } | ExprKind::Null | ExprKind::SymOff { .. }
        )
    }

    /// Statically known truth value of `id` used as a condition.
    pub fn is_bool(&self, id: ExprId) -> Truth {
        match self.arena.kind(id) {
            ExprKind::Int(v) => Truth::from_bool(v != 0),
            ExprKind::Real(bits) => Truth::from_bool(f64::from_bits(bits) != 0.0),
            ExprKind::Complex { re, im } => {
                Truth::from_bool(f64::from_bits(re) != 0.0 || f64::from_bits(im) != 0.0)
            }
            ExprKind::Null => Truth::False,
            ExprKind::SymOff { .. } | ExprKind::String { .. } => Truth::True,
            ExprKind::ArrayLiteral(elems) => Truth::from_bool(!elems.is_empty()),
            ExprKind::AssocArrayLiteral { keys, .. } => Truth::from_bool(!keys.is_empty()),
            ExprKind::Comma { left, right } if !self.has_side_effects(left) => self.is_bool(right),
            _ => Truth::Unknown,
        }
    }

    /// Element-wise array expression that must be lowered as an array op.
    pub fn is_array_operand(&self, id: ExprId) -> bool {
        let ty = self.arena.ty(id);
        let array_typed = self.types.is_slice(ty) || self.types.is_static_array(ty);
        match self.arena.kind(id) {
            ExprKind::Slice { .. } | ExprKind::ArrayLiteral(_) => true,
            ExprKind::Unary {
                op: UnaryOp::Neg | UnaryOp::Com,
                ..
            } => array_typed,
            ExprKind::Binary { op, .. } => array_typed && op.is_array_op_capable(),
            ExprKind::Assign { op, target, .. } => {
                array_typed
                    && op != AssignOp::Cat
                    && matches!(self.arena.kind(target), ExprKind::Slice { .. })
            }
            _ => false,
        }
    }

    /// Could evaluating `id` be observed beyond producing its value?
    ///
    /// Faulting operations (division, indexing) are not counted: folding
    /// only drops subtrees whose value it already knows.
    pub fn has_side_effects(&self, id: ExprId) -> bool {
        apply(self, id, &mut |program: &Program, e: ExprId| {
            if program.node_has_effect(e) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    fn node_has_effect(&self, id: ExprId) -> bool {
        match self.arena.kind(id) {
            ExprKind::Assign { .. }
            | ExprKind::PreIncDec { .. }
            | ExprKind::PostIncDec { .. }
            | ExprKind::New { .. }
            | ExprKind::NewAnonClass { .. }
            | ExprKind::Delete(_)
            | ExprKind::Remove { .. }
            | ExprKind::Assert { .. }
            | ExprKind::Halt
            | ExprKind::Declaration(_)
            | ExprKind::Mixin(_)
            | ExprKind::Import(_) => true,
            ExprKind::Call { callee, .. } => !self.callee_is_pure(callee),
            _ => false,
        }
    }

    fn callee_is_pure(&self, callee: ExprId) -> bool {
        match self.arena.kind(callee) {
            ExprKind::Func { func, .. } | ExprKind::DotFunc { func, .. } => {
                let attrs = self.decls.func(func).attrs;
                attrs.contains(FuncAttrs::PURE | FuncAttrs::NOTHROW) && !attrs.contains(FuncAttrs::REF_RETURN)
            }
            _ => false,
        }
    }

    /// Whether `id` has a static array or struct type, whose values are
    /// copied rather than shared on assignment.
    pub fn has_value_semantics(&self, id: ExprId) -> bool {
        matches!(
            self.types.base_kind(self.arena.ty(id)),
            TypeKind::Array { .. } | TypeKind::Aggregate { .. }
        ) && !self.types.is_class(self.arena.ty(id))
    }
}

#[cfg(test)]
mod tests;
