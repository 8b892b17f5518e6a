//! Append-only storage for expressions and statements.

use crate::expr::{Expr, ExprId, ExprKind, ExprRange};
use crate::stmt::{CaseRange, Stmt, StmtId, StmtKind, StmtRange, SwitchCase};
use crate::ty::TypeId;
use crate::Span;

fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("{what} arena exceeded {} entries", u32::MAX))
}

/// Arena holding every node of a program.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    stmts: Vec<Stmt>,
    stmt_lists: Vec<StmtId>,
    cases: Vec<SwitchCase>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expression"));
        self.exprs.push(expr);
        id
    }

    /// Allocate an unresolved node.
    pub fn alloc_kind(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.alloc(Expr::new(kind, span))
    }

    /// Allocate a node with its type already known.
    pub fn alloc_typed(&mut self, kind: ExprKind, span: Span, ty: TypeId) -> ExprId {
        self.alloc(Expr::typed(kind, span, ty))
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> ExprKind {
        self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    /// Resolved type, `TypeId::ERROR` for unresolved nodes.
    #[inline]
    pub fn ty(&self, id: ExprId) -> TypeId {
        self.exprs[id.index()].ty.unwrap_or(TypeId::ERROR)
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression list");
        self.expr_lists.extend(ids);
        let len = to_u32(self.expr_lists.len(), "expression list") - start;
        ExprRange { start, len }
    }

    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    /// Owned copy of a list, for callers that allocate while iterating.
    pub fn list_vec(&self, range: ExprRange) -> Vec<ExprId> {
        self.list(range).to_vec()
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let id = StmtId::new(to_u32(self.stmts.len(), "statement"));
        self.stmts.push(Stmt::new(kind, span));
        id
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn stmt_mut(&mut self, id: StmtId) -> &mut Stmt {
        &mut self.stmts[id.index()]
    }

    pub fn alloc_stmt_list(&mut self, ids: impl IntoIterator<Item = StmtId>) -> StmtRange {
        let start = to_u32(self.stmt_lists.len(), "statement list");
        self.stmt_lists.extend(ids);
        let len = to_u32(self.stmt_lists.len(), "statement list") - start;
        StmtRange { start, len }
    }

    #[inline]
    pub fn stmt_list(&self, range: StmtRange) -> &[StmtId] {
        let start = range.start as usize;
        &self.stmt_lists[start..start + range.len()]
    }

    pub fn alloc_cases(&mut self, cases: impl IntoIterator<Item = SwitchCase>) -> CaseRange {
        let start = to_u32(self.cases.len(), "switch case");
        self.cases.extend(cases);
        let len = to_u32(self.cases.len(), "switch case") - start;
        CaseRange { start, len }
    }

    #[inline]
    pub fn cases(&self, range: CaseRange) -> &[SwitchCase] {
        let start = range.start as usize;
        &self.cases[start..start + range.len as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_contiguous() {
        let mut arena = ExprArena::new();
        let a = arena.alloc_kind(ExprKind::Int(1), Span::new(0, 1));
        let b = arena.alloc_kind(ExprKind::Int(2), Span::new(2, 3));
        let first = arena.alloc_list([a, b]);
        let second = arena.alloc_list([b]);
        assert_eq!(arena.list(first), &[a, b]);
        assert_eq!(arena.list(second), &[b]);
        assert!(arena.list(ExprRange::EMPTY).is_empty());
    }

    #[test]
    fn unresolved_type_reads_as_error() {
        let mut arena = ExprArena::new();
        let a = arena.alloc_kind(ExprKind::Null, Span::DUMMY);
        let b = arena.alloc_typed(ExprKind::Int(0), Span::DUMMY, TypeId::INT);
        assert_eq!(arena.ty(a), TypeId::ERROR);
        assert_eq!(arena.ty(b), TypeId::INT);
        assert!(!arena.expr(a).is_resolved());
    }
}
