//! Function bodies.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::visitor::stmt_children;
use dex_ir::{ExprId, ExprKind, FuncAttrs, FuncId, SemaState, StmtId, StmtKind, TypeId};

use super::Resolver;
use crate::infer::convert;

impl Resolver<'_> {
    /// Resolve the body of `func` once. Safe to call re-entrantly: a
    /// function already in progress is left alone.
    #[tracing::instrument(level = "debug", skip(self), fields(name = self.program.text(self.program.decls.func(func).name)))]
    pub(crate) fn resolve_function(&mut self, func: FuncId) {
        let decl = self.program.decls.func(func);
        if decl.state != SemaState::Pending {
            return;
        }
        let (parent, body, auto) = (decl.parent, decl.body, decl.attrs.contains(FuncAttrs::AUTO_RETURN));
        if let Some(agg) = parent {
            self.resolve_aggregate(agg);
        }
        self.resolve_signature(func);
        self.program.decls.func_mut(func).state = SemaState::InProgress;
        let before = self.errors;

        if body.is_valid() {
            self.with_function_scope(func, |this| {
                this.collect_labels(body);
                this.resolve_stmt(body);
                this.finish_function(func, body);
            });
        } else if auto {
            self.program.decls.func_mut(func).ret = TypeId::VOID;
        }

        let state = if self.errors > before {
            SemaState::Failed
        } else {
            SemaState::Done
        };
        self.program.decls.func_mut(func).state = state;
    }

    /// Record every label of the body so `goto` can jump forward.
    fn collect_labels(&mut self, stmt: StmtId) {
        if let StmtKind::Labeled { label, .. } = self.program.arena.stmt(stmt).kind {
            let fresh = self.func.as_mut().is_some_and(|ctx| ctx.all_labels.insert(label));
            if !fresh {
                let diag = Diagnostic::error(ErrorCode::E2012)
                    .with_message(format!("label `{}` is already defined", self.program.text(label)))
                    .with_label(self.program.arena.stmt(stmt).span, "redefined here");
                self.report(diag);
            }
        }
        for child in stmt_children(self.program, stmt) {
            self.collect_labels(child);
        }
    }

    /// Settle an inferred return type and check that a value-returning
    /// function cannot run off its end.
    fn finish_function(&mut self, func: FuncId, body: StmtId) {
        let Some(ctx) = self.func.clone() else {
            return;
        };
        if ctx.ret.is_none() {
            let ret = ctx.inferred.unwrap_or(TypeId::VOID);
            self.program.decls.func_mut(func).ret = ret;
            for stmt in ctx.returns {
                if let StmtKind::Return(value) = self.program.arena.stmt(stmt).kind {
                    if value.is_valid() {
                        let value = convert(self, value, ret, "return value");
                        self.program.arena.stmt_mut(stmt).kind = StmtKind::Return(value);
                    }
                }
            }
        }

        let decl = self.program.decls.func(func);
        let ret = decl.ret;
        let returns_value = !self.program.types.is_void(ret) && !self.program.types.is_error(ret) && !decl.is_ctor();
        if returns_value && self.can_fall_through(body) {
            let diag = Diagnostic::error(ErrorCode::E2019)
                .with_message(format!(
                    "function `{}` can reach its end without returning a `{}`",
                    self.program.text(decl.name),
                    self.program.type_name(ret)
                ))
                .with_label(decl.span, "declared here");
            self.report(diag);
        }
    }

    /// Whether control can leave `stmt` by reaching its end.
    pub(crate) fn can_fall_through(&self, stmt: StmtId) -> bool {
        if !stmt.is_valid() {
            return true;
        }
        match self.program.arena.stmt(stmt).kind {
            StmtKind::Return(_)
            | StmtKind::Throw(_)
            | StmtKind::Goto(_)
            | StmtKind::Break(_)
            | StmtKind::Continue(_) => false,
            StmtKind::Expr(e) => !matches!(self.program.arena.kind(e), ExprKind::Halt),
            StmtKind::Block(list) => self.list_falls_through(self.program.arena.stmt_list(list)),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => !else_branch.is_valid() || self.can_fall_through(then_branch) || self.can_fall_through(else_branch),
            StmtKind::While { cond, body } => !self.known_true(cond) || self.has_break(body, false),
            StmtKind::For { cond, body, .. } => {
                (cond.is_valid() && !self.known_true(cond)) || self.has_break(body, false)
            }
            StmtKind::DoWhile { body, cond } => {
                (self.can_fall_through(body) && !self.known_true(cond)) || self.has_break(body, false)
            }
            StmtKind::Labeled { body, .. } => self.can_fall_through(body) || self.has_break(body, false),
            StmtKind::Switch { cases, .. } => {
                let cases = self.program.arena.cases(cases);
                let has_default = cases.iter().any(|c| c.is_default);
                let breaks = cases.iter().any(|c| {
                    self.program
                        .arena
                        .stmt_list(c.body)
                        .iter()
                        .any(|&s| self.has_break(s, false))
                });
                !has_default
                    || breaks
                    || cases
                        .last()
                        .map_or(true, |c| self.list_falls_through(self.program.arena.stmt_list(c.body)))
            }
            StmtKind::Empty
            | StmtKind::Decl(_)
            | StmtKind::StaticIf { .. }
            | StmtKind::StaticAssert { .. }
            | StmtKind::Foreach { .. }
            | StmtKind::ForeachRange { .. } => true,
        }
    }

    /// A statement after an unconditional jump is unreachable until a label
    /// makes it a jump target again.
    fn list_falls_through(&self, stmts: &[StmtId]) -> bool {
        let mut reachable = true;
        for &stmt in stmts {
            if matches!(self.program.arena.stmt(stmt).kind, StmtKind::Labeled { .. }) {
                reachable = true;
            }
            if reachable {
                reachable = self.can_fall_through(stmt);
            }
        }
        reachable
    }

    /// Whether `stmt` contains a `break` leaving it. Inside a nested loop or
    /// switch only labeled breaks count.
    fn has_break(&self, stmt: StmtId, nested: bool) -> bool {
        match self.program.arena.stmt(stmt).kind {
            StmtKind::Break(label) => !nested || !label.is_empty(),
            StmtKind::While { .. }
            | StmtKind::DoWhile { .. }
            | StmtKind::For { .. }
            | StmtKind::Foreach { .. }
            | StmtKind::ForeachRange { .. }
            | StmtKind::Switch { .. } => stmt_children(self.program, stmt)
                .into_iter()
                .any(|child| self.has_break(child, true)),
            _ => stmt_children(self.program, stmt)
                .into_iter()
                .any(|child| self.has_break(child, nested)),
        }
    }

    fn known_true(&self, cond: ExprId) -> bool {
        match self.program.arena.kind(cond) {
            ExprKind::Int(v) => v != 0,
            ExprKind::BoolCast(inner) => self.known_true(inner),
            _ => false,
        }
    }
}
