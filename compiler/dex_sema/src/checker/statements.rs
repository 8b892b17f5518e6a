//! Statement resolution.
//!
//! Statements are resolved in place: each statement's kind is replaced by
//! one whose expressions are resolved. `static if` is replaced by the taken
//! branch and `case` labels by their compile-time values.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{
    CaseRange, ExprId, ExprKind, FuncAttrs, MatchLevel, Name, Span, StmtId, StmtKind, StorageClass, SwitchCase, Symbol,
    TypeId, TypeKind, VarId,
};
use rustc_hash::FxHashSet;

use super::Resolver;
use crate::escape::{check_escape, check_escape_ref};
use crate::infer::{conv_level, convert, resolve_expr, resolve_rvalue, to_boolean};

impl Resolver<'_> {
    pub(crate) fn resolve_stmt(&mut self, id: StmtId) {
        if !id.is_valid() {
            return;
        }
        let stmt = *self.program.arena.stmt(id);
        let span = stmt.span;
        let kind = match stmt.kind {
            StmtKind::Empty => StmtKind::Empty,
            StmtKind::Expr(e) => StmtKind::Expr(resolve_expr(self, e)),
            StmtKind::Decl(var) => {
                self.resolve_var_decl(var);
                self.declare_local(var);
                StmtKind::Decl(var)
            }
            StmtKind::Block(list) => {
                let stmts = self.program.arena.stmt_list(list).to_vec();
                self.with_block_scope(|this| {
                    for stmt in stmts {
                        this.resolve_stmt(stmt);
                    }
                });
                StmtKind::Block(list)
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.resolve_condition(cond);
                self.with_block_scope(|this| this.resolve_stmt(then_branch));
                self.with_block_scope(|this| this.resolve_stmt(else_branch));
                StmtKind::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            StmtKind::StaticIf {
                cond,
                then_branch,
                else_branch,
            } => self.resolve_static_if(cond, then_branch, else_branch),
            StmtKind::While { cond, body } => {
                let cond = self.resolve_condition(cond);
                self.resolve_loop_body(body);
                StmtKind::While { cond, body }
            }
            StmtKind::DoWhile { body, cond } => {
                self.resolve_loop_body(body);
                let cond = self.resolve_condition(cond);
                StmtKind::DoWhile { body, cond }
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => self.with_block_scope(|this| {
                this.resolve_stmt(init);
                let cond = if cond.is_valid() {
                    this.resolve_condition(cond)
                } else {
                    cond
                };
                let step = if step.is_valid() {
                    resolve_expr(this, step)
                } else {
                    step
                };
                this.resolve_loop_body(body);
                StmtKind::For {
                    init,
                    cond,
                    step,
                    body,
                }
            }),
            StmtKind::Foreach {
                key,
                value,
                aggregate,
                body,
            } => self.with_block_scope(|this| {
                let aggregate = this.resolve_foreach(key, value, aggregate);
                this.resolve_loop_body(body);
                StmtKind::Foreach {
                    key,
                    value,
                    aggregate,
                    body,
                }
            }),
            StmtKind::ForeachRange {
                var,
                lower,
                upper,
                body,
            } => self.with_block_scope(|this| {
                let (lower, upper) = this.resolve_foreach_range(var, lower, upper);
                this.resolve_loop_body(body);
                StmtKind::ForeachRange {
                    var,
                    lower,
                    upper,
                    body,
                }
            }),
            StmtKind::Break(label) => {
                self.check_jump(label, false, span);
                StmtKind::Break(label)
            }
            StmtKind::Continue(label) => {
                self.check_jump(label, true, span);
                StmtKind::Continue(label)
            }
            StmtKind::Goto(label) => {
                let known = self.func.as_ref().is_some_and(|ctx| ctx.all_labels.contains(&label));
                if !known {
                    let diag = Diagnostic::error(ErrorCode::E2018)
                        .with_message(format!("no label `{}` in this function", self.program.text(label)))
                        .with_label(span, "jump target not found");
                    self.report(diag);
                }
                StmtKind::Goto(label)
            }
            StmtKind::Labeled { label, body } => {
                let is_loop = matches!(
                    self.program.arena.stmt(body).kind,
                    StmtKind::While { .. }
                        | StmtKind::DoWhile { .. }
                        | StmtKind::For { .. }
                        | StmtKind::Foreach { .. }
                        | StmtKind::ForeachRange { .. }
                );
                self.with_label(label, is_loop, |this| this.resolve_stmt(body));
                StmtKind::Labeled { label, body }
            }
            StmtKind::Return(value) => self.resolve_return(id, value, span),
            StmtKind::Switch { cond, cases } => self.resolve_switch(cond, cases),
            StmtKind::Throw(value) => {
                let value = resolve_rvalue(self, value);
                if let Some(ctx) = &self.func {
                    if ctx.attrs.contains(FuncAttrs::NOTHROW) {
                        let diag = Diagnostic::error(ErrorCode::E2007)
                            .with_message(format!(
                                "`throw` in nothrow function `{}`",
                                self.current_function_name()
                            ))
                            .with_label(span, "may throw");
                        self.report(diag);
                    }
                }
                StmtKind::Throw(value)
            }
            StmtKind::StaticAssert { cond, msg } => self.resolve_static_assert(cond, msg, span),
        };
        self.program.arena.stmt_mut(id).kind = kind;
    }

    /// A condition converted to `bool`.
    pub(crate) fn resolve_condition(&mut self, cond: ExprId) -> ExprId {
        let value = resolve_rvalue(self, cond);
        to_boolean(self, value)
    }

    fn resolve_loop_body(&mut self, body: StmtId) {
        self.with_breakable(true, |this| this.with_block_scope(|this| this.resolve_stmt(body)));
    }

    pub(crate) fn declare_local(&mut self, var: VarId) {
        let decl = self.program.decls.var(var);
        let (name, span) = (decl.name, decl.span);
        if self.scope.declare(name, Symbol::Var(var)).is_err() {
            let diag = Diagnostic::error(ErrorCode::E2012)
                .with_message(format!(
                    "`{}` is already declared in this function",
                    self.program.text(name)
                ))
                .with_label(span, "shadowing declaration");
            self.report(diag);
        }
    }

    fn check_jump(&mut self, label: Name, is_continue: bool, span: Span) {
        let Some(ctx) = &self.func else {
            return;
        };
        let message = if label.is_empty() {
            let depth = if is_continue { ctx.loops } else { ctx.breakables };
            if depth > 0 {
                return;
            }
            if is_continue {
                "`continue` is not inside a loop".to_string()
            } else {
                "`break` is not inside a loop or switch".to_string()
            }
        } else {
            let target = ctx.labels.iter().rev().find(|(l, _)| *l == label);
            match target {
                Some((_, true)) => return,
                Some((_, false)) if !is_continue => return,
                Some((_, false)) => format!("`continue {}` does not name a loop", self.program.text(label)),
                None => format!("no enclosing statement is labeled `{}`", self.program.text(label)),
            }
        };
        let diag = Diagnostic::error(ErrorCode::E2018)
            .with_message(message)
            .with_label(span, "misplaced jump");
        self.report(diag);
    }

    /// Pick the `static if` branch. The branch's statements join the
    /// enclosing scope, so a block branch is resolved without a new frame.
    fn resolve_static_if(&mut self, cond: ExprId, then_branch: StmtId, else_branch: StmtId) -> StmtKind {
        let cond = self.resolve_condition(cond);
        let Ok(value) = self.evaluate(cond) else {
            return StmtKind::Empty;
        };
        let taken = if self.program.is_bool(value).known() == Some(true) {
            then_branch
        } else {
            else_branch
        };
        if !taken.is_valid() {
            return StmtKind::Empty;
        }
        match self.program.arena.stmt(taken).kind {
            StmtKind::Block(list) => {
                for stmt in self.program.arena.stmt_list(list).to_vec() {
                    self.resolve_stmt(stmt);
                }
                StmtKind::Block(list)
            }
            _ => {
                self.resolve_stmt(taken);
                self.program.arena.stmt(taken).kind
            }
        }
    }

    fn resolve_static_assert(&mut self, cond: ExprId, msg: ExprId, span: Span) -> StmtKind {
        let cond = self.resolve_condition(cond);
        let msg = if msg.is_valid() {
            resolve_rvalue(self, msg)
        } else {
            msg
        };
        let Ok(value) = self.evaluate(cond) else {
            return StmtKind::StaticAssert { cond, msg };
        };
        if self.program.is_bool(value).known() != Some(true) {
            let text = if msg.is_valid() {
                self.evaluate(msg)
                    .ok()
                    .and_then(|m| self.program.string_of(m))
                    .map(|(text, _)| text.to_string())
            } else {
                None
            };
            let message = match text {
                Some(text) => format!("static assertion failed: {text}"),
                None => format!("static assertion `{}` failed", self.program.expr_to_string(cond)),
            };
            let diag = Diagnostic::error(ErrorCode::E2015)
                .with_message(message)
                .with_label(span, "evaluates to false");
            self.report(diag);
        }
        StmtKind::StaticAssert { cond: value, msg }
    }

    fn resolve_return(&mut self, id: StmtId, value: ExprId, span: Span) -> StmtKind {
        let Some(ctx) = self.func.as_ref() else {
            let diag = Diagnostic::error(ErrorCode::E2018)
                .with_message("`return` outside a function")
                .with_label(span, "not inside a function body");
            self.report(diag);
            return StmtKind::Return(value);
        };
        let (ret, ref_return) = (ctx.ret, ctx.attrs.contains(FuncAttrs::REF_RETURN));

        if !value.is_valid() {
            match ret {
                Some(ret) if !self.program.types.is_void(ret) && !self.program.types.is_error(ret) => {
                    let diag = Diagnostic::error(ErrorCode::E2003)
                        .with_message(format!(
                            "`{}` must return a `{}`",
                            self.current_function_name(),
                            self.program.type_name(ret)
                        ))
                        .with_label(span, "return without a value");
                    self.report(diag);
                }
                Some(_) => {}
                None => self.infer_return(id, TypeId::VOID, span),
            }
            return StmtKind::Return(value);
        }

        let value = resolve_rvalue(self, value);
        let value_ty = self.program.arena.ty(value);
        let value = match ret {
            Some(ret) if self.program.types.is_void(ret) && !self.program.types.is_void(value_ty) => {
                let diag = Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!(
                        "void function `{}` cannot return a value",
                        self.current_function_name()
                    ))
                    .with_label(self.program.arena.span(value), "returned here");
                self.report(diag);
                value
            }
            Some(ret) if ref_return => {
                let level = conv_level(self, value, ret);
                if level < MatchLevel::Const {
                    self.mismatch(self.program.arena.span(value), ret, value_ty, "ref return");
                }
                value
            }
            Some(ret) => convert(self, value, ret, "return value"),
            None => {
                self.infer_return(id, value_ty, span);
                value
            }
        };

        let escape = if ref_return {
            if self.program.is_lvalue(value) {
                check_escape_ref(self.program, value)
            } else {
                Err(Diagnostic::error(ErrorCode::E2004)
                    .with_message("cannot return an rvalue by reference")
                    .with_label(self.program.arena.span(value), "not an lvalue"))
            }
        } else {
            check_escape(self.program, value)
        };
        if let Err(diag) = escape {
            self.report(diag);
        }
        StmtKind::Return(value)
    }

    /// Merge a returned type into the inferred return type.
    fn infer_return(&mut self, id: StmtId, ty: TypeId, span: Span) {
        let Some(ctx) = self.func.as_mut() else {
            return;
        };
        ctx.returns.push(id);
        let merged = match ctx.inferred {
            None => Some(ty),
            Some(prev) => self.program.types.common_type(prev, ty),
        };
        match merged {
            Some(ty) => ctx.inferred = Some(ty),
            None => {
                let prev = ctx.inferred.unwrap_or(TypeId::ERROR);
                self.mismatch(span, prev, ty, "return value");
            }
        }
    }

    /// `foreach` over an array or associative array. Returns the resolved
    /// aggregate; the loop variables are typed and declared.
    fn resolve_foreach(&mut self, key: VarId, value: VarId, aggregate: ExprId) -> ExprId {
        let aggregate = resolve_rvalue(self, aggregate);
        let agg_ty = self.program.arena.ty(aggregate);
        let (key_ty, value_ty) = if self.program.types.is_assoc_array(agg_ty) {
            match self.program.types.base_kind(agg_ty) {
                TypeKind::AssocArray { key, value } => (*key, *value),
                _ => (TypeId::ERROR, TypeId::ERROR),
            }
        } else if self.program.types.is_array(agg_ty) {
            let elem = self.program.types.elem(agg_ty).unwrap_or(TypeId::ERROR);
            (TypeId::SIZE_T, elem)
        } else {
            if !self.program.types.is_error(agg_ty) {
                let diag = Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!("cannot iterate over `{}`", self.program.type_name(agg_ty)))
                    .with_label(self.program.arena.span(aggregate), "not an array");
                self.report(diag);
            }
            (TypeId::ERROR, TypeId::ERROR)
        };
        if key.is_valid() {
            self.type_loop_var(key, key_ty);
        }
        self.type_loop_var(value, value_ty);
        aggregate
    }

    fn resolve_foreach_range(&mut self, var: VarId, lower: ExprId, upper: ExprId) -> (ExprId, ExprId) {
        let lower = resolve_rvalue(self, lower);
        let upper = resolve_rvalue(self, upper);
        let (lt, ut) = (self.program.arena.ty(lower), self.program.arena.ty(upper));
        let common = match self.program.types.arithmetic_common(lt, ut) {
            Some(t) if self.program.types.is_integral(t) => t,
            _ => {
                if !self.program.types.is_error(lt) && !self.program.types.is_error(ut) {
                    let diag = Diagnostic::error(ErrorCode::E2011)
                        .with_message(format!(
                            "range bounds `{}` and `{}` are not integers",
                            self.program.type_name(lt),
                            self.program.type_name(ut)
                        ))
                        .with_label(self.program.arena.span(lower).merge(self.program.arena.span(upper)), "in this range");
                    self.report(diag);
                }
                TypeId::ERROR
            }
        };
        self.type_loop_var(var, common);
        let ty = self.program.decls.var(var).ty;
        let lower = convert(self, lower, ty, "range bound");
        let upper = convert(self, upper, ty, "range bound");
        (lower, upper)
    }

    /// Give an inferred loop variable `ty`, or check a declared one against it.
    fn type_loop_var(&mut self, var: VarId, ty: TypeId) {
        let decl = self.program.decls.var(var);
        let (declared, storage, span) = (decl.ty, decl.storage, decl.span);
        if declared == TypeId::ERROR && storage.contains(StorageClass::AUTO) {
            self.program.decls.var_mut(var).ty = ty;
        } else {
            let declared = self.resolve_type(declared, span);
            self.program.decls.var_mut(var).ty = declared;
            let level = if storage.contains(StorageClass::REF) {
                if self.program.types.strip(declared) == self.program.types.strip(ty) {
                    MatchLevel::Exact
                } else {
                    MatchLevel::NoMatch
                }
            } else {
                self.program.types.implicit_conv_to(ty, declared)
            };
            if level == MatchLevel::NoMatch {
                self.mismatch(span, declared, ty, "loop variable");
            }
        }
        self.declare_local(var);
    }

    fn resolve_switch(&mut self, cond: ExprId, cases: CaseRange) -> StmtKind {
        let cond = resolve_rvalue(self, cond);
        let cond_ty = self.program.arena.ty(cond);
        let switchable = self.program.types.is_integral(cond_ty)
            || self.program.types.string_width(cond_ty).is_some()
            || self.program.types.is_error(cond_ty);
        if !switchable {
            let diag = Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "cannot switch on a value of type `{}`",
                    self.program.type_name(cond_ty)
                ))
                .with_label(self.program.arena.span(cond), "expected an integer or a string");
            self.report(diag);
        }

        let old_cases = self.program.arena.cases(cases).to_vec();
        let mut seen = FxHashSet::default();
        let mut defaults = 0usize;
        let new_cases = self.with_breakable(false, |this| {
            this.with_block_scope(|this| {
                let mut out = Vec::with_capacity(old_cases.len());
                for case in old_cases {
                    let mut values = Vec::new();
                    for value in this.program.arena.list_vec(case.values) {
                        let value = resolve_rvalue(this, value);
                        let value = convert(this, value, cond_ty, "case label");
                        let value = match this.evaluate(value) {
                            Ok(lit) => lit,
                            Err(_) => this.program.error_expr(this.program.arena.span(value)),
                        };
                        let kind = this.program.arena.kind(value);
                        if kind != ExprKind::Error && !seen.insert(kind) {
                            let diag = Diagnostic::error(ErrorCode::E2012)
                                .with_message(format!("duplicate case `{}`", this.program.expr_to_string(value)))
                                .with_label(case.span, "already handled above");
                            this.report(diag);
                        }
                        values.push(value);
                    }
                    if case.is_default {
                        defaults += 1;
                        if defaults > 1 {
                            let diag = Diagnostic::error(ErrorCode::E2012)
                                .with_message("switch has more than one `default`")
                                .with_label(case.span, "second default");
                            this.report(diag);
                        }
                    }
                    for stmt in this.program.arena.stmt_list(case.body).to_vec() {
                        this.resolve_stmt(stmt);
                    }
                    let values = this.program.arena.alloc_list(values);
                    out.push(SwitchCase { values, ..case });
                }
                out
            })
        });
        let cases = self.program.arena.alloc_cases(new_cases);
        StmtKind::Switch { cond, cases }
    }
}
