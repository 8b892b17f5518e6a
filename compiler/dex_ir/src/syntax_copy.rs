//! Structurally independent copies of expression trees.
//!
//! A copy shares no mutable node with its source: every expression,
//! statement and embedded declaration (declaration expressions, function
//! literal parameters and bodies) is duplicated, and references to copied
//! variables are redirected to the duplicates. Types are cleared except on
//! scalar literals, whose type is lexical, so the copy can be resolved
//! afresh in another scope.

use rustc_hash::FxHashMap;

use crate::decl::{FuncId, SemaState, VarId};
use crate::expr::{Expr, ExprId, ExprKind, ExprRange};
use crate::stmt::{StmtId, StmtKind, SwitchCase};
use crate::Program;

#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum SyntaxCopyError {
    /// A required child is missing; the tree is malformed.
    #[error("{kind} node is missing a required operand")]
    InvalidChild { kind: &'static str },
    /// Error nodes stand for failed analysis and have no syntax to copy.
    #[error("cannot copy an error expression")]
    ErrorNode,
}

type CopyResult<T> = Result<T, SyntaxCopyError>;

struct Copier<'p> {
    program: &'p mut Program,
    vars: FxHashMap<VarId, VarId>,
}

impl Copier<'_> {
    fn var(&self, var: VarId) -> VarId {
        self.vars.get(&var).copied().unwrap_or(var)
    }

    fn copy_var(&mut self, var: VarId) -> CopyResult<VarId> {
        if !var.is_valid() {
            return Ok(var);
        }
        let mut decl = self.program.decls.var(var).clone();
        decl.init = self.opt(decl.init)?;
        let copy = self.program.decls.add_var(decl);
        self.vars.insert(var, copy);
        Ok(copy)
    }

    fn copy_func(&mut self, func: FuncId) -> CopyResult<FuncId> {
        let mut decl = self.program.decls.func(func).clone();
        decl.params = decl
            .params
            .iter()
            .map(|&p| self.copy_var(p))
            .collect::<CopyResult<Vec<_>>>()?;
        decl.body = self.stmt(decl.body)?;
        decl.state = SemaState::Pending;
        Ok(self.program.decls.add_func(decl))
    }

    fn required(&mut self, id: ExprId, kind: &'static str) -> CopyResult<ExprId> {
        if !id.is_valid() {
            return Err(SyntaxCopyError::InvalidChild { kind });
        }
        self.expr(id)
    }

    fn opt(&mut self, id: ExprId) -> CopyResult<ExprId> {
        if id.is_valid() {
            self.expr(id)
        } else {
            Ok(id)
        }
    }

    fn list(&mut self, range: ExprRange) -> CopyResult<ExprRange> {
        let ids = self.program.arena.list_vec(range);
        let copies = ids.into_iter().map(|e| self.opt(e)).collect::<CopyResult<Vec<_>>>()?;
        Ok(self.program.arena.alloc_list(copies))
    }

    fn expr(&mut self, id: ExprId) -> CopyResult<ExprId> {
        let source = *self.program.arena.expr(id);
        let name = source.kind.name();
        let kind = match source.kind {
            ExprKind::Error => return Err(SyntaxCopyError::ErrorNode),
            ExprKind::Int(_)
            | ExprKind::Real(_)
            | ExprKind::Complex { .. }
            | ExprKind::String { .. }
            | ExprKind::Null
            | ExprKind::Ident(_)
            | ExprKind::Dollar
            | ExprKind::Func { .. }
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::OverloadSet(_)
            | ExprKind::TypeExpr(_)
            | ExprKind::ScopeExpr(_)
            | ExprKind::TemplateExpr(_)
            | ExprKind::DefaultInit(_)
            | ExprKind::Halt => source.kind,
            ExprKind::Var(var) => ExprKind::Var(self.var(var)),
            ExprKind::SymOff { var, offset } => ExprKind::SymOff {
                var: self.var(var),
                offset,
            },
            ExprKind::FuncLiteral(func) => ExprKind::FuncLiteral(self.copy_func(func)?),
            ExprKind::ArrayLiteral(elems) => ExprKind::ArrayLiteral(self.list(elems)?),
            ExprKind::AssocArrayLiteral { keys, values } => ExprKind::AssocArrayLiteral {
                keys: self.list(keys)?,
                values: self.list(values)?,
            },
            ExprKind::StructLiteral { agg, elements } => ExprKind::StructLiteral {
                agg,
                elements: self.list(elements)?,
            },
            ExprKind::Tuple { prelude, elements } => ExprKind::Tuple {
                prelude: self.opt(prelude)?,
                elements: self.list(elements)?,
            },
            ExprKind::AddrOf(e) => ExprKind::AddrOf(self.required(e, name)?),
            ExprKind::Deref(e) => ExprKind::Deref(self.required(e, name)?),
            ExprKind::BoolCast(e) => ExprKind::BoolCast(self.required(e, name)?),
            ExprKind::ArrayLength(e) => ExprKind::ArrayLength(self.required(e, name)?),
            ExprKind::Delete(e) => ExprKind::Delete(self.required(e, name)?),
            ExprKind::Mixin(e) => ExprKind::Mixin(self.required(e, name)?),
            ExprKind::Import(e) => ExprKind::Import(self.required(e, name)?),
            ExprKind::Typeid(e) => ExprKind::Typeid(self.required(e, name)?),
            ExprKind::Unary { op, operand } => ExprKind::Unary {
                op,
                operand: self.required(operand, name)?,
            },
            ExprKind::PreIncDec { op, operand } => ExprKind::PreIncDec {
                op,
                operand: self.required(operand, name)?,
            },
            ExprKind::PostIncDec { op, operand } => ExprKind::PostIncDec {
                op,
                operand: self.required(operand, name)?,
            },
            ExprKind::Cast { operand, to } => ExprKind::Cast {
                operand: self.required(operand, name)?,
                to,
            },
            ExprKind::Vector { operand, to } => ExprKind::Vector {
                operand: self.required(operand, name)?,
                to,
            },
            ExprKind::Slice { base, lower, upper } => ExprKind::Slice {
                base: self.required(base, name)?,
                lower: self.opt(lower)?,
                upper: self.opt(upper)?,
            },
            ExprKind::MultiIndex { base, indices } => ExprKind::MultiIndex {
                base: self.required(base, name)?,
                indices: self.list(indices)?,
            },
            ExprKind::Call { callee, args } => ExprKind::Call {
                callee: self.required(callee, name)?,
                args: self.list(args)?,
            },
            ExprKind::Assert { cond, msg } => ExprKind::Assert {
                cond: self.required(cond, name)?,
                msg: self.opt(msg)?,
            },
            ExprKind::DotId { base, member } => ExprKind::DotId {
                base: self.required(base, name)?,
                member,
            },
            ExprKind::DotVar { base, var } => ExprKind::DotVar {
                base: self.required(base, name)?,
                var,
            },
            ExprKind::DotFunc { base, func } => ExprKind::DotFunc {
                base: self.required(base, name)?,
                func,
            },
            ExprKind::DotTemplate { base, template } => ExprKind::DotTemplate {
                base: self.required(base, name)?,
                template,
            },
            ExprKind::New { ty, args } => ExprKind::New {
                ty,
                args: self.list(args)?,
            },
            ExprKind::NewAnonClass { agg, args } => ExprKind::NewAnonClass {
                agg,
                args: self.list(args)?,
            },
            ExprKind::Traits { name: trait_name, args } => ExprKind::Traits {
                name: trait_name,
                args: self.list(args)?,
            },
            ExprKind::IsType {
                target,
                id: capture,
                relation,
                spec,
                params,
            } => ExprKind::IsType {
                target,
                id: capture,
                relation,
                spec,
                params: self.list(params)?,
            },
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op,
                left: self.required(left, name)?,
                right: self.required(right, name)?,
            },
            ExprKind::Comma { left, right } => ExprKind::Comma {
                left: self.required(left, name)?,
                right: self.required(right, name)?,
            },
            ExprKind::Dot { left, right } => ExprKind::Dot {
                left: self.required(left, name)?,
                right: self.required(right, name)?,
            },
            ExprKind::Index { base, index } => ExprKind::Index {
                base: self.required(base, name)?,
                index: self.required(index, name)?,
            },
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => ExprKind::Cond {
                cond: self.required(cond, name)?,
                then_expr: self.required(then_expr, name)?,
                else_expr: self.required(else_expr, name)?,
            },
            ExprKind::Assign { op, target, value } => ExprKind::Assign {
                op,
                target: self.required(target, name)?,
                value: self.required(value, name)?,
            },
            ExprKind::Remove { aa, key } => ExprKind::Remove {
                aa: self.required(aa, name)?,
                key: self.required(key, name)?,
            },
            ExprKind::Declaration(var) => ExprKind::Declaration(self.copy_var(var)?),
        };
        let ty = if source.kind.is_scalar_literal() { source.ty } else { None };
        Ok(self.program.arena.alloc(Expr {
            kind,
            span: source.span,
            ty,
            parens: source.parens,
        }))
    }

    fn stmts(&mut self, ids: &[StmtId]) -> CopyResult<Vec<StmtId>> {
        ids.iter().map(|&s| self.stmt(s)).collect()
    }

    fn stmt(&mut self, id: StmtId) -> CopyResult<StmtId> {
        if !id.is_valid() {
            return Ok(id);
        }
        let source = *self.program.arena.stmt(id);
        let kind = match source.kind {
            StmtKind::Empty | StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Goto(_) => source.kind,
            StmtKind::Expr(e) => StmtKind::Expr(self.expr(e)?),
            StmtKind::Decl(var) => StmtKind::Decl(self.copy_var(var)?),
            StmtKind::Block(list) => {
                let ids = self.program.arena.stmt_list(list).to_vec();
                let copies = self.stmts(&ids)?;
                StmtKind::Block(self.program.arena.alloc_stmt_list(copies))
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => StmtKind::If {
                cond: self.expr(cond)?,
                then_branch: self.stmt(then_branch)?,
                else_branch: self.stmt(else_branch)?,
            },
            StmtKind::StaticIf {
                cond,
                then_branch,
                else_branch,
            } => StmtKind::StaticIf {
                cond: self.expr(cond)?,
                then_branch: self.stmt(then_branch)?,
                else_branch: self.stmt(else_branch)?,
            },
            StmtKind::While { cond, body } => StmtKind::While {
                cond: self.expr(cond)?,
                body: self.stmt(body)?,
            },
            StmtKind::DoWhile { body, cond } => StmtKind::DoWhile {
                body: self.stmt(body)?,
                cond: self.expr(cond)?,
            },
            StmtKind::For { init, cond, step, body } => {
                let init = self.stmt(init)?;
                StmtKind::For {
                    init,
                    cond: self.opt(cond)?,
                    step: self.opt(step)?,
                    body: self.stmt(body)?,
                }
            }
            StmtKind::Foreach {
                key,
                value,
                aggregate,
                body,
            } => {
                let aggregate = self.expr(aggregate)?;
                StmtKind::Foreach {
                    key: self.copy_var(key)?,
                    value: self.copy_var(value)?,
                    aggregate,
                    body: self.stmt(body)?,
                }
            }
            StmtKind::ForeachRange {
                var,
                lower,
                upper,
                body,
            } => {
                let lower = self.expr(lower)?;
                let upper = self.expr(upper)?;
                StmtKind::ForeachRange {
                    var: self.copy_var(var)?,
                    lower,
                    upper,
                    body: self.stmt(body)?,
                }
            }
            StmtKind::Labeled { label, body } => StmtKind::Labeled {
                label,
                body: self.stmt(body)?,
            },
            StmtKind::Return(e) => StmtKind::Return(self.opt(e)?),
            StmtKind::Throw(e) => StmtKind::Throw(self.expr(e)?),
            StmtKind::Switch { cond, cases } => {
                let cond = self.expr(cond)?;
                let sources = self.program.arena.cases(cases).to_vec();
                let mut copies = Vec::with_capacity(sources.len());
                for case in sources {
                    let values = self.list(case.values)?;
                    let body_ids = self.program.arena.stmt_list(case.body).to_vec();
                    let body = self.stmts(&body_ids)?;
                    copies.push(SwitchCase {
                        values,
                        is_default: case.is_default,
                        body: self.program.arena.alloc_stmt_list(body),
                        span: case.span,
                    });
                }
                StmtKind::Switch {
                    cond,
                    cases: self.program.arena.alloc_cases(copies),
                }
            }
            StmtKind::StaticAssert { cond, msg } => StmtKind::StaticAssert {
                cond: self.expr(cond)?,
                msg: self.opt(msg)?,
            },
        };
        Ok(self.program.arena.alloc_stmt(kind, source.span))
    }
}

impl Program {
    /// Copy `id` and everything it owns.
    pub fn syntax_copy(&mut self, id: ExprId) -> Result<ExprId, SyntaxCopyError> {
        Copier {
            program: self,
            vars: FxHashMap::default(),
        }
        .expr(id)
    }

    /// Copy statement `id` and everything it owns.
    pub fn syntax_copy_stmt(&mut self, id: StmtId) -> Result<StmtId, SyntaxCopyError> {
        Copier {
            program: self,
            vars: FxHashMap::default(),
        }
        .stmt(id)
    }
}

#[cfg(test)]
mod tests;
