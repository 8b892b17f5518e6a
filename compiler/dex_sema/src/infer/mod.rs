//! Resolution of expressions.
//!
//! Every handler takes the raw node, resolves its children and allocates a
//! typed replacement; the raw node is left untouched in the arena.
//!
//! - `conversion`: implicit conversions, boolean conditions and `alias this`
//! - `call`: calls, overload selection, construction and `new`
//! - `expressions`: literals, identifiers, member access, operators and
//!   the introspection forms

mod call;
mod conversion;
mod expressions;

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{ExprId, ExprKind, TypeId};
use dex_stack::ensure_sufficient_stack;

use crate::checker::Resolver;

pub(crate) use call::{build_call, resolve_call, select_overload};
pub(crate) use conversion::{conv_level, convert, to_boolean, with_alias_this};

/// Resolve `id`, returning the typed node that replaces it.
///
/// Already-typed nodes come back unchanged, so a subtree may be passed
/// through twice.
#[tracing::instrument(level = "trace", skip_all)]
pub(crate) fn resolve_expr(r: &mut Resolver<'_>, id: ExprId) -> ExprId {
    if !id.is_valid() || r.program.arena.expr(id).ty.is_some() {
        return id;
    }
    ensure_sufficient_stack(|| resolve_expr_inner(r, id))
}

fn resolve_expr_inner(r: &mut Resolver<'_>, id: ExprId) -> ExprId {
    let expr = *r.program.arena.expr(id);
    let span = expr.span;
    match expr.kind {
        ExprKind::Error => finish(r, id, ExprKind::Error, TypeId::ERROR),
        ExprKind::Int(_)
        | ExprKind::Real(_)
        | ExprKind::Complex { .. }
        | ExprKind::String { .. }
        | ExprKind::Null
        | ExprKind::ArrayLiteral(_)
        | ExprKind::AssocArrayLiteral { .. }
        | ExprKind::StructLiteral { .. }
        | ExprKind::Tuple { .. } => expressions::resolve_literal(r, id, expr.kind),

        ExprKind::Ident(name) => expressions::resolve_ident(r, id, name),
        ExprKind::Dollar => expressions::resolve_dollar(r, id),
        ExprKind::Var(_)
        | ExprKind::Func { .. }
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::SymOff { .. }
        | ExprKind::OverloadSet(_)
        | ExprKind::FuncLiteral(_)
        | ExprKind::TypeExpr(_)
        | ExprKind::ScopeExpr(_)
        | ExprKind::TemplateExpr(_) => expressions::resolve_symbol(r, id, expr.kind),

        ExprKind::AddrOf(operand) => expressions::resolve_addr_of(r, id, operand),
        ExprKind::Deref(operand) => expressions::resolve_deref(r, id, operand),
        ExprKind::Unary { op, operand } => expressions::resolve_unary(r, id, op, operand),
        ExprKind::PreIncDec { op, operand } => expressions::resolve_pre_inc_dec(r, id, op, operand),
        ExprKind::PostIncDec { op, operand } => expressions::resolve_post_inc_dec(r, id, op, operand),
        ExprKind::BoolCast(operand) => {
            let value = resolve_rvalue(r, operand);
            to_boolean(r, value)
        }
        ExprKind::Cast { operand, to } => expressions::resolve_cast(r, id, operand, to),
        ExprKind::Vector { .. } => unsupported(r, id, "vector types are not supported"),
        ExprKind::Slice { base, lower, upper } => expressions::resolve_slice(r, id, base, lower, upper),
        ExprKind::ArrayLength(base) => {
            let base = resolve_rvalue(r, base);
            finish(r, id, ExprKind::ArrayLength(base), TypeId::SIZE_T)
        }
        ExprKind::Index { base, index } => expressions::resolve_index(r, id, base, index),
        ExprKind::MultiIndex { base, indices } => expressions::resolve_multi_index(r, id, base, indices),
        ExprKind::Call { callee, args } => resolve_call(r, id, callee, args),
        ExprKind::Delete(operand) => expressions::resolve_delete(r, id, operand),
        ExprKind::Mixin(operand) => expressions::resolve_mixin(r, id, operand),
        ExprKind::Import(operand) => expressions::resolve_import(r, id, operand),
        ExprKind::Assert { cond, msg } => expressions::resolve_assert(r, id, cond, msg),
        ExprKind::DotId { base, member } => expressions::resolve_dot_id(r, id, base, member),
        ExprKind::DotVar { base, var } => {
            let base = resolve_expr(r, base);
            let ty = r.program.decls.var(var).ty;
            finish(r, id, ExprKind::DotVar { base, var }, ty)
        }
        ExprKind::DotFunc { base, func } => {
            let base = resolve_expr(r, base);
            let ty = r.func_type(func, span);
            finish(r, id, ExprKind::DotFunc { base, func }, ty)
        }
        ExprKind::DotTemplate { .. } => unsupported(r, id, "templates cannot be instantiated here"),
        ExprKind::New { ty, args } => call::resolve_new(r, id, ty, args),
        ExprKind::NewAnonClass { agg, args } => call::resolve_new_anon_class(r, id, agg, args),

        ExprKind::Binary { op, left, right } => expressions::resolve_binary(r, id, op, left, right),
        ExprKind::Comma { left, right } => {
            let left = resolve_expr(r, left);
            let right = resolve_expr(r, right);
            let ty = r.program.arena.ty(right);
            finish(r, id, ExprKind::Comma { left, right }, ty)
        }
        ExprKind::Dot { left, right } => {
            let left = resolve_expr(r, left);
            let right = resolve_expr(r, right);
            let ty = r.program.arena.ty(right);
            finish(r, id, ExprKind::Dot { left, right }, ty)
        }
        ExprKind::Cond {
            cond,
            then_expr,
            else_expr,
        } => expressions::resolve_cond(r, id, cond, then_expr, else_expr),
        ExprKind::Assign { op, target, value } => expressions::resolve_assign(r, id, op, target, value),
        ExprKind::Remove { aa, key } => expressions::resolve_remove(r, id, aa, key),

        ExprKind::DefaultInit(kind) => expressions::resolve_default_init(r, kind, span),
        ExprKind::Typeid(operand) => expressions::resolve_typeid(r, id, operand),
        ExprKind::Traits { name, args } => expressions::resolve_traits(r, id, name, args),
        ExprKind::IsType {
            target,
            id: capture,
            relation,
            spec,
            params,
        } => expressions::resolve_is_type(r, id, target, capture, relation, spec, params),
        ExprKind::Declaration(var) => {
            r.resolve_var_decl(var);
            r.declare_local(var);
            let ty = r.program.decls.var(var).ty;
            finish(r, id, ExprKind::Declaration(var), ty)
        }
        ExprKind::Halt => finish(r, id, ExprKind::Halt, TypeId::VOID),
    }
}

/// Resolve `id` where a value is required: types, modules and templates
/// are rejected.
pub(crate) fn resolve_rvalue(r: &mut Resolver<'_>, id: ExprId) -> ExprId {
    let resolved = resolve_expr(r, id);
    if !resolved.is_valid() {
        return resolved;
    }
    let what = match r.program.arena.kind(resolved) {
        ExprKind::TypeExpr(ty) => format!("type `{}`", r.program.type_name(ty)),
        ExprKind::ScopeExpr(name) => format!("module `{}`", r.program.text(name)),
        ExprKind::TemplateExpr(template) => {
            format!("template `{}`", r.program.text(r.program.decls.template(template).name))
        }
        _ => return resolved,
    };
    let span = r.program.arena.span(resolved);
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("{what} is not a value"))
        .with_label(span, "a value is required here");
    r.error_node(diag, span)
}

/// Allocate the typed replacement of `id`, keeping its span and parentheses.
pub(crate) fn finish(r: &mut Resolver<'_>, id: ExprId, kind: ExprKind, ty: TypeId) -> ExprId {
    let mut expr = *r.program.arena.expr(id);
    expr.kind = kind;
    expr.ty = Some(ty);
    r.program.arena.alloc(expr)
}

/// An error node for `id` without a new diagnostic: an operand already
/// failed and was reported.
pub(crate) fn poisoned(r: &mut Resolver<'_>, id: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    r.program.error_expr(span)
}

/// Whether any of `ids` is an error-typed node.
pub(crate) fn any_error(r: &Resolver<'_>, ids: &[ExprId]) -> bool {
    ids.iter()
        .any(|&e| e.is_valid() && r.program.types.is_error(r.program.arena.ty(e)))
}

fn unsupported(r: &mut Resolver<'_>, id: ExprId, message: &str) -> ExprId {
    let span = r.program.arena.span(id);
    let diag = Diagnostic::error(ErrorCode::E2016)
        .with_message(message.to_string())
        .with_label(span, "not supported here");
    r.error_node(diag, span)
}
