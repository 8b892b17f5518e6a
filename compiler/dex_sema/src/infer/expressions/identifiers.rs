use dex_diagnostic::{undefined_identifier, Diagnostic, ErrorCode};
use dex_ir::{ExprId, ExprKind, FuncAttrs, Name, Span, Symbol, TypeId, VarId};

use crate::checker::Resolver;
use crate::infer::finish;
use crate::scope::{Binding, Candidates};
use crate::suggest::suggest_identifier;

pub(crate) fn resolve_ident(r: &mut Resolver<'_>, id: ExprId, name: Name) -> ExprId {
    let span = r.program.arena.span(id);
    match r.scope.lookup(r.program, name) {
        Candidates::None => undefined(r, name, span),
        Candidates::Many { funcs, .. } => {
            let diag = Diagnostic::error(ErrorCode::E2002)
                .with_message(format!(
                    "`{}` refers to {} overloads and cannot be used as a value",
                    r.program.text(name),
                    funcs.len()
                ))
                .with_label(span, "ambiguous reference")
                .with_note("call it, or take the address of a single overload");
            r.error_node(diag, span)
        }
        Candidates::One(Binding::Symbol(sym)) => symbol_expr(r, id, sym),
        Candidates::One(Binding::Field(var)) => {
            let Some(this) = implicit_this(r, span) else {
                return needs_instance(r, name, span);
            };
            let field_ty = r.program.decls.var(var).ty;
            let ty = member_type(r, this, field_ty);
            finish(r, id, ExprKind::DotVar { base: this, var }, ty)
        }
        Candidates::One(Binding::Method(func)) => {
            let Some(this) = implicit_this(r, span) else {
                return needs_instance(r, name, span);
            };
            let ty = r.func_type(func, span);
            finish(r, id, ExprKind::DotFunc { base: this, func }, ty)
        }
    }
}

/// The node a name bound to `sym` resolves to.
pub(crate) fn symbol_expr(r: &mut Resolver<'_>, id: ExprId, sym: Symbol) -> ExprId {
    let span = r.program.arena.span(id);
    match sym {
        Symbol::Var(var) => var_ref(r, id, var),
        Symbol::Func(func) => {
            r.check_deprecated(func, span);
            let ty = r.func_type(func, span);
            finish(
                r,
                id,
                ExprKind::Func {
                    func,
                    has_overloads: false,
                },
                ty,
            )
        }
        Symbol::Overloads(set) => finish(r, id, ExprKind::OverloadSet(set), TypeId::VOID),
        Symbol::Agg(agg) => {
            r.resolve_aggregate(agg);
            let ty = r.program.decls.agg(agg).ty;
            finish(r, id, ExprKind::TypeExpr(ty), ty)
        }
        Symbol::Type(ty) => {
            let ty = r.resolve_type(ty, span);
            finish(r, id, ExprKind::TypeExpr(ty), ty)
        }
        Symbol::Template(template) => finish(r, id, ExprKind::TemplateExpr(template), TypeId::VOID),
        Symbol::Module(name) => finish(r, id, ExprKind::ScopeExpr(name), TypeId::VOID),
    }
}

fn var_ref(r: &mut Resolver<'_>, id: ExprId, var: VarId) -> ExprId {
    let span = r.program.arena.span(id);
    if r.program.decls.var(var).is_global() {
        if !r.resolve_global(var) {
            return r.program.error_expr(span);
        }
        r.check_global_access(var, span);
    }
    let ty = r.program.decls.var(var).ty;
    finish(r, id, ExprKind::Var(var), ty)
}

/// Nodes the parser or a rewrite already bound to a declaration.
pub(crate) fn resolve_symbol(r: &mut Resolver<'_>, id: ExprId, kind: ExprKind) -> ExprId {
    let span = r.program.arena.span(id);
    match kind {
        ExprKind::Var(var) => var_ref(r, id, var),
        ExprKind::Func { func, .. } => {
            let ty = r.func_type(func, span);
            finish(r, id, kind, ty)
        }
        ExprKind::FuncLiteral(func) => {
            r.resolve_function(func);
            let ty = r.func_type(func, span);
            finish(r, id, kind, ty)
        }
        ExprKind::SymOff { var, .. } => {
            if !r.resolve_global(var) {
                return r.program.error_expr(span);
            }
            let ty = r.program.decls.var(var).ty;
            let ty = r.program.types.pointer(ty);
            finish(r, id, kind, ty)
        }
        ExprKind::This => match implicit_this(r, span) {
            Some(this) => this,
            None => {
                let diag = Diagnostic::error(ErrorCode::E2003)
                    .with_message("`this` is only available inside a non-static member function")
                    .with_label(span, "no enclosing instance");
                r.error_node(diag, span)
            }
        },
        ExprKind::Super => {
            let diag = Diagnostic::error(ErrorCode::E2016)
                .with_message("`super` is not supported")
                .with_label(span, "base classes are not modelled");
            r.error_node(diag, span)
        }
        ExprKind::TypeExpr(ty) => {
            let ty = r.resolve_type(ty, span);
            finish(r, id, ExprKind::TypeExpr(ty), ty)
        }
        _ => finish(r, id, kind, TypeId::VOID),
    }
}

/// `$` inside `a[...]`: the length of the innermost indexed array.
pub(crate) fn resolve_dollar(r: &mut Resolver<'_>, id: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let Some(&base) = r.dollar.last() else {
        let diag = Diagnostic::error(ErrorCode::E2001)
            .with_message("`$` is only valid inside an index or slice")
            .with_label(span, "outside of brackets");
        return r.error_node(diag, span);
    };
    let base_ty = r.program.arena.ty(base);
    if let Some(len) = r.program.types.static_len(base_ty) {
        return r.program.int_lit(len, TypeId::SIZE_T, span);
    }
    finish(r, id, ExprKind::ArrayLength(base), TypeId::SIZE_T)
}

/// `this` of the enclosing non-static member function.
pub(crate) fn implicit_this(r: &mut Resolver<'_>, span: Span) -> Option<ExprId> {
    let ctx = r.func.as_ref()?;
    if ctx.attrs.contains(FuncAttrs::STATIC) {
        return None;
    }
    let ty = r.program.decls.agg(ctx.parent?).ty;
    Some(r.program.arena.alloc_typed(ExprKind::This, span, ty))
}

/// E2001 for `name`, with the closest visible name as a hint.
pub(crate) fn undefined(r: &mut Resolver<'_>, name: Name, span: Span) -> ExprId {
    let mut diag = undefined_identifier(span, r.program.text(name));
    if let Some(similar) = suggest_identifier(r.program, &r.scope, name) {
        diag = diag.with_note(format!("did you mean `{similar}`?"));
    }
    r.error_node(diag, span)
}

fn needs_instance(r: &mut Resolver<'_>, name: Name, span: Span) -> ExprId {
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("`{}` needs an instance to be accessed", r.program.text(name)))
        .with_label(span, "no `this` here");
    r.error_node(diag, span)
}

/// Type of a member accessed through `base`: the base's qualifier
/// carries over.
pub(crate) fn member_type(r: &mut Resolver<'_>, base: ExprId, member_ty: TypeId) -> TypeId {
    let base_ty = r.program.arena.ty(base);
    let qual = r.program.types.qualifier(base_ty);
    r.program.types.qualify(member_ty, qual)
}
