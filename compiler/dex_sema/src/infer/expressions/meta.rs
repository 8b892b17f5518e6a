//! Compile-time introspection and code generation forms.

use std::path::{Component, Path};

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_fold::fold_condition;
use dex_ir::{
    CharWidth, DefaultInitKind, ExprId, ExprKind, ExprRange, IsRelation, IsSpec, MatchLevel, Name, Span, Symbol,
    Truth, TypeId,
};

use crate::checker::Resolver;
use crate::infer::{any_error, finish, poisoned, resolve_expr, resolve_rvalue, to_boolean};

/// `__FILE__`, `__LINE__`, `__MODULE__`, `__FUNCTION__` and
/// `__PRETTY_FUNCTION__` at `span`.
pub(crate) fn resolve_default_init(r: &mut Resolver<'_>, kind: DefaultInitKind, span: Span) -> ExprId {
    let text = match kind {
        DefaultInitKind::Line => {
            let line = r.program.module.lines.line(span.start);
            return r.program.int_lit(u64::from(line), TypeId::INT, span);
        }
        DefaultInitKind::File => r.program.text(r.program.module.file).to_string(),
        DefaultInitKind::Module => r.program.text(r.program.module.name).to_string(),
        DefaultInitKind::Function => r
            .func
            .as_ref()
            .map_or_else(String::new, |ctx| r.program.func_path(ctx.func)),
        DefaultInitKind::PrettyFunction => r
            .func
            .as_ref()
            .map_or_else(String::new, |ctx| r.program.func_to_string(ctx.func)),
    };
    r.program
        .string_lit(&text, CharWidth::One, true, TypeId::STRING, span)
}

/// `typeid(T)` and `typeid(expr)`; both describe a static type.
pub(crate) fn resolve_typeid(r: &mut Resolver<'_>, id: ExprId, operand: ExprId) -> ExprId {
    let operand = resolve_expr(r, operand);
    if any_error(r, &[operand]) {
        return poisoned(r, id);
    }
    let ty = match r.program.arena.kind(operand) {
        ExprKind::TypeExpr(ty) => ty,
        _ => r.program.arena.ty(operand),
    };
    let span = r.program.arena.span(operand);
    let described = r.program.arena.alloc_typed(ExprKind::TypeExpr(ty), span, ty);
    finish(r, id, ExprKind::Typeid(described), TypeId::TYPEINFO)
}

/// `__traits(name, args...)`, folded to a literal.
pub(crate) fn resolve_traits(r: &mut Resolver<'_>, id: ExprId, name: Name, args: ExprRange) -> ExprId {
    let span = r.program.arena.span(id);
    let trait_name = r.program.text(name);
    let args = r.program.arena.list_vec(args);

    let predicate: Option<fn(&dex_ir::TypePool, TypeId) -> bool> = match trait_name {
        "isArithmetic" => Some(|t, ty| t.is_scalar(ty) && !t.is_bool(ty)),
        "isIntegral" => Some(|t, ty| t.is_integral(ty) && !t.is_bool(ty)),
        "isFloating" => Some(|t, ty| t.is_floating(ty) || t.is_complex(ty)),
        "isScalar" => Some(|t, ty| t.is_scalar(ty) || t.is_pointer(ty)),
        "isUnsigned" => Some(|t, ty| t.is_unsigned(ty)),
        "isStaticArray" => Some(|t, ty| t.is_static_array(ty)),
        "isAssociativeArray" => Some(|t, ty| t.is_assoc_array(ty)),
        _ => None,
    };
    if let Some(predicate) = predicate {
        let mut all = !args.is_empty();
        for arg in args {
            match trait_operand_type(r, arg) {
                Some(ty) => all &= predicate(&r.program.types, ty),
                None => return poisoned(r, id),
            }
        }
        return r.program.bool_lit(all, span);
    }

    match (trait_name, args.as_slice()) {
        ("hasMember", [target, member]) => {
            let Some(ty) = trait_operand_type(r, *target) else {
                return poisoned(r, id);
            };
            let Some(member) = string_argument(r, *member, "__traits(hasMember)") else {
                return poisoned(r, id);
            };
            let member = r.program.intern(member);
            let found = match r.program.types.aggregate(ty) {
                Some((_, agg)) => {
                    r.resolve_aggregate(agg);
                    r.program.decls.find_field(agg, member).is_some()
                        || !r.program.decls.find_methods(agg, member).is_empty()
                }
                None => false,
            };
            r.program.bool_lit(found, span)
        }
        ("identifier", [symbol]) => {
            let text = match r.program.arena.kind(*symbol) {
                ExprKind::Ident(name) => r.program.text(name).to_string(),
                _ => {
                    let resolved = resolve_expr(r, *symbol);
                    match r.program.arena.kind(resolved) {
                        ExprKind::Var(var) => r.program.text(r.program.decls.var(var).name).to_string(),
                        ExprKind::Func { func, .. } => r.program.text(r.program.decls.func(func).name).to_string(),
                        ExprKind::Error => return poisoned(r, id),
                        _ => r.program.expr_to_string(resolved),
                    }
                }
            };
            r.program
                .string_lit(&text, CharWidth::One, true, TypeId::STRING, span)
        }
        _ => {
            let diag = Diagnostic::error(ErrorCode::E2016)
                .with_message(format!(
                    "unsupported trait `{trait_name}` with {} argument(s)",
                    args.len()
                ))
                .with_label(span, "unknown trait");
            r.error_node(diag, span)
        }
    }
}

/// The type a `__traits` argument names, or the type of the value it is.
fn trait_operand_type(r: &mut Resolver<'_>, arg: ExprId) -> Option<TypeId> {
    let resolved = resolve_expr(r, arg);
    if any_error(r, &[resolved]) {
        return None;
    }
    Some(match r.program.arena.kind(resolved) {
        ExprKind::TypeExpr(ty) => ty,
        _ => r.program.arena.ty(resolved),
    })
}

/// The compile-time string value of `arg`.
fn string_argument(r: &mut Resolver<'_>, arg: ExprId, context: &str) -> Option<&'static str> {
    let value = resolve_rvalue(r, arg);
    if any_error(r, &[value]) {
        return None;
    }
    let literal = r.evaluate(value).ok()?;
    if let Some((text, _)) = r.program.string_of(literal) {
        return Some(text);
    }
    let span = r.program.arena.span(arg);
    let ty = r.program.arena.ty(value);
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message(format!(
            "argument to {context} must be a string, not `{}`",
            r.program.type_name(ty)
        ))
        .with_label(span, "expected a string");
    r.report(diag);
    None
}

/// `is(T)`, `is(T == U)`, `is(T : U)`, `is(T == struct)` and the forms
/// declaring an alias, `is(T Id == U)`.
pub(crate) fn resolve_is_type(
    r: &mut Resolver<'_>,
    id: ExprId,
    target: TypeId,
    capture: Name,
    relation: IsRelation,
    spec: IsSpec,
    params: ExprRange,
) -> ExprId {
    let span = r.program.arena.span(id);
    if !params.is_empty() {
        let diag = Diagnostic::error(ErrorCode::E2016)
            .with_message("template parameter lists in `is(...)` are not supported")
            .with_label(span, "template parameters");
        return r.error_node(diag, span);
    }

    let Ok(ty) = r.lookup_type(target) else {
        return r.program.bool_lit(false, span);
    };
    let matched = match spec {
        IsSpec::None => Some(ty),
        IsSpec::Type(other) => r.lookup_type(other).ok().and_then(|other| {
            let holds = match relation {
                IsRelation::Equals => ty == other,
                IsRelation::Converts => r.program.types.implicit_conv_to(ty, other) != MatchLevel::NoMatch,
                IsRelation::Exists => true,
            };
            holds.then_some(other)
        }),
        IsSpec::Struct => r.program.types.is_struct(ty).then_some(ty),
        IsSpec::Class => r.program.types.is_class(ty).then_some(ty),
        IsSpec::Function => r.program.types.is_function(ty).then_some(ty),
        IsSpec::Pointer => r.program.types.is_pointer(ty).then_some(ty),
    };
    if let (Some(alias), false) = (matched, capture.is_empty()) {
        tracing::trace!(name = r.program.text(capture), ty = %r.program.type_name(alias), "is() alias");
        // A name already visible in this scope keeps its meaning.
        let _ = r.scope.declare(capture, Symbol::Type(alias));
    }
    r.program.bool_lit(matched.is_some(), span)
}

/// `mixin(str)`: the string is parsed as an expression and resolved in
/// place.
pub(crate) fn resolve_mixin(r: &mut Resolver<'_>, id: ExprId, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let Some(text) = string_argument(r, operand, "`mixin`") else {
        return poisoned(r, id);
    };
    let Some(parser) = r.mixin.as_mut() else {
        let diag = Diagnostic::error(ErrorCode::E2016)
            .with_message("`mixin` expressions need a parser and none is configured")
            .with_label(span, "cannot expand");
        return r.error_node(diag, span);
    };
    match parser.parse_expression(r.program, text, span) {
        Ok(expr) => {
            tracing::debug!(text, "mixin expanded");
            resolve_expr(r, expr)
        }
        Err(diags) => {
            if diags.is_empty() {
                let diag = Diagnostic::error(ErrorCode::E2016)
                    .with_message(format!("`{text}` is not a valid expression"))
                    .with_label(span, "in this mixin");
                return r.error_node(diag, span);
            }
            for diag in diags {
                r.report(diag);
            }
            r.program.error_expr(span)
        }
    }
}

/// `import("file")`: the contents of a file found under a string import
/// path, as a string literal.
pub(crate) fn resolve_import(r: &mut Resolver<'_>, id: ExprId, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let Some(name) = string_argument(r, operand, "`import`") else {
        return poisoned(r, id);
    };
    let import_error = |message: String| {
        Diagnostic::error(ErrorCode::E2017)
            .with_message(message)
            .with_label(span, "string import")
    };
    if r.config.string_import_paths.is_empty() {
        let diag = import_error(format!("cannot import `{name}`: no string import paths are configured"))
            .with_note("pass a directory with `-J`");
        return r.error_node(diag, span);
    }
    let path = Path::new(name);
    let escapes = path.is_absolute() || path.components().any(|c| matches!(c, Component::ParentDir));
    if escapes {
        let diag = import_error(format!("`{name}` must be a path relative to a string import path"));
        return r.error_node(diag, span);
    }
    for dir in &r.config.string_import_paths {
        let full = dir.join(path);
        if let Ok(contents) = std::fs::read_to_string(&full) {
            tracing::debug!(path = %full.display(), bytes = contents.len(), "string import");
            return r
                .program
                .string_lit(&contents, CharWidth::One, true, TypeId::STRING, span);
        }
    }
    let diag = import_error(format!("file `{name}` was not found in the string import paths"));
    r.error_node(diag, span)
}

/// `assert(cond, msg)`. A condition known to be false with no message is
/// an unconditional halt.
pub(crate) fn resolve_assert(r: &mut Resolver<'_>, id: ExprId, cond: ExprId, msg: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let cond = resolve_rvalue(r, cond);
    let cond = to_boolean(r, cond);
    let msg = resolve_rvalue(r, msg);
    if any_error(r, &[cond, msg]) {
        return poisoned(r, id);
    }
    if msg.is_valid() {
        let msg_ty = r.program.arena.ty(msg);
        if r.program.types.string_width(msg_ty).is_none() {
            let diag = Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "assert message must be a string, not `{}`",
                    r.program.type_name(msg_ty)
                ))
                .with_label(r.program.arena.span(msg), "expected a string");
            return r.error_node(diag, span);
        }
    }
    if !msg.is_valid() && !r.program.has_side_effects(cond) {
        if let (_, Truth::False) = fold_condition(r.program, cond) {
            return finish(r, id, ExprKind::Halt, TypeId::VOID);
        }
    }
    finish(r, id, ExprKind::Assert { cond, msg }, TypeId::VOID)
}
