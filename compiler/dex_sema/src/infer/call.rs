//! Calls, overload selection, construction and `new`.
//!
//! A resolved call is always `Call { callee, args }` with one argument per
//! parameter: omitted trailing arguments are filled from the parameter
//! defaults, `__LINE__` and friends expanded at the call site. The callee
//! is `Func`, `FuncLiteral`, `DotFunc` (a method with its receiver) or any
//! value of function type.
//!
//! Construction shapes the interpreter relies on:
//! - `S(args)` with constructors: a call of the constructor whose receiver
//!   is `S.init`, typed `S`
//! - `S(args)` without: a struct literal, missing fields skipped
//! - `new C(args)`: the constructor called on `New { C, [] }`, typed `C`
//! - `new S(args)`, `new int(v)`: `New { S*, [value] }`
//! - `new T[](n)`: `New { T[], [n] }`

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{
    AggId, AggKind, ExprId, ExprKind, ExprRange, FuncAttrs, FuncId, MatchLevel, Name, Qualifier, Span, Symbol, TypeId,
    TypeKind,
};
use smallvec::SmallVec;

use super::conversion::{conv_level, convert, with_alias_this};
use super::expressions::{implicit_this, resolve_default_init, undefined};
use super::{any_error, poisoned, resolve_expr, resolve_rvalue};
use crate::checker::Resolver;
use crate::scope::{Binding, Candidates};
use crate::suggest::suggest_member;

pub(crate) fn resolve_call(r: &mut Resolver<'_>, id: ExprId, callee: ExprId, args: ExprRange) -> ExprId {
    let span = r.program.arena.span(id);
    match r.program.arena.kind(callee) {
        ExprKind::Ident(name) => {
            let args = resolve_args(r, args);
            call_named(r, callee, name, args, span)
        }
        ExprKind::DotId { base, member } => {
            let base = resolve_expr(r, base);
            let args = resolve_args(r, args);
            call_member(r, base, member, args, span)
        }
        ExprKind::TypeExpr(ty) => {
            let ty = r.resolve_type(ty, r.program.arena.span(callee));
            let args = resolve_args(r, args);
            construct(r, ty, args, span)
        }
        _ => {
            let callee = resolve_expr(r, callee);
            let args = resolve_args(r, args);
            call_value(r, callee, args, span)
        }
    }
}

fn resolve_args(r: &mut Resolver<'_>, args: ExprRange) -> Vec<ExprId> {
    r.program
        .arena
        .list_vec(args)
        .into_iter()
        .map(|arg| resolve_rvalue(r, arg))
        .collect()
}

/// `name(args)`.
fn call_named(r: &mut Resolver<'_>, callee: ExprId, name: Name, args: Vec<ExprId>, span: Span) -> ExprId {
    let callee_span = r.program.arena.span(callee);
    match r.scope.lookup(r.program, name) {
        Candidates::None => undefined(r, name, callee_span),
        Candidates::Many { funcs, member } => {
            let receiver = if member { implicit_this(r, span) } else { None };
            call_overloads(r, &funcs, receiver, args, span, name)
        }
        Candidates::One(Binding::Symbol(Symbol::Func(func))) => call_overloads(r, &[func], None, args, span, name),
        Candidates::One(Binding::Symbol(Symbol::Overloads(set))) => {
            let funcs = r.program.decls.overloads(set).to_vec();
            call_overloads(r, &funcs, None, args, span, name)
        }
        Candidates::One(Binding::Method(func)) => {
            let receiver = implicit_this(r, span);
            call_overloads(r, &[func], receiver, args, span, name)
        }
        Candidates::One(Binding::Symbol(Symbol::Agg(agg))) => {
            r.resolve_aggregate(agg);
            let ty = r.program.decls.agg(agg).ty;
            construct(r, ty, args, span)
        }
        Candidates::One(Binding::Symbol(Symbol::Type(ty))) => construct(r, ty, args, span),
        Candidates::One(Binding::Symbol(Symbol::Var(_)) | Binding::Field(_)) => {
            let callee = resolve_rvalue(r, callee);
            call_value(r, callee, args, span)
        }
        Candidates::One(Binding::Symbol(Symbol::Template(_) | Symbol::Module(_))) => {
            let what = format!("`{}`", r.program.text(name));
            not_callable(r, callee_span, &what)
        }
    }
}

/// `base.member(args)`: a method, `aa.remove(key)`, a field holding a
/// function, the same through `alias this`, then a free function taking
/// `base` as its first argument.
fn call_member(r: &mut Resolver<'_>, base: ExprId, member: Name, args: Vec<ExprId>, span: Span) -> ExprId {
    if any_error(r, &[base]) || any_error(r, &args) {
        return r.program.error_expr(span);
    }
    match r.program.arena.kind(base) {
        ExprKind::TypeExpr(ty) => return call_static(r, ty, member, args, span),
        ExprKind::ScopeExpr(_) => {
            return match r.program.globals.get(&member).copied() {
                Some(Symbol::Func(func)) => call_overloads(r, &[func], None, args, span, member),
                Some(Symbol::Overloads(set)) => {
                    let funcs = r.program.decls.overloads(set).to_vec();
                    call_overloads(r, &funcs, None, args, span, member)
                }
                _ => undefined(r, member, span),
            };
        }
        _ => {}
    }

    if let Some(call) = try_member_call(r, base, member, &args, span) {
        return call;
    }
    let via_alias = with_alias_this(r, base, |r, inner| {
        has_member(r, inner, member).then(|| call_member(r, inner, member, args.clone(), span))
    });
    if let Some(call) = via_alias {
        return call;
    }

    let mut all_args = Vec::with_capacity(args.len() + 1);
    all_args.push(base);
    all_args.extend(args);
    call_ufcs(r, member, all_args, span).unwrap_or_else(|| no_member(r, base, member, span))
}

/// A free function called with member syntax: `base.f(args)` as
/// `f(base, args)`. `args` already starts with `base`.
pub(crate) fn call_ufcs(r: &mut Resolver<'_>, member: Name, args: Vec<ExprId>, span: Span) -> Option<ExprId> {
    let funcs: SmallVec<[FuncId; 4]> = match r.scope.lookup(r.program, member) {
        Candidates::One(Binding::Symbol(Symbol::Func(func))) => SmallVec::from_slice(&[func]),
        Candidates::One(Binding::Symbol(Symbol::Overloads(set))) => {
            r.program.decls.overloads(set).iter().copied().collect()
        }
        Candidates::Many { funcs, member: false } => funcs,
        _ => return None,
    };
    tracing::debug!(name = r.program.text(member), "calling free function with member syntax");
    Some(call_overloads(r, &funcs, None, args, span, member))
}

fn try_member_call(r: &mut Resolver<'_>, base: ExprId, member: Name, args: &[ExprId], span: Span) -> Option<ExprId> {
    let ty = r.program.arena.ty(base);
    if r.program.types.is_assoc_array(ty) && r.program.text(member) == "remove" && args.len() == 1 {
        let TypeKind::AssocArray { key, .. } = r.program.types.base_kind(ty).clone() else {
            return None;
        };
        let key = convert(r, args[0], key, "associative array key");
        return Some(
            r.program
                .arena
                .alloc_typed(ExprKind::Remove { aa: base, key }, span, TypeId::BOOL),
        );
    }

    let receiver = auto_deref(r, base);
    let (_, agg) = r.program.types.aggregate(r.program.arena.ty(receiver))?;
    r.resolve_aggregate(agg);
    let methods = r.program.decls.find_methods(agg, member);
    if !methods.is_empty() {
        return Some(call_overloads(r, &methods, Some(receiver), args.to_vec(), span, member));
    }
    let field = r.program.decls.find_field(agg, member)?;
    let field_ty = r.program.decls.var(field).ty;
    let callee = r
        .program
        .arena
        .alloc_typed(ExprKind::DotVar { base: receiver, var: field }, span, field_ty);
    Some(call_value(r, callee, args.to_vec(), span))
}

/// Whether `e.member` would find something on `e` itself.
pub(crate) fn has_member(r: &Resolver<'_>, e: ExprId, member: Name) -> bool {
    let mut ty = r.program.arena.ty(e);
    if let TypeKind::Pointer(to) = r.program.types.base_kind(ty) {
        ty = *to;
    }
    match r.program.types.aggregate(ty) {
        Some((_, agg)) => {
            r.program.decls.find_field(agg, member).is_some() || !r.program.decls.find_methods(agg, member).is_empty()
        }
        None => {
            let name = r.program.text(member);
            (r.program.types.is_assoc_array(ty) && matches!(name, "remove" | "length"))
                || (r.program.types.is_array(ty) && name == "length")
        }
    }
}

/// A pointer to a struct is dereferenced for member access.
pub(crate) fn auto_deref(r: &mut Resolver<'_>, base: ExprId) -> ExprId {
    let ty = r.program.arena.ty(base);
    let TypeKind::Pointer(to) = *r.program.types.base_kind(ty) else {
        return base;
    };
    if !r.program.types.is_struct(to) {
        return base;
    }
    let span = r.program.arena.span(base);
    r.program.arena.alloc_typed(ExprKind::Deref(base), span, to)
}

/// `T.member(args)`: a static method of an aggregate.
fn call_static(r: &mut Resolver<'_>, ty: TypeId, member: Name, args: Vec<ExprId>, span: Span) -> ExprId {
    if let Some((_, agg)) = r.program.types.aggregate(ty) {
        r.resolve_aggregate(agg);
        let statics: Vec<FuncId> = r
            .program
            .decls
            .find_methods(agg, member)
            .into_iter()
            .filter(|&f| r.program.decls.func(f).attrs.contains(FuncAttrs::STATIC))
            .collect();
        if !statics.is_empty() {
            return call_overloads(r, &statics, None, args, span, member);
        }
    }
    let diag = Diagnostic::error(ErrorCode::E2010)
        .with_message(format!(
            "type `{}` has no static method `{}`",
            r.program.type_name(ty),
            r.program.text(member)
        ))
        .with_label(span, "called here");
    r.error_node(diag, span)
}

/// A callee that is already a value: a function reference or a value of
/// function type.
fn call_value(r: &mut Resolver<'_>, callee: ExprId, args: Vec<ExprId>, span: Span) -> ExprId {
    if any_error(r, &[callee]) || any_error(r, &args) {
        return r.program.error_expr(span);
    }
    match r.program.arena.kind(callee) {
        ExprKind::Func { func, .. } | ExprKind::FuncLiteral(func) => {
            let name = r.program.decls.func(func).name;
            return call_overloads(r, &[func], None, args, span, name);
        }
        ExprKind::DotFunc { base, func } => {
            let name = r.program.decls.func(func).name;
            return call_overloads(r, &[func], Some(base), args, span, name);
        }
        ExprKind::OverloadSet(set) => {
            let funcs = r.program.decls.overloads(set).to_vec();
            let name = r.program.decls.func(funcs[0]).name;
            return call_overloads(r, &funcs, None, args, span, name);
        }
        ExprKind::TypeExpr(ty) => return construct(r, ty, args, span),
        _ => {}
    }

    let mut fn_ty = r.program.arena.ty(callee);
    if let TypeKind::Pointer(to) = *r.program.types.base_kind(fn_ty) {
        fn_ty = to;
    }
    let TypeKind::Function { params, ret } = r.program.types.base_kind(fn_ty).clone() else {
        let what = format!("`{}`", r.program.expr_to_string(callee));
        let callee_span = r.program.arena.span(callee);
        return not_callable(r, callee_span, &what);
    };
    if params.len() != args.len() {
        let diag = Diagnostic::error(ErrorCode::E2013)
            .with_message(format!(
                "`{}` expects {} argument(s), found {}",
                r.program.expr_to_string(callee),
                params.len(),
                args.len()
            ))
            .with_label(span, "in this call");
        return r.error_node(diag, span);
    }
    let converted: Vec<ExprId> = args
        .into_iter()
        .zip(params.iter())
        .map(|(arg, &param)| convert(r, arg, param, "argument"))
        .collect();
    let args = r.program.arena.alloc_list(converted);
    r.program.arena.alloc_typed(ExprKind::Call { callee, args }, span, ret)
}

fn call_overloads(
    r: &mut Resolver<'_>,
    funcs: &[FuncId],
    receiver: Option<ExprId>,
    args: Vec<ExprId>,
    span: Span,
    name: Name,
) -> ExprId {
    if any_error(r, &args) || receiver.is_some_and(|e| any_error(r, &[e])) {
        return r.program.error_expr(span);
    }
    match select_overload(r, funcs, &args, span, name) {
        Some(func) => build_call(r, func, receiver, args, span, funcs.len() > 1),
        None => r.program.error_expr(span),
    }
}

/// Pick the candidate whose worst argument conversion is best. A single
/// candidate that does not match gets a precise diagnostic; several get a
/// summary.
pub(crate) fn select_overload(
    r: &mut Resolver<'_>,
    funcs: &[FuncId],
    args: &[ExprId],
    span: Span,
    name: Name,
) -> Option<FuncId> {
    let mut best_level = MatchLevel::NoMatch;
    let mut best: SmallVec<[FuncId; 2]> = SmallVec::new();
    for &func in funcs {
        r.resolve_signature(func);
        let level = match_level(r, func, args);
        if level > best_level {
            best_level = level;
            best.clear();
            best.push(func);
        } else if level == best_level && level != MatchLevel::NoMatch {
            best.push(func);
        }
    }
    tracing::trace!(
        name = r.program.text(name),
        candidates = funcs.len(),
        matches = best.len(),
        "overload selection"
    );

    match best.as_slice() {
        [one] => Some(*one),
        [] => {
            if let [only] = funcs {
                explain_mismatch(r, *only, args, span);
            } else {
                let types = arg_types(r, args);
                let diag = Diagnostic::error(ErrorCode::E2002)
                    .with_message(format!(
                        "none of the {} overloads of `{}` accept `({types})`",
                        funcs.len(),
                        r.program.text(name)
                    ))
                    .with_label(span, "no matching overload");
                r.report(diag);
            }
            None
        }
        [first, second, ..] => {
            let diag = Diagnostic::error(ErrorCode::E2002)
                .with_message(format!("call to `{}` is ambiguous", r.program.text(name)))
                .with_label(span, "ambiguous call")
                .with_note(format!(
                    "both `{}` and `{}` match `({})`",
                    r.program.func_to_string(*first),
                    r.program.func_to_string(*second),
                    arg_types(r, args)
                ));
            r.report(diag);
            None
        }
    }
}

fn arg_types(r: &Resolver<'_>, args: &[ExprId]) -> String {
    args.iter()
        .map(|&a| r.program.type_name(r.program.arena.ty(a)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn match_level(r: &mut Resolver<'_>, func: FuncId, args: &[ExprId]) -> MatchLevel {
    let params = r.program.decls.func(func).params.clone();
    if args.len() > params.len() {
        return MatchLevel::NoMatch;
    }
    if params[args.len()..]
        .iter()
        .any(|&p| !r.program.decls.var(p).init.is_valid())
    {
        return MatchLevel::NoMatch;
    }
    let mut level = MatchLevel::Exact;
    for (&arg, &param) in args.iter().zip(&params) {
        let decl = r.program.decls.var(param);
        let (ty, is_ref) = (decl.ty, decl.is_ref());
        let arg_level = if is_ref {
            ref_level(r, arg, ty)
        } else {
            conv_level(r, arg, ty)
        };
        level = level.min(arg_level);
        if level == MatchLevel::NoMatch {
            break;
        }
    }
    level
}

/// A `ref` parameter binds only an lvalue of the same type, and a mutable
/// one only to mutable storage.
fn ref_level(r: &Resolver<'_>, arg: ExprId, param: TypeId) -> MatchLevel {
    if !r.program.is_lvalue(arg) {
        return MatchLevel::NoMatch;
    }
    let types = &r.program.types;
    let from = r.program.arena.ty(arg);
    if types.strip(from) != types.strip(param) {
        return MatchLevel::NoMatch;
    }
    match (types.qualifier(from), types.qualifier(param)) {
        (a, b) if a == b => MatchLevel::Exact,
        (_, Qualifier::Const) => MatchLevel::Const,
        _ => MatchLevel::NoMatch,
    }
}

/// Report why the only candidate does not accept `args`.
fn explain_mismatch(r: &mut Resolver<'_>, func: FuncId, args: &[ExprId], span: Span) {
    let decl = r.program.decls.func(func);
    let name = r.program.text(decl.name);
    let params = decl.params.clone();
    let required = params
        .iter()
        .filter(|&&p| !r.program.decls.var(p).init.is_valid())
        .count();
    if args.len() > params.len() || args.len() < required {
        let expected = if required == params.len() {
            format!("{required}")
        } else {
            format!("{required} to {}", params.len())
        };
        let diag = Diagnostic::error(ErrorCode::E2013)
            .with_message(format!("`{name}` expects {expected} argument(s), found {}", args.len()))
            .with_label(span, "in this call");
        r.report(diag);
        return;
    }
    for (index, (&arg, &param)) in args.iter().zip(&params).enumerate() {
        let decl = r.program.decls.var(param);
        let (ty, is_ref, param_name) = (decl.ty, decl.is_ref(), decl.name);
        let arg_span = r.program.arena.span(arg);
        if is_ref && !r.program.is_lvalue(arg) {
            let diag = Diagnostic::error(ErrorCode::E2004)
                .with_message(format!(
                    "argument {} to `{name}` must be an lvalue for `ref` parameter `{}`",
                    index + 1,
                    r.program.text(param_name)
                ))
                .with_label(arg_span, "not an lvalue");
            r.report(diag);
            return;
        }
        let level = if is_ref {
            ref_level(r, arg, ty)
        } else {
            conv_level(r, arg, ty)
        };
        if level == MatchLevel::NoMatch {
            let context = format!("argument {} to `{name}`", index + 1);
            let found = r.program.arena.ty(arg);
            r.mismatch(arg_span, ty, found, &context);
            return;
        }
    }
}

/// The typed call of a selected `func`.
///
/// A member function without a `receiver` is called on the enclosing
/// `this`. A static member drops its receiver but keeps its side effects.
pub(crate) fn build_call(
    r: &mut Resolver<'_>,
    func: FuncId,
    receiver: Option<ExprId>,
    args: Vec<ExprId>,
    span: Span,
    has_overloads: bool,
) -> ExprId {
    r.check_call_attributes(func, span);
    let decl = r.program.decls.func(func).clone();
    let fn_ty = r.func_type(func, span);
    let ret = r.return_type(func, span);

    let (receiver, prelude) = match receiver {
        Some(recv) if decl.attrs.contains(FuncAttrs::STATIC) => {
            (None, r.program.has_side_effects(recv).then_some(recv))
        }
        Some(recv) => (Some(recv), None),
        None if decl.is_member() => match implicit_this(r, span) {
            Some(this) => (Some(this), None),
            None => {
                let diag = Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!(
                        "`{}` needs an instance of `{}` to be called",
                        r.program.text(decl.name),
                        decl.parent.map_or("", |agg| r.program.text(r.program.decls.agg(agg).name))
                    ))
                    .with_label(span, "called without `this`");
                return r.error_node(diag, span);
            }
        },
        None => (None, None),
    };

    let mut converted = Vec::with_capacity(decl.params.len());
    for (index, &param) in decl.params.iter().enumerate() {
        let pdecl = r.program.decls.var(param);
        let (ty, is_ref, init, param_name) = (pdecl.ty, pdecl.is_ref(), pdecl.init, pdecl.name);
        let arg = match args.get(index) {
            Some(&arg) if is_ref => {
                if !r.program.is_lvalue(arg) {
                    let arg_span = r.program.arena.span(arg);
                    let diag = Diagnostic::error(ErrorCode::E2004)
                        .with_message(format!(
                            "`ref` parameter `{}` needs an lvalue",
                            r.program.text(param_name)
                        ))
                        .with_label(arg_span, "not an lvalue");
                    r.report(diag);
                }
                arg
            }
            Some(&arg) => convert(r, arg, ty, "argument"),
            None => default_argument(r, func, init, ty, span),
        };
        converted.push(arg);
    }

    let callee = match receiver {
        Some(base) => r.program.arena.alloc_typed(ExprKind::DotFunc { base, func }, span, fn_ty),
        None if decl.is_literal => r.program.arena.alloc_typed(ExprKind::FuncLiteral(func), span, fn_ty),
        None => r
            .program
            .arena
            .alloc_typed(ExprKind::Func { func, has_overloads }, span, fn_ty),
    };
    let ty = match receiver {
        Some(base) if decl.is_ctor() => r.program.arena.ty(base),
        _ => ret,
    };
    let args = r.program.arena.alloc_list(converted);
    let call = r.program.arena.alloc_typed(ExprKind::Call { callee, args }, span, ty);
    tracing::trace!(func = %r.program.func_path(func), "call resolved");

    match prelude {
        Some(left) => r
            .program
            .arena
            .alloc_typed(ExprKind::Comma { left, right: call }, span, ty),
        None => call,
    }
}

/// The default of an omitted parameter. `__LINE__`-style defaults describe
/// the call site, so they are expanded here.
fn default_argument(r: &mut Resolver<'_>, func: FuncId, init: ExprId, ty: TypeId, span: Span) -> ExprId {
    if !init.is_valid() {
        let diag = Diagnostic::error(ErrorCode::E2013)
            .with_message(format!(
                "missing argument in call to `{}`",
                r.program.text(r.program.decls.func(func).name)
            ))
            .with_label(span, "in this call");
        return r.error_node(diag, span);
    }
    match r.program.arena.kind(init) {
        ExprKind::DefaultInit(kind) => {
            let value = resolve_default_init(r, kind, span);
            convert(r, value, ty, "default argument")
        }
        _ => init,
    }
}

/// `T(args)`.
fn construct(r: &mut Resolver<'_>, ty: TypeId, args: Vec<ExprId>, span: Span) -> ExprId {
    if r.program.types.is_error(ty) || any_error(r, &args) {
        return r.program.error_expr(span);
    }
    match r.program.types.aggregate(ty) {
        Some((AggKind::Struct, agg)) => {
            r.resolve_aggregate(agg);
            let decl = r.program.decls.agg(agg);
            let (ctors, name) = (decl.ctors.clone(), decl.name);
            if ctors.is_empty() {
                return struct_literal(r, agg, ty, &args, span);
            }
            let Some(ctor) = select_overload(r, &ctors, &args, span, name) else {
                return r.program.error_expr(span);
            };
            let init = r.program.default_init(ty, span);
            build_call(r, ctor, Some(init), args, span, ctors.len() > 1)
        }
        Some((AggKind::Class, agg)) => {
            let diag = Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "class `{}` must be instantiated with `new`",
                    r.program.text(r.program.decls.agg(agg).name)
                ))
                .with_label(span, "constructed without `new`");
            r.error_node(diag, span)
        }
        None => match args.as_slice() {
            [] => r.program.default_init(ty, span),
            [arg] => {
                let arg = *arg;
                let from = r.program.arena.ty(arg);
                if conv_level(r, arg, ty) != MatchLevel::NoMatch {
                    convert(r, arg, ty, "conversion")
                } else if r.program.types.cast_allowed(from, ty) {
                    r.program
                        .arena
                        .alloc_typed(ExprKind::Cast { operand: arg, to: ty }, span, ty)
                } else {
                    r.mismatch(span, ty, from, "conversion");
                    r.program.error_expr(span)
                }
            }
            _ => {
                let diag = Diagnostic::error(ErrorCode::E2013)
                    .with_message(format!(
                        "`{}` takes one argument, found {}",
                        r.program.type_name(ty),
                        args.len()
                    ))
                    .with_label(span, "in this construction");
                r.error_node(diag, span)
            }
        },
    }
}

/// `S(a, b)` for a struct without constructors: fields in order.
fn struct_literal(r: &mut Resolver<'_>, agg: AggId, ty: TypeId, args: &[ExprId], span: Span) -> ExprId {
    let fields = r.program.decls.agg(agg).fields.clone();
    if args.len() > fields.len() {
        let diag = Diagnostic::error(ErrorCode::E2013)
            .with_message(format!(
                "too many initializers for `{}`: it has {} field(s), found {}",
                r.program.type_name(ty),
                fields.len(),
                args.len()
            ))
            .with_label(span, "in this literal");
        return r.error_node(diag, span);
    }
    let mut elements = Vec::with_capacity(fields.len());
    for (index, &field) in fields.iter().enumerate() {
        let element = match args.get(index) {
            Some(&arg) => {
                let field_ty = r.program.decls.var(field).ty;
                convert(r, arg, field_ty, "field initializer")
            }
            None => ExprId::INVALID,
        };
        elements.push(element);
    }
    let elements = r.program.arena.alloc_list(elements);
    r.program
        .arena
        .alloc_typed(ExprKind::StructLiteral { agg, elements }, span, ty)
}

pub(crate) fn resolve_new(r: &mut Resolver<'_>, id: ExprId, ty: TypeId, args: ExprRange) -> ExprId {
    let span = r.program.arena.span(id);
    let ty = r.resolve_type(ty, span);
    let args = resolve_args(r, args);
    if r.program.types.is_error(ty) || any_error(r, &args) {
        return poisoned(r, id);
    }
    match r.program.types.aggregate(ty) {
        Some((AggKind::Class, agg)) => new_class(r, ty, agg, args, span),
        Some((AggKind::Struct, _)) => {
            let value = construct(r, ty, args, span);
            if any_error(r, &[value]) {
                return value;
            }
            heap_cell(r, ty, value, span)
        }
        None if r.program.types.is_slice(ty) => {
            let [len] = args.as_slice() else {
                let diag = Diagnostic::error(ErrorCode::E2013)
                    .with_message(format!("`new {}` needs exactly one length", r.program.type_name(ty)))
                    .with_label(span, "in this allocation");
                return r.error_node(diag, span);
            };
            let len = convert(r, *len, TypeId::SIZE_T, "array length");
            let args = r.program.arena.alloc_list([len]);
            r.program.arena.alloc_typed(ExprKind::New { ty, args }, span, ty)
        }
        None => {
            let value = match args.as_slice() {
                [] => r.program.default_init(ty, span),
                [arg] => convert(r, *arg, ty, "initializer"),
                _ => {
                    let diag = Diagnostic::error(ErrorCode::E2013)
                        .with_message(format!(
                            "`new {}` takes at most one initializer, found {}",
                            r.program.type_name(ty),
                            args.len()
                        ))
                        .with_label(span, "in this allocation");
                    return r.error_node(diag, span);
                }
            };
            heap_cell(r, ty, value, span)
        }
    }
}

/// `New { T*, [value] }`.
fn heap_cell(r: &mut Resolver<'_>, ty: TypeId, value: ExprId, span: Span) -> ExprId {
    let ptr = r.program.types.pointer(ty);
    let args = r.program.arena.alloc_list([value]);
    r.program.arena.alloc_typed(ExprKind::New { ty: ptr, args }, span, ptr)
}

fn new_class(r: &mut Resolver<'_>, ty: TypeId, agg: AggId, args: Vec<ExprId>, span: Span) -> ExprId {
    r.resolve_aggregate(agg);
    let decl = r.program.decls.agg(agg);
    let (ctors, name) = (decl.ctors.clone(), decl.name);
    let object = r
        .program
        .arena
        .alloc_typed(ExprKind::New { ty, args: ExprRange::EMPTY }, span, ty);
    if ctors.is_empty() {
        if args.is_empty() {
            return object;
        }
        let diag = Diagnostic::error(ErrorCode::E2013)
            .with_message(format!(
                "class `{}` has no constructor, found {} argument(s)",
                r.program.text(name),
                args.len()
            ))
            .with_label(span, "in this allocation");
        return r.error_node(diag, span);
    }
    let Some(ctor) = select_overload(r, &ctors, &args, span, name) else {
        return r.program.error_expr(span);
    };
    build_call(r, ctor, Some(object), args, span, ctors.len() > 1)
}

/// `new class(args) { ... }`: its members are resolved here, the class is
/// never named anywhere else.
pub(crate) fn resolve_new_anon_class(r: &mut Resolver<'_>, id: ExprId, agg: AggId, args: ExprRange) -> ExprId {
    let span = r.program.arena.span(id);
    r.resolve_aggregate(agg);
    let decl = r.program.decls.agg(agg);
    let (ty, members): (TypeId, Vec<FuncId>) = (decl.ty, decl.methods.iter().chain(&decl.ctors).copied().collect());
    for func in members {
        r.resolve_function(func);
    }
    let args = resolve_args(r, args);
    if any_error(r, &args) {
        return poisoned(r, id);
    }
    new_class(r, ty, agg, args, span)
}

fn not_callable(r: &mut Resolver<'_>, span: Span, what: &str) -> ExprId {
    let diag = Diagnostic::error(ErrorCode::E2014)
        .with_message(format!("{what} cannot be called"))
        .with_label(span, "not a function");
    r.error_node(diag, span)
}

/// E2010 for `base.member`, with a suggestion when `base` is an aggregate.
pub(crate) fn no_member(r: &mut Resolver<'_>, base: ExprId, member: Name, span: Span) -> ExprId {
    let mut ty = r.program.arena.ty(base);
    if let TypeKind::Pointer(to) = *r.program.types.base_kind(ty) {
        ty = to;
    }
    let mut diag = Diagnostic::error(ErrorCode::E2010)
        .with_message(format!(
            "no member `{}` on type `{}`",
            r.program.text(member),
            r.program.type_name(ty)
        ))
        .with_label(span, "unknown member");
    if let Some((_, agg)) = r.program.types.aggregate(ty) {
        if let Some(similar) = suggest_member(r.program, agg, member) {
            diag = diag.with_note(format!("did you mean `{similar}`?"));
        }
    }
    r.error_node(diag, span)
}
