//! Indexing, slicing and member access.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{CharWidth, ExprId, ExprKind, ExprRange, FloatKind, Name, NumKind, Span, TypeId, TypeKind};

use super::identifiers::{member_type, symbol_expr, undefined};
use super::operators::operator_call;
use crate::checker::Resolver;
use crate::infer::call::{auto_deref, call_ufcs, has_member, no_member};
use crate::infer::{
    any_error, build_call, convert, finish, poisoned, resolve_expr, resolve_rvalue, select_overload, with_alias_this,
};

pub(crate) fn resolve_index(r: &mut Resolver<'_>, id: ExprId, base: ExprId, index: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let base = resolve_rvalue(r, base);
    if any_error(r, &[base]) {
        return poisoned(r, id);
    }
    let base_ty = r.program.arena.ty(base);
    match r.program.types.base_kind(base_ty).clone() {
        TypeKind::Pointer(_) | TypeKind::Slice(_) | TypeKind::Array { .. } => {
            let index = r.with_dollar(base, |r| resolve_rvalue(r, index));
            let index = convert(r, index, TypeId::SIZE_T, "array index");
            if any_error(r, &[index]) {
                return poisoned(r, id);
            }
            if r.program.types.is_pointer(base_ty) {
                r.check_unsafe(span, "indexing a pointer");
            } else if let (Some(len), ExprKind::Int(i)) =
                (r.program.types.static_len(base_ty), r.program.arena.kind(index))
            {
                if i >= len {
                    let diag = Diagnostic::error(ErrorCode::E6002)
                        .with_message(format!("array index {i} is out of bounds `[0 .. {len}]`"))
                        .with_label(r.program.arena.span(index), "out of bounds");
                    return r.error_node(diag, span);
                }
            }
            let elem = r.program.types.elem(base_ty).unwrap_or(TypeId::ERROR);
            finish(r, id, ExprKind::Index { base, index }, elem)
        }
        TypeKind::AssocArray { key, value } => {
            let index = resolve_rvalue(r, index);
            let index = convert(r, index, key, "associative array key");
            if any_error(r, &[index]) {
                return poisoned(r, id);
            }
            let qual = r.program.types.qualifier(base_ty);
            let value = r.program.types.qualify(value, qual);
            finish(r, id, ExprKind::Index { base, index }, value)
        }
        TypeKind::Tuple(elems) => {
            let index = resolve_rvalue(r, index);
            let Ok(value) = r.evaluate(index) else {
                return poisoned(r, id);
            };
            match r.program.arena.kind(value) {
                ExprKind::Int(i) if i < elems.len() as u64 => {
                    let index = r.program.int_lit(i, TypeId::SIZE_T, span);
                    finish(r, id, ExprKind::Index { base, index }, elems[i as usize])
                }
                _ => {
                    let diag = Diagnostic::error(ErrorCode::E6002)
                        .with_message(format!(
                            "tuple index `{}` is out of bounds `[0 .. {}]`",
                            r.program.expr_to_string(value),
                            elems.len()
                        ))
                        .with_label(span, "out of bounds");
                    r.error_node(diag, span)
                }
            }
        }
        TypeKind::Aggregate { .. } => {
            let index = resolve_rvalue(r, index);
            if any_error(r, &[index]) {
                return poisoned(r, id);
            }
            operator_call(r, base, "opIndex", vec![index], span).unwrap_or_else(|| not_indexable(r, base_ty, span))
        }
        _ => not_indexable(r, base_ty, span),
    }
}

/// `a[i, j]`: only user-defined `opIndex` takes several indices.
pub(crate) fn resolve_multi_index(r: &mut Resolver<'_>, id: ExprId, base: ExprId, indices: ExprRange) -> ExprId {
    let span = r.program.arena.span(id);
    let base = resolve_rvalue(r, base);
    let indices: Vec<ExprId> = r
        .program
        .arena
        .list_vec(indices)
        .into_iter()
        .map(|i| resolve_rvalue(r, i))
        .collect();
    if any_error(r, &[base]) || any_error(r, &indices) {
        return poisoned(r, id);
    }
    let base_ty = r.program.arena.ty(base);
    operator_call(r, base, "opIndex", indices, span).unwrap_or_else(|| {
        let diag = Diagnostic::error(ErrorCode::E2003)
            .with_message(format!(
                "`{}` cannot take more than one index",
                r.program.type_name(base_ty)
            ))
            .with_label(span, "multiple indices need `opIndex`");
        r.error_node(diag, span)
    })
}

fn not_indexable(r: &mut Resolver<'_>, ty: TypeId, span: Span) -> ExprId {
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("cannot index a value of type `{}`", r.program.type_name(ty)))
        .with_label(span, "not indexable");
    r.error_node(diag, span)
}

pub(crate) fn resolve_slice(r: &mut Resolver<'_>, id: ExprId, base: ExprId, lower: ExprId, upper: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let base = resolve_rvalue(r, base);
    if any_error(r, &[base]) {
        return poisoned(r, id);
    }
    let base_ty = r.program.arena.ty(base);

    if r.program.types.aggregate(base_ty).is_some() {
        let bounds: Vec<ExprId> = [lower, upper]
            .into_iter()
            .filter(|b| b.is_valid())
            .map(|b| resolve_rvalue(r, b))
            .collect();
        if any_error(r, &bounds) {
            return poisoned(r, id);
        }
        return operator_call(r, base, "opSlice", bounds, span).unwrap_or_else(|| not_sliceable(r, base_ty, span));
    }

    let is_pointer = r.program.types.is_pointer(base_ty);
    if !r.program.types.is_array(base_ty) && !is_pointer {
        return not_sliceable(r, base_ty, span);
    }
    if is_pointer {
        if !lower.is_valid() || !upper.is_valid() {
            let diag = Diagnostic::error(ErrorCode::E2003)
                .with_message("slicing a pointer needs both bounds")
                .with_label(span, "the length of the pointee is unknown");
            return r.error_node(diag, span);
        }
        r.check_unsafe(span, "slicing a pointer");
    }

    let (lower, upper) = r.with_dollar(base, |r| {
        let lower = resolve_rvalue(r, lower);
        let upper = resolve_rvalue(r, upper);
        (lower, upper)
    });
    let lower = convert(r, lower, TypeId::SIZE_T, "slice bound");
    let upper = convert(r, upper, TypeId::SIZE_T, "slice bound");
    if any_error(r, &[lower, upper]) {
        return poisoned(r, id);
    }
    if let Some(diag) = constant_bounds_error(r, base_ty, lower, upper, span) {
        return r.error_node(diag, span);
    }

    let elem = r.program.types.elem(base_ty).unwrap_or(TypeId::ERROR);
    let ty = r.program.types.slice(elem);
    finish(r, id, ExprKind::Slice { base, lower, upper }, ty)
}

/// Bounds known while resolving that are already wrong.
fn constant_bounds_error(
    r: &Resolver<'_>,
    base_ty: TypeId,
    lower: ExprId,
    upper: ExprId,
    span: Span,
) -> Option<Diagnostic> {
    let bound = |e: ExprId| match e.is_valid().then(|| r.program.arena.kind(e)) {
        Some(ExprKind::Int(v)) => Some(v),
        _ => None,
    };
    let (lo, hi) = (bound(lower), bound(upper));
    if let (Some(lo), Some(hi)) = (lo, hi) {
        if lo > hi {
            return Some(
                Diagnostic::error(ErrorCode::E6002)
                    .with_message(format!("slice `[{lo} .. {hi}]` has its lower bound above its upper bound"))
                    .with_label(span, "inverted slice"),
            );
        }
    }
    let len = r.program.types.static_len(base_ty)?;
    match hi.or(lo) {
        Some(bound) if bound > len => Some(
            Diagnostic::error(ErrorCode::E6002)
                .with_message(format!("slice bound {bound} is out of bounds `[0 .. {len}]`"))
                .with_label(span, "out of bounds"),
        ),
        _ => None,
    }
}

fn not_sliceable(r: &mut Resolver<'_>, ty: TypeId, span: Span) -> ExprId {
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message(format!("cannot slice a value of type `{}`", r.program.type_name(ty)))
        .with_label(span, "not sliceable");
    r.error_node(diag, span)
}

/// `aa.remove(key)` built by a rewrite.
pub(crate) fn resolve_remove(r: &mut Resolver<'_>, id: ExprId, aa: ExprId, key: ExprId) -> ExprId {
    let aa = resolve_rvalue(r, aa);
    let key = resolve_rvalue(r, key);
    if any_error(r, &[aa, key]) {
        return poisoned(r, id);
    }
    let aa_ty = r.program.arena.ty(aa);
    let TypeKind::AssocArray { key: key_ty, .. } = r.program.types.base_kind(aa_ty).clone() else {
        let span = r.program.arena.span(id);
        return not_indexable(r, aa_ty, span);
    };
    let key = convert(r, key, key_ty, "associative array key");
    finish(r, id, ExprKind::Remove { aa, key }, TypeId::BOOL)
}

pub(crate) fn resolve_dot_id(r: &mut Resolver<'_>, id: ExprId, base: ExprId, member: Name) -> ExprId {
    let span = r.program.arena.span(id);
    let base = resolve_expr(r, base);
    if any_error(r, &[base]) {
        return poisoned(r, id);
    }
    match r.program.arena.kind(base) {
        ExprKind::TypeExpr(ty) => type_property(r, id, ty, member, span),
        ExprKind::ScopeExpr(_) => match r.program.globals.get(&member).copied() {
            Some(sym) => symbol_expr(r, id, sym),
            None => undefined(r, member, span),
        },
        ExprKind::TemplateExpr(_) => resolve_rvalue(r, base),
        _ => value_member(r, base, member, span),
    }
}

/// `T.member`: built-in properties of a type, then static members of an
/// aggregate.
fn type_property(r: &mut Resolver<'_>, id: ExprId, ty: TypeId, member: Name, span: Span) -> ExprId {
    let name = r.program.text(member);
    let num = r.program.types.num_kind(ty);
    match (name, num) {
        ("init", _) => return r.program.default_init(ty, span),
        ("sizeof", _) => {
            let size = r.program.size_of(ty);
            return r.program.int_lit(size, TypeId::SIZE_T, span);
        }
        ("stringof", _) => {
            let text = r.program.type_name(ty);
            return r.program.string_lit(&text, CharWidth::One, true, TypeId::STRING, span);
        }
        ("mangleof", _) => {
            let mut text = String::new();
            r.program.types.mangle(ty, &r.program.interner, &mut text);
            return r.program.string_lit(&text, CharWidth::One, true, TypeId::STRING, span);
        }
        ("length", _) => {
            if let Some(len) = r.program.types.static_len(ty) {
                return r.program.int_lit(len, TypeId::SIZE_T, span);
            }
        }
        ("max" | "min", Some(kind @ (NumKind::Bool | NumKind::Int { .. }))) => {
            if let Some((min, max)) = kind.int_min_max() {
                let value = if name == "max" { max } else { min };
                return r.program.int_lit(value, ty, span);
            }
        }
        (_, Some(NumKind::Float(fk) | NumKind::Complex(fk))) => {
            if let Some(value) = float_property(name, fk) {
                let real_ty = match fk {
                    FloatKind::Float => TypeId::FLOAT,
                    FloatKind::Double => TypeId::DOUBLE,
                    FloatKind::Real => TypeId::REAL,
                };
                return r.program.real_lit(value, real_ty, span);
            }
        }
        _ => {}
    }

    if let Some((_, agg)) = r.program.types.aggregate(ty) {
        r.resolve_aggregate(agg);
        let methods = r.program.decls.find_methods(agg, member);
        if !methods.is_empty() {
            return match select_overload(r, &methods, &[], span, member) {
                Some(func) => build_call(r, func, None, Vec::new(), span, methods.len() > 1),
                None => r.program.error_expr(span),
            };
        }
        if r.program.decls.find_field(agg, member).is_some() {
            let diag = Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "field `{}` of `{}` needs an instance",
                    name,
                    r.program.type_name(ty)
                ))
                .with_label(span, "accessed through the type");
            return r.error_node(diag, span);
        }
    }
    let type_expr = finish(r, id, ExprKind::TypeExpr(ty), ty);
    no_member(r, type_expr, member, span)
}

fn float_property(name: &str, kind: FloatKind) -> Option<f64> {
    let single = kind == FloatKind::Float;
    Some(match name {
        "max" if single => f64::from(f32::MAX),
        "max" => f64::MAX,
        "min_normal" if single => f64::from(f32::MIN_POSITIVE),
        "min_normal" => f64::MIN_POSITIVE,
        "epsilon" if single => f64::from(f32::EPSILON),
        "epsilon" => f64::EPSILON,
        "nan" => f64::NAN,
        "infinity" => f64::INFINITY,
        _ => return None,
    })
}

/// `value.member` on a resolved `base`.
pub(crate) fn value_member(r: &mut Resolver<'_>, base: ExprId, member: Name, span: Span) -> ExprId {
    let ty = r.program.arena.ty(base);
    let name = r.program.text(member);

    match name {
        "length" if r.program.types.is_array(ty) || r.program.types.is_assoc_array(ty) => {
            if let Some(len) = r.program.types.static_len(ty) {
                if !r.program.has_side_effects(base) {
                    return r.program.int_lit(len, TypeId::SIZE_T, span);
                }
            }
            return r
                .program
                .arena
                .alloc_typed(ExprKind::ArrayLength(base), span, TypeId::SIZE_T);
        }
        "sizeof" => {
            let size = r.program.size_of(ty);
            return r.program.int_lit(size, TypeId::SIZE_T, span);
        }
        "init" if r.program.types.aggregate(ty).is_none() => return r.program.default_init(ty, span),
        "stringof" => {
            let text = r.program.expr_to_string(base);
            return r.program.string_lit(&text, CharWidth::One, true, TypeId::STRING, span);
        }
        _ => {}
    }

    let receiver = auto_deref(r, base);
    let receiver_ty = r.program.arena.ty(receiver);
    if let Some((_, agg)) = r.program.types.aggregate(receiver_ty) {
        r.resolve_aggregate(agg);
        if let Some(field) = r.program.decls.find_field(agg, member) {
            let field_ty = r.program.decls.var(field).ty;
            let field_ty = member_type(r, receiver, field_ty);
            return r
                .program
                .arena
                .alloc_typed(ExprKind::DotVar { base: receiver, var: field }, span, field_ty);
        }
        let methods = r.program.decls.find_methods(agg, member);
        if !methods.is_empty() {
            // Property syntax: `s.len` calls `s.len()`.
            return match select_overload(r, &methods, &[], span, member) {
                Some(func) => build_call(r, func, Some(receiver), Vec::new(), span, methods.len() > 1),
                None => r.program.error_expr(span),
            };
        }
        if name == "init" {
            return r.program.default_init(receiver_ty, span);
        }
    }

    let via_alias = with_alias_this(r, base, |r, inner| {
        has_member(r, inner, member).then(|| value_member(r, inner, member, span))
    });
    if let Some(access) = via_alias {
        return access;
    }
    call_ufcs(r, member, vec![base], span).unwrap_or_else(|| no_member(r, base, member, span))
}
