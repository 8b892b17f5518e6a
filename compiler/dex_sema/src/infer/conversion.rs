//! Implicit conversions.
//!
//! A conversion is ranked with [`conv_level`] and materialized with
//! [`convert`]. Literals are retyped instead of wrapped in a `Cast`:
//! integer literals that fit narrow implicitly, uncommitted string
//! literals change width, array literals convert element-wise.
//! A value of an aggregate type with `alias this` converts through the
//! aliased member when nothing else matches.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{scalar, ExprId, ExprKind, MatchLevel, Name, TypeId, TypeKind};

use super::build_call;
use crate::checker::Resolver;

/// Rank the conversion of the resolved `e` to `to`.
pub(crate) fn conv_level(r: &mut Resolver<'_>, e: ExprId, to: TypeId) -> MatchLevel {
    let from = r.program.arena.ty(e);
    let level = literal_level(r, e, to).unwrap_or_else(|| r.program.types.implicit_conv_to(from, to));
    if level != MatchLevel::NoMatch {
        return level;
    }
    match alias_this_type(r, from) {
        Some(member_ty) if r.program.types.implicit_conv_to(member_ty, to) != MatchLevel::NoMatch => {
            MatchLevel::Convert
        }
        _ => MatchLevel::NoMatch,
    }
}

/// Rank of a literal whose value, not just its type, decides.
fn literal_level(r: &mut Resolver<'_>, e: ExprId, to: TypeId) -> Option<MatchLevel> {
    let types = &r.program.types;
    match r.program.arena.kind(e) {
        ExprKind::Int(v) => {
            let from_kind = types.num_kind(r.program.arena.ty(e))?;
            let to_kind = types.num_kind(to)?;
            let integral = types.is_integral(to) || types.is_bool(to);
            let base = types.implicit_conv_to(r.program.arena.ty(e), to);
            (base == MatchLevel::NoMatch && integral && to_kind.int_fits(v, from_kind)).then_some(MatchLevel::Convert)
        }
        ExprKind::String { width, committed, .. } => {
            let target = types.string_width(to)?;
            if !types.is_slice(to) && !types.is_static_array(to) {
                return None;
            }
            if target == width {
                return None;
            }
            Some(if committed {
                MatchLevel::NoMatch
            } else {
                MatchLevel::Convert
            })
        }
        ExprKind::ArrayLiteral(elems) => {
            let target_elem = types.elem_raw(to)?;
            if types.is_pointer(to) {
                return None;
            }
            if let Some(len) = types.static_len(to) {
                if len != elems.len() as u64 {
                    return Some(MatchLevel::NoMatch);
                }
            }
            let mut level = MatchLevel::Exact;
            for elem in r.program.arena.list_vec(elems) {
                level = level.min(conv_level(r, elem, target_elem));
            }
            Some(level.min(MatchLevel::Convert))
        }
        _ => None,
    }
}

/// Convert the resolved `e` to `to`, reporting a mismatch in `context`.
pub(crate) fn convert(r: &mut Resolver<'_>, e: ExprId, to: TypeId, context: &str) -> ExprId {
    if !e.is_valid() {
        return e;
    }
    let from = r.program.arena.ty(e);
    if from == to || r.program.types.is_error(from) || r.program.types.is_error(to) {
        return e;
    }
    let span = r.program.arena.span(e);
    match conv_level(r, e, to) {
        MatchLevel::NoMatch => {
            r.mismatch(span, to, from, context);
            r.program.error_expr(span)
        }
        _ if r.program.types.implicit_conv_to(from, to) == MatchLevel::NoMatch => {
            if let Some(retyped) = retype_literal(r, e, to) {
                return retyped;
            }
            with_alias_this(r, e, |r, member| Some(convert(r, member, to, context))).unwrap_or_else(|| {
                r.mismatch(span, to, from, context);
                r.program.error_expr(span)
            })
        }
        _ => implicit_cast(r, e, to),
    }
}

/// Materialize an implicit conversion the type system allows.
fn implicit_cast(r: &mut Resolver<'_>, e: ExprId, to: TypeId) -> ExprId {
    let from = r.program.arena.ty(e);
    let span = r.program.arena.span(e);
    if r.program.types.strip(from) == r.program.types.strip(to) && !r.program.arena.kind(e).is_literal() {
        return r.program.arena.alloc_typed(ExprKind::Cast { operand: e, to }, span, to);
    }
    if let Some(retyped) = retype_literal(r, e, to) {
        return retyped;
    }
    r.program.arena.alloc_typed(ExprKind::Cast { operand: e, to }, span, to)
}

/// A literal rebuilt at type `to`, when its kind allows it.
fn retype_literal(r: &mut Resolver<'_>, e: ExprId, to: TypeId) -> Option<ExprId> {
    let span = r.program.arena.span(e);
    match r.program.arena.kind(e) {
        ExprKind::Int(_) | ExprKind::Real(_) | ExprKind::Complex { .. } => {
            let (value, from_kind) = r.program.scalar_of(e)?;
            let to_kind = r.program.types.num_kind(to)?;
            Some(r.program.scalar_lit(scalar::cast(value, from_kind, to_kind), to, span))
        }
        ExprKind::Null => Some(r.program.null_lit(to, span)),
        ExprKind::String { value, .. } => {
            let width = r.program.types.string_width(to)?;
            Some(r.program.arena.alloc_typed(
                ExprKind::String {
                    value,
                    width,
                    committed: true,
                },
                span,
                to,
            ))
        }
        ExprKind::ArrayLiteral(elems) => {
            let elem_ty = r.program.types.elem(to)?;
            let converted: Vec<ExprId> = r
                .program
                .arena
                .list_vec(elems)
                .into_iter()
                .map(|elem| convert(r, elem, elem_ty, "array element"))
                .collect();
            let range = r.program.arena.alloc_list(converted);
            Some(r.program.arena.alloc_typed(ExprKind::ArrayLiteral(range), span, to))
        }
        ExprKind::AssocArrayLiteral { keys, values } => {
            let TypeKind::AssocArray { key, value } = r.program.types.base_kind(to).clone() else {
                return None;
            };
            let keys: Vec<ExprId> = r
                .program
                .arena
                .list_vec(keys)
                .into_iter()
                .map(|k| convert(r, k, key, "associative array key"))
                .collect();
            let values: Vec<ExprId> = r
                .program
                .arena
                .list_vec(values)
                .into_iter()
                .map(|v| convert(r, v, value, "associative array value"))
                .collect();
            let keys = r.program.arena.alloc_list(keys);
            let values = r.program.arena.alloc_list(values);
            Some(r.program.arena.alloc_typed(ExprKind::AssocArrayLiteral { keys, values }, span, to))
        }
        _ => None,
    }
}

/// Use the resolved `e` as a condition.
pub(crate) fn to_boolean(r: &mut Resolver<'_>, e: ExprId) -> ExprId {
    let ty = r.program.arena.ty(e);
    let types = &r.program.types;
    if types.is_error(ty) || types.is_bool(ty) {
        return e;
    }
    let testable = types.is_scalar(ty)
        || types.is_reference(ty)
        || matches!(types.base_kind(ty), TypeKind::Null);
    let span = r.program.arena.span(e);
    if testable {
        return r.program.arena.alloc_typed(ExprKind::BoolCast(e), span, TypeId::BOOL);
    }
    if let Some(converted) = with_alias_this(r, e, |r, member| Some(to_boolean(r, member))) {
        return converted;
    }
    let diag = Diagnostic::error(ErrorCode::E2003)
        .with_message(format!(
            "expression of type `{}` cannot be used as a condition",
            r.program.type_name(ty)
        ))
        .with_label(span, "expected a boolean value");
    r.error_node(diag, span)
}

/// Type `ty` converts to through its `alias this` member, if any.
fn alias_this_type(r: &mut Resolver<'_>, ty: TypeId) -> Option<TypeId> {
    let (_, agg) = r.program.types.aggregate(ty)?;
    let member = r.program.decls.agg(agg).alias_this;
    if member.is_empty() || r.alias_this_active.contains(&r.program.types.strip(ty)) {
        return None;
    }
    if let Some(field) = r.program.decls.find_field(agg, member) {
        return Some(r.program.decls.var(field).ty);
    }
    let method = r.program.decls.find_methods(agg, member).into_iter().next()?;
    let span = r.program.decls.func(method).span;
    Some(r.return_type(method, span))
}

/// Retry `f` on `e` seen through its `alias this` member.
///
/// The type is marked while `f` runs, so an alias chain that comes back to
/// it stops instead of recursing.
pub(crate) fn with_alias_this<T>(
    r: &mut Resolver<'_>,
    e: ExprId,
    f: impl FnOnce(&mut Resolver<'_>, ExprId) -> Option<T>,
) -> Option<T> {
    let ty = r.program.types.strip(r.program.arena.ty(e));
    let (_, agg) = r.program.types.aggregate(ty)?;
    let member = r.program.decls.agg(agg).alias_this;
    if member.is_empty() || !r.alias_this_active.insert(ty) {
        return None;
    }
    tracing::debug!(ty = %r.program.type_name(ty), member = r.program.text(member), "trying alias this");
    let result = alias_this_access(r, e, member).and_then(|access| f(r, access));
    r.alias_this_active.remove(&ty);
    result
}

/// `e.member` for the `alias this` member of `e`'s aggregate.
fn alias_this_access(r: &mut Resolver<'_>, e: ExprId, member: Name) -> Option<ExprId> {
    let ty = r.program.arena.ty(e);
    let (_, agg) = r.program.types.aggregate(ty)?;
    let span = r.program.arena.span(e);
    if let Some(field) = r.program.decls.find_field(agg, member) {
        let field_ty = r.program.decls.var(field).ty;
        let qual = r.program.types.qualifier(ty);
        let field_ty = r.program.types.qualify(field_ty, qual);
        return Some(
            r.program
                .arena
                .alloc_typed(ExprKind::DotVar { base: e, var: field }, span, field_ty),
        );
    }
    let method = r.program.decls.find_methods(agg, member).into_iter().next()?;
    Some(build_call(r, method, Some(e), Vec::new(), span, false))
}
