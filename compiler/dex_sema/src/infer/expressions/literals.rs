use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{AggId, ExprId, ExprKind, ExprRange, Span, TypeId};

use crate::checker::Resolver;
use crate::infer::{any_error, convert, finish, poisoned, resolve_rvalue};

pub(crate) fn resolve_literal(r: &mut Resolver<'_>, id: ExprId, kind: ExprKind) -> ExprId {
    match kind {
        ExprKind::Int(_) => finish(r, id, kind, TypeId::INT),
        ExprKind::Real(_) => finish(r, id, kind, TypeId::DOUBLE),
        ExprKind::Complex { .. } => finish(r, id, kind, TypeId::CDOUBLE),
        ExprKind::Null => finish(r, id, kind, TypeId::NULL),
        ExprKind::String { width, .. } => finish(r, id, kind, width.string_type()),
        ExprKind::ArrayLiteral(elems) => array_literal(r, id, elems),
        ExprKind::AssocArrayLiteral { keys, values } => assoc_array_literal(r, id, keys, values),
        ExprKind::StructLiteral { agg, elements, .. } => struct_literal(r, id, agg, elements),
        ExprKind::Tuple { prelude, elements } => {
            let prelude = resolve_rvalue(r, prelude);
            let elements = resolve_all(r, elements);
            if any_error(r, &elements) || any_error(r, &[prelude]) {
                return poisoned(r, id);
            }
            let types: Vec<TypeId> = elements.iter().map(|&e| r.program.arena.ty(e)).collect();
            let ty = r.program.types.tuple(types);
            let elements = r.program.arena.alloc_list(elements);
            finish(r, id, ExprKind::Tuple { prelude, elements }, ty)
        }
        _ => poisoned(r, id),
    }
}

fn resolve_all(r: &mut Resolver<'_>, range: ExprRange) -> Vec<ExprId> {
    r.program
        .arena
        .list_vec(range)
        .into_iter()
        .map(|e| resolve_rvalue(r, e))
        .collect()
}

/// `[a, b, c]` is typed as a slice of the elements' common type; `[]` is
/// `void[]` and converts to any slice.
fn array_literal(r: &mut Resolver<'_>, id: ExprId, elems: ExprRange) -> ExprId {
    let elems = resolve_all(r, elems);
    if any_error(r, &elems) {
        return poisoned(r, id);
    }
    let span = r.program.arena.span(id);
    let Some(elem_ty) = common_of(r, &elems, span, "array literal elements") else {
        return r.program.error_expr(span);
    };
    let converted: Vec<ExprId> = elems
        .into_iter()
        .map(|e| convert(r, e, elem_ty, "array element"))
        .collect();
    let ty = r.program.types.slice(elem_ty);
    let range = r.program.arena.alloc_list(converted);
    finish(r, id, ExprKind::ArrayLiteral(range), ty)
}

fn assoc_array_literal(r: &mut Resolver<'_>, id: ExprId, keys: ExprRange, values: ExprRange) -> ExprId {
    let keys = resolve_all(r, keys);
    let values = resolve_all(r, values);
    if any_error(r, &keys) || any_error(r, &values) {
        return poisoned(r, id);
    }
    let span = r.program.arena.span(id);
    let (Some(key_ty), Some(value_ty)) = (
        common_of(r, &keys, span, "associative array keys"),
        common_of(r, &values, span, "associative array values"),
    ) else {
        return r.program.error_expr(span);
    };
    let keys: Vec<ExprId> = keys
        .into_iter()
        .map(|k| convert(r, k, key_ty, "associative array key"))
        .collect();
    let values: Vec<ExprId> = values
        .into_iter()
        .map(|v| convert(r, v, value_ty, "associative array value"))
        .collect();
    let ty = r.program.types.assoc_array(key_ty, value_ty);
    let keys = r.program.arena.alloc_list(keys);
    let values = r.program.arena.alloc_list(values);
    finish(r, id, ExprKind::AssocArrayLiteral { keys, values }, ty)
}

/// A struct literal built before resolution: skipped fields stay
/// `INVALID` and take the field's default when evaluated.
fn struct_literal(r: &mut Resolver<'_>, id: ExprId, agg: AggId, elements: ExprRange) -> ExprId {
    r.resolve_aggregate(agg);
    let decl = r.program.decls.agg(agg);
    let (ty, fields) = (decl.ty, decl.fields.clone());
    let mut resolved = Vec::with_capacity(fields.len());
    for (index, element) in r.program.arena.list_vec(elements).into_iter().enumerate() {
        if !element.is_valid() {
            resolved.push(element);
            continue;
        }
        let value = resolve_rvalue(r, element);
        let value = match fields.get(index) {
            Some(&field) => {
                let field_ty = r.program.decls.var(field).ty;
                convert(r, value, field_ty, "field initializer")
            }
            None => value,
        };
        resolved.push(value);
    }
    if any_error(r, &resolved) {
        return poisoned(r, id);
    }
    let elements = r.program.arena.alloc_list(resolved);
    finish(r, id, ExprKind::StructLiteral { agg, elements }, ty)
}

/// The type every one of `ids` converts to, or `void` when there are none.
fn common_of(r: &mut Resolver<'_>, ids: &[ExprId], span: Span, what: &str) -> Option<TypeId> {
    let Some((&first, rest)) = ids.split_first() else {
        return Some(TypeId::VOID);
    };
    let mut common = r.program.arena.ty(first);
    for &e in rest {
        let ty = r.program.arena.ty(e);
        match r.program.types.common_type(common, ty) {
            Some(t) => common = t,
            None => {
                let diag = Diagnostic::error(ErrorCode::E2011)
                    .with_message(format!(
                        "{what} have no common type: `{}` and `{}`",
                        r.program.type_name(common),
                        r.program.type_name(ty)
                    ))
                    .with_label(r.program.arena.span(e), "incompatible element")
                    .with_secondary_label(span, "in this literal");
                r.report(diag);
                return None;
            }
        }
    }
    Some(common)
}
