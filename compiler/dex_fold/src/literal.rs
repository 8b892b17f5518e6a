//! Operator rules over literal operands.
//!
//! Each helper returns `None` when the operands are not literals it
//! understands, or when the operation would fault (division by zero, an
//! index out of range). The caller then keeps the unfolded node and the
//! interpreter reports the fault if the expression is ever evaluated.

use dex_ir::scalar::{self, Scalar};
use dex_ir::{BinaryOp, ExprId, ExprKind, Program, Span, TypeId, UnaryOp, VarId};

/// A tree made only of literals: safe to share, nothing left to evaluate.
pub fn is_literal_tree(program: &Program, id: ExprId) -> bool {
    if !id.is_valid() {
        return false;
    }
    match program.arena.kind(id) {
        ExprKind::Int(_)
        | ExprKind::Real(_)
        | ExprKind::Complex { .. }
        | ExprKind::String { .. }
        | ExprKind::Null
        | ExprKind::SymOff { .. } => true,
        ExprKind::ArrayLiteral(elems) => program.arena.list(elems).iter().all(|&e| is_literal_tree(program, e)),
        ExprKind::AssocArrayLiteral { keys, values } => program
            .arena
            .list(keys)
            .iter()
            .chain(program.arena.list(values))
            .all(|&e| is_literal_tree(program, e)),
        ExprKind::StructLiteral { elements, .. } => program
            .arena
            .list(elements)
            .iter()
            .all(|&e| !e.is_valid() || is_literal_tree(program, e)),
        _ => false,
    }
}

fn index_of(program: &Program, id: ExprId) -> Option<usize> {
    match program.scalar_of(id)? {
        (Scalar::Int(v), kind) if !kind.is_signed() || (v as i64) >= 0 => usize::try_from(v).ok(),
        _ => None,
    }
}

pub(crate) fn unary(program: &mut Program, op: UnaryOp, operand: ExprId, ty: TypeId, span: Span) -> Option<ExprId> {
    let (value, kind) = program.scalar_of(operand)?;
    let result_kind = program.types.num_kind(ty)?;
    let result = match op {
        UnaryOp::Not => scalar::unary(op, kind, value).ok()?,
        UnaryOp::Neg | UnaryOp::Com | UnaryOp::UAdd => {
            scalar::unary(op, result_kind, scalar::cast(value, kind, result_kind)).ok()?
        }
    };
    Some(program.scalar_lit(result, ty, span))
}

pub(crate) fn binary(
    program: &mut Program,
    op: BinaryOp,
    left: ExprId,
    right: ExprId,
    ty: TypeId,
    span: Span,
) -> Option<ExprId> {
    if op == BinaryOp::Cat {
        return concat(program, left, right, ty, span);
    }
    if op.is_logical() || op == BinaryOp::In {
        return None;
    }
    if op.is_equality() {
        if let (Some((a, wa)), Some((b, wb))) = (program.string_of(left), program.string_of(right)) {
            if wa == wb {
                return Some(program.bool_lit((a == b) == (op == BinaryOp::Eq), span));
            }
        }
    }
    let (lv, lk) = program.scalar_of(left)?;
    let (rv, rk) = program.scalar_of(right)?;
    if op.yields_bool() {
        let common = program
            .types
            .arithmetic_common(program.arena.ty(left), program.arena.ty(right))
            .and_then(|t| program.types.num_kind(t))
            .unwrap_or(lk);
        let holds = scalar::compare(op, common, scalar::cast(lv, lk, common), scalar::cast(rv, rk, common)).ok()?;
        return Some(program.bool_lit(holds, span));
    }
    let kind = program.types.num_kind(ty)?;
    let lhs = scalar::cast(lv, lk, kind);
    // The shift amount keeps its own type.
    let rhs = if op.is_shift() { rv } else { scalar::cast(rv, rk, kind) };
    let value = scalar::binary(op, kind, lhs, rhs).ok()?;
    Some(program.scalar_lit(value, ty, span))
}

fn concat(program: &mut Program, left: ExprId, right: ExprId, ty: TypeId, span: Span) -> Option<ExprId> {
    match (program.arena.kind(left), program.arena.kind(right)) {
        (
            ExprKind::String {
                value: a,
                width,
                committed: ca,
            },
            ExprKind::String {
                value: b,
                width: wb,
                committed: cb,
            },
        ) if width == wb => {
            let text = format!("{}{}", program.text(a), program.text(b));
            Some(program.string_lit(&text, width, ca || cb, ty, span))
        }
        (ExprKind::String { value, width, committed }, ExprKind::Int(unit)) => {
            let mut units = width.encode(program.text(value));
            units.push(u32::try_from(unit).ok()?);
            let text = width.decode(&units)?;
            Some(program.string_lit(&text, width, committed, ty, span))
        }
        (ExprKind::Int(unit), ExprKind::String { value, width, committed }) => {
            let mut units = vec![u32::try_from(unit).ok()?];
            units.extend(width.encode(program.text(value)));
            let text = width.decode(&units)?;
            Some(program.string_lit(&text, width, committed, ty, span))
        }
        (ExprKind::ArrayLiteral(a), ExprKind::ArrayLiteral(b)) => {
            let mut elems = program.arena.list_vec(a);
            elems.extend_from_slice(program.arena.list(b));
            let range = program.arena.alloc_list(elems);
            Some(program.arena.alloc_typed(ExprKind::ArrayLiteral(range), span, ty))
        }
        _ => None,
    }
}

pub(crate) fn index(program: &mut Program, base: ExprId, index: ExprId, ty: TypeId, span: Span) -> Option<ExprId> {
    let i = index_of(program, index)?;
    match program.arena.kind(base) {
        ExprKind::String { value, width, .. } => {
            let unit = *width.encode(program.text(value)).get(i)?;
            Some(program.int_lit(u64::from(unit), ty, span))
        }
        ExprKind::ArrayLiteral(elems) => {
            let list = program.arena.list(elems);
            if list.iter().any(|&e| program.has_side_effects(e)) {
                return None;
            }
            list.get(i).copied()
        }
        _ => None,
    }
}

fn bound(program: &Program, id: ExprId, default: usize) -> Option<usize> {
    if id.is_valid() {
        index_of(program, id)
    } else {
        Some(default)
    }
}

pub(crate) fn slice(
    program: &mut Program,
    base: ExprId,
    lower: ExprId,
    upper: ExprId,
    ty: TypeId,
    span: Span,
) -> Option<ExprId> {
    match program.arena.kind(base) {
        ExprKind::String { value, width, committed } => {
            let units = width.encode(program.text(value));
            let lo = bound(program, lower, 0)?;
            let hi = bound(program, upper, units.len())?;
            if lo > hi || hi > units.len() {
                return None;
            }
            let text = width.decode(&units[lo..hi])?;
            Some(program.string_lit(&text, width, committed, ty, span))
        }
        ExprKind::ArrayLiteral(elems) => {
            let list = program.arena.list_vec(elems);
            let lo = bound(program, lower, 0)?;
            let hi = bound(program, upper, list.len())?;
            if lo > hi || hi > list.len() || list.iter().any(|&e| program.has_side_effects(e)) {
                return None;
            }
            let range = program.arena.alloc_list(list[lo..hi].iter().copied());
            Some(program.arena.alloc_typed(ExprKind::ArrayLiteral(range), span, ty))
        }
        _ => None,
    }
}

pub(crate) fn length(program: &mut Program, base: ExprId, ty: TypeId, span: Span) -> Option<ExprId> {
    if program.has_side_effects(base) {
        return None;
    }
    let len = match program.arena.kind(base) {
        ExprKind::String { value, width, .. } => width.encode(program.text(value)).len() as u64,
        ExprKind::ArrayLiteral(elems) => elems.len() as u64,
        _ => program.types.static_len(program.arena.ty(base))?,
    };
    Some(program.int_lit(len, ty, span))
}

pub(crate) fn field(program: &mut Program, base: ExprId, var: VarId, span: Span) -> Option<ExprId> {
    let ExprKind::StructLiteral { agg, elements, .. } = program.arena.kind(base) else {
        return None;
    };
    let position = program.decls.field_index(agg, var)?;
    let list = program.arena.list(elements);
    if list.iter().any(|&e| e.is_valid() && program.has_side_effects(e)) {
        return None;
    }
    let elem = list.get(position).copied()?;
    if elem.is_valid() {
        return Some(elem);
    }
    let init = program.field_init(var, span);
    is_literal_tree(program, init).then_some(init)
}

pub(crate) fn cast(program: &mut Program, operand: ExprId, to: TypeId, span: Span) -> Option<ExprId> {
    if let Some((value, kind)) = program.scalar_of(operand) {
        let target = program.types.num_kind(to)?;
        return Some(program.scalar_lit(scalar::cast(value, kind, target), to, span));
    }
    match program.arena.kind(operand) {
        ExprKind::Null if program.types.is_reference(to) => Some(program.null_lit(to, span)),
        ExprKind::String { value, width, committed }
            if program.types.is_slice(to) && program.types.string_width(to) == Some(width) =>
        {
            let text = program.text(value);
            Some(program.string_lit(text, width, committed, to, span))
        }
        _ => None,
    }
}

/// Copy a constant's initializer to the place it is used.
///
/// Scalars and strings get a fresh node carrying the use's span and type;
/// aggregate literals are shared, since literals are never written to.
pub(crate) fn relocate(program: &mut Program, init: ExprId, ty: TypeId, span: Span) -> ExprId {
    if let Some((value, kind)) = program.scalar_of(init) {
        if let Some(target) = program.types.num_kind(ty) {
            return program.scalar_lit(scalar::cast(value, kind, target), ty, span);
        }
    }
    match program.arena.kind(init) {
        ExprKind::String { value, width, committed } => {
            let text = program.text(value);
            program.string_lit(text, width, committed, ty, span)
        }
        ExprKind::Null => program.null_lit(ty, span),
        _ => init,
    }
}
