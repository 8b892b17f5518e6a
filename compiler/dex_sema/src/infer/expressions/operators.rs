//! Operators.
//!
//! Aggregate operands are rewritten into calls of their operator members.
//! The operator itself travels as a leading string argument:
//! - `a == b` calls `a.opEquals(b)`, and `a != b` negates it
//! - `a < b` compares `a.opCmp(b)` against zero
//! - `a + b` calls `a.opBinary("+", b)` or `b.opBinaryRight("+", a)`
//! - `-a` and `++a` call `a.opUnary("-")` and `a.opUnary("++")`
//! - `a[i] = v` calls `a.opIndexAssign(v, i)`, `a = v` calls
//!   `a.opAssign(v)` and `a += v` calls `a.opOpAssign("+", v)`
//!
//! Element-wise array operations are only accepted on the right of a
//! slice assignment, `a[] = b[] + c[]`.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{
    AggId, AssignOp, BinaryOp, CharWidth, ExprId, ExprKind, IncDec, MatchLevel, NumKind, Span, TypeId, TypeKind, UnaryOp,
};

use crate::checker::Resolver;
use crate::escape::{check_assign_escape, check_modifiable, local_root};
use crate::infer::call::auto_deref;
use crate::infer::{
    any_error, build_call, conv_level, convert, finish, poisoned, resolve_rvalue, select_overload, to_boolean,
    with_alias_this,
};

/// `receiver.name(args)` when the receiver's aggregate declares `name`.
pub(crate) fn operator_call(
    r: &mut Resolver<'_>,
    receiver: ExprId,
    name: &str,
    args: Vec<ExprId>,
    span: Span,
) -> Option<ExprId> {
    let receiver = auto_deref(r, receiver);
    let (_, agg) = r.program.types.aggregate(r.program.arena.ty(receiver))?;
    r.resolve_aggregate(agg);
    let member = r.program.intern(name);
    let methods = r.program.decls.find_methods(agg, member);
    if methods.is_empty() {
        return None;
    }
    tracing::debug!(
        op = name,
        ty = %r.program.type_name(r.program.arena.ty(receiver)),
        "rewriting operator as a call"
    );
    Some(match select_overload(r, &methods, &args, span, member) {
        Some(func) => build_call(r, func, Some(receiver), args, span, methods.len() > 1),
        None => r.program.error_expr(span),
    })
}

fn op_string(r: &mut Resolver<'_>, symbol: &str, span: Span) -> ExprId {
    r.program
        .string_lit(symbol, CharWidth::One, true, TypeId::STRING, span)
}

fn incompatible(r: &mut Resolver<'_>, symbol: &str, left: TypeId, right: TypeId, span: Span) -> ExprId {
    let diag = Diagnostic::error(ErrorCode::E2011)
        .with_message(format!(
            "incompatible types for `{symbol}`: `{}` and `{}`",
            r.program.type_name(left),
            r.program.type_name(right)
        ))
        .with_label(span, "operator used here");
    r.error_node(diag, span)
}

fn not_lvalue(r: &mut Resolver<'_>, e: ExprId, what: &str, span: Span) -> ExprId {
    let diag = Diagnostic::error(ErrorCode::E2004)
        .with_message(format!(
            "cannot {what} `{}`, which is not an lvalue",
            r.program.expr_to_string(e)
        ))
        .with_label(r.program.arena.span(e), "not an lvalue");
    r.error_node(diag, span)
}

/// Aggregate whose constructor is being resolved, if any.
fn constructing(r: &Resolver<'_>) -> Option<AggId> {
    let ctx = r.func.as_ref()?;
    if r.program.decls.func(ctx.func).is_ctor() {
        ctx.parent
    } else {
        None
    }
}

// Binary operators

pub(crate) fn resolve_binary(r: &mut Resolver<'_>, id: ExprId, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    if op.is_logical() {
        let left = resolve_rvalue(r, left);
        let left = to_boolean(r, left);
        let right = resolve_rvalue(r, right);
        let right = to_boolean(r, right);
        if any_error(r, &[left, right]) {
            return poisoned(r, id);
        }
        return finish(r, id, ExprKind::Binary { op, left, right }, TypeId::BOOL);
    }
    let left = resolve_rvalue(r, left);
    let right = resolve_rvalue(r, right);
    if any_error(r, &[left, right]) {
        return poisoned(r, id);
    }
    binary(r, op, left, right, span)
}

/// `left op right` on resolved operands.
fn binary(r: &mut Resolver<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    let types = &r.program.types;
    let aggregate_operand = types.aggregate(lt).is_some() || types.aggregate(rt).is_some();
    if aggregate_operand && !op.is_identity() {
        if let Some(e) = overloaded_binary(r, op, left, right, span) {
            return e;
        }
    }
    if op.is_array_op_capable() && (r.program.types.is_array(lt) || r.program.types.is_array(rt)) {
        return array_op(r, op, left, right, span);
    }
    match op {
        BinaryOp::Is | BinaryOp::NotIs => identity(r, op, left, right, span),
        BinaryOp::In => membership(r, left, right, span),
        BinaryOp::Cat => concat(r, left, right, span),
        _ if op.is_equality() || op.is_relational() => comparison(r, op, left, right, span),
        _ => arithmetic(r, op, left, right, span),
    }
}

fn overloaded_binary(r: &mut Resolver<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> Option<ExprId> {
    if op.is_equality() {
        let call = match operator_call(r, left, "opEquals", vec![right], span) {
            Some(call) => Some(call),
            None => operator_call(r, right, "opEquals", vec![left], span),
        };
        if let Some(call) = call {
            if op == BinaryOp::Ne {
                let call = to_boolean(r, call);
                let not = ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: call,
                };
                return Some(r.program.arena.alloc_typed(not, span, TypeId::BOOL));
            }
            return Some(to_boolean(r, call));
        }
    } else if op.is_relational() {
        if let Some(call) = operator_call(r, left, "opCmp", vec![right], span) {
            return Some(compare_with_zero(r, op, call, span));
        }
        if let Some(call) = operator_call(r, right, "opCmp", vec![left], span) {
            return Some(compare_with_zero(r, mirrored(op), call, span));
        }
    } else {
        let symbol = op_string(r, op.as_symbol(), span);
        if let Some(call) = operator_call(r, left, "opBinary", vec![symbol, right], span) {
            return Some(call);
        }
        if let Some(call) = operator_call(r, right, "opBinaryRight", vec![symbol, left], span) {
            return Some(call);
        }
    }

    // Two values of the same struct compare field by field.
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    if op.is_equality() && r.program.types.strip(lt) == r.program.types.strip(rt) {
        return None;
    }
    if let Some(e) = with_alias_this(r, left, |r, inner| Some(binary(r, op, inner, right, span))) {
        return Some(e);
    }
    with_alias_this(r, right, |r, inner| Some(binary(r, op, left, inner, span)))
}

/// `a.opCmp(b) op 0`.
fn compare_with_zero(r: &mut Resolver<'_>, op: BinaryOp, call: ExprId, span: Span) -> ExprId {
    if any_error(r, &[call]) {
        return call;
    }
    let zero = r.program.int_lit(0, TypeId::INT, span);
    comparison(r, op, call, zero, span)
}

/// The operator that gives the same answer with its operands swapped.
fn mirrored(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::Le => BinaryOp::Ge,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::Ge => BinaryOp::Le,
        other => other,
    }
}

fn identity(r: &mut Resolver<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    let Some(common) = r.program.types.common_type(lt, rt) else {
        return incompatible(r, op.as_symbol(), lt, rt, span);
    };
    let left = convert(r, left, common, "identity operand");
    let right = convert(r, right, common, "identity operand");
    r.program
        .arena
        .alloc_typed(ExprKind::Binary { op, left, right }, span, TypeId::BOOL)
}

/// `key in aa` is a plain membership test.
fn membership(r: &mut Resolver<'_>, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    let TypeKind::AssocArray { key, .. } = r.program.types.base_kind(rt).clone() else {
        return incompatible(r, "in", lt, rt, span);
    };
    let left = convert(r, left, key, "associative array key");
    r.program.arena.alloc_typed(
        ExprKind::Binary {
            op: BinaryOp::In,
            left,
            right,
        },
        span,
        TypeId::BOOL,
    )
}

fn concat(r: &mut Resolver<'_>, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    let lelem = array_elem(r, lt);
    let relem = array_elem(r, rt);
    let elem = match (lelem, relem) {
        (Some(a), Some(b)) => {
            let types = &r.program.types;
            if types.strip(a) == types.strip(b) {
                if types.qualifier(a) == types.qualifier(b) {
                    a
                } else {
                    types.strip(a)
                }
            } else {
                let slice_a = r.program.types.slice(a);
                let slice_b = r.program.types.slice(b);
                if conv_level(r, right, slice_a) != MatchLevel::NoMatch {
                    a
                } else if conv_level(r, left, slice_b) != MatchLevel::NoMatch {
                    b
                } else {
                    return incompatible(r, "~", lt, rt, span);
                }
            }
        }
        (Some(a), None) if conv_level(r, right, a) != MatchLevel::NoMatch => a,
        (None, Some(b)) if conv_level(r, left, b) != MatchLevel::NoMatch => b,
        _ => return incompatible(r, "~", lt, rt, span),
    };
    let left = concat_operand(r, left, elem);
    let right = concat_operand(r, right, elem);
    let ty = r.program.types.slice(elem);
    r.program.arena.alloc_typed(
        ExprKind::Binary {
            op: BinaryOp::Cat,
            left,
            right,
        },
        span,
        ty,
    )
}

fn array_elem(r: &mut Resolver<'_>, ty: TypeId) -> Option<TypeId> {
    if r.program.types.is_array(ty) {
        r.program.types.elem(ty)
    } else {
        None
    }
}

/// An operand of `~` as either a slice of `elem` or a single `elem`.
fn concat_operand(r: &mut Resolver<'_>, e: ExprId, elem: TypeId) -> ExprId {
    let ty = r.program.arena.ty(e);
    if !r.program.types.is_array(ty) {
        return convert(r, e, elem, "concatenated element");
    }
    let same_elem = r
        .program
        .types
        .elem_raw(ty)
        .is_some_and(|own| r.program.types.strip(own) == r.program.types.strip(elem));
    if same_elem {
        return e;
    }
    let slice = r.program.types.slice(elem);
    convert(r, e, slice, "concatenated array")
}

fn comparison(r: &mut Resolver<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    let types = &r.program.types;
    let common = if types.is_scalar(lt) && types.is_scalar(rt) {
        types.arithmetic_common(lt, rt)
    } else {
        types.common_type(lt, rt)
    };
    let Some(common) = common else {
        return incompatible(r, op.as_symbol(), lt, rt, span);
    };
    if op.is_relational() {
        let types = &r.program.types;
        let unordered =
            types.is_complex(common) || types.is_assoc_array(common) || types.aggregate(common).is_some();
        if unordered {
            let diag = Diagnostic::error(ErrorCode::E2011)
                .with_message(format!(
                    "values of type `{}` have no ordering",
                    r.program.type_name(common)
                ))
                .with_label(span, format!("`{}` used here", op.as_symbol()));
            return r.error_node(diag, span);
        }
    }
    let left = convert(r, left, common, "comparison operand");
    let right = convert(r, right, common, "comparison operand");
    r.program
        .arena
        .alloc_typed(ExprKind::Binary { op, left, right }, span, TypeId::BOOL)
}

fn arithmetic(r: &mut Resolver<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    if matches!(op, BinaryOp::Add | BinaryOp::Sub)
        && (r.program.types.is_pointer(lt) || r.program.types.is_pointer(rt))
    {
        return pointer_arithmetic(r, op, left, right, span);
    }
    if op.is_shift() {
        let types = &r.program.types;
        if !types.is_integral(lt) || !types.is_integral(rt) {
            return incompatible(r, op.as_symbol(), lt, rt, span);
        }
        let result = types.promote(lt);
        let left = convert(r, left, result, "shifted operand");
        return r
            .program
            .arena
            .alloc_typed(ExprKind::Binary { op, left, right }, span, result);
    }
    let Some(common) = r.program.types.arithmetic_common(lt, rt) else {
        return incompatible(r, op.as_symbol(), lt, rt, span);
    };
    if op.is_bitwise() && !r.program.types.is_integral(common) {
        return incompatible(r, op.as_symbol(), lt, rt, span);
    }
    let left = convert(r, left, common, "operand");
    let right = convert(r, right, common, "operand");
    r.program
        .arena
        .alloc_typed(ExprKind::Binary { op, left, right }, span, common)
}

/// `p + n`, `n + p`, `p - n` and `p - q`.
fn pointer_arithmetic(r: &mut Resolver<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    r.check_unsafe(span, "pointer arithmetic");
    let types = &r.program.types;
    let (lp, rp) = (types.is_pointer(lt), types.is_pointer(rt));
    let (left, right, ty) = match (lp, rp) {
        (true, false) if types.is_integral(rt) => {
            let right = convert(r, right, TypeId::PTRDIFF_T, "pointer offset");
            (left, right, lt)
        }
        (false, true) if op == BinaryOp::Add && types.is_integral(lt) => {
            let left = convert(r, left, TypeId::PTRDIFF_T, "pointer offset");
            (left, right, rt)
        }
        (true, true) if op == BinaryOp::Sub && types.strip(lt) == types.strip(rt) => {
            (left, right, TypeId::PTRDIFF_T)
        }
        _ => return incompatible(r, op.as_symbol(), lt, rt, span),
    };
    r.program
        .arena
        .alloc_typed(ExprKind::Binary { op, left, right }, span, ty)
}

/// `a[] op b[]` or `a[] op scalar`, typed as a slice of the element result.
fn array_op(r: &mut Resolver<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) -> ExprId {
    let (lt, rt) = (r.program.arena.ty(left), r.program.arena.ty(right));
    if !r.array_op_allowed {
        let diag = Diagnostic::error(ErrorCode::E2011)
            .with_message(format!(
                "array operation `{} {} {}` needs a slice assignment target",
                r.program.expr_to_string(left),
                op.as_symbol(),
                r.program.expr_to_string(right)
            ))
            .with_label(span, "element-wise operation")
            .with_note("assign it to a slice, as in `a[] = b[] + c[]`");
        return r.error_node(diag, span);
    }
    let le = array_elem(r, lt).unwrap_or(lt);
    let re = array_elem(r, rt).unwrap_or(rt);
    let types = &r.program.types;
    let common = if op.is_shift() {
        (types.is_integral(le) && types.is_integral(re)).then(|| types.promote(le))
    } else {
        types.arithmetic_common(le, re)
    };
    let Some(common) = common.filter(|&c| !op.is_bitwise() || r.program.types.is_integral(c)) else {
        return incompatible(r, op.as_symbol(), lt, rt, span);
    };
    let left = if r.program.types.is_array(lt) {
        left
    } else {
        convert(r, left, common, "array operation operand")
    };
    let right = if r.program.types.is_array(rt) || op.is_shift() {
        right
    } else {
        convert(r, right, common, "array operation operand")
    };
    let ty = r.program.types.slice(common);
    r.program
        .arena
        .alloc_typed(ExprKind::Binary { op, left, right }, span, ty)
}

// Unary operators

pub(crate) fn resolve_unary(r: &mut Resolver<'_>, id: ExprId, op: UnaryOp, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let operand = resolve_rvalue(r, operand);
    if any_error(r, &[operand]) {
        return poisoned(r, id);
    }
    unary(r, op, operand, span)
}

fn unary(r: &mut Resolver<'_>, op: UnaryOp, operand: ExprId, span: Span) -> ExprId {
    if op == UnaryOp::Not {
        let operand = to_boolean(r, operand);
        if any_error(r, &[operand]) {
            return operand;
        }
        return r
            .program
            .arena
            .alloc_typed(ExprKind::Unary { op, operand }, span, TypeId::BOOL);
    }

    let ty = r.program.arena.ty(operand);
    if r.program.types.aggregate(ty).is_some() {
        let symbol = op_string(r, op.as_symbol(), span);
        if let Some(call) = operator_call(r, operand, "opUnary", vec![symbol], span) {
            return call;
        }
        if let Some(e) = with_alias_this(r, operand, |r, inner| Some(unary(r, op, inner, span))) {
            return e;
        }
    }
    if r.program.types.is_array(ty) && r.array_op_allowed {
        if let Some(elem) = array_elem(r, ty) {
            let elem = r.program.types.promote(elem);
            let result = r.program.types.slice(elem);
            return r
                .program
                .arena
                .alloc_typed(ExprKind::Unary { op, operand }, span, result);
        }
    }

    let valid = match (op, r.program.types.num_kind(ty)) {
        (UnaryOp::Com, Some(NumKind::Int { .. })) => true,
        (UnaryOp::Neg | UnaryOp::UAdd, Some(NumKind::Int { .. } | NumKind::Float(_) | NumKind::Complex(_))) => {
            true
        }
        _ => false,
    };
    if !valid {
        let diag = Diagnostic::error(ErrorCode::E2011)
            .with_message(format!(
                "`{}` cannot be applied to a value of type `{}`",
                op.as_symbol(),
                r.program.type_name(ty)
            ))
            .with_label(span, "invalid operand");
        return r.error_node(diag, span);
    }
    let result = r.program.types.promote(ty);
    let operand = convert(r, operand, result, "operand");
    r.program
        .arena
        .alloc_typed(ExprKind::Unary { op, operand }, span, result)
}

/// `++e` is resolved as `e += 1`.
pub(crate) fn resolve_pre_inc_dec(r: &mut Resolver<'_>, id: ExprId, op: IncDec, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let operand = resolve_rvalue(r, operand);
    if any_error(r, &[operand]) {
        return poisoned(r, id);
    }
    let ty = r.program.arena.ty(operand);
    if r.program.types.aggregate(ty).is_some() {
        let symbol = op_string(r, op.as_symbol(), span);
        if let Some(call) = operator_call(r, operand, "opUnary", vec![symbol], span) {
            return call;
        }
    }
    let one = r.program.int_lit(1, TypeId::INT, span);
    let assign_op = match op {
        IncDec::Inc => AssignOp::Add,
        IncDec::Dec => AssignOp::Sub,
    };
    assign(r, assign_op, operand, one, span)
}

pub(crate) fn resolve_post_inc_dec(r: &mut Resolver<'_>, id: ExprId, op: IncDec, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let operand = resolve_rvalue(r, operand);
    if any_error(r, &[operand]) {
        return poisoned(r, id);
    }
    let what = match op {
        IncDec::Inc => "increment",
        IncDec::Dec => "decrement",
    };
    if !r.program.is_lvalue(operand) {
        return not_lvalue(r, operand, what, span);
    }
    let ctor_of = constructing(r);
    if let Err(diag) = check_modifiable(r.program, operand, ctor_of) {
        return r.error_node(diag, span);
    }
    let ty = r.program.arena.ty(operand);
    match r.program.types.num_kind(ty) {
        Some(NumKind::Int { .. } | NumKind::Float(_)) => {}
        _ if r.program.types.is_pointer(ty) => r.check_unsafe(span, "pointer arithmetic"),
        _ => {
            let diag = Diagnostic::error(ErrorCode::E2011)
                .with_message(format!("cannot {what} a value of type `{}`", r.program.type_name(ty)))
                .with_label(span, format!("`{}` used here", op.as_symbol()));
            return r.error_node(diag, span);
        }
    }
    finish(r, id, ExprKind::PostIncDec { op, operand }, ty)
}

// Casts, addresses and dereference

pub(crate) fn resolve_cast(r: &mut Resolver<'_>, id: ExprId, operand: ExprId, to: TypeId) -> ExprId {
    let span = r.program.arena.span(id);
    let to = r.resolve_type(to, span);
    let operand = resolve_rvalue(r, operand);
    if any_error(r, &[operand]) || r.program.types.is_error(to) {
        return poisoned(r, id);
    }
    let from = r.program.arena.ty(operand);
    if conv_level(r, operand, to) != MatchLevel::NoMatch {
        return convert(r, operand, to, "cast");
    }
    if !r.program.types.cast_allowed(from, to) {
        let diag = Diagnostic::error(ErrorCode::E2003)
            .with_message(format!(
                "cannot cast `{}` of type `{}` to `{}`",
                r.program.expr_to_string(operand),
                r.program.type_name(from),
                r.program.type_name(to)
            ))
            .with_label(span, "invalid cast");
        return r.error_node(diag, span);
    }
    let types = &r.program.types;
    let reinterprets = (types.is_pointer(from) && types.is_pointer(to))
        || (types.is_pointer(from) != types.is_pointer(to) && (types.is_integral(from) || types.is_integral(to)));
    if reinterprets {
        r.check_unsafe(span, "casting between pointer types");
    }
    finish(r, id, ExprKind::Cast { operand, to }, to)
}

pub(crate) fn resolve_addr_of(r: &mut Resolver<'_>, id: ExprId, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let operand = resolve_rvalue(r, operand);
    if any_error(r, &[operand]) {
        return poisoned(r, id);
    }
    let kind = r.program.arena.kind(operand);
    if matches!(
        kind,
        ExprKind::Func { .. } | ExprKind::FuncLiteral(_) | ExprKind::DotFunc { .. }
    ) {
        return operand;
    }
    if !r.program.is_lvalue(operand) {
        return not_lvalue(r, operand, "take the address of", span);
    }
    let ty = r.program.arena.ty(operand);
    let ptr = r.program.types.pointer(ty);
    if let ExprKind::Var(var) = kind {
        if r.program.decls.var(var).is_global() {
            return finish(r, id, ExprKind::SymOff { var, offset: 0 }, ptr);
        }
    }
    if local_root(r.program, operand).is_some() || matches!(kind, ExprKind::This) {
        r.check_unsafe(span, "taking the address of a local");
    }
    finish(r, id, ExprKind::AddrOf(operand), ptr)
}

pub(crate) fn resolve_deref(r: &mut Resolver<'_>, id: ExprId, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let operand = resolve_rvalue(r, operand);
    if any_error(r, &[operand]) {
        return poisoned(r, id);
    }
    let ty = r.program.arena.ty(operand);
    if !r.program.types.is_pointer(ty) {
        let diag = Diagnostic::error(ErrorCode::E2003)
            .with_message(format!("cannot dereference a value of type `{}`", r.program.type_name(ty)))
            .with_label(span, "not a pointer");
        return r.error_node(diag, span);
    }
    let elem = r.program.types.elem(ty).unwrap_or(TypeId::ERROR);
    finish(r, id, ExprKind::Deref(operand), elem)
}

pub(crate) fn resolve_delete(r: &mut Resolver<'_>, id: ExprId, operand: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let operand = resolve_rvalue(r, operand);
    if any_error(r, &[operand]) {
        return poisoned(r, id);
    }
    let ty = r.program.arena.ty(operand);
    if !r.program.types.is_class(ty) && !r.program.types.is_pointer(ty) {
        let diag = Diagnostic::error(ErrorCode::E2003)
            .with_message(format!("cannot delete a value of type `{}`", r.program.type_name(ty)))
            .with_label(span, "expected a class reference or a pointer");
        return r.error_node(diag, span);
    }
    r.check_unsafe(span, "`delete`");
    finish(r, id, ExprKind::Delete(operand), TypeId::VOID)
}

pub(crate) fn resolve_cond(
    r: &mut Resolver<'_>,
    id: ExprId,
    cond: ExprId,
    then_expr: ExprId,
    else_expr: ExprId,
) -> ExprId {
    let span = r.program.arena.span(id);
    let cond = resolve_rvalue(r, cond);
    let cond = to_boolean(r, cond);
    let then_expr = resolve_rvalue(r, then_expr);
    let else_expr = resolve_rvalue(r, else_expr);
    if any_error(r, &[cond, then_expr, else_expr]) {
        return poisoned(r, id);
    }
    let (tt, et) = (r.program.arena.ty(then_expr), r.program.arena.ty(else_expr));
    let Some(ty) = r.program.types.common_type(tt, et) else {
        let diag = Diagnostic::error(ErrorCode::E2011)
            .with_message(format!(
                "branches of `?:` have incompatible types `{}` and `{}`",
                r.program.type_name(tt),
                r.program.type_name(et)
            ))
            .with_label(r.program.arena.span(then_expr), "this branch")
            .with_secondary_label(r.program.arena.span(else_expr), "and this one");
        return r.error_node(diag, span);
    };
    let then_expr = convert(r, then_expr, ty, "conditional branch");
    let else_expr = convert(r, else_expr, ty, "conditional branch");
    finish(
        r,
        id,
        ExprKind::Cond {
            cond,
            then_expr,
            else_expr,
        },
        ty,
    )
}

// Assignment

pub(crate) fn resolve_assign(r: &mut Resolver<'_>, id: ExprId, op: AssignOp, target: ExprId, value: ExprId) -> ExprId {
    let span = r.program.arena.span(id);
    let mut target = target;
    if let ExprKind::Index { base, index } = r.program.arena.kind(target) {
        let target_span = r.program.arena.span(target);
        let base = resolve_rvalue(r, base);
        if any_error(r, &[base]) {
            return poisoned(r, id);
        }
        let base_ty = r.program.arena.ty(base);
        if op == AssignOp::Assign && r.program.types.aggregate(base_ty).is_some() {
            let index = resolve_rvalue(r, index);
            let value = resolve_rvalue(r, value);
            if any_error(r, &[index, value]) {
                return poisoned(r, id);
            }
            if let Some(call) = operator_call(r, base, "opIndexAssign", vec![value, index], span) {
                return call;
            }
        }
        target = r
            .program
            .arena
            .alloc_kind(ExprKind::Index { base, index }, target_span);
    }
    // `a.length = n` writes the length; reading it may fold to a literal.
    if let ExprKind::DotId { base, member } = r.program.arena.kind(target) {
        if r.program.text(member) == "length" {
            let target_span = r.program.arena.span(target);
            let base = resolve_rvalue(r, base);
            if any_error(r, &[base]) {
                return poisoned(r, id);
            }
            let base_ty = r.program.arena.ty(base);
            if r.program.types.is_array(base_ty) {
                target = r
                    .program
                    .arena
                    .alloc_typed(ExprKind::ArrayLength(base), target_span, TypeId::SIZE_T);
            } else {
                target = r
                    .program
                    .arena
                    .alloc_kind(ExprKind::DotId { base, member }, target_span);
            }
        }
    }

    let slice_target = matches!(r.program.arena.kind(target), ExprKind::Slice { .. });
    let target = resolve_rvalue(r, target);
    let value = if slice_target {
        r.with_array_ops(true, |r| resolve_rvalue(r, value))
    } else {
        resolve_rvalue(r, value)
    };
    if any_error(r, &[target, value]) {
        return poisoned(r, id);
    }
    assign(r, op, target, value, span)
}

/// `target op value` on resolved operands.
fn assign(r: &mut Resolver<'_>, op: AssignOp, target: ExprId, value: ExprId, span: Span) -> ExprId {
    let target_ty = r.program.arena.ty(target);
    if r.program.types.aggregate(target_ty).is_some() && op != AssignOp::Construct {
        let call = match op.binary_op() {
            None => operator_call(r, target, "opAssign", vec![value], span),
            Some(bop) => {
                let symbol = op_string(r, bop.as_symbol(), span);
                operator_call(r, target, "opOpAssign", vec![symbol, value], span)
            }
        };
        if let Some(call) = call {
            return call;
        }
    }

    // A slice is an rvalue, but assigning through it writes the elements.
    let slice_target = matches!(r.program.arena.kind(target), ExprKind::Slice { .. });
    if !slice_target && !r.program.is_lvalue(target) {
        return not_lvalue(r, target, "assign to", span);
    }
    if op != AssignOp::Construct {
        let ctor_of = constructing(r);
        if let Err(diag) = check_modifiable(r.program, target, ctor_of) {
            return r.error_node(diag, span);
        }
    }

    let value = match op.binary_op() {
        None => assigned_value(r, target, value, slice_target),
        Some(BinaryOp::Cat) => appended_value(r, target, value, span),
        Some(bop) => compound_value(r, bop, target, value, slice_target, span),
    };
    if any_error(r, &[value]) {
        return r.program.error_expr(span);
    }
    if let Err(diag) = check_assign_escape(r.program, target, value) {
        r.report(diag);
    }
    tracing::trace!(op = op.as_symbol(), "assignment resolved");
    r.program
        .arena
        .alloc_typed(ExprKind::Assign { op, target, value }, span, target_ty)
}

/// The right side of `=`. A slice or static array target also accepts a
/// single element, which fills it.
fn assigned_value(r: &mut Resolver<'_>, target: ExprId, value: ExprId, slice_target: bool) -> ExprId {
    let tt = r.program.arena.ty(target);
    let vt = r.program.arena.ty(value);
    let whole_array = slice_target || r.program.types.is_static_array(tt);
    if whole_array && conv_level(r, value, tt) == MatchLevel::NoMatch {
        if let Some(elem) = r.program.types.elem(tt) {
            let same_elems = r
                .program
                .types
                .elem_raw(vt)
                .is_some_and(|v| r.program.types.strip(v) == r.program.types.strip(elem));
            if r.program.types.is_array(vt) && same_elems {
                return value;
            }
            if conv_level(r, value, elem) != MatchLevel::NoMatch {
                return convert(r, value, elem, "array element");
            }
        }
    }
    convert(r, value, tt, "assignment")
}

/// The right side of `~=`: a compatible array or a single element.
fn appended_value(r: &mut Resolver<'_>, target: ExprId, value: ExprId, span: Span) -> ExprId {
    let (tt, vt) = (r.program.arena.ty(target), r.program.arena.ty(value));
    if !r.program.types.is_slice(tt) {
        return incompatible(r, "~=", tt, vt, span);
    }
    let elem = r.program.types.elem(tt).unwrap_or(TypeId::ERROR);
    if conv_level(r, value, tt) != MatchLevel::NoMatch {
        return convert(r, value, tt, "appended array");
    }
    if conv_level(r, value, elem) != MatchLevel::NoMatch {
        return convert(r, value, elem, "appended element");
    }
    let same_elems = r
        .program
        .types
        .elem_raw(vt)
        .is_some_and(|v| r.program.types.strip(v) == r.program.types.strip(elem));
    if r.program.types.is_array(vt) && same_elems {
        return value;
    }
    incompatible(r, "~=", tt, vt, span)
}

/// The right side of `op=`, converted to the type the operation is
/// computed in; the result is converted back to the target's type.
fn compound_value(
    r: &mut Resolver<'_>,
    op: BinaryOp,
    target: ExprId,
    value: ExprId,
    slice_target: bool,
    span: Span,
) -> ExprId {
    let (tt, vt) = (r.program.arena.ty(target), r.program.arena.ty(value));
    let symbol = AssignOp::from_binary(op).map_or("=", AssignOp::as_symbol);
    let lhs = if slice_target {
        array_elem(r, tt).unwrap_or(tt)
    } else {
        tt
    };
    if slice_target && r.program.types.is_array(vt) {
        return value;
    }
    if r.program.types.is_pointer(lhs) && matches!(op, BinaryOp::Add | BinaryOp::Sub) {
        if !r.program.types.is_integral(vt) {
            return incompatible(r, symbol, tt, vt, span);
        }
        r.check_unsafe(span, "pointer arithmetic");
        return convert(r, value, TypeId::PTRDIFF_T, "pointer offset");
    }
    if op.is_shift() {
        if !r.program.types.is_integral(lhs) || !r.program.types.is_integral(vt) {
            return incompatible(r, symbol, tt, vt, span);
        }
        return value;
    }
    let common = r
        .program
        .types
        .arithmetic_common(lhs, vt)
        .filter(|&c| !op.is_bitwise() || r.program.types.is_integral(c));
    let Some(common) = common else {
        return incompatible(r, symbol, tt, vt, span);
    };
    convert(r, value, common, "operand")
}

