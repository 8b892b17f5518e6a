//! Operators, casts and slicing.
//!
//! Scalar arithmetic goes through `dex_ir::scalar` with the same operand
//! conversions the constant folder applies, so a folded and an interpreted
//! expression agree bit for bit.

use std::cmp::Ordering;

use dex_ir::scalar;
use dex_ir::{BinaryOp, ExprId, Span, TypeId, UnaryOp};

use super::{Goal, Interpreter};
use crate::errors::{CtfeErrorKind, CtfeResult};
use crate::value::{ArrayValue, Place, StructValue, Value};

impl Interpreter<'_> {
    pub(crate) fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId, ty: TypeId, span: Span) -> CtfeResult {
        match op {
            BinaryOp::AndAnd => {
                if !self.eval(left, Goal::Value)?.truthy() {
                    return Ok(Value::bool(false));
                }
                return Ok(Value::bool(self.eval(right, Goal::Value)?.truthy()));
            }
            BinaryOp::OrOr => {
                if self.eval(left, Goal::Value)?.truthy() {
                    return Ok(Value::bool(true));
                }
                return Ok(Value::bool(self.eval(right, Goal::Value)?.truthy()));
            }
            _ => {}
        }
        let lhs = self.eval(left, Goal::Value)?;
        let rhs = self.eval(right, Goal::Value)?;
        self.binary_values(op, lhs, rhs, ty, span)
    }

    pub(crate) fn binary_values(&self, op: BinaryOp, lhs: Value, rhs: Value, ty: TypeId, span: Span) -> CtfeResult {
        if op == BinaryOp::Cat {
            return Ok(self.concat(lhs, rhs, ty));
        }
        if op == BinaryOp::In {
            return match rhs {
                Value::Assoc(aa) => Ok(Value::bool(aa.get(&lhs).is_some())),
                Value::Null(_) => Ok(Value::bool(false)),
                other => Err(self.unsupported(
                    format!("`in` is not defined for `{}`", self.program.type_name(other.ty())),
                    span,
                )),
            };
        }
        if op.is_array_op_capable() && self.program.types.is_array(ty) {
            return self.array_op(op, lhs, rhs, ty, span);
        }
        match (&lhs, &rhs) {
            (Value::Scalar { .. }, Value::Scalar { .. }) if op.yields_bool() => {
                let holds = self.compare(op, &lhs, &rhs, span)?;
                Ok(Value::bool(holds))
            }
            (Value::Scalar { .. }, Value::Scalar { .. }) => self.arith(op, lhs, rhs, ty, span),
            (Value::Pointer { target, ty: ptr_ty }, Value::Scalar { .. })
                if matches!(op, BinaryOp::Add | BinaryOp::Sub) =>
            {
                let delta = self.to_index(&rhs, span)?;
                let delta = if op == BinaryOp::Sub { -delta } else { delta };
                self.pointer_offset(target.clone(), *ptr_ty, delta, span)
            }
            (Value::Scalar { .. }, Value::Pointer { target, ty: ptr_ty }) if op == BinaryOp::Add => {
                let delta = self.to_index(&lhs, span)?;
                self.pointer_offset(target.clone(), *ptr_ty, delta, span)
            }
            (Value::Pointer { target: a, .. }, Value::Pointer { target: b, .. }) if op == BinaryOp::Sub => {
                match (a, b) {
                    (Place::Element { data: x, index: i }, Place::Element { data: y, index: j }) if x.ptr_eq(y) => {
                        let diff = *i as i64 - *j as i64;
                        Ok(Value::int(diff as u64, ty))
                    }
                    _ if a.same(b) => Ok(Value::int(0, ty)),
                    _ => Err(self.unsupported("subtracting pointers into different memory blocks", span)),
                }
            }
            _ if op.is_equality() => Ok(Value::bool(lhs.same_value(&rhs) == (op == BinaryOp::Eq))),
            _ if op.is_identity() => Ok(Value::bool(lhs.identical(&rhs) == (op == BinaryOp::Is))),
            _ if op.is_relational() => match self.ordering(&lhs, &rhs) {
                Some(ordering) => Ok(Value::bool(match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                })),
                None => Err(self.unsupported(
                    format!(
                        "cannot order `{}` and `{}` at compile time",
                        self.program.type_name(lhs.ty()),
                        self.program.type_name(rhs.ty())
                    ),
                    span,
                )),
            },
            _ => Err(self.unsupported(
                format!(
                    "operator `{}` on `{}` and `{}`",
                    op.as_symbol(),
                    self.program.type_name(lhs.ty()),
                    self.program.type_name(rhs.ty())
                ),
                span,
            )),
        }
    }

    /// Arithmetic on two scalars in the numeric kind of `ty`. The shift
    /// amount keeps its own kind.
    pub(crate) fn arith(&self, op: BinaryOp, lhs: Value, rhs: Value, ty: TypeId, span: Span) -> CtfeResult {
        let types = &self.program.types;
        let (Value::Scalar { value: lv, ty: lt }, Value::Scalar { value: rv, ty: rt }) = (&lhs, &rhs) else {
            return Err(self.unsupported(
                format!("operator `{}` needs scalar operands", op.as_symbol()),
                span,
            ));
        };
        let (Some(kind), Some(lk), Some(rk)) = (types.num_kind(ty), types.num_kind(*lt), types.num_kind(*rt)) else {
            return Err(self.unsupported(
                format!("operator `{}` on `{}`", op.as_symbol(), self.program.type_name(ty)),
                span,
            ));
        };
        let left = scalar::cast(*lv, lk, kind);
        let right = if op.is_shift() { *rv } else { scalar::cast(*rv, rk, kind) };
        match scalar::binary(op, kind, left, right) {
            Ok(value) => Ok(Value::Scalar { value, ty }),
            Err(err) => Err(self.fatal(CtfeErrorKind::from_scalar(err), span)),
        }
    }

    /// Comparison of two scalars in their common arithmetic kind.
    fn compare(&self, op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> CtfeResult<bool> {
        let types = &self.program.types;
        let (Value::Scalar { value: lv, ty: lt }, Value::Scalar { value: rv, ty: rt }) = (lhs, rhs) else {
            return Ok(false);
        };
        let (Some(lk), Some(rk)) = (types.num_kind(*lt), types.num_kind(*rt)) else {
            return Err(self.unsupported(format!("operator `{}` on non-numeric operands", op.as_symbol()), span));
        };
        let kind = types
            .arithmetic_common(*lt, *rt)
            .and_then(|t| types.num_kind(t))
            .unwrap_or(lk);
        scalar::compare(op, kind, scalar::cast(*lv, lk, kind), scalar::cast(*rv, rk, kind))
            .map_err(|err| self.fatal(CtfeErrorKind::from_scalar(err), span))
    }

    /// Lexicographic order of scalars, strings and arrays.
    fn ordering(&self, lhs: &Value, rhs: &Value) -> Option<Ordering> {
        match (lhs, rhs) {
            (Value::Scalar { .. }, Value::Scalar { .. }) => {
                let span = Span::DUMMY;
                if self.compare(BinaryOp::Lt, lhs, rhs, span).ok()? {
                    Some(Ordering::Less)
                } else if self.compare(BinaryOp::Eq, lhs, rhs, span).ok()? {
                    Some(Ordering::Equal)
                } else if self.compare(BinaryOp::Gt, lhs, rhs, span).ok()? {
                    Some(Ordering::Greater)
                } else {
                    None
                }
            }
            _ => {
                let (a, b) = (elements_of(lhs)?, elements_of(rhs)?);
                for (x, y) in a.iter().zip(&b) {
                    match self.ordering(x, y)? {
                        Ordering::Equal => {}
                        unequal => return Some(unequal),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
        }
    }

    /// `a ~ b`: either side may be an array or a single element. The
    /// result always has fresh storage.
    pub(crate) fn concat(&self, lhs: Value, rhs: Value, ty: TypeId) -> Value {
        let elem_ty = self.program.types.elem_raw(ty);
        let mut elems = self.concat_part(lhs, elem_ty);
        elems.extend(self.concat_part(rhs, elem_ty));
        Value::Array(ArrayValue::fresh(elems, ty))
    }

    fn concat_part(&self, value: Value, elem_ty: Option<TypeId>) -> Vec<Value> {
        let types = &self.program.types;
        let is_element = match &value {
            Value::Null(_) => false,
            Value::Array(array) => elem_ty.is_some_and(|elem| types.strip(array.ty) == types.strip(elem)),
            _ => true,
        };
        if is_element {
            return vec![value.copied(types)];
        }
        match value {
            Value::Array(array) => array.elements().iter().map(|e| e.copied(types)).collect(),
            _ => Vec::new(),
        }
    }

    /// Element-wise `a[] op b[]`; a scalar side is broadcast.
    pub(crate) fn array_op(&self, op: BinaryOp, lhs: Value, rhs: Value, ty: TypeId, span: Span) -> CtfeResult {
        let elem_ty = self.program.types.elem_raw(ty).unwrap_or(TypeId::ERROR);
        let (left, right) = (elements_of(&lhs), elements_of(&rhs));
        let len = match (&left, &right) {
            (Some(a), Some(b)) if a.len() != b.len() => {
                return Err(self.fatal(
                    CtfeErrorKind::LengthMismatch {
                        left: a.len(),
                        right: b.len(),
                    },
                    span,
                ))
            }
            (Some(a), _) => a.len(),
            (None, Some(b)) => b.len(),
            (None, None) => return self.arith(op, lhs, rhs, elem_ty, span),
        };
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let a = pick(&left, &lhs, i);
            let b = pick(&right, &rhs, i);
            let value = if self.program.types.is_array(elem_ty) {
                self.array_op(op, a, b, elem_ty, span)?
            } else {
                self.arith(op, a, b, elem_ty, span)?
            };
            out.push(value);
        }
        Ok(Value::Array(ArrayValue::fresh(out, ty)))
    }

    pub(crate) fn unary(&self, op: UnaryOp, value: Value, ty: TypeId, span: Span) -> CtfeResult {
        let types = &self.program.types;
        match value {
            Value::Scalar { value, ty: from } => {
                let Some(from_kind) = types.num_kind(from) else {
                    return Err(self.unsupported(
                        format!("operator `{}` on `{}`", op.as_symbol(), self.program.type_name(from)),
                        span,
                    ));
                };
                let result = match op {
                    UnaryOp::Not => scalar::unary(op, from_kind, value),
                    UnaryOp::Neg | UnaryOp::Com | UnaryOp::UAdd => {
                        let kind = types.num_kind(ty).unwrap_or(from_kind);
                        scalar::unary(op, kind, scalar::cast(value, from_kind, kind))
                    }
                };
                match result {
                    Ok(value) => Ok(Value::Scalar { value, ty }),
                    Err(err) => Err(self.fatal(CtfeErrorKind::from_scalar(err), span)),
                }
            }
            Value::Array(array) if op != UnaryOp::Not && types.is_array(ty) => {
                let elem_ty = types.elem_raw(ty).unwrap_or(TypeId::ERROR);
                let mut out = Vec::with_capacity(array.len);
                for elem in array.elements() {
                    out.push(self.unary(op, elem, elem_ty, span)?);
                }
                Ok(Value::Array(ArrayValue::fresh(out, ty)))
            }
            other if op == UnaryOp::Not => Ok(Value::bool(!other.truthy())),
            other => Err(self.unsupported(
                format!("operator `{}` on `{}`", op.as_symbol(), self.program.type_name(other.ty())),
                span,
            )),
        }
    }

    /// `cast(to) value`.
    pub(crate) fn cast(&self, value: Value, to: TypeId, span: Span) -> CtfeResult {
        let types = &self.program.types;
        if types.is_void(to) {
            return Ok(Value::Void);
        }
        let from = value.ty();
        match value {
            Value::Scalar { value, ty } => match (types.num_kind(ty), types.num_kind(to)) {
                (Some(from_kind), Some(to_kind)) => Ok(Value::Scalar {
                    value: scalar::cast(value, from_kind, to_kind),
                    ty: to,
                }),
                _ if types.is_reference(to) && !value.is_true() => Ok(Value::Null(to)),
                _ => Err(self.invalid_cast(from, to, span)),
            },
            other if types.is_bool(to) => Ok(Value::bool(other.truthy())),
            Value::Null(_) => Ok(Value::Null(to)),
            Value::Array(array) if types.is_array(to) => {
                let same_elems = match (types.elem_raw(array.ty), types.elem_raw(to)) {
                    (Some(a), Some(b)) => types.strip(a) == types.strip(b),
                    _ => false,
                };
                let fits = types.static_len(to).map_or(true, |len| len == array.len as u64);
                if same_elems && fits {
                    Ok(Value::Array(ArrayValue { ty: to, ..array }))
                } else {
                    Err(self.invalid_cast(from, to, span))
                }
            }
            Value::Struct(s) if types.aggregate(to).is_some_and(|(_, agg)| agg == s.agg) => {
                Ok(Value::Struct(StructValue { ty: to, ..s }))
            }
            Value::Pointer { target, .. } if types.is_pointer(to) => Ok(Value::Pointer { target, ty: to }),
            Value::Func { func, .. } if types.is_function(to) || types.is_pointer(to) => Ok(Value::Func { func, ty: to }),
            Value::Assoc(aa) if types.is_assoc_array(to) => {
                Ok(Value::Assoc(crate::value::AssocValue { ty: to, ..aa }))
            }
            other if types.strip(other.ty()) == types.strip(to) => Ok(other),
            _ => Err(self.invalid_cast(from, to, span)),
        }
    }

    fn invalid_cast(&self, from: TypeId, to: TypeId, span: Span) -> crate::errors::Interrupt {
        self.fatal(
            CtfeErrorKind::InvalidCast {
                from: self.program.type_name(from),
                to: self.program.type_name(to),
            },
            span,
        )
    }

    /// `base[lower .. upper]`: a window sharing the base's storage.
    pub(crate) fn slice(&mut self, base: ExprId, lower: ExprId, upper: ExprId, ty: TypeId, span: Span) -> CtfeResult {
        let base = self.eval(base, Goal::Value)?;
        let (data, start, len) = match base {
            Value::Array(array) => (Some(array.data), array.start, array.len),
            Value::Null(_) => (None, 0, 0),
            Value::Pointer {
                target: Place::Element { data, index },
                ..
            } => {
                let len = data.borrow().len().saturating_sub(index);
                (Some(data), index, len)
            }
            other => {
                return Err(self.unsupported(
                    format!("cannot slice a `{}`", self.program.type_name(other.ty())),
                    span,
                ))
            }
        };
        let lo = if lower.is_valid() {
            let lo = self.eval(lower, Goal::Value)?;
            self.to_index(&lo, span)?
        } else {
            0
        };
        let hi = if upper.is_valid() {
            let hi = self.eval(upper, Goal::Value)?;
            self.to_index(&hi, span)?
        } else {
            len as i128
        };
        if lo < 0 || hi < lo || hi > len as i128 {
            return Err(self.fatal(
                CtfeErrorKind::SliceOutOfBounds {
                    lower: lo,
                    upper: hi,
                    len,
                },
                span,
            ));
        }
        let (lo, hi) = (lo as usize, hi as usize);
        match data {
            Some(data) => Ok(Value::Array(ArrayValue {
                data,
                start: start + lo,
                len: hi - lo,
                ty,
            })),
            None => Ok(Value::Null(ty)),
        }
    }

    /// A pointer `delta` elements away from `target`. Pointing one past
    /// the last element is allowed; dereferencing it is not.
    pub(crate) fn pointer_offset(&self, target: Place, ty: TypeId, delta: i128, span: Span) -> CtfeResult {
        match target {
            Place::Element { data, index } => {
                let len = data.borrow().len();
                let pos = index as i128 + delta;
                if pos < 0 || pos > len as i128 {
                    return Err(self.fatal(CtfeErrorKind::IndexOutOfBounds { index: pos, len }, span));
                }
                Ok(Value::Pointer {
                    target: Place::Element {
                        data,
                        index: pos as usize,
                    },
                    ty,
                })
            }
            target if delta == 0 => Ok(Value::Pointer { target, ty }),
            _ => Err(self.unsupported("pointer arithmetic outside an array", span)),
        }
    }
}

/// Elements of an array value; `null` is the empty array.
fn elements_of(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(array) => Some(array.elements()),
        Value::Null(_) => Some(Vec::new()),
        _ => None,
    }
}

fn pick(elems: &Option<Vec<Value>>, whole: &Value, index: usize) -> Value {
    match elems {
        Some(elems) => elems.get(index).cloned().unwrap_or(Value::Void),
        None => whole.clone(),
    }
}
