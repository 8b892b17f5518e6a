//! Expressions as lvalues, and assignment.

use dex_ir::scalar;
use dex_ir::{AssignOp, BinaryOp, ExprId, ExprKind, IncDec, Scalar, Span, TypeId, VarId};
use dex_stack::ensure_sufficient_stack;

use super::{Goal, Interpreter};
use crate::environment::Storage;
use crate::errors::{CtfeErrorKind, CtfeResult};
use crate::value::{ArrayValue, AssocValue, Place, Value};

impl Interpreter<'_> {
    /// The location `id` denotes. Expressions that are not lvalues are
    /// evaluated into a temporary.
    pub(crate) fn place(&mut self, id: ExprId) -> CtfeResult<Place> {
        ensure_sufficient_stack(|| self.place_inner(id))
    }

    fn place_inner(&mut self, id: ExprId) -> CtfeResult<Place> {
        let span = self.program.arena.span(id);
        match self.program.arena.kind(id) {
            ExprKind::Var(var) => self.var_place(var, span),
            ExprKind::This => self.this_place(span),
            ExprKind::Deref(operand) => match self.eval(operand, Goal::Value)? {
                Value::Pointer { target, .. } => Ok(target),
                Value::Null(_) => Err(self.fatal(CtfeErrorKind::NullDereference, span)),
                other => Err(self.unsupported(
                    format!("cannot dereference a `{}`", self.program.type_name(other.ty())),
                    span,
                )),
            },
            ExprKind::DotVar { base, var } => {
                if self.is_instance_field(var) {
                    self.field_place(base, var, span)
                } else {
                    self.var_place(var, span)
                }
            }
            ExprKind::Index { base, index } if self.program.types.is_assoc_array(self.program.arena.ty(base)) => {
                self.entry_place(base, index, span)
            }
            ExprKind::Index { base, index } => {
                let base = self.eval(base, Goal::Value)?;
                self.element_place(base, index, span)
            }
            ExprKind::Comma { left, right } => {
                self.eval(left, Goal::Effect)?;
                self.place(right)
            }
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval(cond, Goal::Value)?.truthy() {
                    self.place(then_expr)
                } else {
                    self.place(else_expr)
                }
            }
            ExprKind::Cast { operand, to }
                if self.program.types.strip(to) == self.program.types.strip(self.program.arena.ty(operand)) =>
            {
                self.place(operand)
            }
            ExprKind::Call { .. } => {
                self.ref_return = None;
                let value = self.eval(id, Goal::Value)?;
                Ok(self.ref_return.take().unwrap_or_else(|| value.temporary()))
            }
            ExprKind::Declaration(var) => {
                self.declare(var, span)?;
                self.var_place(var, span)
            }
            ExprKind::Assign { op, target, value } => self.assign(op, target, value, span),
            ExprKind::PreIncDec { op, operand } => Ok(self.inc_dec(op, operand, span)?.0),
            _ => Ok(self.eval(id, Goal::Value)?.temporary()),
        }
    }

    fn var_place(&mut self, var: VarId, span: Span) -> CtfeResult<Place> {
        match self.lookup(var) {
            Some(place) => Ok(place),
            None => Ok(self.read_var(var, span)?.temporary()),
        }
    }

    /// Field `var` of the struct or class `base` evaluates to; pointers
    /// to structs are followed.
    pub(crate) fn field_place(&mut self, base: ExprId, var: VarId, span: Span) -> CtfeResult<Place> {
        let mut object = self.eval(base, Goal::Value)?;
        if let Value::Pointer { target, .. } = &object {
            object = self.read_place(target, span)?;
        }
        match object {
            Value::Struct(s) => match self.program.decls.field_index(s.agg, var) {
                Some(index) => Ok(s.field_place(index)),
                None => Err(self.unsupported(
                    format!(
                        "`{}` is not a field of `{}`",
                        self.program.text(self.program.decls.var(var).name),
                        self.program.type_name(s.ty)
                    ),
                    span,
                )),
            },
            Value::Null(_) => Err(self.fatal(CtfeErrorKind::NullDereference, span)),
            other => Err(self.unsupported(
                format!("`{}` has no fields", self.program.type_name(other.ty())),
                span,
            )),
        }
    }

    /// `aa[key]` as a place; a null associative array is created on the
    /// spot so that assigning through the place inserts.
    fn entry_place(&mut self, base: ExprId, index: ExprId, span: Span) -> CtfeResult<Place> {
        let base_place = self.place(base)?;
        let aa = match self.read_place(&base_place, span)? {
            Value::Assoc(aa) => aa,
            Value::Null(_) => {
                let aa = AssocValue::empty(self.program.arena.ty(base));
                base_place.write(Value::Assoc(aa.clone()));
                aa
            }
            other => {
                return Err(self.unsupported(
                    format!("cannot index a `{}` by key", self.program.type_name(other.ty())),
                    span,
                ))
            }
        };
        let key = self.eval(index, Goal::Value)?.copied(&self.program.types);
        Ok(Place::Entry {
            entries: aa.entries,
            key: Box::new(key),
        })
    }

    /// Element `index` of an array or of the array a pointer points into,
    /// bounds-checked.
    pub(crate) fn element_place(&mut self, base: Value, index: ExprId, span: Span) -> CtfeResult<Place> {
        let index = self.eval(index, Goal::Value)?;
        let i = self.to_index(&index, span)?;
        let out_of_bounds = |this: &Self, len: usize| {
            this.fatal(CtfeErrorKind::IndexOutOfBounds { index: i, len }, span)
        };
        match base {
            Value::Array(array) => match usize::try_from(i) {
                Ok(i) if i < array.len => Ok(array.element_place(i)),
                _ => Err(out_of_bounds(self, array.len)),
            },
            Value::Null(_) => Err(out_of_bounds(self, 0)),
            Value::Pointer {
                target: Place::Element { data, index: start },
                ..
            } => {
                let len = data.borrow().len();
                match usize::try_from(start as i128 + i) {
                    Ok(pos) if pos < len => Ok(Place::Element { data, index: pos }),
                    _ => Err(out_of_bounds(self, len - start.min(len))),
                }
            }
            Value::Pointer { target, .. } if i == 0 => Ok(target),
            Value::Pointer { .. } => Err(out_of_bounds(self, 1)),
            other => Err(self.unsupported(
                format!("cannot index a `{}`", self.program.type_name(other.ty())),
                span,
            )),
        }
    }

    /// Perform `target op= value` and return the place assigned to.
    pub(crate) fn assign(&mut self, op: AssignOp, target: ExprId, value: ExprId, span: Span) -> CtfeResult<Place> {
        if let ExprKind::ArrayLength(base) = self.program.arena.kind(target) {
            return self.assign_length(op, base, value, span);
        }
        let target_ty = self.program.arena.ty(target);
        let value_ty = self.program.arena.ty(value);
        let rhs = self.eval(value, Goal::Value)?;

        let types = &self.program.types;
        let to_slice = matches!(self.program.arena.kind(target), ExprKind::Slice { .. });
        if to_slice || (types.is_static_array(target_ty) && !types.is_array(value_ty)) {
            return self.assign_elements(op, target, rhs, span);
        }

        let place = self.place(target)?;
        match op.binary_op() {
            None => self.store(&place, rhs, target_ty, span)?,
            Some(BinaryOp::Cat) => {
                let current = self.read_place(&place, span)?;
                let joined = self.concat(current, rhs, target_ty);
                place.write(joined);
            }
            Some(op) => {
                let current = match place.read() {
                    Some(current) => current,
                    None if matches!(place, Place::Entry { .. }) => self.default_value(target_ty, span)?,
                    None => self.read_place(&place, span)?,
                };
                let result = self.compound(op, current, rhs, target_ty, value_ty, span)?;
                self.store(&place, result, target_ty, span)?;
            }
        }
        Ok(place)
    }

    /// `a[] = v`, `a[i .. j] op= b[]` and filling a static array.
    fn assign_elements(&mut self, op: AssignOp, target: ExprId, rhs: Value, span: Span) -> CtfeResult<Place> {
        let target_ty = self.program.arena.ty(target);
        let window = match self.program.arena.kind(target) {
            ExprKind::Slice { .. } => self.eval(target, Goal::Value)?,
            _ => {
                let place = self.place(target)?;
                self.read_place(&place, span)?
            }
        };
        let window = match window {
            Value::Array(array) => array,
            Value::Null(ty) => ArrayValue::fresh(Vec::new(), ty),
            other => {
                return Err(self.unsupported(
                    format!("cannot assign elements of a `{}`", self.program.type_name(other.ty())),
                    span,
                ))
            }
        };
        let source = match op.binary_op() {
            None => rhs,
            Some(op) => self.array_op(op, Value::Array(window.clone()), rhs, target_ty, span)?,
        };
        self.copy_into(&window, &source, span)?;
        Ok(Value::Array(window).temporary())
    }

    /// Overwrite the elements of `window` with `source`, element-wise for
    /// an array and as a fill for anything else.
    fn copy_into(&self, window: &ArrayValue, source: &Value, span: Span) -> CtfeResult<()> {
        let types = &self.program.types;
        let elems: Vec<Value> = match source {
            Value::Array(src) => {
                if src.len != window.len {
                    return Err(self.fatal(
                        CtfeErrorKind::LengthMismatch {
                            left: window.len,
                            right: src.len,
                        },
                        span,
                    ));
                }
                src.elements().iter().map(|e| e.copied(types)).collect()
            }
            Value::Null(_) if types.is_array(source.ty()) || window.len == 0 => {
                if window.len != 0 {
                    return Err(self.fatal(
                        CtfeErrorKind::LengthMismatch {
                            left: window.len,
                            right: 0,
                        },
                        span,
                    ));
                }
                Vec::new()
            }
            fill => (0..window.len).map(|_| fill.copied(types)).collect(),
        };
        let mut data = window.data.borrow_mut();
        for (offset, elem) in elems.into_iter().enumerate() {
            if let Some(slot) = data.get_mut(window.start + offset) {
                *slot = elem;
            }
        }
        Ok(())
    }

    /// Write `value` to `place` with value semantics. A static array or
    /// struct already there is overwritten in place, so pointers into it
    /// observe the new contents.
    pub(crate) fn store(&mut self, place: &Place, value: Value, ty: TypeId, span: Span) -> CtfeResult<()> {
        let types = &self.program.types;
        match (place.read(), &value) {
            (Some(Value::Array(dst)), Value::Array(_)) if types.is_static_array(dst.ty) => {
                return self.copy_into(&dst, &value, span);
            }
            (Some(Value::Struct(dst)), Value::Struct(src)) if !types.is_class(dst.ty) && dst.agg == src.agg => {
                let fields: Vec<Value> = src.fields.borrow().iter().map(|f| f.copied(types)).collect();
                *dst.fields.borrow_mut() = fields;
                return Ok(());
            }
            _ => {}
        }
        let value = self.conform(&value, ty);
        if place.write(value) {
            Ok(())
        } else {
            self.read_place(place, span).map(|_| ())
        }
    }

    /// `target op= rhs` for a single value.
    fn compound(
        &mut self,
        op: BinaryOp,
        current: Value,
        rhs: Value,
        target_ty: TypeId,
        value_ty: TypeId,
        span: Span,
    ) -> CtfeResult {
        let types = &self.program.types;
        if let Value::Pointer { target, ty } = current {
            let delta = self.to_index(&rhs, span)?;
            let delta = if op == BinaryOp::Sub { -delta } else { delta };
            return self.pointer_offset(target, ty, delta, span);
        }
        if types.is_array(target_ty) {
            return self.array_op(op, current, rhs, target_ty, span);
        }
        let common = types.arithmetic_common(target_ty, value_ty).unwrap_or(target_ty);
        let result = self.arith(op, current, rhs, common, span)?;
        self.cast(result, target_ty, span)
    }

    /// `a.length = n`: shrinking keeps the storage, growing reallocates
    /// and pads with default elements.
    fn assign_length(&mut self, op: AssignOp, base: ExprId, value: ExprId, span: Span) -> CtfeResult<Place> {
        let requested = self.eval(value, Goal::Value)?;
        let requested = self.to_index(&requested, span)?;
        let place = self.place(base)?;
        let array_ty = self.program.arena.ty(base);
        let current = self.read_place(&place, span)?;
        let (elems, len) = match &current {
            Value::Array(array) => (Some(array.clone()), array.len),
            Value::Null(_) => (None, 0),
            other => {
                return Err(self.unsupported(
                    format!("cannot set the length of a `{}`", self.program.type_name(other.ty())),
                    span,
                ))
            }
        };
        let new_len = match op.binary_op() {
            None => requested,
            Some(op) => {
                let kind = self.program.types.num_kind(TypeId::SIZE_T);
                let result = kind.and_then(|kind| {
                    scalar::binary(op, kind, Scalar::Int(len as u64), Scalar::Int(requested as u64)).ok()
                });
                match result {
                    Some(Scalar::Int(n)) => i128::from(n),
                    _ => -1,
                }
            }
        };
        let Ok(new_len) = usize::try_from(new_len) else {
            return Err(self.fatal(
                CtfeErrorKind::SliceOutOfBounds {
                    lower: 0,
                    upper: new_len,
                    len,
                },
                span,
            ));
        };
        let resized = match elems {
            Some(array) if new_len <= array.len => ArrayValue { len: new_len, ..array },
            existing => {
                let mut values = existing.map(|array| array.elements()).unwrap_or_default();
                let elem_ty = self.program.types.elem_raw(array_ty).unwrap_or(TypeId::ERROR);
                while values.len() < new_len {
                    values.push(self.default_value(elem_ty, span)?);
                }
                ArrayValue::fresh(values, array_ty)
            }
        };
        place.write(Value::Array(resized));
        Ok(Value::size(new_len).temporary())
    }

    /// Apply `++`/`--` to `operand`; returns the place and the old value.
    pub(crate) fn inc_dec(&mut self, op: IncDec, operand: ExprId, span: Span) -> CtfeResult<(Place, Value)> {
        let place = self.place(operand)?;
        let old = self.read_place(&place, span)?;
        let ty = self.program.arena.ty(operand);
        let new = match &old {
            Value::Pointer { target, ty } => {
                let delta = if op == IncDec::Inc { 1 } else { -1 };
                self.pointer_offset(target.clone(), *ty, delta, span)?
            }
            _ => self.arith(op.binary_op(), old.clone(), Value::int(1, TypeId::INT), ty, span)?,
        };
        place.write(new);
        Ok((place, old))
    }

    /// Bind a local declaration to fresh storage, or to its referent for a
    /// `ref` local. Manifest constants and statics need no binding.
    pub(crate) fn declare(&mut self, var: VarId, span: Span) -> CtfeResult<()> {
        let decl = self.program.decls.var(var);
        if decl.is_manifest() || decl.is_global() {
            return Ok(());
        }
        let (init, ty, is_ref) = (decl.init, decl.ty, decl.is_ref());
        let place = if is_ref && init.is_valid() {
            self.place(init)?
        } else {
            let value = if init.is_valid() {
                self.eval(init, Goal::Value)?
            } else {
                self.default_value(ty, span)?
            };
            Place::Slot(Storage::new(self.conform(&value, ty)))
        };
        self.bind(var, place);
        Ok(())
    }
}
