//! Calls, constructors and `new`.

use dex_ir::{AggKind, ExprId, ExprKind, ExprRange, FuncAttrs, FuncId, SemaState, Span, StorageClass, TypeId, VarId};

use super::{Goal, Interpreter};
use crate::environment::{Frame, Storage};
use crate::errors::{CannotInterpret, CtfeErrorKind, CtfeResult, Interrupt, UnsupportedReason};
use crate::value::{ArrayValue, Place, StructValue, Value};

impl Interpreter<'_> {
    /// Evaluate `callee(args)`.
    ///
    /// `ref` and `out` parameters bind to the argument's place; the others
    /// bind to a copy, taken as soon as the argument is evaluated.
    pub(crate) fn call(&mut self, callee: ExprId, args: ExprRange, span: Span) -> CtfeResult {
        let (func, this) = match self.program.arena.kind(callee) {
            ExprKind::Func { func, .. } | ExprKind::FuncLiteral(func) => (func, None),
            ExprKind::DotFunc { base, func } => {
                if self.program.decls.func(func).attrs.contains(FuncAttrs::STATIC) {
                    self.eval(base, Goal::Effect)?;
                    (func, None)
                } else {
                    (func, Some(self.receiver(base, span)?))
                }
            }
            _ => match self.eval(callee, Goal::Value)? {
                Value::Func { func, .. } => (func, None),
                Value::Null(_) => return Err(self.fatal(CtfeErrorKind::NullDereference, span)),
                other => {
                    return Err(self.unsupported(
                        format!("cannot call a value of type `{}`", self.program.type_name(other.ty())),
                        span,
                    ))
                }
            },
        };

        let params = self.program.decls.func(func).params.clone();
        let arg_ids = self.program.arena.list_vec(args);
        let mut bound = Vec::with_capacity(params.len());
        for (&param, &arg) in params.iter().zip(&arg_ids) {
            let decl = self.program.decls.var(param);
            let (ty, is_ref, is_out) = (decl.ty, decl.is_ref(), decl.storage.contains(StorageClass::OUT));
            let place = if is_ref {
                let place = self.place(arg)?;
                if is_out {
                    let init = self.default_value(ty, span)?;
                    self.store(&place, init, ty, span)?;
                }
                place
            } else {
                let value = self.eval(arg, Goal::Value)?;
                Place::Slot(Storage::new(self.conform(&value, ty)))
            };
            bound.push((param, place));
        }
        self.invoke(func, this, bound, span)
    }

    /// The `this` of a member call: the struct itself, or a temporary
    /// holding the class reference.
    fn receiver(&mut self, base: ExprId, span: Span) -> CtfeResult<Place> {
        let base_ty = self.program.arena.ty(base);
        let (is_class, is_pointer) = (self.program.types.is_class(base_ty), self.program.types.is_pointer(base_ty));
        if is_class {
            return match self.eval(base, Goal::Value)? {
                Value::Null(_) => Err(self.fatal(CtfeErrorKind::NullDereference, span)),
                object => Ok(object.temporary()),
            };
        }
        if is_pointer {
            return match self.eval(base, Goal::Value)? {
                Value::Pointer { target, .. } => Ok(target),
                Value::Null(_) => Err(self.fatal(CtfeErrorKind::NullDereference, span)),
                object => Ok(object.temporary()),
            };
        }
        self.place(base)
    }

    /// Run the body of `func` in a new frame.
    #[tracing::instrument(level = "trace", skip_all)]
    pub(crate) fn invoke(
        &mut self,
        func: FuncId,
        this: Option<Place>,
        args: Vec<(VarId, Place)>,
        call_span: Span,
    ) -> CtfeResult {
        let decl = self.program.decls.func(func);
        let (body, state, attrs, is_ctor) = (decl.body, decl.state, decl.attrs, decl.is_ctor());
        if !body.is_valid() {
            return Err(self.unsupported(
                format!("`{}` has no body to evaluate", self.program.func_path(func)),
                call_span,
            ));
        }
        if state == SemaState::Failed {
            tracing::trace!(func = %self.program.func_path(func), "callee failed to compile");
            return Err(Self::poisoned(call_span));
        }
        if self.frames.len() > self.config.max_recursion_depth {
            return Err(Interrupt::CannotInterpret(CannotInterpret {
                reason: UnsupportedReason::RecursionLimit(self.config.max_recursion_depth),
                span: call_span,
            }));
        }
        tracing::trace!(func = %self.program.func_path(func), depth = self.frames.len(), "interpreting call");

        let ref_return = attrs.contains(FuncAttrs::REF_RETURN);
        let mut frame = Frame::call(func, call_span, this, ref_return);
        for (var, place) in args {
            frame.bind(var, place);
        }
        self.frames.push(frame);
        let outcome = self.exec(body);
        let frame = self.frames.pop();

        if !ref_return {
            self.ref_return = None;
        }
        let value = match outcome {
            Ok(()) => Value::Void,
            Err(Interrupt::Return(value)) => value,
            Err(Interrupt::Break(_) | Interrupt::Continue(_) | Interrupt::Goto(_)) => {
                return Err(self.unsupported("a jump leaves the function body", call_span));
            }
            Err(other) => return Err(other),
        };
        if is_ctor {
            if let Some(this) = frame.and_then(|frame| frame.this) {
                return self.read_place(&this, call_span);
            }
        }
        Ok(value)
    }

    /// `new T(...)` after resolution: a class instance, a heap cell or a
    /// dynamic array.
    pub(crate) fn new_expr(&mut self, ty: TypeId, args: ExprRange, span: Span) -> CtfeResult {
        let args = self.program.arena.list_vec(args);
        let types = &self.program.types;
        let elem_ty = types.elem_raw(ty).unwrap_or(TypeId::ERROR);
        let (is_pointer, is_slice) = (types.is_pointer(ty), types.is_slice(ty));
        if let Some((AggKind::Class, agg)) = types.aggregate(ty) {
            let fields = self.program.decls.agg(agg).fields.clone();
            let mut values = Vec::with_capacity(fields.len());
            for field in fields {
                let field_ty = self.program.decls.var(field).ty;
                let init = self.field_default(field, span)?;
                let value = self.eval(init, Goal::Value)?;
                values.push(self.conform(&value, field_ty));
            }
            return Ok(Value::Struct(StructValue::fresh(agg, values, ty)));
        }
        if is_pointer {
            let value = match args.first() {
                Some(&arg) => self.eval(arg, Goal::Value)?,
                None => self.default_value(elem_ty, span)?,
            };
            let cell = self.conform(&value, elem_ty);
            return Ok(Value::Pointer {
                target: cell.temporary(),
                ty,
            });
        }
        if is_slice {
            let len = match args.first() {
                Some(&arg) => {
                    let len = self.eval(arg, Goal::Value)?;
                    self.to_index(&len, span)?
                }
                None => 0,
            };
            let Ok(len) = usize::try_from(len) else {
                return Err(self.fatal(
                    CtfeErrorKind::SliceOutOfBounds {
                        lower: 0,
                        upper: len,
                        len: 0,
                    },
                    span,
                ));
            };
            let mut elems = Vec::with_capacity(len.min(1 << 16));
            for _ in 0..len {
                elems.push(self.default_value(elem_ty, span)?);
            }
            return Ok(Value::Array(ArrayValue::fresh(elems, ty)));
        }
        Err(self.unsupported(
            format!("cannot allocate a `{}` at compile time", self.program.type_name(ty)),
            span,
        ))
    }
}
