//! Expressions as values.

use dex_ir::{CharWidth, DefaultInitKind, ExprId, ExprKind, Name, Scalar, Span, StorageClass, TypeId, VarId};
use dex_stack::ensure_sufficient_stack;

use super::{Goal, Interpreter};
use crate::errors::{CtfeErrorKind, CtfeResult};
use crate::value::{ArrayValue, AssocValue, StructValue, Value};

impl Interpreter<'_> {
    pub(crate) fn eval(&mut self, id: ExprId, goal: Goal) -> CtfeResult {
        ensure_sufficient_stack(|| self.eval_inner(id, goal))
    }

    fn eval_inner(&mut self, id: ExprId, goal: Goal) -> CtfeResult {
        let span = self.program.arena.span(id);
        self.tick(span)?;
        let ty = self.program.arena.ty(id);
        match self.program.arena.kind(id) {
            ExprKind::Int(bits) => Ok(Value::int(bits, ty)),
            ExprKind::Real(bits) => Ok(Value::Scalar {
                value: Scalar::Float(f64::from_bits(bits)),
                ty,
            }),
            ExprKind::Complex { re, im } => Ok(Value::Scalar {
                value: Scalar::Complex(f64::from_bits(re), f64::from_bits(im)),
                ty,
            }),
            ExprKind::String { value, width, .. } => Ok(self.string_value(value, width, ty)),
            ExprKind::Null => Ok(Value::Null(ty)),
            ExprKind::ArrayLiteral(range) => {
                let ids = self.program.arena.list_vec(range);
                let mut elems = Vec::with_capacity(ids.len());
                for elem in ids {
                    let value = self.eval(elem, Goal::Value)?;
                    elems.push(value.copied(&self.program.types));
                }
                Ok(Value::Array(ArrayValue::fresh(elems, ty)))
            }
            ExprKind::AssocArrayLiteral { keys, values } => {
                let keys = self.program.arena.list_vec(keys);
                let values = self.program.arena.list_vec(values);
                let aa = AssocValue::empty(ty);
                for (key, value) in keys.into_iter().zip(values) {
                    let key = self.eval(key, Goal::Value)?.copied(&self.program.types);
                    let value = self.eval(value, Goal::Value)?.copied(&self.program.types);
                    aa.insert(key, value);
                }
                Ok(Value::Assoc(aa))
            }
            ExprKind::StructLiteral { agg, elements, .. } => {
                let fields = self.program.decls.agg(agg).fields.clone();
                let elements = self.program.arena.list_vec(elements);
                let mut values = Vec::with_capacity(fields.len());
                for (index, field) in fields.into_iter().enumerate() {
                    let elem = elements.get(index).copied().unwrap_or(ExprId::INVALID);
                    let init = if elem.is_valid() {
                        elem
                    } else {
                        self.field_default(field, span)?
                    };
                    let field_ty = self.program.decls.var(field).ty;
                    let value = self.eval(init, Goal::Value)?;
                    values.push(self.conform(&value, field_ty));
                }
                Ok(Value::Struct(StructValue::fresh(agg, values, ty)))
            }
            ExprKind::Tuple { prelude, elements } => {
                if prelude.is_valid() {
                    self.eval(prelude, Goal::Effect)?;
                }
                let ids = self.program.arena.list_vec(elements);
                let mut values = Vec::with_capacity(ids.len());
                for elem in ids {
                    let value = self.eval(elem, Goal::Value)?;
                    values.push(value.copied(&self.program.types));
                }
                Ok(Value::Tuple { elements: values, ty })
            }

            ExprKind::Var(var) => self.read_var(var, span),
            ExprKind::Func { func, .. } | ExprKind::FuncLiteral(func) => Ok(Value::Func { func, ty }),
            ExprKind::This => {
                let this = self.this_place(span)?;
                self.read_place(&this, span)
            }

            ExprKind::AddrOf(operand) => match self.program.arena.kind(operand) {
                ExprKind::Func { func, .. } | ExprKind::FuncLiteral(func) => Ok(Value::Func { func, ty }),
                _ => Ok(Value::Pointer {
                    target: self.place(operand)?,
                    ty,
                }),
            },
            ExprKind::Deref(operand) => match self.eval(operand, Goal::Value)? {
                Value::Pointer { target, .. } => self.read_place(&target, span),
                Value::Func { func, .. } => Ok(Value::Func { func, ty }),
                Value::Null(_) => Err(self.fatal(CtfeErrorKind::NullDereference, span)),
                other => Err(self.unsupported(
                    format!("cannot dereference a `{}`", self.program.type_name(other.ty())),
                    span,
                )),
            },
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand, Goal::Value)?;
                self.unary(op, value, ty, span)
            }
            ExprKind::PreIncDec { op, operand } => {
                let (place, _) = self.inc_dec(op, operand, span)?;
                self.read_place(&place, span)
            }
            ExprKind::PostIncDec { op, operand } => Ok(self.inc_dec(op, operand, span)?.1),
            ExprKind::BoolCast(operand) => Ok(Value::bool(self.eval(operand, Goal::Value)?.truthy())),
            ExprKind::Cast { operand, to } => {
                let value = self.eval(operand, Goal::Value)?;
                self.cast(value, to, span)
            }
            ExprKind::Slice { base, lower, upper } => self.slice(base, lower, upper, ty, span),
            ExprKind::ArrayLength(base) => {
                let len = match self.eval(base, Goal::Value)? {
                    Value::Array(array) => array.len,
                    Value::Assoc(aa) => aa.len(),
                    Value::Null(_) => 0,
                    Value::Tuple { elements, .. } => elements.len(),
                    other => {
                        return Err(self.unsupported(
                            format!("`{}` has no length", self.program.type_name(other.ty())),
                            span,
                        ))
                    }
                };
                let ty = if self.program.types.is_integral(ty) { ty } else { TypeId::SIZE_T };
                Ok(Value::int(len as u64, ty))
            }
            ExprKind::Call { callee, args } => self.call(callee, args, span),
            ExprKind::Delete(operand) => {
                let place = self.place(operand)?;
                place.write(Value::Null(self.program.arena.ty(operand)));
                Ok(Value::Void)
            }
            ExprKind::Assert { cond, msg } => {
                if self.eval(cond, Goal::Value)?.truthy() {
                    return Ok(Value::Void);
                }
                let message = if msg.is_valid() {
                    let msg = self.eval(msg, Goal::Value)?;
                    Some(msg.text(self.program).unwrap_or_else(|| msg.display(self.program)))
                } else {
                    None
                };
                Err(self.fatal(CtfeErrorKind::AssertFailed { message }, span))
            }
            ExprKind::Halt => Err(self.fatal(CtfeErrorKind::AssertFailed { message: None }, span)),
            ExprKind::DotVar { base, var } => {
                if !self.is_instance_field(var) {
                    if self.program.has_side_effects(base) {
                        self.eval(base, Goal::Effect)?;
                    }
                    return self.read_var(var, span);
                }
                let place = self.field_place(base, var, span)?;
                self.read_place(&place, span)
            }
            ExprKind::Comma { left, right } => {
                self.eval(left, Goal::Effect)?;
                self.eval(right, goal)
            }
            ExprKind::Dot { right, .. } => self.eval(right, goal),
            ExprKind::Index { base, index } => self.index(base, index, span),
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval(cond, Goal::Value)?.truthy() {
                    self.eval(then_expr, goal)
                } else {
                    self.eval(else_expr, goal)
                }
            }
            ExprKind::Assign { op, target, value } => {
                let place = self.assign(op, target, value, span)?;
                match goal {
                    Goal::Effect => Ok(Value::Void),
                    Goal::Value => self.read_place(&place, span),
                }
            }
            ExprKind::Remove { aa, key } => {
                let aa = self.eval(aa, Goal::Value)?;
                let key = self.eval(key, Goal::Value)?;
                match aa {
                    Value::Assoc(aa) => Ok(Value::bool(aa.remove(&key))),
                    Value::Null(_) => Ok(Value::bool(false)),
                    other => Err(self.unsupported(
                        format!("cannot remove from a `{}`", self.program.type_name(other.ty())),
                        span,
                    )),
                }
            }
            ExprKind::New { ty, args } => self.new_expr(ty, args, span),
            ExprKind::Binary { op, left, right } => self.binary(op, left, right, ty, span),
            ExprKind::DefaultInit(kind) => Ok(self.default_init_value(kind, ty, span)),
            ExprKind::Typeid(operand) => Ok(Value::TypeInfo(match self.program.arena.kind(operand) {
                ExprKind::TypeExpr(t) => t,
                _ => self.program.arena.ty(operand),
            })),
            ExprKind::Declaration(var) => {
                self.declare(var, span)?;
                self.read_var(var, span)
            }

            ExprKind::Error => Err(Self::poisoned(span)),
            kind @ (ExprKind::Ident(_)
            | ExprKind::Dollar
            | ExprKind::Super
            | ExprKind::SymOff { .. }
            | ExprKind::OverloadSet(_)
            | ExprKind::TypeExpr(_)
            | ExprKind::ScopeExpr(_)
            | ExprKind::TemplateExpr(_)
            | ExprKind::Vector { .. }
            | ExprKind::MultiIndex { .. }
            | ExprKind::Mixin(_)
            | ExprKind::Import(_)
            | ExprKind::DotId { .. }
            | ExprKind::DotFunc { .. }
            | ExprKind::DotTemplate { .. }
            | ExprKind::NewAnonClass { .. }
            | ExprKind::Traits { .. }
            | ExprKind::IsType { .. }) => Err(self.unsupported(
                format!("{} cannot be evaluated at compile time", kind.name()),
                span,
            )),
        }
    }

    /// A string literal as an array of code units.
    pub(crate) fn string_value(&self, text: Name, width: CharWidth, ty: TypeId) -> Value {
        let unit_ty = self.program.types.elem_raw(ty).unwrap_or(width.char_type());
        let units = width
            .encode(self.program.text(text))
            .into_iter()
            .map(|unit| Value::int(u64::from(unit), unit_ty))
            .collect();
        Value::Array(ArrayValue::fresh(units, ty))
    }

    /// Value of a variable: its binding in the current call, or the
    /// initializer of a constant.
    pub(crate) fn read_var(&mut self, var: VarId, span: Span) -> CtfeResult {
        if let Some(place) = self.lookup(var) {
            return self.read_place(&place, span);
        }
        let decl = self.program.decls.var(var);
        let (init, ty, name) = (decl.init, decl.ty, decl.name);
        let constant = decl.is_manifest()
            || (decl.is_global() && decl.storage.intersects(StorageClass::CONST | StorageClass::IMMUTABLE));
        if constant {
            return if init.is_valid() {
                self.eval(init, Goal::Value)
            } else {
                self.default_value(ty, span)
            };
        }
        let name = self.program.text(name);
        if decl.is_global() {
            return Err(self.unsupported(format!("cannot read mutable global `{name}` at compile time"), span));
        }
        Err(self.unsupported(format!("`{name}` is not known at compile time"), span))
    }

    /// A field stored in each instance, as opposed to a static or manifest
    /// member reached through an instance.
    pub(crate) fn is_instance_field(&self, var: VarId) -> bool {
        let decl = self.program.decls.var(var);
        decl.is_field() && !decl.is_manifest() && !decl.is_global()
    }

    fn index(&mut self, base: ExprId, index: ExprId, span: Span) -> CtfeResult {
        let base_value = self.eval(base, Goal::Value)?;
        match base_value {
            Value::Assoc(aa) => {
                let key = self.eval(index, Goal::Value)?;
                aa.get(&key).ok_or_else(|| {
                    self.fatal(
                        CtfeErrorKind::MissingKey {
                            key: key.display(self.program),
                        },
                        span,
                    )
                })
            }
            Value::Null(_) if self.program.types.is_assoc_array(self.program.arena.ty(base)) => {
                let key = self.eval(index, Goal::Value)?;
                Err(self.fatal(
                    CtfeErrorKind::MissingKey {
                        key: key.display(self.program),
                    },
                    span,
                ))
            }
            Value::Tuple { elements, .. } => {
                let i = self.eval(index, Goal::Value)?;
                let i = self.to_index(&i, span)?;
                usize::try_from(i)
                    .ok()
                    .and_then(|i| elements.get(i).cloned())
                    .ok_or_else(|| {
                        self.fatal(
                            CtfeErrorKind::IndexOutOfBounds {
                                index: i,
                                len: elements.len(),
                            },
                            span,
                        )
                    })
            }
            other => {
                let place = self.element_place(other, index, span)?;
                self.read_place(&place, span)
            }
        }
    }

    fn default_init_value(&self, kind: DefaultInitKind, ty: TypeId, span: Span) -> Value {
        let module = &self.program.module;
        let text = match kind {
            DefaultInitKind::Line => {
                let line = module.lines.line(span.start);
                let ty = if self.program.types.is_integral(ty) { ty } else { TypeId::UINT };
                return Value::int(u64::from(line), ty);
            }
            DefaultInitKind::File => self.program.text(module.file).to_string(),
            DefaultInitKind::Module => self.program.text(module.name).to_string(),
            DefaultInitKind::Function | DefaultInitKind::PrettyFunction => self
                .frames
                .iter()
                .rev()
                .find_map(|frame| frame.func)
                .map(|func| self.program.func_path(func))
                .unwrap_or_default(),
        };
        let ty = if self.program.types.string_width(ty).is_some() {
            ty
        } else {
            TypeId::STRING
        };
        let unit_ty = self.program.types.elem_raw(ty).unwrap_or(TypeId::IMMUTABLE_CHAR);
        let units = CharWidth::One
            .encode(&text)
            .into_iter()
            .map(|unit| Value::int(u64::from(unit), unit_ty))
            .collect();
        Value::Array(ArrayValue::fresh(units, ty))
    }
}
