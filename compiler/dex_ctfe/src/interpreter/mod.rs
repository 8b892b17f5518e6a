//! The tree-walking interpreter.
//!
//! One [`Interpreter`] serves one top-level evaluation. It reads the
//! resolved program, allocates its own storage for every value it creates
//! and only writes to the program to materialize default initializers.
//!
//! Evaluation is split by concern:
//! - `expr`: expressions as values
//! - `place`: expressions as lvalues, assignment
//! - `operators`: unary and binary operators, casts
//! - `call`: calls, constructors and `new`
//! - `stmt`: statements and control flow

mod call;
mod expr;
mod operators;
mod place;
mod stmt;

use dex_ir::{ExprId, Program, Span, TypeId, VarId};
use rustc_hash::FxHashMap;

use crate::config::CtfeConfig;
use crate::environment::Frame;
use crate::errors::{
    BacktraceFrame, CannotInterpret, CtfeBacktrace, CtfeError, CtfeErrorKind, CtfeResult, Interrupt, UnsupportedReason,
};
use crate::value::{Place, Value};

/// What the caller does with the result of an expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Goal {
    /// The value is used.
    Value,
    /// Only side effects matter; assignments need not produce their value.
    Effect,
}

pub struct Interpreter<'p> {
    program: &'p mut Program,
    config: CtfeConfig,
    /// Innermost call last; the first frame is the top-level expression.
    frames: Vec<Frame>,
    steps: u64,
    /// Place returned by the last `ref` function to return.
    ref_return: Option<Place>,
    /// Default initializer trees, built once per type.
    defaults: FxHashMap<TypeId, ExprId>,
}

impl<'p> Interpreter<'p> {
    pub fn new(program: &'p mut Program, config: CtfeConfig, span: Span) -> Self {
        Interpreter {
            program,
            config,
            frames: vec![Frame::root(span)],
            steps: 0,
            ref_return: None,
            defaults: FxHashMap::default(),
        }
    }

    /// Evaluate a resolved expression to a value.
    pub fn interpret(&mut self, expr: ExprId) -> CtfeResult {
        let value = self.eval(expr, Goal::Value)?;
        tracing::debug!(steps = self.steps, "compile-time evaluation finished");
        Ok(value)
    }

    pub fn program(&self) -> &Program {
        self.program
    }

    /// Expressions and statements evaluated so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn tick(&mut self, span: Span) -> CtfeResult<()> {
        self.steps += 1;
        if self.steps > self.config.step_budget {
            return Err(self.fatal(
                CtfeErrorKind::StepBudget {
                    budget: self.config.step_budget,
                },
                span,
            ));
        }
        Ok(())
    }

    /// A fault at `span`, with the calls active right now.
    fn fatal(&self, kind: CtfeErrorKind, span: Span) -> Interrupt {
        let frames = self
            .frames
            .iter()
            .rev()
            .filter_map(|frame| {
                frame.func.map(|func| BacktraceFrame {
                    func,
                    call_span: frame.call_span,
                })
            })
            .collect();
        tracing::debug!(error = %kind, "compile-time evaluation failed");
        Interrupt::Fatal(Box::new(CtfeError {
            kind,
            span,
            backtrace: CtfeBacktrace { frames },
        }))
    }

    fn unsupported(&self, what: impl Into<String>, span: Span) -> Interrupt {
        Interrupt::CannotInterpret(CannotInterpret {
            reason: UnsupportedReason::Construct(what.into()),
            span,
        })
    }

    fn poisoned(span: Span) -> Interrupt {
        Interrupt::CannotInterpret(CannotInterpret {
            reason: UnsupportedReason::Poisoned,
            span,
        })
    }

    /// The default of `field` as an expression to evaluate.
    ///
    /// An initializer without a type is still being resolved, so a value
    /// that needs it is circular.
    fn field_default(&mut self, field: VarId, span: Span) -> CtfeResult<ExprId> {
        let init = self.program.field_init(field, span);
        if self.program.arena.expr(init).ty.is_none() {
            let name = self.program.text(self.program.decls.var(field).name);
            return Err(self.unsupported(format!("the initializer of `{name}` depends on itself"), span));
        }
        Ok(init)
    }

    fn lookup(&self, var: VarId) -> Option<Place> {
        self.frames.last().and_then(|frame| frame.lookup(var)).cloned()
    }

    fn bind(&mut self, var: VarId, place: Place) {
        if let Some(frame) = self.frames.last_mut() {
            frame.bind(var, place);
        }
    }

    fn this_place(&self, span: Span) -> CtfeResult<Place> {
        self.frames
            .last()
            .and_then(|frame| frame.this.clone())
            .ok_or_else(|| self.unsupported("`this` is only available inside a member function", span))
    }

    /// The `.init` value of `ty`, freshly allocated.
    fn default_value(&mut self, ty: TypeId, span: Span) -> CtfeResult {
        let init = match self.defaults.get(&ty) {
            Some(&init) => init,
            None => {
                let init = self.program.default_init(ty, span);
                self.defaults.insert(ty, init);
                init
            }
        };
        self.eval(init, Goal::Value)
    }

    /// Read `place`, reporting the fault that makes it unreadable.
    fn read_place(&self, place: &Place, span: Span) -> CtfeResult {
        if let Some(value) = place.read() {
            return Ok(value);
        }
        let kind = match place {
            Place::Entry { key, .. } => CtfeErrorKind::MissingKey {
                key: key.display(self.program),
            },
            Place::Element { index, .. } => CtfeErrorKind::IndexOutOfBounds {
                index: *index as i128,
                len: place.storage_len().unwrap_or(0),
            },
            Place::Slot(_) | Place::Field { .. } => CtfeErrorKind::NullDereference,
        };
        Err(self.fatal(kind, span))
    }

    /// Integral value of an index or length operand.
    fn to_index(&self, value: &Value, span: Span) -> CtfeResult<i128> {
        match value {
            Value::Scalar {
                value: dex_ir::Scalar::Int(bits),
                ty,
            } => Ok(match self.program.types.num_kind(*ty) {
                Some(kind) if kind.is_signed() => i128::from(*bits as i64),
                _ => i128::from(*bits),
            }),
            other => Err(self.unsupported(
                format!("`{}` is not an index", self.program.type_name(other.ty())),
                span,
            )),
        }
    }

    /// A by-value copy of `value` as a `ty` would hold it.
    fn conform(&self, value: &Value, ty: TypeId) -> Value {
        let types = &self.program.types;
        match value {
            Value::Array(array) if types.is_static_array(ty) && !types.is_static_array(array.ty) => {
                let elems = array.elements().iter().map(|e| e.copied(types)).collect();
                Value::Array(crate::value::ArrayValue::fresh(elems, ty))
            }
            other => other.copied(types),
        }
    }
}
