//! Statements and control flow.
//!
//! A statement finishes with `Ok(())` or with an [`Interrupt`]. Loops catch
//! the `Break` and `Continue` aimed at them, statement lists resolve `Goto`
//! to one of their labels, and `Return` travels up to [`Interpreter::invoke`].

use dex_ir::{scalar, BinaryOp, CaseRange, ExprId, Name, Scalar, Span, StmtId, StmtKind, StmtRange, TypeId, VarId};
use dex_stack::ensure_sufficient_stack;

use super::{Goal, Interpreter};
use crate::environment::Storage;
use crate::errors::{CtfeErrorKind, CtfeResult, Interrupt};
use crate::value::{Place, Value};

/// Whether a `break`/`continue` with `target` leaves the loop labeled `label`.
fn aims_at(target: Name, label: Name) -> bool {
    target.is_empty() || target == label
}

impl Interpreter<'_> {
    pub(crate) fn exec(&mut self, id: StmtId) -> CtfeResult<()> {
        self.exec_labeled(id, Name::EMPTY)
    }

    /// Execute `id`; a loop also answers to `label`.
    fn exec_labeled(&mut self, id: StmtId, label: Name) -> CtfeResult<()> {
        if !id.is_valid() {
            return Ok(());
        }
        ensure_sufficient_stack(|| self.exec_inner(id, label))
    }

    fn exec_inner(&mut self, id: StmtId, label: Name) -> CtfeResult<()> {
        let stmt = *self.program.arena.stmt(id);
        let span = stmt.span;
        self.tick(span)?;
        match stmt.kind {
            StmtKind::Empty | StmtKind::StaticAssert { .. } => Ok(()),
            StmtKind::Expr(expr) => self.eval(expr, Goal::Effect).map(drop),
            StmtKind::Decl(var) => self.declare(var, span),
            StmtKind::Block(list) => self.exec_list(list),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            }
            | StmtKind::StaticIf {
                cond,
                then_branch,
                else_branch,
            } => {
                let taken = if self.eval(cond, Goal::Value)?.truthy() {
                    then_branch
                } else {
                    else_branch
                };
                self.exec(taken)
            }
            StmtKind::While { cond, body } => {
                while self.eval(cond, Goal::Value)?.truthy() {
                    if !self.loop_body(body, label)? {
                        break;
                    }
                }
                Ok(())
            }
            StmtKind::DoWhile { body, cond } => {
                while self.loop_body(body, label)? {
                    if !self.eval(cond, Goal::Value)?.truthy() {
                        break;
                    }
                }
                Ok(())
            }
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                self.exec(init)?;
                loop {
                    if cond.is_valid() && !self.eval(cond, Goal::Value)?.truthy() {
                        break;
                    }
                    if !self.loop_body(body, label)? {
                        break;
                    }
                    if step.is_valid() {
                        self.eval(step, Goal::Effect)?;
                    }
                }
                Ok(())
            }
            StmtKind::Foreach {
                key,
                value,
                aggregate,
                body,
            } => self.foreach(key, value, aggregate, body, label, span),
            StmtKind::ForeachRange {
                var,
                lower,
                upper,
                body,
            } => self.foreach_range(var, lower, upper, body, label, span),
            StmtKind::Break(target) => Err(Interrupt::Break(target)),
            StmtKind::Continue(target) => Err(Interrupt::Continue(target)),
            StmtKind::Goto(target) => Err(Interrupt::Goto(target)),
            StmtKind::Labeled { label, body } => match self.exec_labeled(body, label) {
                Err(Interrupt::Break(target)) if target == label => Ok(()),
                other => other,
            },
            StmtKind::Return(value) => Err(self.return_value(value)?),
            StmtKind::Switch { cond, cases } => self.switch(cond, cases),
            StmtKind::Throw(value) => {
                let thrown = self.eval(value, Goal::Value)?;
                let message = thrown.text(self.program).unwrap_or_else(|| thrown.display(self.program));
                Err(self.fatal(CtfeErrorKind::Uncaught { message: Some(message) }, span))
            }
        }
    }

    /// Run one iteration; `false` when the loop is left.
    fn loop_body(&mut self, body: StmtId, label: Name) -> CtfeResult<bool> {
        match self.exec(body) {
            Ok(()) => Ok(true),
            Err(Interrupt::Break(target)) if aims_at(target, label) => Ok(false),
            Err(Interrupt::Continue(target)) if aims_at(target, label) => Ok(true),
            Err(other) => Err(other),
        }
    }

    fn exec_list(&mut self, list: StmtRange) -> CtfeResult<()> {
        let stmts = self.program.arena.stmt_list(list).to_vec();
        self.exec_stmts(&stmts)
    }

    /// Execute `stmts` in order; a `goto` to one of their labels resumes
    /// there, any other leaves the list.
    fn exec_stmts(&mut self, stmts: &[StmtId]) -> CtfeResult<()> {
        let mut pc = 0;
        while let Some(&stmt) = stmts.get(pc) {
            match self.exec(stmt) {
                Ok(()) => pc += 1,
                Err(Interrupt::Goto(target)) => match self.label_position(stmts, target) {
                    Some(position) => pc = position,
                    None => return Err(Interrupt::Goto(target)),
                },
                Err(other) => return Err(other),
            }
        }
        Ok(())
    }

    fn label_position(&self, stmts: &[StmtId], target: Name) -> Option<usize> {
        stmts.iter().position(|&stmt| {
            matches!(self.program.arena.stmt(stmt).kind, StmtKind::Labeled { label, .. } if label == target)
        })
    }

    /// The `Return` interrupt for `return value;`.
    fn return_value(&mut self, value: ExprId) -> CtfeResult<Interrupt> {
        if !value.is_valid() {
            return Ok(Interrupt::Return(Value::Void));
        }
        let by_ref = self.frames.last().is_some_and(|frame| frame.ref_return);
        if by_ref {
            let span = self.program.arena.span(value);
            let place = self.place(value)?;
            let result = self.read_place(&place, span)?;
            self.ref_return = Some(place);
            return Ok(Interrupt::Return(result));
        }
        let result = self.eval(value, Goal::Value)?;
        Ok(Interrupt::Return(result.copied(&self.program.types)))
    }

    fn foreach(
        &mut self,
        key: VarId,
        value: VarId,
        aggregate: ExprId,
        body: StmtId,
        label: Name,
        span: Span,
    ) -> CtfeResult<()> {
        let key_ty = if key.is_valid() {
            self.program.decls.var(key).ty
        } else {
            TypeId::ERROR
        };
        let value_decl = self.program.decls.var(value);
        let (value_ty, by_ref) = (value_decl.ty, value_decl.is_ref());

        match self.eval(aggregate, Goal::Value)? {
            Value::Array(array) => {
                for index in 0..array.len {
                    if key.is_valid() {
                        self.bind(key, Value::int(index as u64, key_ty).temporary());
                    }
                    let element = array.element_place(index);
                    let place = if by_ref {
                        element
                    } else {
                        let current = self.read_place(&element, span)?;
                        Place::Slot(Storage::new(self.conform(&current, value_ty)))
                    };
                    self.bind(value, place);
                    if !self.loop_body(body, label)? {
                        break;
                    }
                }
            }
            Value::Assoc(aa) => {
                let snapshot = aa.entries.borrow().clone();
                for (entry_key, entry_value) in snapshot {
                    let place = if by_ref {
                        Place::Entry {
                            entries: aa.entries.clone(),
                            key: Box::new(entry_key.clone()),
                        }
                    } else {
                        Place::Slot(Storage::new(self.conform(&entry_value, value_ty)))
                    };
                    if key.is_valid() {
                        self.bind(key, Place::Slot(Storage::new(self.conform(&entry_key, key_ty))));
                    }
                    self.bind(value, place);
                    if !self.loop_body(body, label)? {
                        break;
                    }
                }
            }
            Value::Tuple { elements, .. } => {
                for (index, element) in elements.into_iter().enumerate() {
                    if key.is_valid() {
                        self.bind(key, Value::int(index as u64, key_ty).temporary());
                    }
                    self.bind(value, element.temporary());
                    if !self.loop_body(body, label)? {
                        break;
                    }
                }
            }
            Value::Null(_) => {}
            other => {
                return Err(self.unsupported(
                    format!("cannot iterate over a `{}`", self.program.type_name(other.ty())),
                    span,
                ))
            }
        }
        Ok(())
    }

    /// `foreach (var; lower .. upper)`. The loop counts on its own copy, so
    /// assigning to `var` in the body does not change the iteration.
    fn foreach_range(
        &mut self,
        var: VarId,
        lower: ExprId,
        upper: ExprId,
        body: StmtId,
        label: Name,
        span: Span,
    ) -> CtfeResult<()> {
        let ty = self.program.decls.var(var).ty;
        let lower = self.eval(lower, Goal::Value)?;
        let upper = self.eval(upper, Goal::Value)?;
        let kind = self.program.types.num_kind(ty);
        let (Some(kind), Value::Scalar { value: mut current, .. }, Value::Scalar { value: end, .. }) =
            (kind, lower, upper)
        else {
            return Err(self.unsupported("range bounds are not integers", span));
        };
        loop {
            let below = scalar::compare(BinaryOp::Lt, kind, current, end)
                .map_err(|err| self.fatal(CtfeErrorKind::from_scalar(err), span))?;
            if !below {
                break;
            }
            self.bind(var, Value::Scalar { value: current, ty }.temporary());
            if !self.loop_body(body, label)? {
                break;
            }
            current = scalar::binary(BinaryOp::Add, kind, current, Scalar::Int(1))
                .map_err(|err| self.fatal(CtfeErrorKind::from_scalar(err), span))?;
        }
        Ok(())
    }

    /// Jump to the first case whose value matches, else to `default`, and
    /// fall through the remaining cases until a `break`.
    fn switch(&mut self, cond: ExprId, cases: CaseRange) -> CtfeResult<()> {
        let value = self.eval(cond, Goal::Value)?;
        let cases = self.program.arena.cases(cases).to_vec();
        let mut start = None;
        'cases: for (index, case) in cases.iter().enumerate() {
            for candidate in self.program.arena.list_vec(case.values) {
                if self.eval(candidate, Goal::Value)?.same_value(&value) {
                    start = Some(index);
                    break 'cases;
                }
            }
        }
        let Some(start) = start.or_else(|| cases.iter().position(|case| case.is_default)) else {
            return Ok(());
        };
        let mut body = Vec::new();
        for case in &cases[start..] {
            body.extend_from_slice(self.program.arena.stmt_list(case.body));
        }
        match self.exec_stmts(&body) {
            Err(Interrupt::Break(target)) if target.is_empty() => Ok(()),
            other => other,
        }
    }
}
