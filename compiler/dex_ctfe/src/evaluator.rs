//! Entry points: the resolver's evaluator and direct interpretation.

use dex_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use dex_fold::{is_literal_tree, optimize, OptimizeFlags};
use dex_ir::{ExprId, Program};
use dex_sema::CompileTimeEvaluator;

use crate::config::CtfeConfig;
use crate::errors::{CannotInterpret, CtfeError, CtfeResult, Interrupt, UnsupportedReason};
use crate::interpreter::Interpreter;
use crate::value::Unrepresentable;

/// Folds first and interprets what folding leaves.
///
/// Used by the resolver wherever a value is needed at compile time, so
/// manifest constants, `static if` conditions and array lengths may call
/// functions.
#[derive(Copy, Clone, Debug, Default)]
pub struct CtfeEvaluator {
    config: CtfeConfig,
}

impl CtfeEvaluator {
    pub fn new(config: CtfeConfig) -> Self {
        CtfeEvaluator { config }
    }

    pub fn config(&self) -> &CtfeConfig {
        &self.config
    }
}

impl CompileTimeEvaluator for CtfeEvaluator {
    fn evaluate(
        &mut self,
        program: &mut Program,
        expr: ExprId,
        diags: &mut DiagnosticQueue,
    ) -> Result<ExprId, ErrorGuaranteed> {
        let folded = optimize(program, expr, OptimizeFlags::WANT_VALUE | OptimizeFlags::EXPAND_VARS);
        if is_literal_tree(program, folded) {
            return Ok(folded);
        }

        let span = program.arena.span(expr);
        let ty = program.arena.ty(expr);
        tracing::debug!(expr = %program.expr_to_string(folded), "interpreting at compile time");
        let diag = match interpret(program, folded, &self.config) {
            Ok(value) => match value.to_literal(program, ty, span) {
                Ok(literal) => return Ok(literal),
                Err(Unrepresentable(what)) => {
                    let cannot = CannotInterpret {
                        reason: UnsupportedReason::Construct(format!("{what} has no compile-time representation")),
                        span,
                    };
                    cannot.to_diagnostic(program, span, &program.expr_to_string(expr))
                }
            },
            Err(Interrupt::CannotInterpret(cannot)) => {
                if cannot.reason == UnsupportedReason::Poisoned {
                    if let Some(guar) = ErrorGuaranteed::from_error_count(diags.error_count()) {
                        tracing::debug!("evaluation depends on an error already reported");
                        return Err(guar);
                    }
                }
                cannot.to_diagnostic(program, span, &program.expr_to_string(expr))
            }
            Err(Interrupt::Fatal(error)) => error.to_diagnostic(program),
            Err(escaped) => Diagnostic::error(ErrorCode::E9001)
                .with_message(format!("`{escaped:?}` escaped a compile-time evaluation"))
                .with_label(span, "while evaluating this expression"),
        };
        Err(diags.emit_error(diag, &program.module.lines))
    }
}

/// Interpret a resolved expression without folding it first.
#[tracing::instrument(level = "trace", skip_all)]
pub fn interpret(program: &mut Program, expr: ExprId, config: &CtfeConfig) -> CtfeResult {
    let span = program.arena.span(expr);
    Interpreter::new(program, *config, span).interpret(expr)
}

/// Interpret `expr` if it can be, for callers with a run-time fallback.
///
/// `Ok(None)` means the expression is not computable at compile time, or
/// its value has no literal form; only a genuine fault is an error.
pub fn try_interpret(program: &mut Program, expr: ExprId, config: &CtfeConfig) -> Result<Option<ExprId>, CtfeError> {
    let span = program.arena.span(expr);
    let ty = program.arena.ty(expr);
    match interpret(program, expr, config) {
        Ok(value) => Ok(value.to_literal(program, ty, span).ok()),
        Err(Interrupt::Fatal(error)) => Err(*error),
        Err(other) => {
            tracing::trace!(?other, "left for run time");
            Ok(None)
        }
    }
}
