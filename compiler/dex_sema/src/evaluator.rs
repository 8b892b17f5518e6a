//! Collaborators the resolver calls back into.
//!
//! Compile-time evaluation and `mixin` re-parsing live in crates that
//! depend on this one, so the resolver reaches them through these traits.

use dex_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use dex_fold::{is_literal_tree, optimize, OptimizeFlags};
use dex_ir::{ExprId, Program, Span};

/// Evaluates a resolved expression whose value is needed at compile time:
/// manifest constants, `static if`, `case` labels, static array lengths,
/// `mixin` and `import` arguments.
pub trait CompileTimeEvaluator {
    /// Reduce `expr` to a literal tree or report why it cannot be.
    ///
    /// Every function reachable from `expr` has had its body resolved
    /// before this is called.
    fn evaluate(
        &mut self,
        program: &mut Program,
        expr: ExprId,
        diags: &mut DiagnosticQueue,
    ) -> Result<ExprId, ErrorGuaranteed>;
}

/// Evaluation by constant folding alone: no calls, no loops.
#[derive(Copy, Clone, Debug, Default)]
pub struct FoldEvaluator;

impl CompileTimeEvaluator for FoldEvaluator {
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
        let diag = Diagnostic::error(ErrorCode::E6001)
            .with_message(format!(
                "cannot evaluate `{}` at compile time",
                program.expr_to_string(expr)
            ))
            .with_label(span, "not a constant expression");
        Err(diags.emit_error(diag, &program.module.lines))
    }
}

/// Parses the text produced by `mixin(...)` into an unresolved expression.
pub trait MixinParser {
    /// Every node of the result is placed at `origin`.
    fn parse_expression(&mut self, program: &mut Program, text: &str, origin: Span) -> Result<ExprId, Vec<Diagnostic>>;
}
