//! Early exits from an evaluation and the errors they carry.

use std::fmt;

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{FuncId, Name, Program, ScalarError, Span};
use smallvec::SmallVec;

use crate::value::Value;

/// Result of evaluating an expression or executing a statement.
pub type CtfeResult<T = Value> = Result<T, Interrupt>;

/// Everything that stops an evaluation before it produces a value.
///
/// Jumps and `return` travel the same channel as failures: a loop catches
/// the `Break`/`Continue` aimed at it, a statement list the `Goto` to one
/// of its labels, a call the `Return` of its body. What nothing catches
/// reaches the top-level driver.
#[derive(Debug)]
pub enum Interrupt {
    /// `break label;`, `Name::EMPTY` for the innermost loop or switch.
    Break(Name),
    Continue(Name),
    Goto(Name),
    Return(Value),
    /// No compile-time rule applies; the expression may still run later.
    CannotInterpret(CannotInterpret),
    /// The evaluation is wrong, not merely unsupported.
    Fatal(Box<CtfeError>),
}

/// Why an expression was left for run time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CannotInterpret {
    pub reason: UnsupportedReason,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// A construct with no compile-time meaning.
    Construct(String),
    /// Interpreted calls nested deeper than the configured limit.
    RecursionLimit(usize),
    /// The expression depends on a declaration whose errors were already
    /// reported.
    Poisoned,
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedReason::Construct(what) => f.write_str(what),
            UnsupportedReason::RecursionLimit(limit) => {
                write!(f, "compile-time calls nested deeper than {limit}")
            }
            UnsupportedReason::Poisoned => f.write_str("depends on a declaration that failed to compile"),
        }
    }
}

impl CannotInterpret {
    pub fn to_diagnostic(&self, program: &Program, expr_span: Span, expr_text: &str) -> Diagnostic {
        let diag = match self.reason {
            UnsupportedReason::RecursionLimit(limit) => Diagnostic::error(ErrorCode::E6005)
                .with_message(format!("recursion limit of {limit} exceeded while evaluating `{expr_text}`"))
                .with_label(expr_span, "evaluated at compile time here")
                .with_secondary_label(self.span, "innermost call")
                .with_note("raise the limit with `--max-ctfe-depth`"),
            UnsupportedReason::Poisoned => Diagnostic::error(ErrorCode::E6001)
                .with_message(format!("cannot evaluate `{expr_text}` at compile time"))
                .with_label(expr_span, "not a constant expression")
                .with_secondary_label(self.span, self.reason.to_string()),
            UnsupportedReason::Construct(ref what) => {
                let diag = Diagnostic::error(ErrorCode::E6001)
                    .with_message(format!("cannot evaluate `{expr_text}` at compile time"))
                    .with_label(expr_span, "not a constant expression");
                if self.span == expr_span {
                    diag.with_note(what.clone())
                } else {
                    diag.with_secondary_label(self.span, what.clone())
                }
            }
        };
        diag.with_note(format!("in module `{}`", program.text(program.module.name)))
    }
}

/// A fault during evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct CtfeError {
    pub kind: CtfeErrorKind,
    pub span: Span,
    pub backtrace: CtfeBacktrace,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CtfeErrorKind {
    #[error("array index {index} is out of bounds [0 .. {len}]")]
    IndexOutOfBounds { index: i128, len: usize },
    #[error("slice [{lower} .. {upper}] is out of bounds [0 .. {len}]")]
    SliceOutOfBounds { lower: i128, upper: i128, len: usize },
    #[error("array lengths {left} and {right} do not match")]
    LengthMismatch { left: usize, right: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0}")]
    Arithmetic(ScalarError),
    #[error("assertion failed{}", suffix(.message))]
    AssertFailed { message: Option<String> },
    #[error("uncaught exception{}", suffix(.message))]
    Uncaught { message: Option<String> },
    #[error("null dereference")]
    NullDereference,
    #[error("evaluation exceeded the budget of {budget} steps")]
    StepBudget { budget: u64 },
    #[error("key {key} not found in associative array")]
    MissingKey { key: String },
    #[error("cannot cast `{from}` to `{to}` at compile time")]
    InvalidCast { from: String, to: String },
}

fn suffix(message: &Option<String>) -> String {
    message.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl CtfeErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            CtfeErrorKind::IndexOutOfBounds { .. }
            | CtfeErrorKind::SliceOutOfBounds { .. }
            | CtfeErrorKind::LengthMismatch { .. } => ErrorCode::E6002,
            CtfeErrorKind::DivisionByZero => ErrorCode::E6003,
            CtfeErrorKind::AssertFailed { .. } => ErrorCode::E6004,
            CtfeErrorKind::Uncaught { .. } => ErrorCode::E6006,
            CtfeErrorKind::NullDereference => ErrorCode::E6007,
            CtfeErrorKind::StepBudget { .. } => ErrorCode::E6008,
            CtfeErrorKind::MissingKey { .. } => ErrorCode::E6009,
            CtfeErrorKind::Arithmetic(_) => ErrorCode::E6010,
            CtfeErrorKind::InvalidCast { .. } => ErrorCode::E6011,
        }
    }

    pub(crate) fn from_scalar(err: ScalarError) -> Self {
        match err {
            ScalarError::DivisionByZero => CtfeErrorKind::DivisionByZero,
            other => CtfeErrorKind::Arithmetic(other),
        }
    }
}

impl CtfeError {
    /// The error, labelled where it happened, with one `called from here`
    /// label per active compile-time call.
    pub fn to_diagnostic(&self, program: &Program) -> Diagnostic {
        let mut diag = Diagnostic::error(self.kind.code())
            .with_message(format!("{} during compile-time evaluation", self.kind))
            .with_label(self.span, self.kind.to_string());
        for frame in &self.backtrace.frames {
            diag = diag.with_secondary_label(
                frame.call_span,
                format!("called from here: `{}`", program.func_path(frame.func)),
            );
        }
        if matches!(self.kind, CtfeErrorKind::StepBudget { .. }) {
            diag = diag.with_note("raise the budget with `--ctfe-budget`");
        }
        diag
    }
}

impl fmt::Display for CtfeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

/// Active calls at the point of a fault, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CtfeBacktrace {
    pub frames: SmallVec<[BacktraceFrame; 4]>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub func: FuncId,
    pub call_span: Span,
}

impl CtfeBacktrace {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_fault() {
        let oob = CtfeErrorKind::IndexOutOfBounds { index: 10, len: 3 };
        assert_eq!(oob.to_string(), "array index 10 is out of bounds [0 .. 3]");
        assert_eq!(oob.code(), ErrorCode::E6002);

        let assert = CtfeErrorKind::AssertFailed {
            message: Some("too big".into()),
        };
        assert_eq!(assert.to_string(), "assertion failed: too big");
        let bare = CtfeErrorKind::AssertFailed { message: None };
        assert_eq!(bare.to_string(), "assertion failed");
    }

    #[test]
    fn scalar_faults_map_to_codes() {
        assert_eq!(
            CtfeErrorKind::from_scalar(ScalarError::DivisionByZero).code(),
            ErrorCode::E6003
        );
        let shift = ScalarError::ShiftOutOfRange { amount: 40, bits: 32 };
        assert_eq!(CtfeErrorKind::from_scalar(shift).code(), ErrorCode::E6010);
    }
}
