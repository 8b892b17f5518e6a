//! Dex CTFE - compile-time function evaluation.
//!
//! A tree-walking interpreter over resolved expressions and function
//! bodies. The resolver reaches it through [`CtfeEvaluator`], its
//! implementation of `dex_sema::CompileTimeEvaluator`.
//!
//! # Architecture
//!
//! - [`Value`]: interpreter values, distinct from arena literals. Every
//!   literal is copied into fresh storage when evaluated, so mutating a
//!   value can never reach the source tree.
//! - [`Place`]: an lvalue, the target of assignments, `ref` parameters and
//!   pointers.
//! - [`Interrupt`]: everything that leaves an evaluation early. `break`,
//!   `continue`, `goto` and `return` unwind through `Result` like errors do,
//!   until the statement that owns them catches them.
//! - [`Interpreter`]: the evaluation state of one top-level evaluation:
//!   call frames, the step counter and the configuration.
//!
//! # Failure Modes
//!
//! An expression the interpreter has no rule for yields
//! [`Interrupt::CannotInterpret`]; the caller decides whether that is an
//! error (a manifest constant) or a fallback to run-time code. Faults such
//! as an out-of-bounds index yield [`Interrupt::Fatal`] with the stack of
//! compile-time calls active at the fault.

mod config;
mod environment;
mod errors;
mod evaluator;
mod interpreter;
mod value;

#[cfg(test)]
mod tests;

pub use config::CtfeConfig;
pub use environment::Storage;
pub use errors::{
    BacktraceFrame, CannotInterpret, CtfeBacktrace, CtfeError, CtfeErrorKind, CtfeResult, Interrupt, UnsupportedReason,
};
pub use evaluator::{interpret, try_interpret, CtfeEvaluator};
pub use interpreter::{Goal, Interpreter};
pub use value::{ArrayValue, AssocValue, Place, StructValue, Value};
