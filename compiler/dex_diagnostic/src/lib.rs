//! Diagnostic system for error reporting.
//!
//! Every user-facing failure in the compiler is a [`Diagnostic`]:
//! - an error code for searchability
//! - a message saying what went wrong
//! - a primary label saying where
//! - notes for context (for CTFE failures, the compile-time call stack)
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is proof that at least one error was emitted. Passes
//! that substitute error nodes hold one, so a failed analysis can never
//! look like a silent success.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic, &lines);
//! fn resolve_all() -> Result<(), ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{type_mismatch, undefined_identifier, Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
