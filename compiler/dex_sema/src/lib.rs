//! Dex Sema - semantic resolution of expressions and function bodies.
//!
//! The resolver turns the parser's untyped trees into typed ones:
//! - identifiers are bound to declarations through the [`scope::ScopeChain`]
//! - overloads are selected and implicit conversions become `Cast` nodes
//! - user-defined operators are rewritten into ordinary calls
//! - lvalue, mutability, purity, safety and escape rules are enforced
//!
//! # Error Tolerance
//!
//! Every failure emits a diagnostic and substitutes an `ExprKind::Error`
//! node typed `ERROR`. Error-typed operands silence follow-on diagnostics,
//! so one mistake produces one message and sibling expressions are still
//! checked.
//!
//! # Collaborators
//!
//! Compile-time evaluation and `mixin` re-parsing are reached through the
//! [`CompileTimeEvaluator`] and [`MixinParser`] traits; the driver plugs in
//! the interpreter and the parser.

pub mod checker;
mod config;
pub mod escape;
mod evaluator;
mod infer;
pub mod scope;
pub mod suggest;

#[cfg(test)]
mod tests;

pub use checker::{resolve_module, Resolver};
pub use config::{Deprecation, ResolverConfig};
pub use evaluator::{CompileTimeEvaluator, FoldEvaluator, MixinParser};
