//! Dex Fold - best-effort constant folding of resolved expressions.
//!
//! `optimize` rewrites a resolved tree toward literals. It never fails:
//! whatever it cannot fold losslessly comes back unchanged, with its
//! children folded where possible.
//!
//! # Scope
//!
//! - Literal arithmetic, comparisons and casts
//! - Short-circuit operators and `?:` with a known condition
//! - Manifest constants (and, with [`OptimizeFlags::EXPAND_VARS`], other
//!   constants whose initializer is a literal)
//! - Indexing, slicing, `.length` and `~` on string and array literals
//!
//! Does NOT cover calls, loops or anything needing a frame; that is the
//! interpreter's job. Both passes reduce operators through
//! `dex_ir::scalar`, so a folded result and an interpreted one agree.
//!
//! # Side Effects
//!
//! A subtree is only dropped when its value is already known and
//! `Program::has_side_effects` says evaluating it cannot be observed.

mod fold;
mod literal;

use bitflags::bitflags;
use dex_ir::{ExprId, Program, Truth};

pub use literal::is_literal_tree;

bitflags! {
    /// What the caller needs from the folded expression.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct OptimizeFlags: u8 {
        /// The result is used as a value, not just for its effects.
        const WANT_VALUE  = 1 << 0;
        /// Replace `const`/`immutable` variables that have a literal
        /// initializer by that literal.
        const EXPAND_VARS = 1 << 1;
    }
}

/// Fold `id` as far as possible; returns `id` itself when nothing changed.
#[tracing::instrument(level = "trace", skip_all)]
pub fn optimize(program: &mut Program, id: ExprId, flags: OptimizeFlags) -> ExprId {
    fold::Folder::new(program, flags).fold(id)
}

/// Fold a condition and report its static truth value.
///
/// This is how `static if` and `case` labels learn their values when no
/// interpreter is involved.
pub fn fold_condition(program: &mut Program, id: ExprId) -> (ExprId, Truth) {
    let folded = optimize(program, id, OptimizeFlags::WANT_VALUE | OptimizeFlags::EXPAND_VARS);
    if program.has_side_effects(folded) {
        return (folded, Truth::Unknown);
    }
    (folded, program.is_bool(folded))
}

#[cfg(test)]
mod tests;
