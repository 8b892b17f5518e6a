//! Dex IR - shared data structures for the expression subsystem.
//!
//! This crate holds everything the passes agree on:
//! - Spans and interned names
//! - The type pool and declaration tables
//! - The expression/statement arena (`ExprKind`, `StmtKind`)
//! - Scalar arithmetic used by both the folder and the interpreter
//! - Tree-level contracts: `apply`, `syntax_copy`, printing, mangling and
//!   the classification predicates
//!
//! # Design Philosophy
//!
//! - **Intern everything**: strings are `Name(u32)`, types `TypeId(u32)`,
//!   nodes `ExprId(u32)`.
//! - **Closed node set**: `ExprKind` is a `Copy` enum and every pass matches
//!   it exhaustively, so a new variant fails to compile until each pass
//!   handles it.
//! - **Rewrite by allocation**: passes produce new nodes instead of editing
//!   resolved ones in place.

mod arena;
pub mod decl;
pub mod expr;
mod mangle;
mod name;
pub mod operators;
mod predicates;
mod print;
mod program;
pub mod scalar;
mod span;
pub mod stmt;
mod syntax_copy;
pub mod ty;
pub mod visitor;

pub use arena::ExprArena;
pub use decl::{
    AggId, AggKind, AggregateDecl, DeclTable, FuncAttrs, FuncDecl, FuncId, OverloadSetId, Owner, SemaState,
    StorageClass, Symbol, TemplateDecl, TemplateId, VarDecl, VarId,
};
pub use expr::{Expr, ExprId, ExprKind, ExprRange, IsRelation, IsSpec, Truth};
pub use name::{Name, StringInterner};
pub use operators::{AssignOp, BinaryOp, DefaultInitKind, IncDec, UnaryOp};
pub use program::{Item, ModuleInfo, Program};
pub use scalar::{FloatKind, NumKind, Scalar, ScalarError};
pub use span::{LineIndex, Span};
pub use stmt::{CaseRange, Stmt, StmtId, StmtKind, StmtRange, SwitchCase};
pub use syntax_copy::SyntaxCopyError;
pub use ty::{CharWidth, IntKind, MatchLevel, Qualifier, TypeId, TypeKind, TypePool};
pub use visitor::{apply, apply_stmt, children, Visitor};
