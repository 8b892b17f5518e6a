//! Resolver core.
//!
//! Contains the `Resolver` struct and the module-level entry points.
//!
//! # Module Structure
//!
//! - `scope_guards`: closure-scoped save/restore of function, block and loop context
//! - `type_resolution`: `Ident` types to declared aggregates and aliases
//! - `signatures`: parameter and return types, on demand
//! - `declarations`: variables, globals and aggregates
//! - `function_checking`: function bodies, labels and fall-through analysis
//! - `statements`: statement resolution
//! - `attributes`: purity, nothrow, safety and deprecation checks
//! - `evaluation`: hand-off to the compile-time evaluator
//!
//! # Resolution Order
//!
//! Declarations are resolved lazily: a global is resolved the first time it
//! is referenced, a function body the first time its return type or its
//! compile-time value is needed. `resolve_module` then sweeps everything
//! that was never referenced. Re-entry is tracked with [`SemaState`] so a
//! cycle is reported instead of recursing forever.

mod attributes;
mod declarations;
mod evaluation;
mod function_checking;
mod scope_guards;
mod signatures;
mod statements;
mod type_resolution;

use dex_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use dex_ir::{AggId, ExprId, FuncAttrs, FuncId, Item, Name, Program, SemaState, Span, StmtId, Symbol, TypeId, VarId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::evaluator::{CompileTimeEvaluator, MixinParser};
use crate::infer::resolve_expr;
use crate::scope::ScopeChain;
use crate::ResolverConfig;

/// What the resolver knows about the function whose body it is inside.
#[derive(Clone, Debug)]
pub(crate) struct FuncContext {
    pub(crate) func: FuncId,
    pub(crate) attrs: FuncAttrs,
    pub(crate) parent: Option<AggId>,
    /// Declared return type, `None` while an `auto` return type is inferred.
    pub(crate) ret: Option<TypeId>,
    /// Common type of the `return` statements seen so far.
    pub(crate) inferred: Option<TypeId>,
    /// `return` statements to convert once an inferred type is final.
    pub(crate) returns: Vec<StmtId>,
    /// Enclosing loops, for `continue`.
    pub(crate) loops: usize,
    /// Enclosing loops and switches, for `break`.
    pub(crate) breakables: usize,
    /// Enclosing labeled statements; `true` when the label is on a loop.
    pub(crate) labels: Vec<(Name, bool)>,
    /// Every label in the body, for `goto`.
    pub(crate) all_labels: FxHashSet<Name>,
}

/// Semantic resolver for one module.
pub struct Resolver<'a> {
    pub(crate) program: &'a mut Program,
    pub(crate) diags: &'a mut DiagnosticQueue,
    pub(crate) config: &'a ResolverConfig,
    pub(crate) evaluator: &'a mut dyn CompileTimeEvaluator,
    pub(crate) mixin: Option<&'a mut dyn MixinParser>,
    pub(crate) scope: ScopeChain,
    pub(crate) func: Option<FuncContext>,
    /// Bases of the enclosing index and slice brackets, innermost last.
    pub(crate) dollar: Vec<ExprId>,
    /// Types whose `alias this` is being tried, so a cycle stops.
    pub(crate) alias_this_active: FxHashSet<TypeId>,
    pub(crate) globals: FxHashMap<VarId, SemaState>,
    pub(crate) aggregates: FxHashMap<AggId, SemaState>,
    pub(crate) signatures: FxHashSet<FuncId>,
    /// Inside the right-hand side of a slice assignment.
    pub(crate) array_op_allowed: bool,
    /// Errors this resolver has reported.
    pub(crate) errors: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(
        program: &'a mut Program,
        diags: &'a mut DiagnosticQueue,
        config: &'a ResolverConfig,
        evaluator: &'a mut dyn CompileTimeEvaluator,
    ) -> Self {
        Resolver {
            program,
            diags,
            config,
            evaluator,
            mixin: None,
            scope: ScopeChain::new(),
            func: None,
            dollar: Vec::new(),
            alias_this_active: FxHashSet::default(),
            globals: FxHashMap::default(),
            aggregates: FxHashMap::default(),
            signatures: FxHashSet::default(),
            array_op_allowed: false,
            errors: 0,
        }
    }

    /// Enable `mixin(...)` expressions.
    #[must_use]
    pub fn with_mixin_parser(mut self, parser: &'a mut dyn MixinParser) -> Self {
        self.mixin = Some(parser);
        self
    }

    /// Resolve every declaration of the module.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve_module(&mut self) -> Result<(), ErrorGuaranteed> {
        let start = self.errors;
        let items = self.program.items.clone();
        self.declare_items(&items);

        for item in &items {
            if let Item::Agg(agg) = *item {
                self.resolve_aggregate(agg);
            }
        }
        for item in &items {
            if let Item::Func(func) = *item {
                self.resolve_signature(func);
            }
        }
        for item in &items {
            match *item {
                Item::Var(var) => {
                    self.resolve_global(var);
                }
                Item::StaticAssert(stmt) => self.with_module_scope(|this| this.resolve_stmt(stmt)),
                Item::Func(_) | Item::Agg(_) | Item::Alias { .. } => {}
            }
        }
        for item in &items {
            match *item {
                Item::Func(func) => self.resolve_function(func),
                Item::Agg(agg) => {
                    let decl = self.program.decls.agg(agg);
                    let members: Vec<FuncId> = decl.methods.iter().chain(&decl.ctors).copied().collect();
                    for func in members {
                        self.resolve_function(func);
                    }
                }
                Item::Var(_) | Item::StaticAssert(_) | Item::Alias { .. } => {}
            }
        }

        tracing::debug!(errors = self.errors - start, "module resolved");
        if self.errors > start {
            Err(self.error_guarantee(Span::DUMMY))
        } else {
            Ok(())
        }
    }

    /// Resolve a standalone expression at module scope.
    pub fn resolve_expression(&mut self, id: ExprId) -> ExprId {
        self.with_module_scope(|this| resolve_expr(this, id))
    }

    /// Resolve `id` at module scope and reduce it to a literal tree.
    pub fn evaluate_expression(&mut self, id: ExprId) -> Result<ExprId, ErrorGuaranteed> {
        let resolved = self.resolve_expression(id);
        self.evaluate(resolved)
    }

    /// Enter module-level names into the global table.
    fn declare_items(&mut self, items: &[Item]) {
        for item in items {
            let (name, sym, span) = match *item {
                Item::Var(var) => {
                    let decl = self.program.decls.var(var);
                    (decl.name, Symbol::Var(var), decl.span)
                }
                Item::Func(func) => {
                    let decl = self.program.decls.func(func);
                    (decl.name, Symbol::Func(func), decl.span)
                }
                Item::Agg(agg) => {
                    let decl = self.program.decls.agg(agg);
                    (decl.name, Symbol::Agg(agg), decl.span)
                }
                Item::StaticAssert(_) | Item::Alias { .. } => continue,
            };
            self.declare_global(name, sym, span);
        }
        // Aliases may name any aggregate, so they come second.
        for item in items {
            if let Item::Alias { name, ty, span } = *item {
                let ty = self.with_module_scope(|this| this.resolve_type(ty, span));
                self.declare_global(name, Symbol::Type(ty), span);
            }
        }
    }

    fn declare_global(&mut self, name: Name, sym: Symbol, span: Span) {
        if self.program.declare_global(name, sym).is_err() {
            let diag = Diagnostic::error(ErrorCode::E2012)
                .with_message(format!("`{}` is already declared in this module", self.program.text(name)))
                .with_label(span, "redeclared here");
            self.report(diag);
        }
    }

    // Diagnostics

    /// Emit an error diagnostic.
    pub(crate) fn report(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        self.errors += 1;
        self.diags.emit_error(diag, &self.program.module.lines)
    }

    pub(crate) fn warn(&mut self, diag: Diagnostic) {
        self.diags.add(diag, &self.program.module.lines);
    }

    /// Emit `diag` and return an error node in place of the failed expression.
    pub(crate) fn error_node(&mut self, diag: Diagnostic, span: Span) -> ExprId {
        self.report(diag);
        self.program.error_expr(span)
    }

    /// Proof that an error was reported, for paths that only see an error
    /// node left behind by an earlier diagnostic.
    pub(crate) fn error_guarantee(&mut self, span: Span) -> ErrorGuaranteed {
        if let Some(guar) = ErrorGuaranteed::from_error_count(self.diags.error_count()) {
            return guar;
        }
        let diag = Diagnostic::error(ErrorCode::E9001)
            .with_message("error node reached without a diagnostic")
            .with_label(span, "here");
        self.report(diag)
    }

    /// Name of the function being resolved, for messages.
    pub(crate) fn current_function_name(&self) -> &'static str {
        self.func
            .as_ref()
            .map_or("<module>", |ctx| self.program.text(self.program.decls.func(ctx.func).name))
    }
}

/// Resolve every declaration of `program`.
pub fn resolve_module(
    program: &mut Program,
    diags: &mut DiagnosticQueue,
    config: &ResolverConfig,
    evaluator: &mut dyn CompileTimeEvaluator,
) -> Result<(), ErrorGuaranteed> {
    Resolver::new(program, diags, config, evaluator).resolve_module()
}
