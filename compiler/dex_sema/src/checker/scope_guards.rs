//! Closure-scoped context management for the resolver.
//!
//! Each helper installs a context, runs the closure and restores what was
//! there before, so an early return inside the closure cannot leak state.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{ExprId, FuncAttrs, FuncId, Name, Symbol};
use rustc_hash::FxHashSet;

use super::{FuncContext, Resolver};
use crate::scope::{FrameKind, ScopeChain};

/// Saved state of the enclosing function while a nested one is resolved.
struct SavedFunctionContext {
    scope: ScopeChain,
    func: Option<FuncContext>,
    dollar: Vec<ExprId>,
    array_op_allowed: bool,
}

impl Resolver<'_> {
    /// Run `f` inside the body scope of `func`: its parameters, and the
    /// members of its aggregate for member functions.
    pub(crate) fn with_function_scope<T>(&mut self, func: FuncId, f: impl FnOnce(&mut Self) -> T) -> T {
        let decl = self.program.decls.func(func);
        let params = decl.params.clone();
        let ctx = FuncContext {
            func,
            attrs: decl.attrs,
            parent: decl.parent,
            ret: (!decl.attrs.contains(FuncAttrs::AUTO_RETURN)).then_some(decl.ret),
            inferred: None,
            returns: Vec::new(),
            loops: 0,
            breakables: 0,
            labels: Vec::new(),
            all_labels: FxHashSet::default(),
        };
        let mut scope = ScopeChain::new();
        if let (true, Some(agg)) = (decl.is_member(), decl.parent) {
            scope.push(FrameKind::Aggregate(agg));
        }
        scope.push(FrameKind::Function(func));

        let saved = SavedFunctionContext {
            scope: std::mem::replace(&mut self.scope, scope),
            func: self.func.replace(ctx),
            dollar: std::mem::take(&mut self.dollar),
            array_op_allowed: std::mem::replace(&mut self.array_op_allowed, false),
        };

        for param in params {
            let var = self.program.decls.var(param);
            let (name, span) = (var.name, var.span);
            if self.scope.declare(name, Symbol::Var(param)).is_err() {
                let diag = Diagnostic::error(ErrorCode::E2012)
                    .with_message(format!("parameter `{}` is declared twice", self.program.text(name)))
                    .with_label(span, "duplicate parameter");
                self.report(diag);
            }
        }

        let result = f(self);

        self.scope = saved.scope;
        self.func = saved.func;
        self.dollar = saved.dollar;
        self.array_op_allowed = saved.array_op_allowed;
        result
    }

    /// Run `f` outside any function, seeing only module-level names.
    pub(crate) fn with_module_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = SavedFunctionContext {
            scope: std::mem::take(&mut self.scope),
            func: self.func.take(),
            dollar: std::mem::take(&mut self.dollar),
            array_op_allowed: std::mem::replace(&mut self.array_op_allowed, false),
        };

        let result = f(self);

        self.scope = saved.scope;
        self.func = saved.func;
        self.dollar = saved.dollar;
        self.array_op_allowed = saved.array_op_allowed;
        result
    }

    pub(crate) fn with_block_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scope.push(FrameKind::Block);
        let result = f(self);
        self.scope.pop();
        result
    }

    /// Run `f` with `$` bound to the length of `base`.
    pub(crate) fn with_dollar<T>(&mut self, base: ExprId, f: impl FnOnce(&mut Self) -> T) -> T {
        self.dollar.push(base);
        let result = f(self);
        self.dollar.pop();
        result
    }

    pub(crate) fn with_array_ops<T>(&mut self, allowed: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.array_op_allowed, allowed);
        let result = f(self);
        self.array_op_allowed = saved;
        result
    }

    /// Run `f` as the body of a loop (`is_loop`) or a switch.
    pub(crate) fn with_breakable<T>(&mut self, is_loop: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        if let Some(ctx) = &mut self.func {
            ctx.breakables += 1;
            ctx.loops += usize::from(is_loop);
        }
        let result = f(self);
        if let Some(ctx) = &mut self.func {
            ctx.breakables -= 1;
            ctx.loops -= usize::from(is_loop);
        }
        result
    }

    /// Run `f` as the body of a statement labeled `label`.
    pub(crate) fn with_label<T>(&mut self, label: Name, is_loop: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        if let Some(ctx) = &mut self.func {
            ctx.labels.push((label, is_loop));
        }
        let result = f(self);
        if let Some(ctx) = &mut self.func {
            ctx.labels.pop();
        }
        result
    }
}
