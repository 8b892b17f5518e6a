//! Purity, nothrow, safety and deprecation checks.
//!
//! Every check compares the accessed symbol against the attributes of the
//! function being resolved. Violations are reported, never downgraded.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{FuncAttrs, FuncId, Qualifier, Span, VarId};

use super::Resolver;
use crate::Deprecation;

impl Resolver<'_> {
    /// Check a call of `callee` from the current function.
    pub(crate) fn check_call_attributes(&mut self, callee: FuncId, span: Span) {
        let Some(ctx) = &self.func else {
            return;
        };
        let caller = ctx.attrs;
        let decl = self.program.decls.func(callee);
        if decl.is_literal {
            return;
        }
        let (callee_attrs, callee_name) = (decl.attrs, self.program.text(decl.name));
        let caller_name = self.current_function_name();

        let mut problems = Vec::new();
        if caller.contains(FuncAttrs::PURE) && !callee_attrs.contains(FuncAttrs::PURE) {
            problems.push((
                ErrorCode::E2007,
                format!("pure function `{caller_name}` cannot call impure function `{callee_name}`"),
            ));
        }
        if caller.contains(FuncAttrs::NOTHROW) && !callee_attrs.contains(FuncAttrs::NOTHROW) {
            problems.push((
                ErrorCode::E2007,
                format!("nothrow function `{caller_name}` cannot call `{callee_name}`, which may throw"),
            ));
        }
        if caller.contains(FuncAttrs::SAFE) && !callee_attrs.is_safe_interface() {
            problems.push((
                ErrorCode::E2008,
                format!("@safe function `{caller_name}` cannot call @system function `{callee_name}`"),
            ));
        }
        for (code, message) in problems {
            let diag = Diagnostic::error(code)
                .with_message(message)
                .with_label(span, "called here");
            self.report(diag);
        }
        self.check_deprecated(callee, span);
    }

    /// Report a use of a `deprecated` function per the configured policy.
    pub(crate) fn check_deprecated(&mut self, func: FuncId, span: Span) {
        let decl = self.program.decls.func(func);
        if !decl.attrs.contains(FuncAttrs::DEPRECATED) {
            return;
        }
        let inside_deprecated = self
            .func
            .as_ref()
            .is_some_and(|ctx| ctx.attrs.contains(FuncAttrs::DEPRECATED));
        if inside_deprecated {
            return;
        }
        let message = format!("`{}` is deprecated", self.program.text(decl.name));
        match self.config.deprecation {
            Deprecation::Allow => {}
            Deprecation::Warn => {
                let diag = Diagnostic::warning(ErrorCode::E2009)
                    .with_message(message)
                    .with_label(span, "used here");
                self.warn(diag);
            }
            Deprecation::Error => {
                let diag = Diagnostic::error(ErrorCode::E2009)
                    .with_message(message)
                    .with_label(span, "used here");
                self.report(diag);
            }
        }
    }

    /// A pure function may only read globals that can never change.
    pub(crate) fn check_global_access(&mut self, var: VarId, span: Span) {
        let Some(ctx) = &self.func else {
            return;
        };
        if !ctx.attrs.contains(FuncAttrs::PURE) {
            return;
        }
        let decl = self.program.decls.var(var);
        if !decl.is_global() || decl.is_manifest() || self.program.types.qualifier(decl.ty) != Qualifier::Mutable {
            return;
        }
        let diag = Diagnostic::error(ErrorCode::E2007)
            .with_message(format!(
                "pure function `{}` cannot access mutable static data `{}`",
                self.current_function_name(),
                self.program.text(decl.name)
            ))
            .with_label(span, "accessed here");
        self.report(diag);
    }

    /// Report `what` if the current function is `@safe`.
    pub(crate) fn check_unsafe(&mut self, span: Span, what: &str) {
        let safe = self.func.as_ref().is_some_and(|ctx| ctx.attrs.contains(FuncAttrs::SAFE));
        if safe {
            let diag = Diagnostic::error(ErrorCode::E2008)
                .with_message(format!(
                    "{what} is not allowed in @safe function `{}`",
                    self.current_function_name()
                ))
                .with_label(span, "unsafe operation");
            self.report(diag);
        }
    }
}
