//! Variable, global and aggregate declarations.

use dex_diagnostic::{type_mismatch, Diagnostic, ErrorCode};
use dex_ir::{AggId, ExprId, ExprKind, MatchLevel, SemaState, Span, StorageClass, TypeId, VarId};

use super::Resolver;
use crate::infer::{convert, resolve_rvalue};

impl Resolver<'_> {
    /// Resolve the type and initializer of `var` in the current scope.
    ///
    /// Manifest constants, globals and field defaults must be known at
    /// compile time, so their initializers are evaluated.
    pub(crate) fn resolve_var_decl(&mut self, var: VarId) {
        let decl = self.program.decls.var(var).clone();
        let inferred = decl.ty == TypeId::ERROR && decl.storage.contains(StorageClass::AUTO);

        let (ty, init) = if inferred {
            if !decl.init.is_valid() {
                let diag = Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!(
                        "cannot infer the type of `{}` without an initializer",
                        self.program.text(decl.name)
                    ))
                    .with_label(decl.span, "declared here");
                self.report(diag);
                return;
            }
            let init = resolve_rvalue(self, decl.init);
            let init_ty = self.program.arena.ty(init);
            if self.program.types.is_void(init_ty) {
                let diag = Diagnostic::error(ErrorCode::E2003)
                    .with_message(format!("`{}` cannot have type `void`", self.program.text(decl.name)))
                    .with_label(self.program.arena.span(init), "this expression has no value");
                self.report(diag);
                self.program.decls.var_mut(var).ty = TypeId::ERROR;
                return;
            }
            let ty = if decl.storage.contains(StorageClass::IMMUTABLE) {
                self.program.types.immutable_of(init_ty)
            } else if decl.storage.contains(StorageClass::CONST) {
                self.program.types.const_of(init_ty)
            } else {
                init_ty
            };
            let init = if ty == init_ty {
                init
            } else {
                convert(self, init, ty, "initializer")
            };
            (ty, init)
        } else {
            let ty = self.resolve_type(decl.ty, decl.span);
            let init = if decl.init.is_valid() {
                let value = resolve_rvalue(self, decl.init);
                self.resolve_initializer(value, ty)
            } else {
                ExprId::INVALID
            };
            (ty, init)
        };

        let must_evaluate = decl.is_manifest() || decl.is_global() || decl.is_field();
        let init = if init.is_valid() && must_evaluate && !self.program.types.is_error(self.program.arena.ty(init)) {
            match self.evaluate(init) {
                Ok(value) => value,
                Err(_) => self.program.error_expr(self.program.arena.span(init)),
            }
        } else {
            init
        };

        let decl = self.program.decls.var_mut(var);
        decl.ty = ty;
        decl.init = init;
    }

    /// Convert an initializer to the declared type. A scalar initializing a
    /// static array fills every element.
    pub(crate) fn resolve_initializer(&mut self, value: ExprId, ty: TypeId) -> ExprId {
        let value_ty = self.program.arena.ty(value);
        let len = self.program.types.static_len(ty);
        let elem = self.program.types.elem(ty);
        if let (Some(len), Some(elem)) = (len, elem) {
            let types = &self.program.types;
            let fills = !types.is_array(value_ty)
                && !types.is_error(value_ty)
                && types.implicit_conv_to(value_ty, elem) != MatchLevel::NoMatch;
            if fills {
                let elem_value = convert(self, value, elem, "array element");
                let span = self.program.arena.span(value);
                let elems: Vec<ExprId> = (0..len).map(|_| elem_value).collect();
                let range = self.program.arena.alloc_list(elems);
                return self.program.arena.alloc_typed(ExprKind::ArrayLiteral(range), span, ty);
            }
        }
        convert(self, value, ty, "initializer")
    }

    /// Resolve a module-level or `static` variable. Returns `false` when the
    /// variable is still being resolved, i.e. its initializer refers to itself.
    pub(crate) fn resolve_global(&mut self, var: VarId) -> bool {
        match self.globals.get(&var).copied() {
            Some(SemaState::Done | SemaState::Failed) => return true,
            Some(SemaState::InProgress) => {
                let decl = self.program.decls.var(var);
                let diag = Diagnostic::error(ErrorCode::E6001)
                    .with_message(format!("circular initialization of `{}`", self.program.text(decl.name)))
                    .with_label(decl.span, "its initializer depends on itself");
                self.report(diag);
                return false;
            }
            Some(SemaState::Pending) | None => {}
        }
        self.globals.insert(var, SemaState::InProgress);
        let before = self.errors;
        self.with_module_scope(|this| this.resolve_var_decl(var));
        let state = if self.errors > before {
            SemaState::Failed
        } else {
            SemaState::Done
        };
        self.globals.insert(var, state);
        true
    }

    /// Resolve field types and defaults, member signatures and `alias this`.
    pub(crate) fn resolve_aggregate(&mut self, agg: AggId) {
        if self.aggregates.contains_key(&agg) {
            return;
        }
        self.aggregates.insert(agg, SemaState::InProgress);
        let decl = self.program.decls.agg(agg).clone();

        for &field in &decl.fields {
            self.with_module_scope(|this| this.resolve_var_decl(field));
        }
        for &func in decl.methods.iter().chain(&decl.ctors) {
            self.resolve_signature(func);
        }
        if !decl.alias_this.is_empty()
            && self.program.decls.find_field(agg, decl.alias_this).is_none()
            && self.program.decls.find_methods(agg, decl.alias_this).is_empty()
        {
            let diag = Diagnostic::error(ErrorCode::E2010)
                .with_message(format!(
                    "`alias {} this` names no member of `{}`",
                    self.program.text(decl.alias_this),
                    self.program.text(decl.name)
                ))
                .with_label(decl.span, "in this aggregate");
            self.report(diag);
        }
        self.aggregates.insert(agg, SemaState::Done);
    }

    /// Report that a `found` value was used where `expected` is required.
    pub(crate) fn mismatch(&mut self, span: Span, expected: TypeId, found: TypeId, context: &str) {
        let expected = self.program.type_name(expected);
        let found = self.program.type_name(found);
        self.report(type_mismatch(span, &expected, &found, context));
    }
}
