//! Function signatures.
//!
//! Parameter and declared return types are resolved once, at module scope.
//! An `auto` return type is only known after the body has been resolved,
//! so [`Resolver::return_type`] resolves the body on demand.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{DefaultInitKind, ExprId, ExprKind, FuncAttrs, FuncId, SemaState, Span, TypeId};

use super::Resolver;
use crate::infer::{convert, resolve_rvalue};

impl Resolver<'_> {
    pub(crate) fn resolve_signature(&mut self, func: FuncId) {
        if !self.signatures.insert(func) {
            return;
        }
        let decl = self.program.decls.func(func);
        let (params, ret, attrs, span) = (decl.params.clone(), decl.ret, decl.attrs, decl.span);

        self.with_module_scope(|this| {
            for param in params {
                let var = this.program.decls.var(param);
                let (ty, init, var_span) = (var.ty, var.init, var.span);
                let ty = this.resolve_type(ty, var_span);
                this.program.decls.var_mut(param).ty = ty;
                if init.is_valid() {
                    let init = this.resolve_default_arg(init, ty);
                    this.program.decls.var_mut(param).init = init;
                }
            }
            if !attrs.contains(FuncAttrs::AUTO_RETURN) {
                let ret = this.resolve_type(ret, span);
                this.program.decls.func_mut(func).ret = ret;
            }
        });
    }

    /// A parameter default. `__LINE__` and friends stay unexpanded and are
    /// re-created at each call site.
    fn resolve_default_arg(&mut self, init: ExprId, ty: TypeId) -> ExprId {
        if let ExprKind::DefaultInit(kind) = self.program.arena.kind(init) {
            let own = match kind {
                DefaultInitKind::Line => TypeId::INT,
                DefaultInitKind::File
                | DefaultInitKind::Module
                | DefaultInitKind::Function
                | DefaultInitKind::PrettyFunction => TypeId::STRING,
            };
            self.program.arena.expr_mut(init).ty = Some(own);
            return init;
        }
        let value = resolve_rvalue(self, init);
        convert(self, value, ty, "default argument")
    }

    /// Function type of `func`, inferring its return type if needed.
    pub(crate) fn func_type(&mut self, func: FuncId, span: Span) -> TypeId {
        let ret = self.return_type(func, span);
        let params: Vec<TypeId> = self
            .program
            .decls
            .func(func)
            .params
            .iter()
            .map(|&p| self.program.decls.var(p).ty)
            .collect();
        self.program.types.function(params, ret)
    }

    /// Return type of `func`; an `auto` function has its body resolved first.
    pub(crate) fn return_type(&mut self, func: FuncId, span: Span) -> TypeId {
        self.resolve_signature(func);
        let decl = self.program.decls.func(func);
        if !decl.attrs.contains(FuncAttrs::AUTO_RETURN) {
            return decl.ret;
        }
        match decl.state {
            SemaState::Pending => {
                self.resolve_function(func);
                self.program.decls.func(func).ret
            }
            SemaState::InProgress => {
                let diag = Diagnostic::error(ErrorCode::E2016)
                    .with_message(format!(
                        "cannot infer the return type of `{}` from inside its own body",
                        self.program.text(decl.name)
                    ))
                    .with_label(span, "used here before its return type is known");
                self.report(diag);
                TypeId::ERROR
            }
            SemaState::Done | SemaState::Failed => decl.ret,
        }
    }
}
