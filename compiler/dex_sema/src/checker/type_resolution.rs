//! Turning parsed types into resolved ones.
//!
//! The parser leaves named types as `TypeKind::Ident` and `T[N]` with an
//! identifier `N` as `TypeKind::IdentIndexed`, since it cannot tell a
//! manifest length from a key type. Both are looked up here. Resolution is
//! idempotent: resolved types intern to themselves.

use dex_diagnostic::{undefined_identifier, Diagnostic, ErrorCode};
use dex_ir::{ExprKind, Name, Span, Symbol, TypeId, TypeKind};

use super::Resolver;
use crate::scope::{Binding, Candidates};

/// Why a parsed type did not resolve.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum TypeLookupError {
    Undefined(Name),
    NotAType(Name),
    /// `T[N]` where `N` is neither a type nor a constant length.
    BadIndex(Name),
}

impl Resolver<'_> {
    /// Resolve `ty` without reporting anything; `is(...)` relies on this.
    pub(crate) fn lookup_type(&mut self, ty: TypeId) -> Result<TypeId, TypeLookupError> {
        let kind = self.program.types.kind(ty).clone();
        let resolved = match kind {
            TypeKind::Ident(name) => match self.scope.lookup(self.program, name) {
                Candidates::One(Binding::Symbol(Symbol::Agg(agg))) => self.program.decls.agg(agg).ty,
                Candidates::One(Binding::Symbol(Symbol::Type(t))) => t,
                Candidates::None => return Err(TypeLookupError::Undefined(name)),
                Candidates::One(_) | Candidates::Many { .. } => return Err(TypeLookupError::NotAType(name)),
            },
            TypeKind::IdentIndexed { elem, index } => {
                let elem = self.lookup_type(elem)?;
                self.lookup_indexed(elem, index)?
            }
            TypeKind::Pointer(t) => {
                let t = self.lookup_type(t)?;
                self.program.types.pointer(t)
            }
            TypeKind::Slice(t) => {
                let t = self.lookup_type(t)?;
                self.program.types.slice(t)
            }
            TypeKind::Array { elem, len } => {
                let elem = self.lookup_type(elem)?;
                self.program.types.array(elem, len)
            }
            TypeKind::AssocArray { key, value } => {
                let key = self.lookup_type(key)?;
                let value = self.lookup_type(value)?;
                self.program.types.assoc_array(key, value)
            }
            TypeKind::Function { params, ret } => {
                let params = params
                    .iter()
                    .map(|&p| self.lookup_type(p))
                    .collect::<Result<Vec<_>, _>>()?;
                let ret = self.lookup_type(ret)?;
                self.program.types.function(params, ret)
            }
            TypeKind::Tuple(elems) => {
                let elems = elems
                    .iter()
                    .map(|&e| self.lookup_type(e))
                    .collect::<Result<Vec<_>, _>>()?;
                self.program.types.tuple(elems)
            }
            TypeKind::Const(t) => {
                let t = self.lookup_type(t)?;
                self.program.types.const_of(t)
            }
            TypeKind::Immutable(t) => {
                let t = self.lookup_type(t)?;
                self.program.types.immutable_of(t)
            }
            TypeKind::Error
            | TypeKind::Void
            | TypeKind::Bool
            | TypeKind::Int(_)
            | TypeKind::Float(_)
            | TypeKind::Complex(_)
            | TypeKind::Null
            | TypeKind::TypeInfo
            | TypeKind::Aggregate { .. } => ty,
        };
        Ok(resolved)
    }

    /// `elem[index]`: an associative array keyed by a type, or a static
    /// array whose length is a manifest constant.
    fn lookup_indexed(&mut self, elem: TypeId, index: Name) -> Result<TypeId, TypeLookupError> {
        match self.scope.lookup(self.program, index) {
            Candidates::One(Binding::Symbol(Symbol::Agg(agg))) => {
                let key = self.program.decls.agg(agg).ty;
                Ok(self.program.types.assoc_array(key, elem))
            }
            Candidates::One(Binding::Symbol(Symbol::Type(key))) => Ok(self.program.types.assoc_array(key, elem)),
            Candidates::One(Binding::Symbol(Symbol::Var(var))) if self.program.decls.var(var).is_manifest() => {
                if self.program.decls.var(var).is_global() {
                    self.resolve_global(var);
                }
                let init = self.program.decls.var(var).init;
                if init.is_valid() {
                    if let ExprKind::Int(len) = self.program.arena.kind(init) {
                        return Ok(self.program.types.array(elem, len));
                    }
                }
                Err(TypeLookupError::BadIndex(index))
            }
            Candidates::None => Err(TypeLookupError::Undefined(index)),
            Candidates::One(_) | Candidates::Many { .. } => Err(TypeLookupError::BadIndex(index)),
        }
    }

    /// Resolve `ty`, reporting failures at `span` and yielding `ERROR`.
    pub(crate) fn resolve_type(&mut self, ty: TypeId, span: Span) -> TypeId {
        match self.lookup_type(ty) {
            Ok(t) => t,
            Err(err) => {
                self.report_type_error(err, span);
                TypeId::ERROR
            }
        }
    }

    fn report_type_error(&mut self, err: TypeLookupError, span: Span) {
        let diag = match err {
            TypeLookupError::Undefined(name) => undefined_identifier(span, self.program.text(name)),
            TypeLookupError::NotAType(name) => Diagnostic::error(ErrorCode::E2003)
                .with_message(format!("`{}` is not a type", self.program.text(name)))
                .with_label(span, "expected a type"),
            TypeLookupError::BadIndex(name) => Diagnostic::error(ErrorCode::E2003)
                .with_message(format!(
                    "`{}` is neither a key type nor a constant array length",
                    self.program.text(name)
                ))
                .with_label(span, "in this type"),
        };
        self.report(diag);
    }
}
