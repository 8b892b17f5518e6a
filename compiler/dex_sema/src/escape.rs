//! Lvalue mutability and escape analysis.
//!
//! These checks look at resolved trees only and never allocate, so the
//! statement resolver and the expression handlers share them. Each returns
//! the diagnostic instead of reporting it; the caller decides the node that
//! replaces the failed expression.
//!
//! A by-value parameter lives in the callee's frame and counts as a local.
//! `this` of a struct method is the caller's storage and is never reported.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::{AggId, ExprId, ExprKind, Owner, Program, Qualifier, VarId};

fn qualifier_word(q: Qualifier) -> &'static str {
    match q {
        Qualifier::Mutable => "mutable",
        Qualifier::Const => "const",
        Qualifier::Immutable => "immutable",
    }
}

fn cannot_modify(program: &Program, e: ExprId, what: String) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2005)
        .with_message(format!("cannot modify {what}"))
        .with_label(program.arena.span(e), format!("`{}` is read-only", program.expr_to_string(e)))
}

/// Whether the lvalue `e` may be written. `ctor_of` is the aggregate whose
/// constructor is being resolved: its `const` and `immutable` fields may be
/// initialized through `this`.
pub fn check_modifiable(program: &Program, e: ExprId, ctor_of: Option<AggId>) -> Result<(), Diagnostic> {
    let types = &program.types;
    let ty = program.arena.ty(e);
    match program.arena.kind(e) {
        ExprKind::Error => Ok(()),
        ExprKind::Var(var) => {
            let decl = program.decls.var(var);
            if decl.is_manifest() {
                return Err(cannot_modify(
                    program,
                    e,
                    format!("manifest constant `{}`", program.text(decl.name)),
                ));
            }
            match types.qualifier(decl.ty) {
                Qualifier::Mutable => Ok(()),
                q => Err(cannot_modify(
                    program,
                    e,
                    format!("{} variable `{}`", qualifier_word(q), program.text(decl.name)),
                )),
            }
        }
        ExprKind::DotVar { base, var } => {
            let decl = program.decls.var(var);
            let field_qual = types.qualifier(decl.ty);
            if field_qual != Qualifier::Mutable {
                let initializing = matches!(program.arena.kind(base), ExprKind::This)
                    && matches!(decl.owner, Owner::Agg(agg) if Some(agg) == ctor_of);
                if !initializing {
                    return Err(cannot_modify(
                        program,
                        e,
                        format!("{} field `{}`", qualifier_word(field_qual), program.text(decl.name)),
                    ));
                }
            }
            let base_ty = program.arena.ty(base);
            if types.is_class(base_ty) || types.is_pointer(base_ty) {
                return match types.qualifier(base_ty) {
                    Qualifier::Mutable => Ok(()),
                    q => Err(cannot_modify(
                        program,
                        e,
                        format!("a field of a {} reference", qualifier_word(q)),
                    )),
                };
            }
            check_modifiable(program, base, ctor_of)
        }
        ExprKind::Index { base, .. } => {
            let base_ty = program.arena.ty(base);
            if types.is_static_array(base_ty) {
                return check_modifiable(program, base, ctor_of);
            }
            match types.qualifier(ty) {
                Qualifier::Mutable => Ok(()),
                q => Err(cannot_modify(program, e, format!("{} element", qualifier_word(q)))),
            }
        }
        ExprKind::ArrayLength(base) => {
            if types.is_static_array(program.arena.ty(base)) {
                return Err(cannot_modify(program, e, "the length of a static array".to_string()));
            }
            check_modifiable(program, base, ctor_of)
        }
        ExprKind::Slice { base, .. } => {
            let base_ty = program.arena.ty(base);
            if types.is_static_array(base_ty) {
                return check_modifiable(program, base, ctor_of);
            }
            match types.elem_raw(ty).map(|elem| types.qualifier(elem)) {
                Some(Qualifier::Const | Qualifier::Immutable) => {
                    Err(cannot_modify(program, e, "the elements of a read-only slice".to_string()))
                }
                _ => Ok(()),
            }
        }
        ExprKind::Comma { right, .. } | ExprKind::Dot { right, .. } => check_modifiable(program, right, ctor_of),
        ExprKind::Cond {
            then_expr,
            else_expr,
            ..
        } => {
            check_modifiable(program, then_expr, ctor_of)?;
            check_modifiable(program, else_expr, ctor_of)
        }
        ExprKind::Cast { operand, .. } => {
            check_modifiable(program, operand, ctor_of)?;
            qualified_target(program, e)
        }
        _ => qualified_target(program, e),
    }
}

fn qualified_target(program: &Program, e: ExprId) -> Result<(), Diagnostic> {
    match program.types.qualifier(program.arena.ty(e)) {
        Qualifier::Mutable => Ok(()),
        q => Err(cannot_modify(program, e, format!("a {} value", qualifier_word(q)))),
    }
}

/// The stack variable whose storage the lvalue `e` designates, if any.
pub fn local_root(program: &Program, e: ExprId) -> Option<VarId> {
    let types = &program.types;
    match program.arena.kind(e) {
        ExprKind::Var(var) => {
            let decl = program.decls.var(var);
            (decl.is_local() && !decl.is_ref()).then_some(var)
        }
        ExprKind::DotVar { base, .. } => {
            let base_ty = program.arena.ty(base);
            if types.is_class(base_ty) || types.is_pointer(base_ty) {
                return None;
            }
            local_root(program, base)
        }
        ExprKind::Index { base, .. } | ExprKind::Slice { base, .. } => {
            if types.is_static_array(program.arena.ty(base)) {
                local_root(program, base)
            } else {
                None
            }
        }
        ExprKind::Cast { operand, to } if types.strip(to) == types.strip(program.arena.ty(operand)) => {
            local_root(program, operand)
        }
        ExprKind::Comma { right, .. } | ExprKind::Dot { right, .. } => local_root(program, right),
        ExprKind::Cond {
            then_expr,
            else_expr,
            ..
        } => local_root(program, then_expr).or_else(|| local_root(program, else_expr)),
        _ => None,
    }
}

/// The local whose address the value `e` carries, if any.
fn escaping_local(program: &Program, e: ExprId) -> Option<VarId> {
    let types = &program.types;
    match program.arena.kind(e) {
        ExprKind::AddrOf(inner) => local_root(program, inner),
        ExprKind::Slice { base, .. } if types.is_static_array(program.arena.ty(base)) => local_root(program, base),
        ExprKind::Cast { operand, to } => {
            let from = program.arena.ty(operand);
            if types.is_static_array(from) && types.is_slice(to) {
                local_root(program, operand)
            } else {
                escaping_local(program, operand)
            }
        }
        ExprKind::Comma { right, .. } | ExprKind::Dot { right, .. } => escaping_local(program, right),
        ExprKind::Cond {
            then_expr,
            else_expr,
            ..
        } => escaping_local(program, then_expr).or_else(|| escaping_local(program, else_expr)),
        _ => None,
    }
}

/// A value returned by a function must not point into its frame.
pub fn check_escape(program: &Program, e: ExprId) -> Result<(), Diagnostic> {
    match escaping_local(program, e) {
        Some(var) => Err(Diagnostic::error(ErrorCode::E2006)
            .with_message(format!(
                "returning `{}` escapes a reference to local `{}`",
                program.expr_to_string(e),
                program.text(program.decls.var(var).name)
            ))
            .with_label(program.arena.span(e), "escapes the function")),
        None => Ok(()),
    }
}

/// An lvalue returned by `ref` must outlive the call.
pub fn check_escape_ref(program: &Program, e: ExprId) -> Result<(), Diagnostic> {
    match local_root(program, e) {
        Some(var) => Err(Diagnostic::error(ErrorCode::E2006)
            .with_message(format!(
                "cannot return local `{}` by reference",
                program.text(program.decls.var(var).name)
            ))
            .with_label(program.arena.span(e), "refers to the stack frame")),
        None => Ok(()),
    }
}

/// Storing the address of a local into storage that is not itself local.
pub fn check_assign_escape(program: &Program, target: ExprId, value: ExprId) -> Result<(), Diagnostic> {
    if local_root(program, target).is_some() {
        return Ok(());
    }
    match escaping_local(program, value) {
        Some(var) => Err(Diagnostic::error(ErrorCode::E2006)
            .with_message(format!(
                "reference to local `{}` assigned to `{}`, which outlives it",
                program.text(program.decls.var(var).name),
                program.expr_to_string(target)
            ))
            .with_label(program.arena.span(value), "escapes into longer-lived storage")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use dex_ir::{ExprKind, FuncId, Owner, Program, Span, StorageClass, TypeId, VarDecl};
    use pretty_assertions::assert_eq;

    use super::*;

    fn local(program: &mut Program, name: &str, ty: TypeId) -> (VarId, ExprId) {
        let name = program.intern(name);
        let var = program.decls.add_var(VarDecl {
            name,
            ty,
            init: ExprId::INVALID,
            storage: StorageClass::empty(),
            owner: Owner::Func(FuncId::new(0)),
            span: Span::DUMMY,
        });
        let e = program.arena.alloc_typed(ExprKind::Var(var), Span::DUMMY, ty);
        (var, e)
    }

    #[test]
    fn address_of_local_escapes() {
        let mut program = Program::new("m", "m.d", "");
        let (_, x) = local(&mut program, "x", TypeId::INT);
        let ptr = program.types.pointer(TypeId::INT);
        let addr = program.arena.alloc_typed(ExprKind::AddrOf(x), Span::DUMMY, ptr);
        let err = check_escape(&program, addr).unwrap_err();
        assert_eq!(err.code, ErrorCode::E2006);
        assert!(check_escape(&program, x).is_ok());
    }

    #[test]
    fn slicing_local_static_array_escapes() {
        let mut program = Program::new("m", "m.d", "");
        let arr = program.types.array(TypeId::INT, 3);
        let (_, a) = local(&mut program, "a", arr);
        let slice = program.types.slice(TypeId::INT);
        let s = program.arena.alloc_typed(
            ExprKind::Slice {
                base: a,
                lower: ExprId::INVALID,
                upper: ExprId::INVALID,
            },
            Span::DUMMY,
            slice,
        );
        assert!(check_escape(&program, s).is_err());
        assert!(check_escape_ref(&program, a).is_err());
    }

    #[test]
    fn const_local_is_not_modifiable() {
        let mut program = Program::new("m", "m.d", "");
        let const_int = program.types.const_of(TypeId::INT);
        let (_, c) = local(&mut program, "c", const_int);
        let (_, m) = local(&mut program, "m", TypeId::INT);
        let err = check_modifiable(&program, c, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::E2005);
        assert!(check_modifiable(&program, m, None).is_ok());
    }
}
