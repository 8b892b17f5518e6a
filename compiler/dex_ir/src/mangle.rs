//! Link names for declarations and value manglings for literal expressions.
//!
//! Both depend only on names, types and literal values, never on arena
//! indices, so they are stable across compiler runs.

use std::fmt::Write;

use crate::decl::{FuncAttrs, FuncId, Owner, StorageClass, VarId};
use crate::expr::{ExprId, ExprKind};
use crate::ty::CharWidth;
use crate::Program;

fn push_ident(out: &mut String, ident: &str) {
    let _ = write!(out, "{}{ident}", ident.len());
}

fn push_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NAN");
    } else if f == f64::INFINITY {
        out.push_str("INF");
    } else if f == f64::NEG_INFINITY {
        out.push_str("NINF");
    } else {
        let _ = write!(out, "{:016X}", f.to_bits());
    }
}

impl Program {
    fn push_scope(&self, out: &mut String, parent: Option<crate::decl::AggId>) {
        out.push_str("_D");
        push_ident(out, self.text(self.module.name));
        if let Some(agg) = parent {
            push_ident(out, self.text(self.decls.agg(agg).name));
        }
    }

    /// Link name of a global or field.
    pub fn mangle_var(&self, var: VarId) -> String {
        let decl = self.decls.var(var);
        let mut out = String::new();
        let parent = match decl.owner {
            Owner::Agg(agg) => Some(agg),
            Owner::Module | Owner::Func(_) => None,
        };
        self.push_scope(&mut out, parent);
        push_ident(&mut out, self.text(decl.name));
        self.types.mangle(decl.ty, &self.interner, &mut out);
        out
    }

    /// Link name of a function, including its attributes and the `this`
    /// marker for members.
    pub fn mangle_func(&self, func: FuncId) -> String {
        let decl = self.decls.func(func);
        let mut out = String::new();
        self.push_scope(&mut out, decl.parent);
        push_ident(&mut out, self.text(decl.name));
        if decl.is_member() {
            out.push('M');
        }
        out.push('F');
        for (flag, code) in [
            (FuncAttrs::PURE, "Na"),
            (FuncAttrs::NOTHROW, "Nb"),
            (FuncAttrs::REF_RETURN, "Nc"),
            (FuncAttrs::SAFE, "Nf"),
            (FuncAttrs::TRUSTED, "Ne"),
        ] {
            if decl.attrs.contains(flag) {
                out.push_str(code);
            }
        }
        for &p in &decl.params {
            let param = self.decls.var(p);
            if param.storage.contains(StorageClass::OUT) {
                out.push('J');
            } else if param.storage.contains(StorageClass::REF) {
                out.push('K');
            }
            self.types.mangle(param.ty, &self.interner, &mut out);
        }
        out.push('Z');
        self.types.mangle(decl.ret, &self.interner, &mut out);
        out
    }

    /// Value mangling of a literal, as used for compile-time arguments.
    /// `None` for anything that is not a literal tree.
    pub fn mangle_value(&self, id: ExprId) -> Option<String> {
        let mut out = String::new();
        self.write_value(id, &mut out)?;
        Some(out)
    }

    fn write_value(&self, id: ExprId, out: &mut String) -> Option<()> {
        if !id.is_valid() {
            out.push('v');
            return Some(());
        }
        match self.arena.kind(id) {
            ExprKind::Int(v) => {
                let signed = self
                    .types
                    .num_kind(self.arena.ty(id))
                    .is_some_and(crate::scalar::NumKind::is_signed);
                if signed && (v as i64) < 0 {
                    let _ = write!(out, "N{}", (v as i64).unsigned_abs());
                } else {
                    let _ = write!(out, "i{v}");
                }
            }
            ExprKind::Real(bits) => {
                out.push('e');
                push_float(out, f64::from_bits(bits));
            }
            ExprKind::Complex { re, im } => {
                out.push('c');
                push_float(out, f64::from_bits(re));
                out.push('c');
                push_float(out, f64::from_bits(im));
            }
            ExprKind::Null => out.push('n'),
            ExprKind::String { value, width, .. } => {
                let units = width.encode(self.text(value));
                let tag = match width {
                    CharWidth::One => 'a',
                    CharWidth::Two => 'w',
                    CharWidth::Four => 'd',
                };
                let digits = usize::from(width.bytes()) * 2;
                let _ = write!(out, "{tag}{}_", units.len() * usize::from(width.bytes()));
                for unit in units {
                    let _ = write!(out, "{unit:0digits$x}");
                }
            }
            ExprKind::ArrayLiteral(elems) => {
                let elems = self.arena.list(elems);
                let _ = write!(out, "A{}", elems.len());
                for &e in elems {
                    self.write_value(e, out)?;
                }
            }
            ExprKind::AssocArrayLiteral { keys, values } => {
                let keys = self.arena.list(keys);
                let _ = write!(out, "A{}", keys.len());
                for (&k, &v) in keys.iter().zip(self.arena.list(values)) {
                    self.write_value(k, out)?;
                    self.write_value(v, out)?;
                }
            }
            ExprKind::StructLiteral { elements, .. } => {
                let elems = self.arena.list(elements);
                let _ = write!(out, "S{}", elems.len());
                for &e in elems {
                    self.write_value(e, out)?;
                }
            }
            _ => return None,
        }
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{FuncDecl, SemaState, VarDecl};
    use crate::stmt::StmtId;
    use crate::ty::TypeId;
    use crate::Span;
    use pretty_assertions::assert_eq;

    fn param(program: &mut Program, ty: TypeId, storage: StorageClass) -> VarId {
        let name = program.intern("p");
        program.decls.add_var(VarDecl {
            name,
            ty,
            init: ExprId::INVALID,
            storage: storage | StorageClass::PARAMETER,
            owner: Owner::Module,
            span: Span::DUMMY,
        })
    }

    #[test]
    fn function_link_names() {
        let mut program = Program::new("app", "app.d", "");
        let x = param(&mut program, TypeId::INT, StorageClass::empty());
        let y = param(&mut program, TypeId::DOUBLE, StorageClass::REF);
        let name = program.intern("square");
        let func = program.decls.add_func(FuncDecl {
            name,
            params: vec![x, y],
            ret: TypeId::INT,
            body: StmtId::INVALID,
            attrs: FuncAttrs::PURE | FuncAttrs::SAFE,
            parent: None,
            is_literal: false,
            state: SemaState::Pending,
            span: Span::DUMMY,
        });
        assert_eq!(program.mangle_func(func), "_D3app6squareFNaNfiKdZi");
    }

    #[test]
    fn global_link_name() {
        let mut program = Program::new("app", "app.d", "");
        let name = program.intern("count");
        let var = program.decls.add_var(VarDecl {
            name,
            ty: TypeId::ULONG,
            init: ExprId::INVALID,
            storage: StorageClass::empty(),
            owner: Owner::Module,
            span: Span::DUMMY,
        });
        assert_eq!(program.mangle_var(var), "_D3app5countm");
    }

    #[test]
    fn literal_values() {
        let mut program = Program::new("app", "app.d", "");
        let neg = program.int_lit((-5i64) as u64, TypeId::INT, Span::DUMMY);
        let pos = program.int_lit(7, TypeId::UINT, Span::DUMMY);
        let s = program.string_lit("ab", CharWidth::One, true, TypeId::STRING, Span::DUMMY);
        let elems = program.arena.alloc_list([neg, pos]);
        let arr = program.arena.alloc_kind(ExprKind::ArrayLiteral(elems), Span::DUMMY);
        assert_eq!(program.mangle_value(neg).as_deref(), Some("N5"));
        assert_eq!(program.mangle_value(s).as_deref(), Some("a2_6162"));
        assert_eq!(program.mangle_value(arr).as_deref(), Some("A2N5i7"));
        let this = program.arena.alloc_kind(ExprKind::This, Span::DUMMY);
        assert_eq!(program.mangle_value(this), None);
    }
}
