//! The compilation unit every pass threads through.

use rustc_hash::FxHashMap;

use crate::decl::{AggId, AggKind, DeclTable, FuncId, Symbol, VarId};
use crate::expr::{ExprId, ExprKind};
use crate::scalar::{NumKind, Scalar};
use crate::stmt::StmtId;
use crate::ty::{CharWidth, IntKind, TypeId, TypeKind, TypePool};
use crate::{ExprArena, LineIndex, Name, Span, StringInterner};

/// Module identity, used by `__MODULE__`, `__FILE__`, `__LINE__` and mangling.
#[derive(Clone, Debug)]
pub struct ModuleInfo {
    pub name: Name,
    pub file: Name,
    pub lines: LineIndex,
}

/// Top-level declarations in source order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Item {
    Var(VarId),
    Func(FuncId),
    Agg(AggId),
    /// A `StaticAssert` statement at module level.
    StaticAssert(StmtId),
    Alias { name: Name, ty: TypeId, span: Span },
}

/// Everything known about one module.
#[derive(Debug)]
pub struct Program {
    pub interner: StringInterner,
    pub types: TypePool,
    pub arena: ExprArena,
    pub decls: DeclTable,
    pub module: ModuleInfo,
    /// Module scope: the root of every lookup chain.
    pub globals: FxHashMap<Name, Symbol>,
    pub items: Vec<Item>,
}

impl Program {
    pub fn new(module_name: &str, file: &str, source: &str) -> Self {
        let interner = StringInterner::new();
        let module = ModuleInfo {
            name: interner.intern(module_name),
            file: interner.intern(file),
            lines: LineIndex::new(source),
        };
        Program {
            interner,
            types: TypePool::new(),
            arena: ExprArena::new(),
            decls: DeclTable::new(),
            module,
            globals: FxHashMap::default(),
            items: Vec::new(),
        }
    }

    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    #[inline]
    pub fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub fn type_name(&self, ty: TypeId) -> String {
        self.types.display(ty, &self.interner)
    }

    /// Bind `name` at module scope. Functions sharing a name merge into an
    /// overload set; any other clash returns the existing symbol.
    pub fn declare_global(&mut self, name: Name, sym: Symbol) -> Result<(), Symbol> {
        let existing = match self.globals.get(&name) {
            None => {
                self.globals.insert(name, sym);
                return Ok(());
            }
            Some(&existing) => existing,
        };
        match (existing, sym) {
            (Symbol::Func(a), Symbol::Func(b)) => {
                let set = self.decls.add_overloads(vec![a, b]);
                self.globals.insert(name, Symbol::Overloads(set));
                Ok(())
            }
            (Symbol::Overloads(set), Symbol::Func(b)) => {
                self.decls.overloads_mut(set).push(b);
                Ok(())
            }
            (existing, _) => Err(existing),
        }
    }

    /// Qualified name, e.g. `app.Point.norm`.
    pub fn func_path(&self, func: FuncId) -> String {
        let decl = self.decls.func(func);
        let mut path = self.text(self.module.name).to_string();
        if let Some(agg) = decl.parent {
            path.push('.');
            path.push_str(self.text(self.decls.agg(agg).name));
        }
        path.push('.');
        path.push_str(self.text(decl.name));
        path
    }

    /// Byte size of `ty`, including struct layouts (no padding model).
    pub fn size_of(&self, ty: TypeId) -> u64 {
        if let Some(size) = self.types.size_of(ty) {
            return size;
        }
        match self.types.base_kind(ty) {
            TypeKind::Aggregate {
                kind: AggKind::Struct,
                agg,
                ..
            } => self
                .decls
                .agg(*agg)
                .fields
                .iter()
                .map(|&f| self.size_of(self.decls.var(f).ty))
                .sum(),
            TypeKind::Array { elem, len } => self.size_of(*elem) * len,
            _ => 0,
        }
    }

    // Literal construction

    pub fn error_expr(&mut self, span: Span) -> ExprId {
        self.arena.alloc_typed(ExprKind::Error, span, TypeId::ERROR)
    }

    /// Integral literal of type `ty`; `bits` is normalized to the type's width.
    pub fn int_lit(&mut self, bits: u64, ty: TypeId, span: Span) -> ExprId {
        let value = self.types.num_kind(ty).map_or(bits, |k| k.normalize(bits));
        self.arena.alloc_typed(ExprKind::Int(value), span, ty)
    }

    pub fn bool_lit(&mut self, value: bool, span: Span) -> ExprId {
        self.arena.alloc_typed(ExprKind::Int(u64::from(value)), span, TypeId::BOOL)
    }

    pub fn real_lit(&mut self, value: f64, ty: TypeId, span: Span) -> ExprId {
        self.arena.alloc_typed(ExprKind::Real(value.to_bits()), span, ty)
    }

    pub fn complex_lit(&mut self, re: f64, im: f64, ty: TypeId, span: Span) -> ExprId {
        self.arena.alloc_typed(
            ExprKind::Complex {
                re: re.to_bits(),
                im: im.to_bits(),
            },
            span,
            ty,
        )
    }

    pub fn string_lit(&mut self, text: &str, width: CharWidth, committed: bool, ty: TypeId, span: Span) -> ExprId {
        let value = self.intern(text);
        self.arena.alloc_typed(
            ExprKind::String {
                value,
                width,
                committed,
            },
            span,
            ty,
        )
    }

    pub fn null_lit(&mut self, ty: TypeId, span: Span) -> ExprId {
        self.arena.alloc_typed(ExprKind::Null, span, ty)
    }

    /// Build a literal from a scalar of type `ty`.
    pub fn scalar_lit(&mut self, value: Scalar, ty: TypeId, span: Span) -> ExprId {
        match value {
            Scalar::Int(bits) => self.int_lit(bits, ty, span),
            Scalar::Float(f) => self.real_lit(f, ty, span),
            Scalar::Complex(re, im) => self.complex_lit(re, im, ty, span),
        }
    }

    /// Scalar value of a scalar literal node, with its numeric kind.
    pub fn scalar_of(&self, id: ExprId) -> Option<(Scalar, NumKind)> {
        let expr = self.arena.expr(id);
        let kind = self.types.num_kind(expr.ty?)?;
        let value = match expr.kind {
            ExprKind::Int(v) => Scalar::Int(v),
            ExprKind::Real(bits) => Scalar::Float(f64::from_bits(bits)),
            ExprKind::Complex { re, im } => Scalar::Complex(f64::from_bits(re), f64::from_bits(im)),
            _ => return None,
        };
        Some((value, kind))
    }

    /// Text and width of a string literal node.
    pub fn string_of(&self, id: ExprId) -> Option<(&'static str, CharWidth)> {
        match self.arena.kind(id) {
            ExprKind::String { value, width, .. } => Some((self.text(value), width)),
            _ => None,
        }
    }

    /// The `.init` value of `ty` as a literal tree.
    pub fn default_init(&mut self, ty: TypeId, span: Span) -> ExprId {
        let base = self.types.strip(ty);
        match self.types.kind(base).clone() {
            TypeKind::Bool | TypeKind::Int(_) => {
                let bits = match self.types.kind(base) {
                    TypeKind::Int(IntKind::Char) => 0xFF,
                    TypeKind::Int(IntKind::Wchar | IntKind::Dchar) => 0xFFFF,
                    _ => 0,
                };
                self.int_lit(bits, ty, span)
            }
            TypeKind::Float(_) => self.real_lit(f64::NAN, ty, span),
            TypeKind::Complex(_) => self.complex_lit(f64::NAN, f64::NAN, ty, span),
            TypeKind::Array { elem, len } => {
                let elems: Vec<ExprId> = (0..len).map(|_| self.default_init(elem, span)).collect();
                let range = self.arena.alloc_list(elems);
                self.arena.alloc_typed(ExprKind::ArrayLiteral(range), span, ty)
            }
            TypeKind::Aggregate {
                kind: AggKind::Struct,
                agg,
                ..
            } => {
                let count = self.decls.agg(agg).fields.len();
                let elements = self.arena.alloc_list(std::iter::repeat(ExprId::INVALID).take(count));
                self.arena.alloc_typed(ExprKind::StructLiteral { agg, elements }, span, ty)
            }
            TypeKind::Error => self.error_expr(span),
            TypeKind::Void
            | TypeKind::Null
            | TypeKind::TypeInfo
            | TypeKind::Pointer(_)
            | TypeKind::Slice(_)
            | TypeKind::AssocArray { .. }
            | TypeKind::Aggregate { .. }
            | TypeKind::Function { .. }
            | TypeKind::Tuple(_)
            | TypeKind::Const(_)
            | TypeKind::Immutable(_)
            | TypeKind::Ident(_)
            | TypeKind::IdentIndexed { .. } => self.null_lit(ty, span),
        }
    }

    /// Initializer of field `field`, or the field type's default.
    pub fn field_init(&mut self, field: VarId, span: Span) -> ExprId {
        let decl = self.decls.var(field);
        if decl.init.is_valid() {
            return decl.init;
        }
        let ty = decl.ty;
        self.default_init(ty, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{FuncAttrs, FuncDecl, SemaState};
    use crate::stmt::StmtId;

    fn func(program: &mut Program, name: &str) -> FuncId {
        let name = program.intern(name);
        program.decls.add_func(FuncDecl {
            name,
            params: Vec::new(),
            ret: TypeId::VOID,
            body: StmtId::INVALID,
            attrs: FuncAttrs::empty(),
            parent: None,
            is_literal: false,
            state: SemaState::Pending,
            span: Span::DUMMY,
        })
    }

    #[test]
    fn functions_merge_into_overload_sets() {
        let mut program = Program::new("app", "app.d", "");
        let name = program.intern("f");
        let a = func(&mut program, "f");
        let b = func(&mut program, "f");
        let c = func(&mut program, "f");
        program.declare_global(name, Symbol::Func(a)).unwrap();
        program.declare_global(name, Symbol::Func(b)).unwrap();
        program.declare_global(name, Symbol::Func(c)).unwrap();
        let Some(Symbol::Overloads(set)) = program.globals.get(&name).copied() else {
            panic!("expected an overload set");
        };
        assert_eq!(program.decls.overloads(set), &[a, b, c]);
        assert_eq!(program.func_path(a), "app.f");
    }

    #[test]
    fn clashing_non_functions_are_rejected() {
        let mut program = Program::new("app", "app.d", "");
        let name = program.intern("x");
        program.declare_global(name, Symbol::Type(TypeId::INT)).unwrap();
        assert_eq!(
            program.declare_global(name, Symbol::Type(TypeId::LONG)),
            Err(Symbol::Type(TypeId::INT))
        );
    }

    #[test]
    fn literals_normalize_to_their_type() {
        let mut program = Program::new("app", "app.d", "");
        let lit = program.int_lit(300, TypeId::UBYTE, Span::DUMMY);
        assert_eq!(program.arena.kind(lit), ExprKind::Int(44));
        let (value, kind) = program.scalar_of(lit).unwrap();
        assert_eq!(value, Scalar::Int(44));
        assert!(!kind.is_signed());
    }

    #[test]
    fn default_initializers() {
        let mut program = Program::new("app", "app.d", "");
        let c = program.default_init(TypeId::CHAR, Span::DUMMY);
        assert_eq!(program.arena.kind(c), ExprKind::Int(0xFF));
        let f = program.default_init(TypeId::DOUBLE, Span::DUMMY);
        let ExprKind::Real(bits) = program.arena.kind(f) else {
            panic!("expected a real literal");
        };
        assert!(f64::from_bits(bits).is_nan());
        let arr_ty = program.types.array(TypeId::INT, 3);
        let arr = program.default_init(arr_ty, Span::DUMMY);
        let ExprKind::ArrayLiteral(elems) = program.arena.kind(arr) else {
            panic!("expected an array literal");
        };
        assert_eq!(elems.len(), 3);
    }
}
