//! Declaration tables: variables, functions, aggregates, overload sets.
//!
//! Declarations are owned by [`DeclTable`] and referenced everywhere else by
//! id. The resolver fills in types and bodies in place; the interpreter only
//! reads them.

use bitflags::bitflags;

use crate::expr::ExprId;
use crate::stmt::StmtId;
use crate::ty::TypeId;
use crate::{Name, Span};

macro_rules! decl_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }
    };
}

decl_id!(
    /// Index of a [`VarDecl`].
    VarId
);
decl_id!(
    /// Index of a [`FuncDecl`].
    FuncId
);
decl_id!(
    /// Index of an [`AggregateDecl`].
    AggId
);
decl_id!(
    /// Index of an overload set.
    OverloadSetId
);
decl_id!(
    /// Index of a [`TemplateDecl`].
    TemplateId
);

bitflags! {
    /// Storage classes of a variable.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct StorageClass: u32 {
        /// `enum x = ...;` - a named constant with no storage.
        const MANIFEST  = 1 << 0;
        const CONST     = 1 << 1;
        const IMMUTABLE = 1 << 2;
        const REF       = 1 << 3;
        const OUT       = 1 << 4;
        const SCOPE     = 1 << 5;
        const PARAMETER = 1 << 6;
        const FIELD     = 1 << 7;
        /// Module-level or `static` storage.
        const STATIC    = 1 << 8;
        /// Type inferred from the initializer.
        const AUTO      = 1 << 9;
        /// Compiler-generated temporary.
        const TEMP      = 1 << 10;
    }
}

bitflags! {
    /// Attributes of a function.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FuncAttrs: u32 {
        const PURE        = 1 << 0;
        const NOTHROW     = 1 << 1;
        const SAFE        = 1 << 2;
        const TRUSTED     = 1 << 3;
        const SYSTEM      = 1 << 4;
        const DEPRECATED  = 1 << 5;
        const REF_RETURN  = 1 << 6;
        const CONSTRUCTOR = 1 << 7;
        const STATIC      = 1 << 8;
        /// Return type inferred from the body.
        const AUTO_RETURN = 1 << 9;
    }
}

impl FuncAttrs {
    /// `@safe` code may only call `@safe` or `@trusted` code.
    pub fn is_safe_interface(self) -> bool {
        self.intersects(FuncAttrs::SAFE | FuncAttrs::TRUSTED)
    }
}

/// Where a variable lives.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Owner {
    Module,
    Func(FuncId),
    Agg(AggId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub name: Name,
    pub ty: TypeId,
    /// Initializer, `ExprId::INVALID` for default initialization.
    pub init: ExprId,
    pub storage: StorageClass,
    pub owner: Owner,
    pub span: Span,
}

impl VarDecl {
    pub fn is_manifest(&self) -> bool {
        self.storage.contains(StorageClass::MANIFEST)
    }

    pub fn is_ref(&self) -> bool {
        self.storage.intersects(StorageClass::REF | StorageClass::OUT)
    }

    pub fn is_parameter(&self) -> bool {
        self.storage.contains(StorageClass::PARAMETER)
    }

    pub fn is_field(&self) -> bool {
        self.storage.contains(StorageClass::FIELD)
    }

    /// Module-level or `static` variable.
    pub fn is_global(&self) -> bool {
        matches!(self.owner, Owner::Module) || self.storage.contains(StorageClass::STATIC)
    }

    /// Stack-allocated: locals and non-`ref` parameters.
    pub fn is_local(&self) -> bool {
        matches!(self.owner, Owner::Func(_)) && !self.is_global() && !self.is_manifest()
    }
}

/// Resolution progress of a function body.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum SemaState {
    #[default]
    Pending,
    InProgress,
    Done,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: Name,
    pub params: Vec<VarId>,
    pub ret: TypeId,
    /// `StmtId::INVALID` for declarations without a body.
    pub body: StmtId,
    pub attrs: FuncAttrs,
    /// Enclosing aggregate for member functions and constructors.
    pub parent: Option<AggId>,
    /// Function literal (`function int(int x) { ... }`).
    pub is_literal: bool,
    pub state: SemaState,
    pub span: Span,
}

impl FuncDecl {
    pub fn has_body(&self) -> bool {
        self.body.is_valid()
    }

    pub fn is_ctor(&self) -> bool {
        self.attrs.contains(FuncAttrs::CONSTRUCTOR)
    }

    pub fn is_member(&self) -> bool {
        self.parent.is_some() && !self.attrs.contains(FuncAttrs::STATIC)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AggKind {
    Struct,
    Class,
}

impl AggKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            AggKind::Struct => "struct",
            AggKind::Class => "class",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggregateDecl {
    pub name: Name,
    pub kind: AggKind,
    pub fields: Vec<VarId>,
    pub methods: Vec<FuncId>,
    pub ctors: Vec<FuncId>,
    /// Member named by `alias x this;`, `Name::EMPTY` when absent.
    pub alias_this: Name,
    pub ty: TypeId,
    pub span: Span,
}

/// Template declarations are opaque here: instantiation belongs to the symbol table.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateDecl {
    pub name: Name,
    pub params: Vec<Name>,
    pub span: Span,
}

/// What an identifier can denote.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Symbol {
    Var(VarId),
    Func(FuncId),
    Overloads(OverloadSetId),
    Agg(AggId),
    /// `alias Name = Type;` or a captured `is(...)` identifier.
    Type(TypeId),
    Template(TemplateId),
    Module(Name),
}

/// Storage for every declaration in a program.
#[derive(Clone, Debug, Default)]
pub struct DeclTable {
    vars: Vec<VarDecl>,
    funcs: Vec<FuncDecl>,
    aggs: Vec<AggregateDecl>,
    overloads: Vec<Vec<FuncId>>,
    templates: Vec<TemplateDecl>,
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("declaration table exceeded {} entries", u32::MAX))
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, decl: VarDecl) -> VarId {
        let id = VarId::new(next_id(self.vars.len()));
        self.vars.push(decl);
        id
    }

    pub fn add_func(&mut self, decl: FuncDecl) -> FuncId {
        let id = FuncId::new(next_id(self.funcs.len()));
        self.funcs.push(decl);
        id
    }

    pub fn add_agg(&mut self, decl: AggregateDecl) -> AggId {
        let id = AggId::new(next_id(self.aggs.len()));
        self.aggs.push(decl);
        id
    }

    pub fn add_overloads(&mut self, funcs: Vec<FuncId>) -> OverloadSetId {
        let id = OverloadSetId::new(next_id(self.overloads.len()));
        self.overloads.push(funcs);
        id
    }

    pub fn add_template(&mut self, decl: TemplateDecl) -> TemplateId {
        let id = TemplateId::new(next_id(self.templates.len()));
        self.templates.push(decl);
        id
    }

    #[inline]
    pub fn var(&self, id: VarId) -> &VarDecl {
        &self.vars[id.index()]
    }

    #[inline]
    pub fn var_mut(&mut self, id: VarId) -> &mut VarDecl {
        &mut self.vars[id.index()]
    }

    #[inline]
    pub fn func(&self, id: FuncId) -> &FuncDecl {
        &self.funcs[id.index()]
    }

    #[inline]
    pub fn func_mut(&mut self, id: FuncId) -> &mut FuncDecl {
        &mut self.funcs[id.index()]
    }

    #[inline]
    pub fn agg(&self, id: AggId) -> &AggregateDecl {
        &self.aggs[id.index()]
    }

    #[inline]
    pub fn agg_mut(&mut self, id: AggId) -> &mut AggregateDecl {
        &mut self.aggs[id.index()]
    }

    #[inline]
    pub fn overloads(&self, id: OverloadSetId) -> &[FuncId] {
        &self.overloads[id.index()]
    }

    #[inline]
    pub fn overloads_mut(&mut self, id: OverloadSetId) -> &mut Vec<FuncId> {
        &mut self.overloads[id.index()]
    }

    #[inline]
    pub fn template(&self, id: TemplateId) -> &TemplateDecl {
        &self.templates[id.index()]
    }

    pub fn func_ids(&self) -> impl Iterator<Item = FuncId> {
        (0..self.funcs.len()).map(|i| FuncId::new(i as u32))
    }

    /// Position of `var` among the fields of `agg`.
    pub fn field_index(&self, agg: AggId, var: VarId) -> Option<usize> {
        self.agg(agg).fields.iter().position(|&f| f == var)
    }

    /// Field of `agg` named `name`.
    pub fn find_field(&self, agg: AggId, name: Name) -> Option<VarId> {
        self.agg(agg)
            .fields
            .iter()
            .copied()
            .find(|&f| self.var(f).name == name)
    }

    /// Methods of `agg` named `name`, constructors excluded.
    pub fn find_methods(&self, agg: AggId, name: Name) -> Vec<FuncId> {
        self.agg(agg)
            .methods
            .iter()
            .copied()
            .filter(|&f| self.func(f).name == name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringInterner;

    #[test]
    fn field_lookup() {
        let interner = StringInterner::new();
        let mut decls = DeclTable::new();
        let agg = decls.add_agg(AggregateDecl {
            name: interner.intern("Point"),
            kind: AggKind::Struct,
            fields: Vec::new(),
            methods: Vec::new(),
            ctors: Vec::new(),
            alias_this: Name::EMPTY,
            ty: TypeId::ERROR,
            span: Span::DUMMY,
        });
        let mut field = |name: &str| {
            decls.add_var(VarDecl {
                name: interner.intern(name),
                ty: TypeId::INT,
                init: ExprId::INVALID,
                storage: StorageClass::FIELD,
                owner: Owner::Agg(agg),
                span: Span::DUMMY,
            })
        };
        let x = field("x");
        let y = field("y");
        decls.agg_mut(agg).fields = vec![x, y];

        assert_eq!(decls.find_field(agg, interner.intern("y")), Some(y));
        assert_eq!(decls.field_index(agg, y), Some(1));
        assert_eq!(decls.find_field(agg, interner.intern("z")), None);
        assert!(!decls.var(x).is_local());
    }

    #[test]
    fn locality() {
        let var = VarDecl {
            name: Name::EMPTY,
            ty: TypeId::INT,
            init: ExprId::INVALID,
            storage: StorageClass::PARAMETER,
            owner: Owner::Func(FuncId::new(0)),
            span: Span::DUMMY,
        };
        assert!(var.is_local());
        let global = VarDecl {
            owner: Owner::Module,
            ..var.clone()
        };
        assert!(global.is_global() && !global.is_local());
        let manifest = VarDecl {
            storage: StorageClass::MANIFEST,
            ..var
        };
        assert!(!manifest.is_local());
    }
}
