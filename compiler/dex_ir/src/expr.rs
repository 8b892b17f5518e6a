//! Expression nodes.
//!
//! # Design Notes
//!
//! The expression set is a closed enum. Every pass matches on [`ExprKind`]
//! exhaustively, so adding a variant is a compile error in each pass until
//! it is handled.
//!
//! Nodes live in [`crate::ExprArena`] and refer to children by [`ExprId`];
//! lists of children are [`ExprRange`]s into the arena's side table. Passes
//! that rewrite a node allocate a new one and return its id, the old node is
//! left in place. A node with `ty == None` has not been resolved yet.

use std::fmt;

use crate::decl::{AggId, FuncId, OverloadSetId, TemplateId, VarId};
use crate::operators::{AssignOp, BinaryOp, DefaultInitKind, IncDec, UnaryOp};
use crate::ty::{CharWidth, TypeId};
use crate::{Name, Span};

/// Index into the expression arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Absent child (e.g. a slice without bounds, a skipped struct field).
    pub const INVALID: ExprId = ExprId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
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

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ExprId({})", self.0)
        } else {
            write!(f, "ExprId::INVALID")
        }
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A run of child ids in the arena's list table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ExprRange {
    pub start: u32,
    pub len: u32,
}

impl ExprRange {
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Tri-state truth of an expression known at compile time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn from_bool(b: bool) -> Self {
        if b {
            Truth::True
        } else {
            Truth::False
        }
    }

    pub fn known(self) -> Option<bool> {
        match self {
            Truth::True => Some(true),
            Truth::False => Some(false),
            Truth::Unknown => None,
        }
    }
}

/// Relation in an `is(...)` expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IsRelation {
    /// `is(T)`: `T` is a valid type.
    Exists,
    /// `is(T : U)`: implicitly converts.
    Converts,
    /// `is(T == U)`: same type.
    Equals,
}

/// Right-hand side of an `is(...)` relation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IsSpec {
    None,
    Type(TypeId),
    Struct,
    Class,
    Function,
    Pointer,
}

/// Expression variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    // Literals
    /// Placeholder substituted for a node whose resolution failed.
    Error,
    /// Integral, character and boolean literal; value normalized to its type.
    Int(u64),
    /// Floating literal, stored as `f64` bits.
    Real(u64),
    /// Complex literal, parts stored as `f64` bits.
    Complex { re: u64, im: u64 },
    /// String literal. An uncommitted literal may still change width.
    String {
        value: Name,
        width: CharWidth,
        committed: bool,
    },
    Null,
    ArrayLiteral(ExprRange),
    /// Parallel key/value lists; keys are validated for uniqueness on use.
    AssocArrayLiteral { keys: ExprRange, values: ExprRange },
    /// One element per field of `agg`; `ExprId::INVALID` skips a field.
    StructLiteral { agg: AggId, elements: ExprRange },
    /// `prelude` runs for side effects before the elements.
    Tuple { prelude: ExprId, elements: ExprRange },

    // Symbol references
    Ident(Name),
    Dollar,
    Var(VarId),
    Func { func: FuncId, has_overloads: bool },
    This,
    Super,
    /// Address of a static symbol plus a byte offset.
    SymOff { var: VarId, offset: u64 },
    OverloadSet(OverloadSetId),
    FuncLiteral(FuncId),
    TypeExpr(TypeId),
    /// A module used as a value, e.g. the left of `mod.member`.
    ScopeExpr(Name),
    TemplateExpr(TemplateId),

    // Unary forms
    AddrOf(ExprId),
    Deref(ExprId),
    Unary { op: UnaryOp, operand: ExprId },
    PreIncDec { op: IncDec, operand: ExprId },
    BoolCast(ExprId),
    Cast { operand: ExprId, to: TypeId },
    /// Reinterpret a static array as a vector type.
    Vector { operand: ExprId, to: TypeId },
    Slice {
        base: ExprId,
        lower: ExprId,
        upper: ExprId,
    },
    ArrayLength(ExprId),
    /// `a[i, j]` or an index list awaiting `opIndex`.
    MultiIndex { base: ExprId, indices: ExprRange },
    Call { callee: ExprId, args: ExprRange },
    Delete(ExprId),
    /// `mixin(...)`: a string re-parsed as an expression.
    Mixin(ExprId),
    /// `import(...)`: contents of a file as a string.
    Import(ExprId),
    Assert { cond: ExprId, msg: ExprId },
    DotId { base: ExprId, member: Name },
    /// Resolved field access.
    DotVar { base: ExprId, var: VarId },
    /// Resolved method reference with its receiver.
    DotFunc { base: ExprId, func: FuncId },
    DotTemplate { base: ExprId, template: TemplateId },
    New { ty: TypeId, args: ExprRange },
    NewAnonClass { agg: AggId, args: ExprRange },

    // Binary forms
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Comma { left: ExprId, right: ExprId },
    /// `scope.expr`, evaluated in the scope named on the left.
    Dot { left: ExprId, right: ExprId },
    Index { base: ExprId, index: ExprId },
    Cond {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Assign {
        op: AssignOp,
        target: ExprId,
        value: ExprId,
    },
    PostIncDec { op: IncDec, operand: ExprId },
    /// `aa.remove(key)`
    Remove { aa: ExprId, key: ExprId },

    // Default-value pseudo-literals
    DefaultInit(DefaultInitKind),

    // Meta / introspection
    Typeid(ExprId),
    Traits { name: Name, args: ExprRange },
    IsType {
        target: TypeId,
        id: Name,
        relation: IsRelation,
        spec: IsSpec,
        /// Identifiers of the capture list, as `Ident` nodes.
        params: ExprRange,
    },
    /// A variable declaration used as an expression.
    Declaration(VarId),
    /// Unconditional halt (`assert(0)`).
    Halt,
}

impl ExprKind {
    /// Literal forms: values with no further evaluation.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            ExprKind::Int(_)
                | ExprKind::Real(_)
                | ExprKind::Complex { .. }
                | ExprKind::String { .. }
                | ExprKind::Null
                | ExprKind::ArrayLiteral(_)
                | ExprKind::AssocArrayLiteral { .. }
                | ExprKind::StructLiteral { .. }
        )
    }

    /// Scalar literal (int, real, complex).
    pub fn is_scalar_literal(self) -> bool {
        matches!(self, ExprKind::Int(_) | ExprKind::Real(_) | ExprKind::Complex { .. })
    }

    /// Short name of the variant, used by logging and internal errors.
    pub fn name(self) -> &'static str {
        match self {
            ExprKind::Error => "error",
            ExprKind::Int(_) => "integer literal",
            ExprKind::Real(_) => "real literal",
            ExprKind::Complex { .. } => "complex literal",
            ExprKind::String { .. } => "string literal",
            ExprKind::Null => "null",
            ExprKind::ArrayLiteral(_) => "array literal",
            ExprKind::AssocArrayLiteral { .. } => "associative array literal",
            ExprKind::StructLiteral { .. } => "struct literal",
            ExprKind::Tuple { .. } => "tuple",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Dollar => "`$`",
            ExprKind::Var(_) => "variable",
            ExprKind::Func { .. } => "function",
            ExprKind::This => "`this`",
            ExprKind::Super => "`super`",
            ExprKind::SymOff { .. } => "symbol offset",
            ExprKind::OverloadSet(_) => "overload set",
            ExprKind::FuncLiteral(_) => "function literal",
            ExprKind::TypeExpr(_) => "type",
            ExprKind::ScopeExpr(_) => "module",
            ExprKind::TemplateExpr(_) => "template",
            ExprKind::AddrOf(_) => "address-of",
            ExprKind::Deref(_) => "dereference",
            ExprKind::Unary { .. } => "unary expression",
            ExprKind::PreIncDec { .. } => "prefix increment",
            ExprKind::BoolCast(_) => "boolean conversion",
            ExprKind::Cast { .. } => "cast",
            ExprKind::Vector { .. } => "vector",
            ExprKind::Slice { .. } => "slice",
            ExprKind::ArrayLength(_) => "array length",
            ExprKind::MultiIndex { .. } => "index list",
            ExprKind::Call { .. } => "call",
            ExprKind::Delete(_) => "delete",
            ExprKind::Mixin(_) => "mixin",
            ExprKind::Import(_) => "import expression",
            ExprKind::Assert { .. } => "assert",
            ExprKind::DotId { .. } => "member access",
            ExprKind::DotVar { .. } => "field access",
            ExprKind::DotFunc { .. } => "method reference",
            ExprKind::DotTemplate { .. } => "template member",
            ExprKind::New { .. } => "new expression",
            ExprKind::NewAnonClass { .. } => "anonymous class",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Comma { .. } => "comma expression",
            ExprKind::Dot { .. } => "scoped expression",
            ExprKind::Index { .. } => "index",
            ExprKind::Cond { .. } => "conditional",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::PostIncDec { .. } => "postfix increment",
            ExprKind::Remove { .. } => "remove",
            ExprKind::DefaultInit(_) => "default initializer",
            ExprKind::Typeid(_) => "typeid",
            ExprKind::Traits { .. } => "__traits",
            ExprKind::IsType { .. } => "is expression",
            ExprKind::Declaration(_) => "declaration",
            ExprKind::Halt => "halt",
        }
    }
}

/// An expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    /// Resolved type, `None` before semantic analysis.
    pub ty: Option<TypeId>,
    /// Written in parentheses in the source.
    pub parens: bool,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            ty: None,
            parens: false,
        }
    }

    pub fn typed(kind: ExprKind, span: Span, ty: TypeId) -> Self {
        Expr {
            kind,
            span,
            ty: Some(ty),
            parens: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.ty.is_some()
    }
}
