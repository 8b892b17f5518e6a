//! Statement nodes, the bodies interpreted functions execute.

use crate::decl::VarId;
use crate::expr::{ExprId, ExprRange};
use crate::{Name, Span};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct StmtId(u32);

impl StmtId {
    pub const INVALID: StmtId = StmtId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        StmtId(index)
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

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StmtRange {
    pub start: u32,
    pub len: u32,
}

impl StmtRange {
    pub const EMPTY: StmtRange = StmtRange { start: 0, len: 0 };

    pub const fn len(self) -> usize {
        self.len as usize
    }

    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CaseRange {
    pub start: u32,
    pub len: u32,
}

/// One `case`/`default` arm. Control falls through into the next arm
/// unless the body leaves the switch.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SwitchCase {
    /// Empty for `default:`.
    pub values: ExprRange,
    pub is_default: bool,
    pub body: StmtRange,
    pub span: Span,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    Empty,
    Expr(ExprId),
    /// Local declaration; the initializer lives on the `VarDecl`.
    Decl(VarId),
    Block(StmtRange),
    If {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: StmtId,
    },
    /// Resolved away by the resolver into the taken branch.
    StaticIf {
        cond: ExprId,
        then_branch: StmtId,
        else_branch: StmtId,
    },
    While { cond: ExprId, body: StmtId },
    DoWhile { body: StmtId, cond: ExprId },
    For {
        init: StmtId,
        cond: ExprId,
        step: ExprId,
        body: StmtId,
    },
    /// `foreach (key, value; aggregate)`; `key` may be `VarId::INVALID`.
    Foreach {
        key: VarId,
        value: VarId,
        aggregate: ExprId,
        body: StmtId,
    },
    /// `foreach (var; lower .. upper)`
    ForeachRange {
        var: VarId,
        lower: ExprId,
        upper: ExprId,
        body: StmtId,
    },
    /// Label is `Name::EMPTY` for the innermost loop or switch.
    Break(Name),
    Continue(Name),
    Goto(Name),
    Labeled { label: Name, body: StmtId },
    Return(ExprId),
    Switch { cond: ExprId, cases: CaseRange },
    Throw(ExprId),
    StaticAssert { cond: ExprId, msg: ExprId },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}
