//! Operator enums shared by the tree, the resolver and both evaluators.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
    Cat,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Is,
    NotIs,
    In,
    AndAnd,
    OrOr,
}

impl BinaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^^",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Ushr => ">>>",
            BinaryOp::Cat => "~",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Is => "is",
            BinaryOp::NotIs => "!is",
            BinaryOp::In => "in",
            BinaryOp::AndAnd => "&&",
            BinaryOp::OrOr => "||",
        }
    }

    /// Binding strength, higher binds tighter. Assignment is 1, the conditional 2.
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOp::OrOr => 3,
            BinaryOp::AndAnd => 4,
            BinaryOp::Or => 5,
            BinaryOp::Xor => 6,
            BinaryOp::And => 7,
            BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Is
            | BinaryOp::NotIs
            | BinaryOp::In => 8,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr => 9,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Cat => 10,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 11,
            BinaryOp::Pow => 13,
        }
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow
        )
    }

    pub const fn is_bitwise(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::Ushr)
    }

    /// Ordering comparisons (`<`, `<=`, `>`, `>=`).
    pub const fn is_relational(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    pub const fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub const fn is_identity(self) -> bool {
        matches!(self, BinaryOp::Is | BinaryOp::NotIs)
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOp::AndAnd | BinaryOp::OrOr)
    }

    /// Operators whose result is `bool` regardless of operand type.
    pub const fn yields_bool(self) -> bool {
        self.is_relational() || self.is_equality() || self.is_identity() || self.is_logical()
    }

    /// Operators that may appear in an element-wise array expression.
    pub const fn is_array_op_capable(self) -> bool {
        self.is_arithmetic() || self.is_bitwise()
    }
}

/// Prefix operators that keep their own node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Com,
    Not,
    UAdd,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Com => "~",
            UnaryOp::Not => "!",
            UnaryOp::UAdd => "+",
        }
    }
}

/// `++` or `--`, prefix or postfix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IncDec {
    Inc,
    Dec,
}

impl IncDec {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            IncDec::Inc => "++",
            IncDec::Dec => "--",
        }
    }

    pub const fn binary_op(self) -> BinaryOp {
        match self {
            IncDec::Inc => BinaryOp::Add,
            IncDec::Dec => BinaryOp::Sub,
        }
    }
}

/// The assignment family: plain, construct, and one compound form per operator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    /// First assignment of a declaration; may initialise `const`/`immutable` storage.
    Construct,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
    Cat,
}

impl AssignOp {
    /// The operator applied before storing, `None` for plain and construct assignment.
    pub const fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign | AssignOp::Construct => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
            AssignOp::Pow => Some(BinaryOp::Pow),
            AssignOp::And => Some(BinaryOp::And),
            AssignOp::Or => Some(BinaryOp::Or),
            AssignOp::Xor => Some(BinaryOp::Xor),
            AssignOp::Shl => Some(BinaryOp::Shl),
            AssignOp::Shr => Some(BinaryOp::Shr),
            AssignOp::Ushr => Some(BinaryOp::Ushr),
            AssignOp::Cat => Some(BinaryOp::Cat),
        }
    }

    /// Inverse of [`AssignOp::binary_op`] for operators that have a compound form.
    pub const fn from_binary(op: BinaryOp) -> Option<AssignOp> {
        Some(match op {
            BinaryOp::Add => AssignOp::Add,
            BinaryOp::Sub => AssignOp::Sub,
            BinaryOp::Mul => AssignOp::Mul,
            BinaryOp::Div => AssignOp::Div,
            BinaryOp::Mod => AssignOp::Mod,
            BinaryOp::Pow => AssignOp::Pow,
            BinaryOp::And => AssignOp::And,
            BinaryOp::Or => AssignOp::Or,
            BinaryOp::Xor => AssignOp::Xor,
            BinaryOp::Shl => AssignOp::Shl,
            BinaryOp::Shr => AssignOp::Shr,
            BinaryOp::Ushr => AssignOp::Ushr,
            BinaryOp::Cat => AssignOp::Cat,
            _ => return None,
        })
    }

    /// Source spelling. Construct prints as `=`, it is only distinguishable by position.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            AssignOp::Assign | AssignOp::Construct => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Pow => "^^=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::Ushr => ">>>=",
            AssignOp::Cat => "~=",
        }
    }
}

/// Call-site introspection placeholders (`__FILE__` and friends).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DefaultInitKind {
    File,
    Line,
    Module,
    Function,
    PrettyFunction,
}

impl DefaultInitKind {
    pub const fn as_keyword(self) -> &'static str {
        match self {
            DefaultInitKind::File => "__FILE__",
            DefaultInitKind::Line => "__LINE__",
            DefaultInitKind::Module => "__MODULE__",
            DefaultInitKind::Function => "__FUNCTION__",
            DefaultInitKind::PrettyFunction => "__PRETTY_FUNCTION__",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_ops_round_trip() {
        for op in [
            BinaryOp::Add,
            BinaryOp::Pow,
            BinaryOp::Ushr,
            BinaryOp::Cat,
            BinaryOp::Xor,
        ] {
            let assign = AssignOp::from_binary(op);
            assert_eq!(assign.and_then(AssignOp::binary_op), Some(op));
        }
        assert_eq!(AssignOp::from_binary(BinaryOp::Lt), None);
        assert_eq!(AssignOp::Construct.binary_op(), None);
    }

    #[test]
    fn precedence_matches_grammar() {
        assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
        assert!(BinaryOp::Add.precedence() > BinaryOp::Shl.precedence());
        assert!(BinaryOp::Eq.precedence() > BinaryOp::And.precedence());
        assert!(BinaryOp::AndAnd.precedence() > BinaryOp::OrOr.precedence());
        assert_eq!(BinaryOp::Cat.precedence(), BinaryOp::Add.precedence());
    }
}
