//! Expressions.
//!
//! Binary operators are parsed by precedence climbing over
//! [`BinaryOp::precedence`]; assignment, `?:` and the comma operator sit
//! above it, prefix operators and `^^` below. `^^` binds tighter than a
//! prefix minus on its left (`-2 ^^ 2` is `-(2 ^^ 2)`) and is
//! right-associative.
//!
//! Numeric and character literals get their lexical type here, every
//! other node is left untyped for the resolver.

use dex_ir::{
    AssignOp, BinaryOp, CharWidth, DefaultInitKind, ExprId, ExprKind, ExprRange, IncDec, IsRelation, IsSpec, Span,
    TypeId, UnaryOp,
};

use super::{PResult, Parser};
use crate::lexer::{FloatLit, FloatSuffix, IntLit, IntSuffix, Token};
use crate::ParseError;

/// Lexical type of an integer literal.
pub(crate) fn int_literal_type(lit: IntLit) -> TypeId {
    let v = lit.value;
    let fits_int = v <= i32::MAX as u64;
    let fits_uint = v <= u64::from(u32::MAX);
    let fits_long = v <= i64::MAX as u64;
    match lit.suffix {
        IntSuffix::None if fits_int => TypeId::INT,
        IntSuffix::None if fits_uint && !lit.decimal => TypeId::UINT,
        IntSuffix::None | IntSuffix::L if fits_long => TypeId::LONG,
        IntSuffix::U if fits_uint => TypeId::UINT,
        IntSuffix::None | IntSuffix::U | IntSuffix::L | IntSuffix::UL => TypeId::ULONG,
    }
}

fn char_literal_type(c: char) -> TypeId {
    match u32::from(c) {
        0..=0x7F => TypeId::CHAR,
        0x80..=0xFFFF => TypeId::WCHAR,
        _ => TypeId::DCHAR,
    }
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    Some(match token {
        Token::Eq => AssignOp::Assign,
        Token::PlusEq => AssignOp::Add,
        Token::MinusEq => AssignOp::Sub,
        Token::StarEq => AssignOp::Mul,
        Token::SlashEq => AssignOp::Div,
        Token::PercentEq => AssignOp::Mod,
        Token::PowEq => AssignOp::Pow,
        Token::AmpEq => AssignOp::And,
        Token::PipeEq => AssignOp::Or,
        Token::CaretEq => AssignOp::Xor,
        Token::ShlEq => AssignOp::Shl,
        Token::ShrEq => AssignOp::Shr,
        Token::UshrEq => AssignOp::Ushr,
        Token::TildeEq => AssignOp::Cat,
        _ => return None,
    })
}

/// A binary operator at the cursor: the operator, whether the result is
/// negated (`!is`, `!in`) and how many tokens it spans.
fn binary_op(current: Option<&Token>, next: Option<&Token>) -> Option<(BinaryOp, bool, usize)> {
    let op = match current? {
        Token::OrOr => BinaryOp::OrOr,
        Token::AndAnd => BinaryOp::AndAnd,
        Token::Pipe => BinaryOp::Or,
        Token::Caret => BinaryOp::Xor,
        Token::Amp => BinaryOp::And,
        Token::EqEq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::Ne,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::Le,
        Token::Gt => BinaryOp::Gt,
        Token::GtEq => BinaryOp::Ge,
        Token::Is => BinaryOp::Is,
        Token::In => BinaryOp::In,
        Token::Bang => {
            return match next? {
                Token::Is => Some((BinaryOp::NotIs, false, 2)),
                Token::In => Some((BinaryOp::In, true, 2)),
                _ => None,
            }
        }
        Token::Shl => BinaryOp::Shl,
        Token::Shr => BinaryOp::Shr,
        Token::Ushr => BinaryOp::Ushr,
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Sub,
        Token::Tilde => BinaryOp::Cat,
        Token::Star => BinaryOp::Mul,
        Token::Slash => BinaryOp::Div,
        Token::Percent => BinaryOp::Mod,
        _ => return None,
    };
    Some((op, false, 1))
}

impl Parser<'_> {
    /// Full expression, including the comma operator.
    pub(crate) fn parse_expr(&mut self) -> PResult<ExprId> {
        let mut left = self.parse_assign_expr()?;
        while self.cursor.eat(&Token::Comma) {
            let right = self.parse_assign_expr()?;
            let span = self.span_of(left).merge(self.span_of(right));
            left = self.alloc(ExprKind::Comma { left, right }, span);
        }
        Ok(left)
    }

    pub(crate) fn parse_assign_expr(&mut self) -> PResult<ExprId> {
        let target = self.parse_cond_expr()?;
        let Some(op) = self.cursor.current().and_then(assign_op) else {
            return Ok(target);
        };
        self.cursor.advance();
        let value = self.parse_assign_expr()?;
        let span = self.span_of(target).merge(self.span_of(value));
        Ok(self.alloc(ExprKind::Assign { op, target, value }, span))
    }

    fn parse_cond_expr(&mut self) -> PResult<ExprId> {
        let cond = self.parse_binary(BinaryOp::OrOr.precedence())?;
        if !self.cursor.eat(&Token::Question) {
            return Ok(cond);
        }
        let then_expr = self.parse_expr()?;
        self.cursor.expect(&Token::Colon, "`:` in conditional expression")?;
        let else_expr = self.parse_cond_expr()?;
        let span = self.span_of(cond).merge(self.span_of(else_expr));
        Ok(self.alloc(
            ExprKind::Cond {
                cond,
                then_expr,
                else_expr,
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<ExprId> {
        let mut left = self.parse_unary()?;
        while let Some((op, negate, width)) = binary_op(self.cursor.current(), self.cursor.peek(1)) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            for _ in 0..width {
                self.cursor.advance();
            }
            let right = self.parse_binary(prec + 1)?;
            let span = self.span_of(left).merge(self.span_of(right));
            left = self.alloc(ExprKind::Binary { op, left, right }, span);
            if negate {
                left = self.alloc(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: left,
                    },
                    span,
                );
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<ExprId> {
        let start = self.cursor.current_span();
        let prefix = match self.cursor.current() {
            Some(Token::Amp) => Some(ExprKind::AddrOf as fn(ExprId) -> ExprKind),
            Some(Token::Star) => Some(ExprKind::Deref as fn(ExprId) -> ExprKind),
            Some(Token::Delete) => Some(ExprKind::Delete as fn(ExprId) -> ExprKind),
            _ => None,
        };
        if let Some(make) = prefix {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(self.span_of(operand));
            return Ok(self.alloc(make(operand), span));
        }
        let unary = match self.cursor.current() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Plus) => Some(UnaryOp::UAdd),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Tilde) => Some(UnaryOp::Com),
            _ => None,
        };
        if let Some(op) = unary {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(self.span_of(operand));
            return Ok(self.alloc(ExprKind::Unary { op, operand }, span));
        }
        let incdec = match self.cursor.current() {
            Some(Token::PlusPlus) => Some(IncDec::Inc),
            Some(Token::MinusMinus) => Some(IncDec::Dec),
            _ => None,
        };
        if let Some(op) = incdec {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(self.span_of(operand));
            return Ok(self.alloc(ExprKind::PreIncDec { op, operand }, span));
        }
        match self.cursor.current() {
            Some(Token::Cast) => self.parse_cast(),
            Some(Token::New) => self.parse_new(),
            _ => self.parse_pow(),
        }
    }

    fn parse_cast(&mut self) -> PResult<ExprId> {
        let start = self.cursor.advance();
        let open = self.cursor.expect(&Token::LParen, "`(` after `cast`")?;
        let to = self.parse_type()?;
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        let operand = self.parse_unary()?;
        let span = start.merge(self.span_of(operand));
        if to == TypeId::BOOL {
            return Ok(self.alloc(ExprKind::BoolCast(operand), span));
        }
        Ok(self.alloc(ExprKind::Cast { operand, to }, span))
    }

    /// `new T`, `new T(args)`, `new T[n]`, `new class(args) { ... }`.
    fn parse_new(&mut self) -> PResult<ExprId> {
        let start = self.cursor.advance();
        if self.cursor.check(&Token::Class) {
            self.cursor.advance();
            let args = if self.cursor.check(&Token::LParen) {
                self.parse_call_args()?
            } else {
                ExprRange::EMPTY
            };
            let agg = self.parse_anonymous_class(start)?;
            let span = start.merge(self.cursor.previous_span());
            return Ok(self.alloc(ExprKind::NewAnonClass { agg, args }, span));
        }
        let mut ty = self.parse_new_base_type()?;
        if self.cursor.check(&Token::LBracket) && self.cursor.check_next(&Token::RBracket) {
            ty = self.parse_type_suffixes(ty)?;
        }
        let args = if self.cursor.check(&Token::LBracket) {
            let open = self.cursor.advance();
            let len = self.parse_assign_expr()?;
            self.cursor.expect_close(&Token::RBracket, "[", open)?;
            ty = self.program.types.slice(ty);
            self.program.arena.alloc_list([len])
        } else if self.cursor.check(&Token::LParen) {
            self.parse_call_args()?
        } else {
            ExprRange::EMPTY
        };
        let span = start.merge(self.cursor.previous_span());
        Ok(self.alloc(ExprKind::New { ty, args }, span))
    }

    /// Type after `new`: array suffixes are left for the length argument.
    fn parse_new_base_type(&mut self) -> PResult<TypeId> {
        let mut ty = match self.cursor.current() {
            Some(Token::Ident(_)) => {
                let (name, _) = self.cursor.expect_ident()?;
                let name = self.intern(&name);
                self.program.types.intern(dex_ir::TypeKind::Ident(name))
            }
            _ => {
                let base = self.cursor.current().and_then(super::ty::builtin_type);
                match base {
                    Some(t) => {
                        self.cursor.advance();
                        t
                    }
                    None => return self.parse_type(),
                }
            }
        };
        while self.cursor.eat(&Token::Star) {
            ty = self.program.types.pointer(ty);
        }
        Ok(ty)
    }

    fn parse_pow(&mut self) -> PResult<ExprId> {
        let base = self.parse_postfix()?;
        if !self.cursor.eat(&Token::Pow) {
            return Ok(base);
        }
        let exponent = self.parse_unary()?;
        let span = self.span_of(base).merge(self.span_of(exponent));
        Ok(self.alloc(
            ExprKind::Binary {
                op: BinaryOp::Pow,
                left: base,
                right: exponent,
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> PResult<ExprId> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = self.span_of(expr);
            match self.cursor.current() {
                Some(Token::Dot) => {
                    self.cursor.advance();
                    let (member, span) = self.cursor.expect_ident()?;
                    let member = self.intern(&member);
                    expr = self.alloc(ExprKind::DotId { base: expr, member }, start.merge(span));
                }
                Some(Token::LParen) => {
                    let args = self.parse_call_args()?;
                    let span = start.merge(self.cursor.previous_span());
                    expr = self.alloc(ExprKind::Call { callee: expr, args }, span);
                }
                Some(Token::LBracket) => expr = self.parse_index(expr)?,
                Some(Token::PlusPlus | Token::MinusMinus) => {
                    let op = if self.cursor.check(&Token::PlusPlus) {
                        IncDec::Inc
                    } else {
                        IncDec::Dec
                    };
                    let end = self.cursor.advance();
                    expr = self.alloc(ExprKind::PostIncDec { op, operand: expr }, start.merge(end));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `a[]`, `a[i]`, `a[i .. j]`, `a[i, j]`.
    fn parse_index(&mut self, base: ExprId) -> PResult<ExprId> {
        let start = self.span_of(base);
        let open = self.cursor.advance();
        if self.cursor.check(&Token::RBracket) {
            let end = self.cursor.advance();
            return Ok(self.alloc(
                ExprKind::Slice {
                    base,
                    lower: ExprId::INVALID,
                    upper: ExprId::INVALID,
                },
                start.merge(end),
            ));
        }
        let first = self.parse_assign_expr()?;
        if self.cursor.eat(&Token::DotDot) {
            let upper = self.parse_assign_expr()?;
            let end = self.cursor.expect_close(&Token::RBracket, "[", open)?;
            return Ok(self.alloc(
                ExprKind::Slice {
                    base,
                    lower: first,
                    upper,
                },
                start.merge(end),
            ));
        }
        if self.cursor.check(&Token::Comma) {
            let mut indices = vec![first];
            while self.cursor.eat(&Token::Comma) {
                indices.push(self.parse_assign_expr()?);
            }
            let end = self.cursor.expect_close(&Token::RBracket, "[", open)?;
            let indices = self.program.arena.alloc_list(indices);
            return Ok(self.alloc(ExprKind::MultiIndex { base, indices }, start.merge(end)));
        }
        let end = self.cursor.expect_close(&Token::RBracket, "[", open)?;
        Ok(self.alloc(ExprKind::Index { base, index: first }, start.merge(end)))
    }

    pub(crate) fn parse_call_args(&mut self) -> PResult<ExprRange> {
        let open = self.cursor.expect(&Token::LParen, "`(`")?;
        let mut args = Vec::new();
        while !self.cursor.check(&Token::RParen) && !self.cursor.is_at_end() {
            args.push(self.parse_assign_expr()?);
            if !self.cursor.eat(&Token::Comma) {
                break;
            }
        }
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        Ok(self.program.arena.alloc_list(args))
    }

    fn parse_primary(&mut self) -> PResult<ExprId> {
        let span = self.cursor.current_span();
        let Some(token) = self.cursor.current().cloned() else {
            return Err(ParseError::ExpectedExpression {
                found: self.cursor.found(),
                span,
            });
        };
        if super::ty::builtin_type(&token).is_some() || matches!(token, Token::Const | Token::Immutable) {
            let ty = self.parse_type()?;
            return Ok(self.alloc(ExprKind::TypeExpr(ty), span.merge(self.cursor.previous_span())));
        }
        match token {
            Token::IntLit(lit) => {
                self.cursor.advance();
                Ok(self.program.int_lit(lit.value, int_literal_type(lit), span))
            }
            Token::FloatLit(lit) => {
                self.cursor.advance();
                Ok(self.float_literal(lit, span))
            }
            Token::CharLit(c) => {
                self.cursor.advance();
                Ok(self.program.int_lit(u64::from(u32::from(c)), char_literal_type(c), span))
            }
            Token::StrLit(lit) => {
                self.cursor.advance();
                let value = self.intern(&lit.text);
                Ok(self.alloc(
                    ExprKind::String {
                        value,
                        width: lit.postfix.unwrap_or(CharWidth::One),
                        committed: lit.postfix.is_some(),
                    },
                    span,
                ))
            }
            Token::True | Token::False => {
                self.cursor.advance();
                Ok(self.program.bool_lit(token == Token::True, span))
            }
            Token::Null => self.leaf(ExprKind::Null),
            Token::This => self.leaf(ExprKind::This),
            Token::Super => self.leaf(ExprKind::Super),
            Token::Dollar => self.leaf(ExprKind::Dollar),
            Token::File => self.leaf(ExprKind::DefaultInit(DefaultInitKind::File)),
            Token::Line => self.leaf(ExprKind::DefaultInit(DefaultInitKind::Line)),
            Token::ModuleName => self.leaf(ExprKind::DefaultInit(DefaultInitKind::Module)),
            Token::FunctionName => self.leaf(ExprKind::DefaultInit(DefaultInitKind::Function)),
            Token::PrettyFunction => self.leaf(ExprKind::DefaultInit(DefaultInitKind::PrettyFunction)),
            Token::Ident(name) => {
                self.cursor.advance();
                let name = self.intern(&name);
                Ok(self.alloc(ExprKind::Ident(name), span))
            }
            Token::LParen => {
                let open = self.cursor.advance();
                let inner = self.parse_expr()?;
                self.cursor.expect_close(&Token::RParen, "(", open)?;
                self.program.arena.expr_mut(inner).parens = true;
                Ok(inner)
            }
            Token::LBracket => self.parse_array_literal(),
            Token::Typeid => {
                self.cursor.advance();
                let open = self.cursor.expect(&Token::LParen, "`(` after `typeid`")?;
                let operand = self.parse_type_or_expr()?;
                let end = self.cursor.expect_close(&Token::RParen, "(", open)?;
                Ok(self.alloc(ExprKind::Typeid(operand), span.merge(end)))
            }
            Token::Is => self.parse_is(),
            Token::Traits => self.parse_traits(),
            Token::Mixin | Token::Import => {
                self.cursor.advance();
                let open = self.cursor.expect(&Token::LParen, "`(`")?;
                let operand = self.parse_assign_expr()?;
                let end = self.cursor.expect_close(&Token::RParen, "(", open)?;
                let kind = if token == Token::Mixin {
                    ExprKind::Mixin(operand)
                } else {
                    ExprKind::Import(operand)
                };
                Ok(self.alloc(kind, span.merge(end)))
            }
            Token::Assert => {
                self.cursor.advance();
                let open = self.cursor.expect(&Token::LParen, "`(` after `assert`")?;
                let cond = self.parse_assign_expr()?;
                let msg = if self.cursor.eat(&Token::Comma) && !self.cursor.check(&Token::RParen) {
                    self.parse_assign_expr()?
                } else {
                    ExprId::INVALID
                };
                let end = self.cursor.expect_close(&Token::RParen, "(", open)?;
                Ok(self.alloc(ExprKind::Assert { cond, msg }, span.merge(end)))
            }
            Token::Function => self.parse_function_literal(),
            _ => Err(ParseError::ExpectedExpression {
                found: self.cursor.found(),
                span,
            }),
        }
    }

    fn leaf(&mut self, kind: ExprKind) -> PResult<ExprId> {
        let span = self.cursor.advance();
        Ok(self.alloc(kind, span))
    }

    fn float_literal(&mut self, lit: FloatLit, span: Span) -> ExprId {
        match (lit.imaginary, lit.suffix) {
            (false, FloatSuffix::None) => self.program.real_lit(lit.value, TypeId::DOUBLE, span),
            (false, FloatSuffix::F) => self.program.real_lit(lit.value, TypeId::FLOAT, span),
            (false, FloatSuffix::L) => self.program.real_lit(lit.value, TypeId::REAL, span),
            (true, FloatSuffix::None) => self.program.complex_lit(0.0, lit.value, TypeId::CDOUBLE, span),
            (true, FloatSuffix::F) => self.program.complex_lit(0.0, lit.value, TypeId::CFLOAT, span),
            (true, FloatSuffix::L) => self.program.complex_lit(0.0, lit.value, TypeId::CREAL, span),
        }
    }

    /// `[a, b]` or `[k: v, ...]`.
    fn parse_array_literal(&mut self) -> PResult<ExprId> {
        let open = self.cursor.advance();
        let mut keys = Vec::new();
        let mut values = Vec::new();
        while !self.cursor.check(&Token::RBracket) && !self.cursor.is_at_end() {
            let first = self.parse_assign_expr()?;
            if self.cursor.eat(&Token::Colon) {
                keys.push(first);
                values.push(self.parse_assign_expr()?);
            } else {
                values.push(first);
            }
            if !self.cursor.eat(&Token::Comma) {
                break;
            }
        }
        let end = self.cursor.expect_close(&Token::RBracket, "[", open)?;
        let span = open.merge(end);
        if keys.is_empty() {
            let elems = self.program.arena.alloc_list(values);
            return Ok(self.alloc(ExprKind::ArrayLiteral(elems), span));
        }
        if keys.len() != values.len() {
            return Err(ParseError::UnexpectedToken {
                found: "an element without a key".to_string(),
                expected: "`key: value` pairs throughout an associative array literal",
                span,
            });
        }
        let keys = self.program.arena.alloc_list(keys);
        let values = self.program.arena.alloc_list(values);
        Ok(self.alloc(ExprKind::AssocArrayLiteral { keys, values }, span))
    }

    /// A type when the argument starts with a type keyword, otherwise an
    /// expression (identifiers are classified by the resolver).
    fn parse_type_or_expr(&mut self) -> PResult<ExprId> {
        if self.at_builtin_type() || matches!(self.cursor.current(), Some(Token::Const | Token::Immutable)) {
            let start = self.cursor.current_span();
            let ty = self.parse_type()?;
            return Ok(self.alloc(ExprKind::TypeExpr(ty), start.merge(self.cursor.previous_span())));
        }
        self.parse_assign_expr()
    }

    /// `is(T)`, `is(T == U)`, `is(T : U)`, `is(T id == U)`, `is(T == struct)`.
    fn parse_is(&mut self) -> PResult<ExprId> {
        let start = self.cursor.advance();
        let open = self.cursor.expect(&Token::LParen, "`(` after `is`")?;
        let target = self.parse_type()?;
        let id = if let Some(Token::Ident(_)) = self.cursor.current() {
            let (name, _) = self.cursor.expect_ident()?;
            self.intern(&name)
        } else {
            dex_ir::Name::EMPTY
        };
        let relation = if self.cursor.eat(&Token::EqEq) {
            IsRelation::Equals
        } else if self.cursor.eat(&Token::Colon) {
            IsRelation::Converts
        } else {
            IsRelation::Exists
        };
        let spec = match relation {
            IsRelation::Exists => IsSpec::None,
            IsRelation::Converts | IsRelation::Equals => match self.cursor.current() {
                Some(Token::Struct) => {
                    self.cursor.advance();
                    IsSpec::Struct
                }
                Some(Token::Class) => {
                    self.cursor.advance();
                    IsSpec::Class
                }
                Some(Token::Function) => {
                    self.cursor.advance();
                    IsSpec::Function
                }
                Some(Token::Star) => {
                    self.cursor.advance();
                    IsSpec::Pointer
                }
                _ => IsSpec::Type(self.parse_type()?),
            },
        };
        let mut params = Vec::new();
        while self.cursor.eat(&Token::Comma) {
            let (name, span) = self.cursor.expect_ident()?;
            let name = self.intern(&name);
            params.push(self.alloc(ExprKind::Ident(name), span));
        }
        let end = self.cursor.expect_close(&Token::RParen, "(", open)?;
        let params = self.program.arena.alloc_list(params);
        Ok(self.alloc(
            ExprKind::IsType {
                target,
                id,
                relation,
                spec,
                params,
            },
            start.merge(end),
        ))
    }

    /// `__traits(name, args...)`.
    fn parse_traits(&mut self) -> PResult<ExprId> {
        let start = self.cursor.advance();
        let open = self.cursor.expect(&Token::LParen, "`(` after `__traits`")?;
        let (name, _) = self.cursor.expect_ident()?;
        let name = self.intern(&name);
        let mut args = Vec::new();
        while self.cursor.eat(&Token::Comma) {
            args.push(self.parse_type_or_expr()?);
        }
        let end = self.cursor.expect_close(&Token::RParen, "(", open)?;
        let args = self.program.arena.alloc_list(args);
        Ok(self.alloc(ExprKind::Traits { name, args }, start.merge(end)))
    }
}
