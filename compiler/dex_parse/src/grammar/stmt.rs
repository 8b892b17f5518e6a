//! Statements.

use dex_ir::{ExprId, ExprRange, Name, StmtId, StmtKind, StorageClass, SwitchCase, TypeId, VarDecl, VarId};

use super::decl::Declared;
use super::{PResult, Parser};
use crate::lexer::Token;
use crate::ParseError;

impl Parser<'_> {
    /// `{ statements }`; errors inside are recorded and skipped.
    pub(crate) fn parse_block(&mut self) -> PResult<StmtId> {
        let open = self.cursor.expect(&Token::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.cursor.check(&Token::RBrace) && !self.cursor.is_at_end() {
            if let Err(err) = self.parse_statement(&mut stmts) {
                self.errors.push(err);
                self.synchronize();
            }
        }
        let end = self.cursor.expect_close(&Token::RBrace, "{", open)?;
        let list = self.program.arena.alloc_stmt_list(stmts);
        Ok(self.alloc_stmt(StmtKind::Block(list), open.merge(end)))
    }

    /// One statement, wrapped in a block when it declares several variables.
    fn parse_single_statement(&mut self) -> PResult<StmtId> {
        let mut stmts = Vec::new();
        self.parse_statement(&mut stmts)?;
        match stmts.as_slice() {
            [single] => Ok(*single),
            _ => {
                let span = self.cursor.previous_span();
                let list = self.program.arena.alloc_stmt_list(stmts);
                Ok(self.alloc_stmt(StmtKind::Block(list), span))
            }
        }
    }

    /// Parse a statement and append what it produced to `out`.
    pub(crate) fn parse_statement(&mut self, out: &mut Vec<StmtId>) -> PResult<()> {
        let start = self.cursor.current_span();
        let token = self.cursor.current().cloned();
        let stmt = match token {
            Some(Token::LBrace) => self.parse_block()?,
            Some(Token::Semi) => {
                self.cursor.advance();
                self.alloc_stmt(StmtKind::Empty, start)
            }
            Some(Token::If) => self.parse_if(false)?,
            Some(Token::Static) if self.cursor.check_next(&Token::If) => {
                self.cursor.advance();
                self.parse_if(true)?
            }
            Some(Token::Static) if self.cursor.check_next(&Token::Assert) => {
                self.cursor.advance();
                self.parse_static_assert()?
            }
            Some(Token::While) => {
                self.cursor.advance();
                let cond = self.parse_paren_expr()?;
                let body = self.parse_single_statement()?;
                self.alloc_stmt(StmtKind::While { cond, body }, start.merge(self.cursor.previous_span()))
            }
            Some(Token::Do) => {
                self.cursor.advance();
                let body = self.parse_single_statement()?;
                self.cursor.expect(&Token::While, "`while` after `do` body")?;
                let cond = self.parse_paren_expr()?;
                self.cursor.expect(&Token::Semi, "`;` after `do ... while`")?;
                self.alloc_stmt(StmtKind::DoWhile { body, cond }, start.merge(self.cursor.previous_span()))
            }
            Some(Token::For) => self.parse_for()?,
            Some(Token::Foreach) => self.parse_foreach()?,
            Some(Token::Switch) => self.parse_switch()?,
            Some(Token::Break | Token::Continue) => {
                let is_break = self.cursor.check(&Token::Break);
                self.cursor.advance();
                let label = self.parse_optional_label();
                self.cursor.expect(&Token::Semi, "`;`")?;
                let kind = if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                };
                self.alloc_stmt(kind, start.merge(self.cursor.previous_span()))
            }
            Some(Token::Goto) => {
                self.cursor.advance();
                let (label, _) = self.cursor.expect_ident()?;
                let label = self.intern(&label);
                self.cursor.expect(&Token::Semi, "`;` after `goto`")?;
                self.alloc_stmt(StmtKind::Goto(label), start.merge(self.cursor.previous_span()))
            }
            Some(Token::Return) => {
                self.cursor.advance();
                let value = if self.cursor.check(&Token::Semi) {
                    ExprId::INVALID
                } else {
                    self.parse_expr()?
                };
                self.cursor.expect(&Token::Semi, "`;` after `return`")?;
                self.alloc_stmt(StmtKind::Return(value), start.merge(self.cursor.previous_span()))
            }
            Some(Token::Throw) => {
                self.cursor.advance();
                let value = self.parse_expr()?;
                self.cursor.expect(&Token::Semi, "`;` after `throw`")?;
                self.alloc_stmt(StmtKind::Throw(value), start.merge(self.cursor.previous_span()))
            }
            Some(Token::Ident(_)) if self.cursor.check_next(&Token::Colon) => {
                let (label, _) = self.cursor.expect_ident()?;
                let label = self.intern(&label);
                self.cursor.advance();
                let body = self.parse_single_statement()?;
                self.alloc_stmt(StmtKind::Labeled { label, body }, start.merge(self.cursor.previous_span()))
            }
            _ if !self.at_declaration() => {
                let expr = self.parse_expr()?;
                self.cursor.expect(&Token::Semi, "`;` after expression")?;
                self.alloc_stmt(StmtKind::Expr(expr), start.merge(self.cursor.previous_span()))
            }
            _ => return self.parse_local_declaration(out),
        };
        out.push(stmt);
        Ok(())
    }

    fn parse_local_declaration(&mut self, out: &mut Vec<StmtId>) -> PResult<()> {
        let prefix = self.parse_prefix();
        match self.parse_declaration(prefix, None)? {
            Declared::Vars(vars) => {
                for var in vars {
                    let span = self.program.decls.var(var).span;
                    out.push(self.alloc_stmt(StmtKind::Decl(var), span));
                }
                Ok(())
            }
            Declared::Func(func) => Err(ParseError::UnexpectedToken {
                found: "a nested function".to_string(),
                expected: "a statement",
                span: self.program.decls.func(func).span,
            }),
        }
    }

    /// A declaration starts here: a storage class, a builtin type not used
    /// as an expression, or `Type name`.
    fn at_declaration(&mut self) -> bool {
        match self.cursor.current() {
            Some(
                Token::Static
                | Token::Enum
                | Token::Auto
                | Token::Ref
                | Token::Scope
                | Token::Out
                | Token::Pure
                | Token::Nothrow
                | Token::Deprecated
                | Token::At,
            ) => true,
            Some(Token::Const | Token::Immutable) if !self.cursor.check_next(&Token::LParen) => true,
            Some(Token::Ident(_) | Token::Const | Token::Immutable) => self.looks_like_declaration(false),
            _ => self.at_builtin_type() && self.looks_like_declaration(false),
        }
    }

    fn parse_optional_label(&mut self) -> Name {
        if let Some(Token::Ident(label)) = self.cursor.current() {
            let label = label.clone();
            self.cursor.advance();
            return self.intern(&label);
        }
        Name::EMPTY
    }

    fn parse_paren_expr(&mut self) -> PResult<ExprId> {
        let open = self.cursor.expect(&Token::LParen, "`(`")?;
        let expr = self.parse_expr()?;
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        Ok(expr)
    }

    fn parse_if(&mut self, is_static: bool) -> PResult<StmtId> {
        let start = self.cursor.advance();
        let cond = self.parse_paren_expr()?;
        let then_branch = self.parse_single_statement()?;
        let else_branch = if self.cursor.eat(&Token::Else) {
            self.parse_single_statement()?
        } else {
            StmtId::INVALID
        };
        let span = start.merge(self.cursor.previous_span());
        let kind = if is_static {
            StmtKind::StaticIf {
                cond,
                then_branch,
                else_branch,
            }
        } else {
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            }
        };
        Ok(self.alloc_stmt(kind, span))
    }

    /// `assert(cond [, msg]);` after `static`.
    pub(crate) fn parse_static_assert(&mut self) -> PResult<StmtId> {
        let start = self.cursor.advance();
        let open = self.cursor.expect(&Token::LParen, "`(` after `static assert`")?;
        let cond = self.parse_assign_expr()?;
        let msg = if self.cursor.eat(&Token::Comma) {
            self.parse_assign_expr()?
        } else {
            ExprId::INVALID
        };
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        self.cursor.expect(&Token::Semi, "`;` after `static assert`")?;
        Ok(self.alloc_stmt(StmtKind::StaticAssert { cond, msg }, start.merge(self.cursor.previous_span())))
    }

    fn parse_for(&mut self) -> PResult<StmtId> {
        let start = self.cursor.advance();
        let open = self.cursor.expect(&Token::LParen, "`(` after `for`")?;
        let init = if self.cursor.eat(&Token::Semi) {
            StmtId::INVALID
        } else {
            self.parse_single_statement()?
        };
        let cond = if self.cursor.check(&Token::Semi) {
            ExprId::INVALID
        } else {
            self.parse_expr()?
        };
        self.cursor.expect(&Token::Semi, "`;` after loop condition")?;
        let step = if self.cursor.check(&Token::RParen) {
            ExprId::INVALID
        } else {
            self.parse_expr()?
        };
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        let body = self.parse_single_statement()?;
        Ok(self.alloc_stmt(
            StmtKind::For {
                init,
                cond,
                step,
                body,
            },
            start.merge(self.cursor.previous_span()),
        ))
    }

    /// `foreach ([ref] [T] k, [ref] [T] v; aggregate)` or
    /// `foreach (i; lower .. upper)`.
    fn parse_foreach(&mut self) -> PResult<StmtId> {
        let start = self.cursor.advance();
        let open = self.cursor.expect(&Token::LParen, "`(` after `foreach`")?;
        let mut vars = vec![self.parse_foreach_var()?];
        if self.cursor.eat(&Token::Comma) {
            vars.push(self.parse_foreach_var()?);
        }
        self.cursor.expect(&Token::Semi, "`;` after foreach variables")?;
        let aggregate = self.parse_assign_expr()?;
        let upper = if self.cursor.eat(&Token::DotDot) {
            Some(self.parse_assign_expr()?)
        } else {
            None
        };
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        let body = self.parse_single_statement()?;
        let span = start.merge(self.cursor.previous_span());
        let kind = match (upper, vars.as_slice()) {
            (Some(upper), [var]) => StmtKind::ForeachRange {
                var: *var,
                lower: aggregate,
                upper,
                body,
            },
            (Some(_), _) => {
                return Err(ParseError::UnexpectedToken {
                    found: "two loop variables".to_string(),
                    expected: "a single variable for a range `foreach`",
                    span,
                })
            }
            (None, [value]) => StmtKind::Foreach {
                key: VarId::INVALID,
                value: *value,
                aggregate,
                body,
            },
            (None, [key, value, ..]) => StmtKind::Foreach {
                key: *key,
                value: *value,
                aggregate,
                body,
            },
            (None, []) => StmtKind::Empty,
        };
        Ok(self.alloc_stmt(kind, span))
    }

    fn parse_foreach_var(&mut self) -> PResult<VarId> {
        let mut storage = StorageClass::empty();
        if self.cursor.eat(&Token::Ref) {
            storage |= StorageClass::REF;
        }
        let ty = if matches!(self.cursor.current(), Some(Token::Ident(_)))
            && matches!(self.cursor.peek(1), Some(Token::Comma | Token::Semi))
        {
            storage |= StorageClass::AUTO;
            TypeId::ERROR
        } else {
            self.parse_type()?
        };
        let (name, span) = self.cursor.expect_ident()?;
        let name = self.intern(&name);
        Ok(self.program.decls.add_var(VarDecl {
            name,
            ty,
            init: ExprId::INVALID,
            storage,
            owner: self.owner,
            span,
        }))
    }

    fn parse_switch(&mut self) -> PResult<StmtId> {
        let start = self.cursor.advance();
        let cond = self.parse_paren_expr()?;
        let open = self.cursor.expect(&Token::LBrace, "`{` after `switch (...)`")?;
        let mut cases = Vec::new();
        while !self.cursor.check(&Token::RBrace) && !self.cursor.is_at_end() {
            cases.push(self.parse_case()?);
        }
        self.cursor.expect_close(&Token::RBrace, "{", open)?;
        let cases = self.program.arena.alloc_cases(cases);
        Ok(self.alloc_stmt(StmtKind::Switch { cond, cases }, start.merge(self.cursor.previous_span())))
    }

    /// `case a, b: stmts` or `default: stmts`.
    fn parse_case(&mut self) -> PResult<SwitchCase> {
        let start = self.cursor.current_span();
        let (values, is_default) = if self.cursor.eat(&Token::Default) {
            (ExprRange::EMPTY, true)
        } else {
            self.cursor.expect(&Token::Case, "`case` or `default`")?;
            let mut values = vec![self.parse_assign_expr()?];
            while self.cursor.eat(&Token::Comma) {
                values.push(self.parse_assign_expr()?);
            }
            (self.program.arena.alloc_list(values), false)
        };
        self.cursor.expect(&Token::Colon, "`:` after case label")?;
        let mut body = Vec::new();
        while !matches!(self.cursor.current(), Some(Token::Case | Token::Default | Token::RBrace) | None) {
            if let Err(err) = self.parse_statement(&mut body) {
                self.errors.push(err);
                self.synchronize();
            }
        }
        Ok(SwitchCase {
            values,
            is_default,
            body: self.program.arena.alloc_stmt_list(body),
            span: start.merge(self.cursor.previous_span()),
        })
    }
}
