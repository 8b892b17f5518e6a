//! Grammar productions.
//!
//! Each module extends [`Parser`] with the methods for one part of the
//! grammar:
//!
//! - [`expr`]: expressions, by precedence climbing
//! - [`ty`]: type syntax and the declaration lookahead
//! - [`decl`]: variable, function and aggregate declarations
//! - [`stmt`]: statements inside function bodies
//! - [`item`]: the module level
//!
//! # Design
//!
//! Productions return `Result<_, ParseError>`. Statement lists and the
//! module loop catch errors, record them and resynchronize at the next
//! `;` or `}`, so one malformed statement does not hide the rest.

mod decl;
mod expr;
mod item;
mod stmt;
mod ty;

use dex_ir::{Expr, ExprId, ExprKind, Owner, Program, Span, StmtId, StmtKind};

use crate::cursor::Cursor;
use crate::lexer::Token;
use crate::ParseError;

pub(crate) type PResult<T> = Result<T, ParseError>;

pub(crate) struct Parser<'p> {
    pub(crate) cursor: Cursor,
    pub(crate) program: &'p mut Program,
    pub(crate) errors: Vec<ParseError>,
    /// Declaration that owns the variables being parsed.
    owner: Owner,
}

impl<'p> Parser<'p> {
    pub(crate) fn new(cursor: Cursor, program: &'p mut Program) -> Self {
        Parser {
            cursor,
            program,
            errors: Vec::new(),
            owner: Owner::Module,
        }
    }

    #[inline]
    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.program.arena.alloc(Expr::new(kind, span))
    }

    #[inline]
    fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.program.arena.alloc_stmt(kind, span)
    }

    #[inline]
    fn span_of(&self, id: ExprId) -> Span {
        self.program.arena.span(id)
    }

    fn intern(&self, text: &str) -> dex_ir::Name {
        self.program.intern(text)
    }

    /// Skip to the end of the current statement: past the next `;` at this
    /// nesting level, or up to (not past) an unmatched `}`.
    pub(crate) fn synchronize(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.cursor.current() {
            match token {
                Token::LBrace => depth += 1,
                Token::RBrace if depth == 0 => return,
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.cursor.advance();
                        return;
                    }
                }
                Token::Semi if depth == 0 => {
                    self.cursor.advance();
                    return;
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }
}
