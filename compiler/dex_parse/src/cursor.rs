//! Token cursor: lookahead, consumption and backtracking.

use dex_ir::Span;

use crate::lexer::{Spanned, Token};
use crate::ParseError;

pub(crate) struct Cursor {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Span reported at end of input.
    eof: Span,
}

impl Cursor {
    pub fn new(tokens: Vec<Spanned>, source_len: usize) -> Self {
        let end = u32::try_from(source_len).unwrap_or(u32::MAX);
        Cursor {
            tokens,
            pos: 0,
            eof: Span::new(end, end),
        }
    }

    #[inline]
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    #[inline]
    pub fn peek(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens.get(self.pos).map_or(self.eof, |t| t.span)
    }

    #[inline]
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].span,
            None => Span::DUMMY,
        }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos <= self.tokens.len(), "cursor position {pos} out of bounds");
        self.pos = pos;
    }

    #[inline]
    pub fn check(&self, token: &Token) -> bool {
        self.current() == Some(token)
    }

    #[inline]
    pub fn check_next(&self, token: &Token) -> bool {
        self.peek(1) == Some(token)
    }

    /// Consume the current token and return its span.
    pub fn advance(&mut self) -> Span {
        let span = self.current_span();
        if !self.is_at_end() {
            self.pos += 1;
        }
        span
    }

    /// Consume `token` if it is next.
    pub fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn found(&self) -> String {
        self.current().map_or_else(|| "end of input".to_string(), ToString::to_string)
    }

    pub fn expect(&mut self, token: &Token, expected: &'static str) -> Result<Span, ParseError> {
        if self.check(token) {
            return Ok(self.advance());
        }
        Err(self.unexpected(expected))
    }

    /// Expect the closing delimiter of a group opened at `open_span`.
    pub fn expect_close(&mut self, close: &Token, open: &'static str, open_span: Span) -> Result<Span, ParseError> {
        if self.check(close) {
            return Ok(self.advance());
        }
        if self.is_at_end() {
            return Err(ParseError::Unclosed {
                open,
                open_span,
                span: self.eof,
            });
        }
        Err(self.unexpected(match close {
            Token::RParen => "`)`",
            Token::RBracket => "`]`",
            _ => "`}`",
        }))
    }

    pub fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        if let Some(Token::Ident(name)) = self.current() {
            let name = name.clone();
            return Ok((name, self.advance()));
        }
        Err(self.unexpected("an identifier"))
    }

    pub fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.found(),
            expected,
            span: self.current_span(),
        }
    }
}
