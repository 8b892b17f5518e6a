//! Dex Parser - source text to unresolved expression trees.
//!
//! The lexer is generated by `logos`; the parser is hand-written recursive
//! descent over the token vector. The output is the untyped IR in
//! `dex_ir`: every `Expr` has `ty == None` except numeric, character and
//! boolean literals, whose lexical type is known.
//!
//! Two entry points:
//! - [`parse_module`] fills a [`Program`] with items from a source file
//! - [`parse_expression`] parses one expression, used for `mixin(...)`
//!   text produced at compile time

mod cursor;
mod error;
mod grammar;
pub mod lexer;

use dex_ir::{ExprId, Program, Span};

pub use error::ParseError;
pub use lexer::{tokenize, Token};

use cursor::Cursor;
use grammar::Parser;

/// Parse a whole module into `program`.
///
/// Lexical errors stop parsing; syntax errors are recovered from at
/// statement and item boundaries, so several can be reported at once.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_module(program: &mut Program, source: &str) -> Vec<ParseError> {
    let (tokens, lex_errors) = tokenize(source);
    if !lex_errors.is_empty() {
        return lex_errors;
    }
    let mut parser = Parser::new(Cursor::new(tokens, source.len()), program);
    parser.parse_items();
    let errors = parser.errors;
    tracing::debug!(items = program.items.len(), errors = errors.len(), "parsed module");
    errors
}

/// Parse `text` as a single expression.
///
/// With an `origin`, every node and error is placed at that span: the text
/// comes from a string built at compile time and has no location of its
/// own.
pub fn parse_expression(program: &mut Program, text: &str, origin: Option<Span>) -> Result<ExprId, Vec<ParseError>> {
    let respan = |errors: Vec<ParseError>| -> Vec<ParseError> {
        match origin {
            Some(at) => errors.into_iter().map(|e| e.at(at)).collect(),
            None => errors,
        }
    };
    let (mut tokens, lex_errors) = tokenize(text);
    if !lex_errors.is_empty() {
        return Err(respan(lex_errors));
    }
    if let Some(at) = origin {
        for token in &mut tokens {
            token.span = at;
        }
    }
    let mut parser = Parser::new(Cursor::new(tokens, text.len()), program);
    let result = parser.parse_expr().and_then(|expr| {
        if parser.cursor.is_at_end() {
            Ok(expr)
        } else {
            Err(parser.cursor.unexpected("end of expression"))
        }
    });
    match result {
        Ok(expr) => Ok(expr),
        Err(err) => Err(respan(vec![err])),
    }
}

#[cfg(test)]
mod tests;
