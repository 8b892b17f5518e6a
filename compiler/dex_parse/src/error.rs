//! Parse errors and their conversion to diagnostics.

use dex_diagnostic::{Diagnostic, ErrorCode};
use dex_ir::Span;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unterminated string or character literal")]
    Unterminated { span: Span },

    #[error("invalid character `{text}`")]
    InvalidChar { text: String, span: Span },

    #[error("invalid number literal `{text}`")]
    InvalidNumber { text: String, span: Span },

    #[error("invalid escape sequence in {text}")]
    InvalidEscape { text: String, span: Span },

    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        span: Span,
    },

    #[error("expected an expression, found {found}")]
    ExpectedExpression { found: String, span: Span },

    #[error("unclosed `{open}`")]
    Unclosed {
        open: &'static str,
        open_span: Span,
        span: Span,
    },

    #[error("expected a type, found {found}")]
    ExpectedType { found: String, span: Span },

    #[error("expected a declaration, found {found}")]
    ExpectedDeclaration { found: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Unterminated { span }
            | ParseError::InvalidChar { span, .. }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::InvalidEscape { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::ExpectedExpression { span, .. }
            | ParseError::Unclosed { span, .. }
            | ParseError::ExpectedType { span, .. }
            | ParseError::ExpectedDeclaration { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::Unterminated { .. } => ErrorCode::E0001,
            ParseError::InvalidChar { .. } => ErrorCode::E0002,
            ParseError::InvalidNumber { .. } => ErrorCode::E0003,
            ParseError::InvalidEscape { .. } => ErrorCode::E0004,
            ParseError::UnexpectedToken { .. } => ErrorCode::E1001,
            ParseError::ExpectedExpression { .. } => ErrorCode::E1002,
            ParseError::Unclosed { .. } => ErrorCode::E1003,
            ParseError::ExpectedType { .. } => ErrorCode::E1004,
            ParseError::ExpectedDeclaration { .. } => ErrorCode::E1005,
        }
    }

    /// Move the error onto `span`; used when parsing text produced by `mixin`.
    #[must_use]
    pub fn at(mut self, at: Span) -> Self {
        match &mut self {
            ParseError::Unterminated { span }
            | ParseError::InvalidChar { span, .. }
            | ParseError::InvalidNumber { span, .. }
            | ParseError::InvalidEscape { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::ExpectedExpression { span, .. }
            | ParseError::ExpectedType { span, .. }
            | ParseError::ExpectedDeclaration { span, .. } => *span = at,
            ParseError::Unclosed { open_span, span, .. } => {
                *open_span = at;
                *span = at;
            }
        }
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(self.span(), self.label());
        match self {
            ParseError::Unclosed { open, open_span, .. } => {
                diag.with_secondary_label(*open_span, format!("`{open}` opened here"))
            }
            _ => diag,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ParseError::Unterminated { .. } => "literal starts here",
            ParseError::InvalidChar { .. } => "not valid here",
            ParseError::InvalidNumber { .. } => "malformed or out of range",
            ParseError::InvalidEscape { .. } => "unknown escape",
            ParseError::UnexpectedToken { expected, .. } => expected,
            ParseError::ExpectedExpression { .. } => "expected expression",
            ParseError::Unclosed { .. } => "reached end of input",
            ParseError::ExpectedType { .. } => "expected type",
            ParseError::ExpectedDeclaration { .. } => "expected declaration",
        }
    }
}
