//! `mixin` support: the parser behind the resolver's [`MixinParser`] hook.

use dex_diagnostic::Diagnostic;
use dex_ir::{ExprId, Program, Span};
use dex_sema::MixinParser;

/// Re-parses `mixin` strings with `dex_parse`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ParserMixin;

impl MixinParser for ParserMixin {
    fn parse_expression(&mut self, program: &mut Program, text: &str, origin: Span) -> Result<ExprId, Vec<Diagnostic>> {
        dex_parse::parse_expression(program, text, Some(origin))
            .map_err(|errors| errors.iter().map(dex_parse::ParseError::to_diagnostic).collect())
    }
}
