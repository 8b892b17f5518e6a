//! Module level: the module header, imports, aggregates, aliases and
//! global declarations.

use dex_ir::Item;

use super::decl::Declared;
use super::{PResult, Parser};
use crate::lexer::Token;

impl Parser<'_> {
    /// Parse every item up to end of input, recording errors as it goes.
    pub(crate) fn parse_items(&mut self) {
        if self.cursor.check(&Token::Module) {
            if let Err(err) = self.parse_module_header() {
                self.errors.push(err);
                self.synchronize();
            }
        }
        while !self.cursor.is_at_end() {
            if let Err(err) = self.parse_item() {
                self.errors.push(err);
                self.synchronize();
                // A stray `}` would stop synchronize without progress.
                self.cursor.eat(&Token::RBrace);
            }
        }
    }

    /// `module a.b.c;`
    fn parse_module_header(&mut self) -> PResult<()> {
        self.cursor.advance();
        let path = self.parse_dotted_path()?;
        self.cursor.expect(&Token::Semi, "`;` after module name")?;
        self.program.module.name = self.intern(&path);
        Ok(())
    }

    fn parse_dotted_path(&mut self) -> PResult<String> {
        let (mut path, _) = self.cursor.expect_ident()?;
        while self.cursor.eat(&Token::Dot) {
            let (part, _) = self.cursor.expect_ident()?;
            path.push('.');
            path.push_str(&part);
        }
        Ok(path)
    }

    fn parse_item(&mut self) -> PResult<()> {
        match self.cursor.current() {
            Some(Token::Semi) => {
                self.cursor.advance();
            }
            Some(Token::Import) if !self.cursor.check_next(&Token::LParen) => {
                // Other modules are not loaded; the import only has to parse.
                self.cursor.advance();
                let path = self.parse_dotted_path()?;
                self.cursor.expect(&Token::Semi, "`;` after import")?;
                tracing::debug!(module = %path, "ignoring import");
            }
            Some(Token::Struct | Token::Class) => {
                let agg = self.parse_aggregate()?;
                self.program.items.push(Item::Agg(agg));
            }
            Some(Token::Alias) => {
                let start = self.cursor.advance();
                let (name, _) = self.cursor.expect_ident()?;
                let name = self.intern(&name);
                self.cursor.expect(&Token::Eq, "`=` in alias declaration")?;
                let ty = self.parse_type()?;
                self.cursor.expect(&Token::Semi, "`;` after alias")?;
                let span = start.merge(self.cursor.previous_span());
                self.program.items.push(Item::Alias { name, ty, span });
            }
            Some(Token::Static) if self.cursor.check_next(&Token::Assert) => {
                self.cursor.advance();
                let stmt = self.parse_static_assert()?;
                self.program.items.push(Item::StaticAssert(stmt));
            }
            _ => {
                let prefix = self.parse_prefix();
                if !prefix.any && !self.at_builtin_type() && !self.looks_like_declaration(true) {
                    return Err(crate::ParseError::ExpectedDeclaration {
                        found: self.cursor.found(),
                        span: self.cursor.current_span(),
                    });
                }
                match self.parse_declaration(prefix, None)? {
                    Declared::Vars(vars) => {
                        self.program.items.extend(vars.into_iter().map(Item::Var));
                    }
                    Declared::Func(func) => self.program.items.push(Item::Func(func)),
                }
            }
        }
        Ok(())
    }
}
