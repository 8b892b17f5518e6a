//! Type syntax.
//!
//! Named types are left as `TypeKind::Ident`; `T[N]` with an identifier
//! `N` becomes `TypeKind::IdentIndexed` because only the resolver knows
//! whether `N` is a type (an associative array) or a constant (a static
//! array).

use dex_ir::{TypeId, TypeKind};

use super::{PResult, Parser};
use crate::lexer::Token;
use crate::ParseError;

/// Builtin type named by a keyword token.
pub(crate) fn builtin_type(token: &Token) -> Option<TypeId> {
    Some(match token {
        Token::Void => TypeId::VOID,
        Token::Bool => TypeId::BOOL,
        Token::Byte => TypeId::BYTE,
        Token::Ubyte => TypeId::UBYTE,
        Token::Short => TypeId::SHORT,
        Token::Ushort => TypeId::USHORT,
        Token::Int => TypeId::INT,
        Token::Uint => TypeId::UINT,
        Token::Long => TypeId::LONG,
        Token::Ulong => TypeId::ULONG,
        Token::Char => TypeId::CHAR,
        Token::Wchar => TypeId::WCHAR,
        Token::Dchar => TypeId::DCHAR,
        Token::Float => TypeId::FLOAT,
        Token::Double => TypeId::DOUBLE,
        Token::Real => TypeId::REAL,
        Token::Cfloat => TypeId::CFLOAT,
        Token::Cdouble => TypeId::CDOUBLE,
        Token::Creal => TypeId::CREAL,
        Token::String => TypeId::STRING,
        Token::Wstring => TypeId::WSTRING,
        Token::Dstring => TypeId::DSTRING,
        Token::SizeT => TypeId::SIZE_T,
        Token::PtrdiffT => TypeId::PTRDIFF_T,
        Token::TypeInfo => TypeId::TYPEINFO,
        _ => return None,
    })
}

impl Parser<'_> {
    /// The current token can only start a type.
    pub(crate) fn at_builtin_type(&self) -> bool {
        self.cursor.current().and_then(builtin_type).is_some()
    }

    pub(crate) fn parse_type(&mut self) -> PResult<TypeId> {
        let base = self.parse_base_type()?;
        self.parse_type_suffixes(base)
    }

    fn parse_base_type(&mut self) -> PResult<TypeId> {
        if let Some(ty) = self.cursor.current().and_then(builtin_type) {
            self.cursor.advance();
            return Ok(ty);
        }
        match self.cursor.current() {
            Some(Token::Const | Token::Immutable) => {
                let is_const = self.cursor.check(&Token::Const);
                self.cursor.advance();
                let inner = if self.cursor.check(&Token::LParen) {
                    let open = self.cursor.advance();
                    let inner = self.parse_type()?;
                    self.cursor.expect_close(&Token::RParen, "(", open)?;
                    inner
                } else {
                    self.parse_type()?
                };
                Ok(if is_const {
                    self.program.types.const_of(inner)
                } else {
                    self.program.types.immutable_of(inner)
                })
            }
            Some(Token::Ident(_)) => {
                let (name, _) = self.cursor.expect_ident()?;
                let name = self.intern(&name);
                Ok(self.program.types.intern(TypeKind::Ident(name)))
            }
            _ => Err(ParseError::ExpectedType {
                found: self.cursor.found(),
                span: self.cursor.current_span(),
            }),
        }
    }

    pub(crate) fn parse_type_suffixes(&mut self, mut ty: TypeId) -> PResult<TypeId> {
        loop {
            match self.cursor.current() {
                Some(Token::Star) => {
                    self.cursor.advance();
                    ty = self.program.types.pointer(ty);
                }
                Some(Token::LBracket) => {
                    let open = self.cursor.advance();
                    ty = self.parse_bracket_suffix(ty)?;
                    self.cursor.expect_close(&Token::RBracket, "[", open)?;
                }
                Some(Token::Function) => {
                    self.cursor.advance();
                    let params = self.parse_param_types()?;
                    ty = self.program.types.function(params, ty);
                }
                _ => return Ok(ty),
            }
        }
    }

    fn parse_bracket_suffix(&mut self, elem: TypeId) -> PResult<TypeId> {
        match self.cursor.current() {
            Some(Token::RBracket) => Ok(self.program.types.slice(elem)),
            Some(Token::IntLit(lit)) => {
                let len = lit.value;
                self.cursor.advance();
                Ok(self.program.types.array(elem, len))
            }
            Some(Token::Ident(_)) if self.cursor.check_next(&Token::RBracket) => {
                let (index, _) = self.cursor.expect_ident()?;
                let index = self.intern(&index);
                Ok(self.program.types.intern(TypeKind::IdentIndexed { elem, index }))
            }
            _ => {
                let key = self.parse_type()?;
                Ok(self.program.types.assoc_array(key, elem))
            }
        }
    }

    /// `(int, ref string s)` after `function` in a type.
    fn parse_param_types(&mut self) -> PResult<Vec<TypeId>> {
        let open = self.cursor.expect(&Token::LParen, "`(`")?;
        let mut params = Vec::new();
        while !self.cursor.check(&Token::RParen) {
            while matches!(self.cursor.current(), Some(Token::Ref | Token::Out | Token::Scope)) {
                self.cursor.advance();
            }
            params.push(self.parse_type()?);
            if matches!(self.cursor.current(), Some(Token::Ident(_))) {
                self.cursor.advance();
            }
            if !self.cursor.eat(&Token::Comma) {
                break;
            }
        }
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        Ok(params)
    }

    /// Speculatively parse `Type Ident` followed by one of `follow`, then
    /// rewind. Decides whether a statement starting with an identifier is
    /// a declaration.
    pub(crate) fn looks_like_declaration(&mut self, allow_function: bool) -> bool {
        let start = self.cursor.position();
        let is_decl = self.parse_type().is_ok()
            && matches!(self.cursor.current(), Some(Token::Ident(_)))
            && match self.cursor.peek(1) {
                Some(Token::Eq | Token::Semi | Token::Comma) => true,
                Some(Token::LParen) => allow_function,
                _ => false,
            };
        self.cursor.set_position(start);
        is_decl
    }
}
