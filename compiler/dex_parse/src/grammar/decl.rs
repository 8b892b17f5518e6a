//! Declarations: variables, functions, aggregates and function literals.
//!
//! Declarations are registered in the `DeclTable` as soon as they are
//! parsed. Names are not entered into any scope here; the resolver builds
//! scopes from `Program::items` and from `Decl` statements.

use dex_ir::{
    AggId, AggKind, AggregateDecl, ExprId, ExprKind, FuncAttrs, FuncDecl, FuncId, Name, Owner, SemaState, Span,
    StmtId, StorageClass, TypeId, TypeKind, VarDecl, VarId,
};

use super::{PResult, Parser};
use crate::lexer::Token;

/// Storage classes and attributes written before a declaration.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Prefix {
    pub storage: StorageClass,
    pub attrs: FuncAttrs,
    /// Anything at all was written; `auto`-style inference applies.
    pub any: bool,
}

/// What one declaration statement produced.
pub(crate) enum Declared {
    Vars(Vec<VarId>),
    Func(FuncId),
}

impl Parser<'_> {
    /// Storage-class and attribute keywords. `const(` and `immutable(`
    /// start a type and are left alone.
    pub(crate) fn parse_prefix(&mut self) -> Prefix {
        let mut prefix = Prefix::default();
        loop {
            let storage = match self.cursor.current() {
                Some(Token::Static) => StorageClass::STATIC,
                Some(Token::Enum) => StorageClass::MANIFEST,
                Some(Token::Auto) => StorageClass::AUTO,
                Some(Token::Ref) => StorageClass::REF,
                Some(Token::Out) => StorageClass::OUT,
                Some(Token::Scope) => StorageClass::SCOPE,
                Some(Token::Const) if !self.cursor.check_next(&Token::LParen) => StorageClass::CONST,
                Some(Token::Immutable) if !self.cursor.check_next(&Token::LParen) => StorageClass::IMMUTABLE,
                _ => StorageClass::empty(),
            };
            if !storage.is_empty() {
                self.cursor.advance();
                prefix.storage |= storage;
                prefix.any = true;
                continue;
            }
            match self.parse_function_attribute() {
                Some(attr) => {
                    prefix.attrs |= attr;
                    prefix.any = true;
                }
                None => return prefix,
            }
        }
    }

    fn parse_function_attribute(&mut self) -> Option<FuncAttrs> {
        let attr = match self.cursor.current() {
            Some(Token::Pure) => FuncAttrs::PURE,
            Some(Token::Nothrow) => FuncAttrs::NOTHROW,
            Some(Token::Deprecated) => FuncAttrs::DEPRECATED,
            Some(Token::At) => {
                let attr = match self.cursor.peek(1) {
                    Some(Token::Ident(name)) => match name.as_str() {
                        "safe" => FuncAttrs::SAFE,
                        "trusted" => FuncAttrs::TRUSTED,
                        "system" => FuncAttrs::SYSTEM,
                        _ => return None,
                    },
                    _ => return None,
                };
                self.cursor.advance();
                attr
            }
            _ => return None,
        };
        self.cursor.advance();
        Some(attr)
    }

    /// A declaration after its prefix: `[Type] name ...`.
    ///
    /// The type may be omitted after a storage class (`auto x = 1;`,
    /// `enum n = 3;`, `static f() { ... }`).
    pub(crate) fn parse_declaration(&mut self, prefix: Prefix, parent: Option<AggId>) -> PResult<Declared> {
        let inferred = prefix.any
            && matches!(self.cursor.current(), Some(Token::Ident(_)))
            && matches!(self.cursor.peek(1), Some(Token::Eq | Token::LParen));
        let ty = if inferred {
            TypeId::ERROR
        } else {
            self.parse_type()?
        };
        let (name, span) = self.cursor.expect_ident()?;
        let name = self.intern(&name);
        if self.cursor.check(&Token::LParen) {
            let mut prefix = prefix;
            if inferred {
                prefix.attrs |= FuncAttrs::AUTO_RETURN;
            }
            if prefix.storage.contains(StorageClass::STATIC) && parent.is_some() {
                prefix.attrs |= FuncAttrs::STATIC;
            }
            if prefix.storage.contains(StorageClass::REF) {
                prefix.attrs |= FuncAttrs::REF_RETURN;
            }
            return self.parse_function(prefix.attrs, ty, name, span, parent).map(Declared::Func);
        }
        let mut storage = prefix.storage;
        if inferred {
            storage |= StorageClass::AUTO;
        }
        self.parse_var_list(storage, ty, name, span).map(Declared::Vars)
    }

    /// `name [= init] {, name [= init]} ;` with the first name consumed.
    fn parse_var_list(&mut self, storage: StorageClass, ty: TypeId, name: Name, span: Span) -> PResult<Vec<VarId>> {
        let ty = self.qualify(ty, storage);
        let mut vars = vec![self.parse_var_rest(storage, ty, name, span)?];
        while self.cursor.eat(&Token::Comma) {
            let (name, span) = self.cursor.expect_ident()?;
            let name = self.intern(&name);
            vars.push(self.parse_var_rest(storage, ty, name, span)?);
        }
        self.cursor.expect(&Token::Semi, "`;` after declaration")?;
        Ok(vars)
    }

    fn parse_var_rest(&mut self, storage: StorageClass, ty: TypeId, name: Name, span: Span) -> PResult<VarId> {
        let init = if self.cursor.eat(&Token::Eq) {
            self.parse_assign_expr()?
        } else {
            ExprId::INVALID
        };
        let span = if init.is_valid() {
            span.merge(self.span_of(init))
        } else {
            span
        };
        Ok(self.program.decls.add_var(VarDecl {
            name,
            ty,
            init,
            storage,
            owner: self.owner,
            span,
        }))
    }

    /// Apply `const`/`immutable` storage classes to an explicit type.
    fn qualify(&mut self, ty: TypeId, storage: StorageClass) -> TypeId {
        if ty == TypeId::ERROR {
            ty
        } else if storage.contains(StorageClass::IMMUTABLE) {
            self.program.types.immutable_of(ty)
        } else if storage.contains(StorageClass::CONST) {
            self.program.types.const_of(ty)
        } else {
            ty
        }
    }

    /// Parameters, postfix attributes and body of a function whose return
    /// type and name have been parsed.
    fn parse_function(
        &mut self,
        attrs: FuncAttrs,
        ret: TypeId,
        name: Name,
        span: Span,
        parent: Option<AggId>,
    ) -> PResult<FuncId> {
        let func = self.program.decls.add_func(FuncDecl {
            name,
            params: Vec::new(),
            ret,
            body: StmtId::INVALID,
            attrs,
            parent,
            is_literal: false,
            state: SemaState::Pending,
            span,
        });
        self.parse_function_rest(func)?;
        Ok(func)
    }

    /// Parameter list, attributes and body, parsed with `func` as owner.
    fn parse_function_rest(&mut self, func: FuncId) -> PResult<()> {
        let outer = std::mem::replace(&mut self.owner, Owner::Func(func));
        let result = self.parse_function_parts(func);
        self.owner = outer;
        result
    }

    fn parse_function_parts(&mut self, func: FuncId) -> PResult<()> {
        let params = self.parse_params()?;
        let mut attrs = FuncAttrs::empty();
        while let Some(attr) = self.parse_function_attribute() {
            attrs |= attr;
        }
        let body = if self.cursor.eat(&Token::Semi) {
            StmtId::INVALID
        } else {
            self.parse_block()?
        };
        let decl = self.program.decls.func_mut(func);
        decl.params = params;
        decl.attrs |= attrs;
        decl.body = body;
        Ok(())
    }

    /// `(ref int a, string s = "x")`.
    fn parse_params(&mut self) -> PResult<Vec<VarId>> {
        let open = self.cursor.expect(&Token::LParen, "`(` to start a parameter list")?;
        let mut params = Vec::new();
        while !self.cursor.check(&Token::RParen) && !self.cursor.is_at_end() {
            let mut storage = StorageClass::PARAMETER;
            loop {
                let class = match self.cursor.current() {
                    Some(Token::Ref) => StorageClass::REF,
                    Some(Token::Out) => StorageClass::OUT,
                    Some(Token::Scope) => StorageClass::SCOPE,
                    _ => break,
                };
                self.cursor.advance();
                storage |= class;
            }
            let ty = self.parse_type()?;
            let (name, span) = match self.cursor.current() {
                Some(Token::Ident(_)) => self.cursor.expect_ident()?,
                _ => (format!("_param_{}", params.len()), self.cursor.previous_span()),
            };
            let name = self.intern(&name);
            params.push(self.parse_var_rest(storage, ty, name, span)?);
            if !self.cursor.eat(&Token::Comma) {
                break;
            }
        }
        self.cursor.expect_close(&Token::RParen, "(", open)?;
        Ok(params)
    }

    /// `function [Ret](params) { ... }` in expression position.
    pub(crate) fn parse_function_literal(&mut self) -> PResult<ExprId> {
        let start = self.cursor.advance();
        let (ret, attrs) = if self.cursor.check(&Token::LParen) {
            (TypeId::ERROR, FuncAttrs::AUTO_RETURN)
        } else {
            (self.parse_type()?, FuncAttrs::empty())
        };
        let func = self.program.decls.add_func(FuncDecl {
            name: Name::EMPTY,
            params: Vec::new(),
            ret,
            body: StmtId::INVALID,
            attrs,
            parent: None,
            is_literal: true,
            state: SemaState::Pending,
            span: start,
        });
        let name = self.intern(&format!("__lambda{}", func.index()));
        self.program.decls.func_mut(func).name = name;
        self.parse_function_rest(func)?;
        let span = start.merge(self.cursor.previous_span());
        self.program.decls.func_mut(func).span = span;
        Ok(self.alloc(ExprKind::FuncLiteral(func), span))
    }

    /// `struct Name { ... }` or `class Name { ... }`.
    pub(crate) fn parse_aggregate(&mut self) -> PResult<AggId> {
        let kind = if self.cursor.check(&Token::Struct) {
            AggKind::Struct
        } else {
            AggKind::Class
        };
        let start = self.cursor.advance();
        let (name, _) = self.cursor.expect_ident()?;
        let name = self.intern(&name);
        self.parse_aggregate_body(kind, name, start)
    }

    /// Body of `new class(args) { ... }`.
    pub(crate) fn parse_anonymous_class(&mut self, start: Span) -> PResult<AggId> {
        let name = self.intern(&format!("__anonclass{}", self.program.items.len()));
        self.parse_aggregate_body(AggKind::Class, name, start)
    }

    fn parse_aggregate_body(&mut self, kind: AggKind, name: Name, start: Span) -> PResult<AggId> {
        let agg = self.program.decls.add_agg(AggregateDecl {
            name,
            kind,
            fields: Vec::new(),
            methods: Vec::new(),
            ctors: Vec::new(),
            alias_this: Name::EMPTY,
            ty: TypeId::ERROR,
            span: start,
        });
        let ty = self.program.types.intern(TypeKind::Aggregate { kind, agg, name });
        self.program.decls.agg_mut(agg).ty = ty;

        let open = self.cursor.expect(&Token::LBrace, "`{` to start the aggregate body")?;
        let outer = std::mem::replace(&mut self.owner, Owner::Agg(agg));
        let result = self.parse_members(agg, open);
        self.owner = outer;
        let end = result?;
        self.program.decls.agg_mut(agg).span = start.merge(end);
        Ok(agg)
    }

    fn parse_members(&mut self, agg: AggId, open: Span) -> PResult<Span> {
        while !self.cursor.check(&Token::RBrace) && !self.cursor.is_at_end() {
            if let Err(err) = self.parse_member(agg) {
                self.errors.push(err);
                self.synchronize();
            }
        }
        self.cursor.expect_close(&Token::RBrace, "{", open)
    }

    fn parse_member(&mut self, agg: AggId) -> PResult<()> {
        if self.cursor.check(&Token::Alias) {
            // alias name this;
            self.cursor.advance();
            let (member, _) = self.cursor.expect_ident()?;
            self.cursor.expect(&Token::This, "`this` in `alias ... this`")?;
            self.cursor.expect(&Token::Semi, "`;`")?;
            self.program.decls.agg_mut(agg).alias_this = self.intern(&member);
            return Ok(());
        }
        let prefix = self.parse_prefix();
        if self.cursor.check(&Token::This) && self.cursor.check_next(&Token::LParen) {
            let span = self.cursor.advance();
            let name = self.intern("this");
            let ctor = self.parse_function(
                prefix.attrs | FuncAttrs::CONSTRUCTOR,
                TypeId::VOID,
                name,
                span,
                Some(agg),
            )?;
            self.program.decls.agg_mut(agg).ctors.push(ctor);
            return Ok(());
        }
        let is_static = prefix.storage.contains(StorageClass::STATIC);
        match self.parse_declaration(prefix, Some(agg))? {
            Declared::Func(func) => self.program.decls.agg_mut(agg).methods.push(func),
            Declared::Vars(vars) => {
                for var in vars {
                    if is_static {
                        let decl = self.program.decls.var_mut(var);
                        decl.owner = Owner::Module;
                        self.program.items.push(dex_ir::Item::Var(var));
                    } else if self.program.decls.var(var).is_manifest() {
                        self.program.decls.var_mut(var).owner = Owner::Module;
                        self.program.items.push(dex_ir::Item::Var(var));
                    } else {
                        let decl = self.program.decls.var_mut(var);
                        decl.storage |= StorageClass::FIELD;
                        self.program.decls.agg_mut(agg).fields.push(var);
                    }
                }
            }
        }
        Ok(())
    }
}
