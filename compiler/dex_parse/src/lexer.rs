//! Lexer for the D subset, built on logos.
//!
//! Literal tokens carry their decoded payload: integer literals keep the
//! value together with the suffix and radix the parser needs to pick a
//! type, strings are unescaped, character literals decoded to a `char`.

use std::fmt;

use dex_ir::{CharWidth, Span};
use logos::Logos;

use crate::ParseError;

/// Suffix of an integer literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntSuffix {
    None,
    U,
    L,
    UL,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntLit {
    pub value: u64,
    pub suffix: IntSuffix,
    /// Written in decimal; hex and binary literals may also become unsigned.
    pub decimal: bool,
}

/// Suffix of a floating literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FloatSuffix {
    None,
    F,
    L,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatLit {
    pub value: f64,
    pub suffix: FloatSuffix,
    pub imaginary: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrLit {
    pub text: String,
    /// `c`, `w` or `d` postfix; `None` leaves the width open.
    pub postfix: Option<CharWidth>,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,

    // Keywords
    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("struct")]
    Struct,
    #[token("class")]
    Class,
    #[token("alias")]
    Alias,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("enum")]
    Enum,
    #[token("static")]
    Static,
    #[token("assert")]
    Assert,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("goto")]
    Goto,
    #[token("return")]
    Return,
    #[token("throw")]
    Throw,
    #[token("new")]
    New,
    #[token("delete")]
    Delete,
    #[token("cast")]
    Cast,
    #[token("typeid")]
    Typeid,
    #[token("is")]
    Is,
    #[token("in")]
    In,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("function")]
    Function,
    #[token("auto")]
    Auto,
    #[token("const")]
    Const,
    #[token("immutable")]
    Immutable,
    #[token("ref")]
    Ref,
    #[token("out")]
    Out,
    #[token("scope")]
    Scope,
    #[token("pure")]
    Pure,
    #[token("nothrow")]
    Nothrow,
    #[token("deprecated")]
    Deprecated,
    #[token("mixin")]
    Mixin,
    #[token("__traits")]
    Traits,

    // Builtin types
    #[token("void")]
    Void,
    #[token("bool")]
    Bool,
    #[token("byte")]
    Byte,
    #[token("ubyte")]
    Ubyte,
    #[token("short")]
    Short,
    #[token("ushort")]
    Ushort,
    #[token("int")]
    Int,
    #[token("uint")]
    Uint,
    #[token("long")]
    Long,
    #[token("ulong")]
    Ulong,
    #[token("char")]
    Char,
    #[token("wchar")]
    Wchar,
    #[token("dchar")]
    Dchar,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("real")]
    Real,
    #[token("cfloat")]
    Cfloat,
    #[token("cdouble")]
    Cdouble,
    #[token("creal")]
    Creal,
    #[token("string")]
    String,
    #[token("wstring")]
    Wstring,
    #[token("dstring")]
    Dstring,
    #[token("size_t")]
    SizeT,
    #[token("ptrdiff_t")]
    PtrdiffT,
    #[token("TypeInfo")]
    TypeInfo,

    // Special identifiers
    #[token("__FILE__")]
    File,
    #[token("__LINE__")]
    Line,
    #[token("__MODULE__")]
    ModuleName,
    #[token("__FUNCTION__")]
    FunctionName,
    #[token("__PRETTY_FUNCTION__")]
    PrettyFunction,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("$")]
    Dollar,
    #[token("@")]
    At,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^^")]
    Pow,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    Ushr,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("^^=")]
    PowEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token(">>>=")]
    UshrEq,
    #[token("~=")]
    TildeEq,

    // Literals
    #[regex(r"[0-9][0-9_]*([uU]L?|L[uU]?)?", |lex| int_literal(lex.slice(), 10))]
    #[regex(r"0[xX][0-9a-fA-F_]+([uU]L?|L[uU]?)?", |lex| int_literal(lex.slice(), 16))]
    #[regex(r"0[bB][01_]+([uU]L?|L[uU]?)?", |lex| int_literal(lex.slice(), 2))]
    IntLit(IntLit),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFL]?i?", |lex| float_literal(lex.slice()))]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFL]?i?", |lex| float_literal(lex.slice()))]
    #[regex(r"[0-9][0-9_]*i", |lex| float_literal(lex.slice()))]
    FloatLit(FloatLit),

    #[regex(r"'([^'\\\n]|\\[^\n]|\\x[0-9a-fA-F][0-9a-fA-F]|\\u[0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F])'", |lex| char_literal(lex.slice()))]
    CharLit(char),

    #[regex(r#""([^"\\]|\\[^\n])*"[cwd]?"#, |lex| string_literal(lex.slice()))]
    #[regex(r#"r"[^"]*"[cwd]?"#, |lex| raw_string(lex.slice(), 1))]
    #[regex(r"`[^`]*`[cwd]?", |lex| raw_string(lex.slice(), 0))]
    StrLit(StrLit),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

fn int_literal(slice: &str, radix: u32) -> Option<IntLit> {
    let digits_start = if radix == 10 { 0 } else { 2 };
    let body = slice[digits_start..].trim_end_matches(['u', 'U', 'L']);
    let suffix = &slice[digits_start + body.len()..];
    let suffix = match suffix.to_ascii_uppercase().as_str() {
        "" => IntSuffix::None,
        "U" => IntSuffix::U,
        "L" => IntSuffix::L,
        "UL" | "LU" => IntSuffix::UL,
        _ => return None,
    };
    let digits: String = body.chars().filter(|&c| c != '_').collect();
    if digits.is_empty() {
        return None;
    }
    let value = u64::from_str_radix(&digits, radix).ok()?;
    Some(IntLit {
        value,
        suffix,
        decimal: radix == 10,
    })
}

fn float_literal(slice: &str) -> Option<FloatLit> {
    let imaginary = slice.ends_with('i');
    let body = slice.strip_suffix('i').unwrap_or(slice);
    let (body, suffix) = if let Some(b) = body.strip_suffix(['f', 'F']) {
        (b, FloatSuffix::F)
    } else if let Some(b) = body.strip_suffix('L') {
        (b, FloatSuffix::L)
    } else {
        (body, FloatSuffix::None)
    };
    let digits: String = body.chars().filter(|&c| c != '_').collect();
    let value: f64 = digits.parse().ok()?;
    let value = if suffix == FloatSuffix::F {
        f64::from(value as f32)
    } else {
        value
    };
    Some(FloatLit {
        value,
        suffix,
        imaginary,
    })
}

fn char_literal(slice: &str) -> Option<char> {
    let inner = &slice[1..slice.len() - 1];
    let text = unescape(inner)?;
    let mut chars = text.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn postfix_width(slice: &str) -> (usize, Option<CharWidth>) {
    match slice.as_bytes().last() {
        Some(b'c') => (1, Some(CharWidth::One)),
        Some(b'w') => (1, Some(CharWidth::Two)),
        Some(b'd') => (1, Some(CharWidth::Four)),
        _ => (0, None),
    }
}

fn string_literal(slice: &str) -> Option<StrLit> {
    let (trim, postfix) = postfix_width(slice);
    let inner = &slice[1..slice.len() - 1 - trim];
    Some(StrLit {
        text: unescape(inner)?,
        postfix,
    })
}

fn raw_string(slice: &str, prefix: usize) -> Option<StrLit> {
    let (trim, postfix) = postfix_width(slice);
    let inner = &slice[prefix + 1..slice.len() - 1 - trim];
    Some(StrLit {
        text: inner.to_string(),
        postfix,
    })
}

/// Decode escape sequences; `None` for an unknown or malformed escape.
pub(crate) fn unescape(text: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '?' => '?',
            'x' => hex_escape(&mut chars, 2)?,
            'u' => hex_escape(&mut chars, 4)?,
            'U' => hex_escape(&mut chars, 8)?,
            _ => return None,
        };
        out.push(decoded);
    }
    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, len: usize) -> Option<char> {
    let digits: String = chars.take(len).collect();
    if digits.len() != len {
        return None;
    }
    char::from_u32(u32::from_str_radix(&digits, 16).ok()?)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::IntLit(lit) => return write!(f, "integer literal `{}`", lit.value),
            Token::FloatLit(lit) => return write!(f, "floating literal `{}`", lit.value),
            Token::CharLit(c) => return write!(f, "character literal {c:?}"),
            Token::StrLit(lit) => return write!(f, "string literal {:?}", lit.text),
            Token::Ident(name) => return write!(f, "identifier `{name}`"),
            Token::LineComment | Token::BlockComment => "comment",
            Token::Module => "module",
            Token::Import => "import",
            Token::Struct => "struct",
            Token::Class => "class",
            Token::Alias => "alias",
            Token::This => "this",
            Token::Super => "super",
            Token::Enum => "enum",
            Token::Static => "static",
            Token::Assert => "assert",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::Do => "do",
            Token::For => "for",
            Token::Foreach => "foreach",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Goto => "goto",
            Token::Return => "return",
            Token::Throw => "throw",
            Token::New => "new",
            Token::Delete => "delete",
            Token::Cast => "cast",
            Token::Typeid => "typeid",
            Token::Is => "is",
            Token::In => "in",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            Token::Function => "function",
            Token::Auto => "auto",
            Token::Const => "const",
            Token::Immutable => "immutable",
            Token::Ref => "ref",
            Token::Out => "out",
            Token::Scope => "scope",
            Token::Pure => "pure",
            Token::Nothrow => "nothrow",
            Token::Deprecated => "deprecated",
            Token::Mixin => "mixin",
            Token::Traits => "__traits",
            Token::Void => "void",
            Token::Bool => "bool",
            Token::Byte => "byte",
            Token::Ubyte => "ubyte",
            Token::Short => "short",
            Token::Ushort => "ushort",
            Token::Int => "int",
            Token::Uint => "uint",
            Token::Long => "long",
            Token::Ulong => "ulong",
            Token::Char => "char",
            Token::Wchar => "wchar",
            Token::Dchar => "dchar",
            Token::Float => "float",
            Token::Double => "double",
            Token::Real => "real",
            Token::Cfloat => "cfloat",
            Token::Cdouble => "cdouble",
            Token::Creal => "creal",
            Token::String => "string",
            Token::Wstring => "wstring",
            Token::Dstring => "dstring",
            Token::SizeT => "size_t",
            Token::PtrdiffT => "ptrdiff_t",
            Token::TypeInfo => "TypeInfo",
            Token::File => "__FILE__",
            Token::Line => "__LINE__",
            Token::ModuleName => "__MODULE__",
            Token::FunctionName => "__FUNCTION__",
            Token::PrettyFunction => "__PRETTY_FUNCTION__",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::Colon => ":",
            Token::Question => "?",
            Token::Dot => ".",
            Token::DotDot => "..",
            Token::Dollar => "$",
            Token::At => "@",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Pow => "^^",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Tilde => "~",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::Ushr => ">>>",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Bang => "!",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Eq => "=",
            Token::PlusEq => "+=",
            Token::MinusEq => "-=",
            Token::StarEq => "*=",
            Token::SlashEq => "/=",
            Token::PercentEq => "%=",
            Token::PowEq => "^^=",
            Token::AmpEq => "&=",
            Token::PipeEq => "|=",
            Token::CaretEq => "^=",
            Token::ShlEq => "<<=",
            Token::ShrEq => ">>=",
            Token::UshrEq => ">>>=",
            Token::TildeEq => "~=",
        };
        write!(f, "`{text}`")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Split `source` into tokens. Every malformed token is reported; the
/// caller decides whether to parse what remains.
pub fn tokenize(source: &str) -> (Vec<Spanned>, Vec<ParseError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        match result {
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(()) => errors.push(classify_error(lexer.slice(), span)),
        }
    }

    (tokens, errors)
}

fn classify_error(slice: &str, span: Span) -> ParseError {
    let text = slice.to_string();
    match slice.chars().next() {
        Some('"' | '\'' | '`') if slice.len() < 2 || !slice.ends_with(&slice[..1]) => {
            ParseError::Unterminated { span }
        }
        Some('"' | '\'' | '`') => ParseError::InvalidEscape { text, span },
        Some(c) if c.is_ascii_digit() => ParseError::InvalidNumber { text, span },
        _ => ParseError::InvalidChar { text, span },
    }
}

#[cfg(test)]
mod tests;
