use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn tokens(source: &str) -> Vec<Token> {
    let (tokens, errors) = tokenize(source);
    assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
    tokens.into_iter().map(|t| t.token).collect()
}

fn single(source: &str) -> Token {
    let toks = tokens(source);
    assert_eq!(toks.len(), 1, "expected one token, got {toks:?}");
    toks.into_iter().next().unwrap()
}

fn int(value: u64, suffix: IntSuffix, decimal: bool) -> Token {
    Token::IntLit(IntLit { value, suffix, decimal })
}

#[test]
fn integer_suffixes_and_radixes() {
    assert_eq!(single("42"), int(42, IntSuffix::None, true));
    assert_eq!(single("1_000u"), int(1000, IntSuffix::U, true));
    assert_eq!(single("7L"), int(7, IntSuffix::L, true));
    assert_eq!(single("7UL"), int(7, IntSuffix::UL, true));
    assert_eq!(single("7LU"), int(7, IntSuffix::UL, true));
    assert_eq!(single("0xFF"), int(255, IntSuffix::None, false));
    assert_eq!(single("0b1010"), int(10, IntSuffix::None, false));
}

#[test]
fn integer_overflow_is_a_number_error() {
    let (_, errors) = tokenize("99999999999999999999999");
    assert!(matches!(errors.as_slice(), [ParseError::InvalidNumber { .. }]));
}

#[test]
fn floating_literals() {
    let Token::FloatLit(lit) = single("1.5") else {
        panic!("expected a float");
    };
    assert_eq!(lit.value, 1.5);
    assert_eq!(lit.suffix, FloatSuffix::None);

    let Token::FloatLit(lit) = single("2.5f") else {
        panic!("expected a float");
    };
    assert_eq!(lit.suffix, FloatSuffix::F);

    let Token::FloatLit(lit) = single("1e-7") else {
        panic!("expected a float");
    };
    assert_eq!(lit.value, 1e-7);

    let Token::FloatLit(lit) = single("3.0i") else {
        panic!("expected an imaginary literal");
    };
    assert!(lit.imaginary);
    assert_eq!(lit.value, 3.0);
}

#[test]
fn range_is_not_a_float() {
    assert_eq!(
        tokens("1..2"),
        vec![int(1, IntSuffix::None, true), Token::DotDot, int(2, IntSuffix::None, true)]
    );
}

#[test]
fn character_literals() {
    assert_eq!(single("'a'"), Token::CharLit('a'));
    assert_eq!(single(r"'\n'"), Token::CharLit('\n'));
    assert_eq!(single(r"'\x41'"), Token::CharLit('A'));
    assert_eq!(single(r"'\u00e9'"), Token::CharLit('é'));
}

#[test]
fn string_literals_unescape_and_keep_postfix() {
    assert_eq!(
        single(r#""a\tb""#),
        Token::StrLit(StrLit {
            text: "a\tb".into(),
            postfix: None
        })
    );
    assert_eq!(
        single(r#""wide"w"#),
        Token::StrLit(StrLit {
            text: "wide".into(),
            postfix: Some(CharWidth::Two)
        })
    );
    assert_eq!(
        single(r#"r"C:\dir""#),
        Token::StrLit(StrLit {
            text: r"C:\dir".into(),
            postfix: None
        })
    );
    assert_eq!(
        single("`raw`d"),
        Token::StrLit(StrLit {
            text: "raw".into(),
            postfix: Some(CharWidth::Four)
        })
    );
}

#[test]
fn bad_escape_is_reported() {
    let (_, errors) = tokenize(r#""\q""#);
    assert!(matches!(errors.as_slice(), [ParseError::InvalidEscape { .. }]));
}

#[test]
fn stray_character_is_reported() {
    let (tokens, errors) = tokenize("a # b");
    assert_eq!(tokens.len(), 2);
    assert!(matches!(errors.as_slice(), [ParseError::InvalidChar { text, .. }] if text == "#"));
}

#[test]
fn keywords_and_operators() {
    assert_eq!(
        tokens("x ^^= 2 >>> 1 !is null"),
        vec![
            Token::Ident("x".into()),
            Token::PowEq,
            int(2, IntSuffix::None, true),
            Token::Ushr,
            int(1, IntSuffix::None, true),
            Token::Bang,
            Token::Is,
            Token::Null,
        ]
    );
    assert_eq!(single("__FILE__"), Token::File);
    assert_eq!(single("size_t"), Token::SizeT);
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        tokens("a // line\n /* block * still */ b"),
        vec![Token::Ident("a".into()), Token::Ident("b".into())]
    );
}

#[test]
fn spans_cover_the_token() {
    let (tokens, _) = tokenize("  foo + 1");
    assert_eq!(tokens[0].span, Span::new(2, 5));
    assert_eq!(tokens[2].span, Span::new(8, 9));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn decimal_integers_round_trip(n in any::<u64>()) {
        prop_assert_eq!(single(&n.to_string()), int(n, IntSuffix::None, true));
    }

    #[test]
    fn identifiers_lex_as_one_token(name in "[a-z][a-z0-9_]{0,12}") {
        let tok = single(&name);
        // Keywords are fine; anything else must be an identifier of the same text.
        if let Token::Ident(text) = tok {
            prop_assert_eq!(text, name);
        }
    }
}
