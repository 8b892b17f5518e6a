use super::*;
use pretty_assertions::assert_eq;

#[test]
fn builtins_have_fixed_ids() {
    let pool = TypePool::new();
    assert_eq!(pool.kind(TypeId::INT), &TypeKind::Int(IntKind::Int));
    assert_eq!(pool.kind(TypeId::STRING), &TypeKind::Slice(TypeId::IMMUTABLE_CHAR));
    assert_eq!(pool.string_width(TypeId::WSTRING), Some(CharWidth::Two));
}

#[test]
fn interning_dedups() {
    let mut pool = TypePool::new();
    let a = pool.slice(TypeId::INT);
    let b = pool.slice(TypeId::INT);
    assert_eq!(a, b);
    assert_ne!(a, pool.pointer(TypeId::INT));
}

#[test]
fn qualifiers_are_idempotent_and_transitive() {
    let mut pool = TypePool::new();
    let c = pool.const_of(TypeId::INT);
    assert_eq!(pool.const_of(c), c);
    assert_eq!(pool.const_of(TypeId::IMMUTABLE_CHAR), TypeId::IMMUTABLE_CHAR);
    let arr = pool.slice(TypeId::INT);
    let carr = pool.const_of(arr);
    assert_eq!(pool.elem(carr), Some(c));
    assert_eq!(pool.strip(carr), arr);
}

#[test]
fn integral_conversions() {
    let pool = TypePool::new();
    assert_eq!(pool.implicit_conv_to(TypeId::INT, TypeId::LONG), MatchLevel::Convert);
    assert_eq!(pool.implicit_conv_to(TypeId::LONG, TypeId::INT), MatchLevel::NoMatch);
    assert_eq!(pool.implicit_conv_to(TypeId::INT, TypeId::UINT), MatchLevel::Convert);
    assert_eq!(pool.implicit_conv_to(TypeId::INT, TypeId::DOUBLE), MatchLevel::Convert);
    assert_eq!(pool.implicit_conv_to(TypeId::DOUBLE, TypeId::INT), MatchLevel::NoMatch);
    assert_eq!(pool.implicit_conv_to(TypeId::INT, TypeId::BOOL), MatchLevel::NoMatch);
    assert_eq!(pool.implicit_conv_to(TypeId::INT, TypeId::INT), MatchLevel::Exact);
}

#[test]
fn qualified_conversions() {
    let mut pool = TypePool::new();
    let const_int = pool.const_of(TypeId::INT);
    assert_eq!(pool.implicit_conv_to(const_int, TypeId::INT), MatchLevel::Const);

    let char_slice = pool.slice(TypeId::CHAR);
    let const_char = pool.const_of(TypeId::CHAR);
    let const_char_slice = pool.slice(const_char);
    assert_eq!(pool.implicit_conv_to(TypeId::STRING, const_char_slice), MatchLevel::Const);
    assert_eq!(pool.implicit_conv_to(char_slice, const_char_slice), MatchLevel::Const);
    assert_eq!(pool.implicit_conv_to(TypeId::STRING, char_slice), MatchLevel::NoMatch);
    assert_eq!(pool.implicit_conv_to(const_char_slice, TypeId::STRING), MatchLevel::NoMatch);
}

#[test]
fn null_and_arrays() {
    let mut pool = TypePool::new();
    let p = pool.pointer(TypeId::INT);
    let s = pool.slice(TypeId::INT);
    let a = pool.array(TypeId::INT, 3);
    assert_eq!(pool.implicit_conv_to(TypeId::NULL, p), MatchLevel::Convert);
    assert_eq!(pool.implicit_conv_to(TypeId::NULL, TypeId::INT), MatchLevel::NoMatch);
    assert_eq!(pool.implicit_conv_to(a, s), MatchLevel::Convert);
    assert_eq!(pool.implicit_conv_to(s, a), MatchLevel::NoMatch);
    let void_ptr = pool.pointer(TypeId::VOID);
    assert_eq!(pool.implicit_conv_to(p, void_ptr), MatchLevel::Convert);
}

#[test]
fn arithmetic_promotion() {
    let pool = TypePool::new();
    assert_eq!(pool.arithmetic_common(TypeId::UBYTE, TypeId::SHORT), Some(TypeId::INT));
    assert_eq!(pool.arithmetic_common(TypeId::INT, TypeId::UINT), Some(TypeId::UINT));
    assert_eq!(pool.arithmetic_common(TypeId::UINT, TypeId::LONG), Some(TypeId::LONG));
    assert_eq!(pool.arithmetic_common(TypeId::INT, TypeId::FLOAT), Some(TypeId::FLOAT));
    assert_eq!(pool.arithmetic_common(TypeId::DOUBLE, TypeId::CFLOAT), Some(TypeId::CDOUBLE));
    assert_eq!(pool.arithmetic_common(TypeId::DCHAR, TypeId::CHAR), Some(TypeId::UINT));
    assert_eq!(pool.arithmetic_common(TypeId::STRING, TypeId::INT), None);
}

#[test]
fn explicit_casts() {
    let mut pool = TypePool::new();
    let p = pool.pointer(TypeId::INT);
    let q = pool.pointer(TypeId::UBYTE);
    assert!(pool.cast_allowed(TypeId::LONG, TypeId::BYTE));
    assert!(pool.cast_allowed(TypeId::DOUBLE, TypeId::INT));
    assert!(pool.cast_allowed(p, q));
    assert!(!pool.cast_allowed(TypeId::STRING, TypeId::INT));
    assert!(!pool.cast_allowed(TypeId::CDOUBLE, TypeId::INT));
}

#[test]
fn display_and_mangle() {
    let interner = StringInterner::new();
    let mut pool = TypePool::new();
    let aa = pool.assoc_array(TypeId::STRING, TypeId::INT);
    let f = pool.function(vec![TypeId::INT, aa], TypeId::BOOL);
    assert_eq!(pool.display(aa, &interner), "int[string]");
    assert_eq!(pool.display(f, &interner), "bool function(int, int[string])");

    let mut out = String::new();
    pool.mangle(f, &interner, &mut out);
    assert_eq!(out, "FiHAyaiZb");

    let arr = pool.array(TypeId::UINT, 4);
    let mut out = String::new();
    pool.mangle(arr, &interner, &mut out);
    assert_eq!(out, "G4k");
}

#[test]
fn sizes() {
    let mut pool = TypePool::new();
    let arr = pool.array(TypeId::SHORT, 5);
    assert_eq!(pool.size_of(TypeId::INT), Some(4));
    assert_eq!(pool.size_of(TypeId::STRING), Some(16));
    assert_eq!(pool.size_of(arr), Some(10));
}

#[test]
fn string_width_round_trip_text() {
    let units = CharWidth::Two.encode("h\u{e9}\u{1F600}");
    assert_eq!(units.len(), 4);
    assert_eq!(CharWidth::Two.decode(&units).as_deref(), Some("h\u{e9}\u{1F600}"));
    assert_eq!(CharWidth::One.decode(&[0xFF]), None);
}
