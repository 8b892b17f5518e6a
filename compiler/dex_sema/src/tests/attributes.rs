use dex_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::{resolve, resolve_with};
use crate::{Deprecation, ResolverConfig};

#[test]
fn pure_cannot_call_impure() {
    let r = resolve("int impure() { return 1; } pure int f() { return impure(); }");
    assert_eq!(r.errors(), vec![ErrorCode::E2007]);

    let ok = resolve("pure int twice(int x) { return 2 * x; } pure int f() { return twice(2); }");
    ok.assert_clean();
}

#[test]
fn pure_reads_only_immutable_globals() {
    let r = resolve("int counter; pure int f() { return counter; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2007]);

    let ok = resolve("immutable int limit = 3; enum N = 4; pure int f() { return limit + N; }");
    ok.assert_clean();
}

#[test]
fn nothrow_rejects_throwing_calls_and_throw() {
    let r = resolve("void may() {} nothrow void f() { may(); }");
    assert_eq!(r.errors(), vec![ErrorCode::E2007]);

    let ok = resolve("nothrow void quiet() {} nothrow void f() { quiet(); }");
    ok.assert_clean();
}

#[test]
fn safe_rejects_system_calls() {
    let r = resolve("void sys() {} @safe void f() { sys(); }");
    assert_eq!(r.errors(), vec![ErrorCode::E2008]);

    let ok = resolve("@trusted void t() {} @safe void s() {} @safe void f() { t(); s(); }");
    ok.assert_clean();
}

#[test]
fn safe_rejects_pointer_arithmetic() {
    let r = resolve("@safe int* f(int* p) { return p + 1; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2008]);

    let ok = resolve("int* f(int* p) { return p + 1; }");
    ok.assert_clean();
}

#[test]
fn safe_rejects_address_of_locals() {
    let r = resolve("@safe void f() { int x; int* p = &x; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2008]);
}

#[test]
fn deprecation_follows_the_configured_policy() {
    let source = "deprecated void old() {} void f() { old(); }";

    let warned = resolve(source);
    warned.assert_clean();
    assert_eq!(warned.warnings(), vec![ErrorCode::E2009]);

    let config = ResolverConfig::default().with_deprecation(Deprecation::Error);
    let failed = resolve_with(source, &config);
    assert_eq!(failed.errors(), vec![ErrorCode::E2009]);

    let config = ResolverConfig::default().with_deprecation(Deprecation::Allow);
    let silent = resolve_with(source, &config);
    assert!(silent.diagnostics.is_empty());
}

#[test]
fn deprecated_callers_may_use_deprecated_code() {
    let r = resolve("deprecated void old() {} deprecated void older() { old(); }");
    assert!(r.diagnostics.is_empty(), "{:?}", r.diagnostics);
}
