use dex_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::resolve;

#[test]
fn returning_the_address_of_a_local() {
    let r = resolve("int* f() { int x; return &x; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2006]);
}

#[test]
fn returning_the_address_of_a_by_value_parameter() {
    let r = resolve("int* f(int x) { return &x; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2006]);

    let by_ref = resolve("int* f(ref int x) { return &x; }");
    by_ref.assert_clean();
}

#[test]
fn returning_a_slice_of_a_local_static_array() {
    let r = resolve("int[] f() { int[3] a; return a[]; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2006]);

    let global = resolve("int[3] table; int[] f() { return table[]; }");
    global.assert_clean();
}

#[test]
fn ref_returns_must_outlive_the_call() {
    let r = resolve("ref int f() { int x; return x; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2006]);

    let ok = resolve("ref int f(ref int x) { return x; }");
    ok.assert_clean();

    let rvalue = resolve("ref int f() { return 1; }");
    assert_eq!(rvalue.errors(), vec![ErrorCode::E2004]);
}

#[test]
fn storing_a_local_address_in_a_global() {
    let r = resolve("int* saved; void f() { int x; saved = &x; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2006]);

    let local = resolve("void f() { int x; int* p; p = &x; }");
    local.assert_clean();
}

#[test]
fn escapes_through_conditionals() {
    let r = resolve("int* f(bool b, int* p) { int x; return b ? &x : p; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2006]);
}

#[test]
fn fields_of_struct_locals_are_local() {
    let r = resolve("struct S { int a; } int* f() { S s; return &s.a; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2006]);

    let through_pointer = resolve("struct S { int a; } int* f(S* s) { return &s.a; }");
    through_pointer.assert_clean();
}

#[test]
fn immutable_fields_can_be_set_in_constructors() {
    let r = resolve(
        "struct P {
             immutable int id;
             this(int id) { this.id = id; }
             void reset() { this.id = 0; }
         }",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E2005]);
}

#[test]
fn static_array_length_is_read_only() {
    let r = resolve("void f() { int[3] a; a.length = 4; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2005]);

    let dynamic = resolve("void f(int[] a) { a.length = 4; }");
    dynamic.assert_clean();
}
