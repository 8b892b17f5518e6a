use dex_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::{evaluate, evaluate_with};
use crate::CtfeConfig;

#[test]
fn recursion() {
    let r = evaluate(
        "int fact(int n) { return n <= 1 ? 1 : n * fact(n - 1); }
         int fib(int n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }
         enum f = fact(10);
         enum g = fib(15);",
    );
    r.assert_clean();
    assert_eq!(r.int("f"), 3_628_800);
    assert_eq!(r.int("g"), 610);
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let r = evaluate_with(
        "int down(int n) { return down(n + 1); }
         enum x = down(0);",
        CtfeConfig::default().with_max_recursion_depth(50),
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6005]);
    assert!(r.diagnostic(ErrorCode::E6005).message.contains("50"));
}

#[test]
fn ref_and_out_parameters() {
    let r = evaluate(
        "void bump(ref int x) { x += 1; }
         void reset(out int x) { x += 5; }
         int f() { int a = 1; bump(a); bump(a); return a; }
         int g() { int a = 100; reset(a); return a; }
         enum x = f();
         enum y = g();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 3);
    assert_eq!(r.int("y"), 5);
}

#[test]
fn by_value_arguments_are_copies() {
    let r = evaluate(
        "void clobber(int[3] a) { a[0] = 0; }
         void grow(int[] a) { a[0] = 0; }
         int f() { int[3] a = [1, 2, 3]; clobber(a); return a[0]; }
         int g() { int[] a = [1, 2, 3]; grow(a); return a[0]; }
         enum x = f();
         enum y = g();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 1, "static arrays are values");
    assert_eq!(r.int("y"), 0, "slices share their elements");
}

#[test]
fn default_arguments() {
    let r = evaluate(
        "int scale(int x, int by = 10) { return x * by; }
         enum a = scale(4);
         enum b = scale(4, 2);",
    );
    r.assert_clean();
    assert_eq!(r.int("a"), 40);
    assert_eq!(r.int("b"), 8);
}

#[test]
fn struct_constructors_and_methods() {
    let r = evaluate(
        "struct Counter {
             int n;
             this(int start) { n = start; }
             void bump() { n += 1; }
             int get() { return n; }
         }
         int f() { Counter c = Counter(5); c.bump(); c.bump(); return c.get(); }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 7);
}

#[test]
fn struct_results_become_literals() {
    let r = evaluate(
        "struct P { int x; int y; }
         P mirror(P p) { return P(p.y, p.x); }
         enum p = mirror(P(1, 2));",
    );
    r.assert_clean();
    assert_eq!(r.printed("p"), "P(2, 1)");
}

#[test]
fn classes_are_references() {
    let r = evaluate(
        "class Box {
             int v;
             this(int v) { this.v = v; }
             int twice() { return v * 2; }
         }
         void fill(Box b) { b.v = 50; }
         int f() { Box b = new Box(21); int first = b.twice(); fill(b); return first + b.v; }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 92);
}

#[test]
fn null_class_reference() {
    let r = evaluate(
        "class Box { int v; int get() { return v; } }
         int f() { Box b; return b.get(); }
         enum x = f();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6007]);
}

#[test]
fn callee_that_failed_to_compile_is_reported_once() {
    let r = evaluate(
        "int g() { const int a = 1; a = 2; return a; }
         enum x = g();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E2005]);
}

#[test]
fn self_referential_field_default() {
    let r = evaluate("class C { C next = new C; }");
    assert_eq!(r.errors(), vec![ErrorCode::E6001]);
}

#[test]
fn ref_returns_are_assignable() {
    let r = evaluate(
        "ref int first(int[] a) { return a[0]; }
         int f() { int[] a = [1, 2]; first(a) = 10; first(a) += 5; return a[0]; }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 15);
}

#[test]
fn faults_carry_the_call_stack() {
    let r = evaluate(
        "int inner(int[] a) { return a[5]; }
         int outer() { return inner([1]); }
         enum x = outer();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6002]);
    let diag = r.diagnostic(ErrorCode::E6002);
    let callers: Vec<&str> = diag
        .labels
        .iter()
        .filter(|l| !l.is_primary)
        .map(|l| l.message.as_str())
        .collect();
    assert_eq!(callers.len(), 2, "{callers:?}");
    assert!(callers[0].contains("inner"), "{callers:?}");
    assert!(callers[1].contains("outer"), "{callers:?}");
}

#[test]
fn failed_assertions_keep_their_message() {
    let r = evaluate(
        r#"int check(int x) { assert(x > 0, "x must be positive"); return x; }
           enum a = check(3);
           enum b = check(-1);"#,
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6004]);
    assert!(r.diagnostic(ErrorCode::E6004).message.contains("x must be positive"));
    assert_eq!(r.int("a"), 3);
}

#[test]
fn uncaught_throw() {
    let r = evaluate(
        r#"int fail(int x) { if (x > 1) throw "too big"; return x; }
           enum a = fail(5);"#,
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6006]);
    assert!(r.diagnostic(ErrorCode::E6006).message.contains("too big"));
}

#[test]
fn step_budget() {
    let r = evaluate_with(
        "int spin(int n) { int i = 0; while (n > 0) { i++; } return i; }
         enum x = spin(1);",
        CtfeConfig::default().with_step_budget(1_000),
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6008]);
    assert!(r
        .diagnostic(ErrorCode::E6008)
        .notes
        .iter()
        .any(|n| n.contains("--ctfe-budget")));
}

#[test]
fn mutable_globals_are_not_constant() {
    let r = evaluate(
        "int counter = 1;
         int read() { return counter; }
         enum x = read();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6001]);
}

#[test]
fn immutable_globals_are_constant() {
    let r = evaluate(
        "immutable int base = 40;
         int add(int x) { return base + x; }
         enum x = add(2);",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 42);
}
