use dex_diagnostic::ErrorCode;
use dex_ir::{ExprKind, Span, TypeId};
use pretty_assertions::assert_eq;

use super::evaluate;
use crate::{try_interpret, CtfeConfig};

#[test]
fn calls_produce_manifest_constants() {
    let r = evaluate(
        "int square(int x) { return x * x; }
         enum a = square(5);
         enum b = square(a) + 1;",
    );
    r.assert_clean();
    assert_eq!(r.int("a"), 25);
    assert_eq!(r.int("b"), 626);
}

#[test]
fn strings_index_and_concatenate() {
    let r = evaluate(
        r#"char second(string s) { return s[1]; }
           string greet(string name) { return "hello " ~ name ~ "!"; }
           enum c = second("abc");
           enum s = greet("dex");"#,
    );
    r.assert_clean();
    assert_eq!(r.int("c"), u64::from(b'b'));
    assert_eq!(r.string("s"), "hello dex!");
}

#[test]
fn logical_operators_short_circuit() {
    let r = evaluate(
        "bool boom() { assert(false, \"evaluated\"); return true; }
         bool quiet() { return false && boom(); }
         bool loud() { return true || boom(); }
         enum a = quiet();
         enum b = loud();",
    );
    r.assert_clean();
    assert_eq!(r.int("a"), 0);
    assert_eq!(r.int("b"), 1);
}

#[test]
fn length_of_a_literal_still_evaluates_its_elements() {
    let r = evaluate(
        "int boom() { assert(false, \"evaluated\"); return 1; }
         int bump(ref int c) { return ++c; }
         int counted() { int c; ulong n = [bump(c), 2].length; return c * 10 + cast(int) n; }
         enum x = [boom(), 2].length;
         enum y = counted();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6004]);
    assert!(r.diagnostic(ErrorCode::E6004).message.contains("evaluated"));
    assert_eq!(r.int("y"), 12);
}

#[test]
fn conditional_evaluates_one_branch() {
    let r = evaluate(
        "int fail() { int[] a; return a[3]; }
         int pick(bool b) { return b ? 1 : fail(); }
         enum x = pick(true);",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 1);
}

#[test]
fn index_out_of_bounds_reports_the_index() {
    let r = evaluate(
        "int at(int i) { int[] a = [1, 2, 3]; return a[i]; }
         enum x = at(10);",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6002]);
    let diag = r.diagnostic(ErrorCode::E6002);
    assert!(diag.message.contains("index 10"), "{}", diag.message);
    assert!(diag.message.contains("[0 .. 3]"), "{}", diag.message);
}

#[test]
fn slices_out_of_bounds() {
    let r = evaluate(
        "int[] cut(int n) { int[] a = [1, 2, 3]; return a[1 .. n]; }
         enum x = cut(5);",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6002]);
    assert!(r.diagnostic(ErrorCode::E6002).message.contains("slice [1 .. 5]"));
}

#[test]
fn division_by_zero() {
    let r = evaluate(
        "int divide(int x) { return 10 / x; }
         enum z = divide(0);",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6003]);
}

#[test]
fn literals_are_fresh_on_every_evaluation() {
    let r = evaluate(
        "int f() {
             int total = 0;
             foreach (i; 0 .. 3) {
                 int[] a = [1, 2];
                 total += a[0];
                 a[0] = 10;
             }
             return total;
         }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 3);
}

#[test]
fn struct_copies_do_not_alias() {
    let r = evaluate(
        "struct P { int x; int y; }
         int f() { P a = P(1, 2); P b = a; b.x = 10; return a.x * 100 + b.x; }
         enum r = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("r"), 110);
}

#[test]
fn evaluations_do_not_share_literal_state() {
    let r = evaluate(
        "struct P { int x; }
         immutable P origin = P(1);
         int bump() { P p = origin; p.x += 10; return p.x; }
         enum a = bump();
         enum b = bump();
         enum c = origin.x;",
    );
    r.assert_clean();
    assert_eq!(r.int("a"), 11);
    assert_eq!(r.int("b"), 11);
    assert_eq!(r.int("c"), 1);
}

#[test]
fn slices_alias_their_array() {
    let r = evaluate(
        "int f() { int[] a = [1, 2, 3]; int[] s = a[1 .. 3]; s[0] = 20; return a[1]; }
         int g() { int[3] a = [1, 2, 3]; int[3] b = a; b[0] = 9; return a[0]; }
         enum x = f();
         enum y = g();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 20);
    assert_eq!(r.int("y"), 1);
}

#[test]
fn pointers_write_through() {
    let r = evaluate(
        "int f() { int x = 1; int* p = &x; *p = 5; return x; }
         int g() { int* p = new int(3); *p += 4; return *p; }
         enum x = f();
         enum y = g();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 5);
    assert_eq!(r.int("y"), 7);
}

#[test]
fn null_dereference() {
    let r = evaluate(
        "int f() { int* p = null; return *p; }
         enum x = f();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6007]);
}

#[test]
fn associative_arrays() {
    let r = evaluate(
        r#"int f() {
               int[string] aa;
               aa["a"] = 1;
               aa["b"] += 2;
               aa["a"] += 10;
               return aa["a"] + aa["b"];
           }
           bool has(string k) { int[string] aa = ["x": 1]; return k in aa; }
           enum no = has("y");
           enum x = f();
           enum yes = has("x");"#,
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 13);
    assert_eq!(r.int("yes"), 1);
    assert_eq!(r.int("no"), 0);
}

#[test]
fn missing_key() {
    let r = evaluate(
        r#"int f() { int[string] aa; aa["a"] = 1; return aa["zz"]; }
           enum x = f();"#,
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6009]);
    assert!(r.diagnostic(ErrorCode::E6009).message.contains("\"zz\""));
}

#[test]
fn appending_and_length() {
    let r = evaluate(
        "int f() {
             int[] a;
             a ~= 1;
             a ~= [2, 3];
             a.length = 5;
             a[4] = 7;
             return cast(int) a.length * 100 + a[2] * 10 + a[4];
         }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 537);
}

#[test]
fn array_operations() {
    let r = evaluate(
        "int f() {
             int[3] a = [1, 2, 3];
             int[3] b = [4, 5, 6];
             int[3] c;
             c[] = a[] + b[];
             c[] *= 2;
             return c[0] + c[1] + c[2];
         }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 42);
}

#[test]
fn array_results_become_literals() {
    let r = evaluate(
        "int[] squares(int n) { int[] result; foreach (i; 0 .. n) result ~= i * i; return result; }
         enum s = squares(4);",
    );
    r.assert_clean();
    assert_eq!(r.printed("s"), "[0, 1, 4, 9]");
}

#[test]
fn pointers_have_no_literal_form() {
    let r = evaluate(
        "int* f() { return new int(1); }
         enum p = f();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6001]);
}

#[test]
fn try_interpret_leaves_runtime_state_alone() {
    let mut r = evaluate(
        "int counter;
         int twice(int x) { return x * 2; }
         enum a = twice(21);",
    );
    r.assert_clean();
    let config = CtfeConfig::default();

    let literal = r.init("a");
    let same = try_interpret(&mut r.program, literal, &config);
    assert_eq!(same.map(|e| e.map(|e| r.program.arena.kind(e))), Ok(Some(ExprKind::Int(42))));

    let counter = r.var("counter");
    let read = r
        .program
        .arena
        .alloc_typed(ExprKind::Var(counter), Span::DUMMY, TypeId::INT);
    assert_eq!(try_interpret(&mut r.program, read, &config), Ok(None));
}
