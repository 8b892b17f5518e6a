use dex_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::evaluate;

#[test]
fn loops() {
    let r = evaluate(
        "int f(int n) {
             int total = 0;
             for (int i = 0; i < n; ++i) total += i;
             int j = 0;
             while (j < n) { total += 100; j++; }
             do { total += 1000; } while (false);
             return total;
         }
         enum x = f(4);",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 1406);
}

#[test]
fn switch_falls_through_until_break() {
    let r = evaluate(
        "int classify(int x) {
             int r = 0;
             switch (x) {
                 case 1: r += 1;
                 case 2: r += 10; break;
                 case 3, 4: r = 100; break;
                 default: r = -1;
             }
             return r;
         }
         enum a = classify(1);
         enum b = classify(2);
         enum c = classify(4);
         enum d = classify(7);",
    );
    r.assert_clean();
    assert_eq!(r.int("a"), 11);
    assert_eq!(r.int("b"), 10);
    assert_eq!(r.int("c"), 100);
    assert_eq!(r.signed("d"), -1);
}

#[test]
fn switch_on_strings() {
    let r = evaluate(
        r#"int code(string s) {
               switch (s) {
                   case "red": return 1;
                   case "green": return 2;
                   default: return 0;
               }
           }
           enum g = code("green");
           enum n = code("blue");"#,
    );
    r.assert_clean();
    assert_eq!(r.int("g"), 2);
    assert_eq!(r.int("n"), 0);
}

#[test]
fn goto_resumes_at_the_label() {
    let r = evaluate(
        "int f() {
             int i = 0;
         again:
             i++;
             if (i < 5) goto again;
             return i;
         }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 5);
}

#[test]
fn labeled_break_and_continue() {
    let r = evaluate(
        "int f() {
             int hits = 0;
             outer: foreach (i; 0 .. 5) {
                 foreach (j; 0 .. 5) {
                     if (j > i) continue outer;
                     if (i == 3) break outer;
                     hits++;
                 }
             }
             return hits;
         }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 6);
}

#[test]
fn foreach_by_value_and_by_ref() {
    let r = evaluate(
        "int f() {
             int[] a = [1, 2, 3];
             foreach (v; a) v = 0;
             foreach (ref v; a) v *= 2;
             int s = 0;
             foreach (i, v; a) s += cast(int) i * v;
             return s;
         }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 16);
}

#[test]
fn foreach_over_associative_arrays() {
    let r = evaluate(
        r#"int f() {
               int[string] aa = ["a": 1, "b": 2, "c": 3];
               foreach (ref v; aa) v *= 10;
               int total = 0;
               foreach (k, v; aa) total += v;
               return total;
           }
           enum x = f();"#,
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 60);
}

#[test]
fn range_variable_is_a_copy() {
    let r = evaluate(
        "int f() { int n = 0; foreach (i; 0 .. 3) { i = 10; n++; } return n; }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 3);
}

#[test]
fn locals_default_initialize() {
    let r = evaluate(
        "struct S { int a = 4; int[2] b; }
         int f() { int[4] a; S s; return a[3] + s.a + s.b[1]; }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 4);
}

#[test]
fn static_array_fill() {
    let r = evaluate(
        "int f() { int[3] a = 7; a[1] = 1; return a[0] + a[1] + a[2]; }
         enum x = f();",
    );
    r.assert_clean();
    assert_eq!(r.int("x"), 15);
}

#[test]
fn length_mismatch_in_element_copy() {
    let r = evaluate(
        "int f() { int[] a = [1, 2, 3]; int[] b = [1, 2]; a[] = b[]; return a[0]; }
         enum x = f();",
    );
    assert_eq!(r.errors(), vec![ErrorCode::E6002]);
}
