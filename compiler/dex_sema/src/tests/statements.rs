use dex_diagnostic::ErrorCode;
use dex_ir::TypeId;
use pretty_assertions::assert_eq;

use super::resolve;

#[test]
fn control_flow_resolves() {
    let r = resolve(
        "int sum(int[] a) {
             int total = 0;
             foreach (v; a) total += v;
             foreach (i; 0 .. 10) { if (i == 3) continue; else break; }
             for (int n = 0; n < 3; ++n) total++;
             while (total > 100) total--;
             do { total -= 1; } while (total > 50);
             outer: switch (total) {
                 case 1, 2: break outer;
                 default: break;
             }
             return total;
         }",
    );
    r.assert_clean();
}

#[test]
fn falling_off_the_end() {
    let r = resolve("int f(int x) { if (x) return 1; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2019]);

    let both = resolve("int f(int x) { if (x) return 1; else return 2; }");
    both.assert_clean();
}

#[test]
fn misplaced_jumps() {
    let r = resolve("void f() { break; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2018]);

    let r = resolve("void f() { continue; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2018]);

    let r = resolve("void f() { goto nowhere; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2018]);
}

#[test]
fn labels_reach_enclosing_loops() {
    let r = resolve(
        "void f() {
             outer: foreach (i; 0 .. 3) {
                 foreach (j; 0 .. 3) { if (j == 1) continue outer; }
             }
         }",
    );
    r.assert_clean();
}

#[test]
fn static_assert_failure() {
    let r = resolve("enum N = 3; static assert(N == 4);");
    assert_eq!(r.errors(), vec![ErrorCode::E2015]);

    let ok = resolve("enum N = 3; static assert(N == 3);");
    ok.assert_clean();
}

#[test]
fn static_if_discards_the_false_branch() {
    let r = resolve(
        "int f() {
             static if (false) { return undefined_name; }
             return 1;
         }",
    );
    r.assert_clean();
}

#[test]
fn auto_return_type_is_inferred() {
    let r = resolve("auto f() { return 1; } auto g(bool b) { if (b) return 1; return 2L; }");
    r.assert_clean();
    assert_eq!(r.program.decls.func(r.func("f")).ret, TypeId::INT);
    assert_eq!(r.program.decls.func(r.func("g")).ret, TypeId::LONG);
}

#[test]
fn duplicate_local() {
    let r = resolve("void f() { int x; int x; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2012]);
}

#[test]
fn duplicate_global() {
    let r = resolve("int x; int x;");
    assert_eq!(r.errors(), vec![ErrorCode::E2012]);
}

#[test]
fn return_type_mismatch() {
    let r = resolve(r#"int f() { return "text"; }"#);
    assert_eq!(r.errors(), vec![ErrorCode::E2003]);
}

#[test]
fn condition_must_convert_to_bool() {
    let r = resolve("struct S { int a; } void f(S s) { if (s) {} }");
    assert_eq!(r.errors(), vec![ErrorCode::E2003]);
}
