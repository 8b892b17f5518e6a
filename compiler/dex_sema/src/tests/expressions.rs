use dex_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::resolve;

#[test]
fn manifest_constants_fold() {
    let r = resolve(
        "enum a = 1 + 2 * 3;
         enum b = a << 2;
         enum c = a > 5 ? 10 : 20;",
    );
    r.assert_clean();
    assert_eq!(r.int("a"), 7);
    assert_eq!(r.int("b"), 28);
    assert_eq!(r.int("c"), 10);
    assert_eq!(r.type_of("a"), "int");
}

#[test]
fn string_concatenation_folds() {
    let r = resolve(r#"enum s = "ab" ~ "cd";"#);
    r.assert_clean();
    assert_eq!(r.string("s"), "abcd");
}

#[test]
fn implicit_conversion_to_declared_type() {
    let r = resolve("long x = 3; ubyte y = 200;");
    r.assert_clean();
    assert_eq!(r.type_of("x"), "long");
    assert_eq!(r.int("x"), 3);
    assert_eq!(r.int("y"), 200);
}

#[test]
fn narrowing_conversion_is_rejected() {
    let r = resolve("int i = 1; ubyte b = i;");
    assert!(r.errors().contains(&ErrorCode::E2003), "{:?}", r.diagnostics);
}

#[test]
fn undefined_identifier_suggests_a_close_name() {
    let r = resolve("int value = 1; int other = valeu;");
    assert_eq!(r.errors(), vec![ErrorCode::E2001]);
    let diag = &r.diagnostics[0];
    assert!(
        diag.notes.iter().any(|n| n.contains("value")),
        "notes: {:?}",
        diag.notes
    );
}

#[test]
fn type_properties() {
    let r = resolve(
        "enum max = int.max;
         enum min = byte.min;
         enum size = long.sizeof;",
    );
    r.assert_clean();
    assert_eq!(r.int("max"), i32::MAX as u64);
    assert_eq!(r.int("min") as i64, -128);
    assert_eq!(r.int("size"), 8);
}

#[test]
fn static_array_length_is_constant() {
    let r = resolve("int[3] arr; enum n = arr.length;");
    r.assert_clean();
    assert_eq!(r.int("n"), 3);
}

#[test]
fn is_expressions() {
    let r = resolve(
        "struct S { int a; }
         enum converts = is(int : long);
         enum same = is(int == long);
         enum isStruct = is(S == struct);
         enum exists = is(Missing);",
    );
    r.assert_clean();
    assert_eq!(r.int("converts"), 1);
    assert_eq!(r.int("same"), 0);
    assert_eq!(r.int("isStruct"), 1);
    assert_eq!(r.int("exists"), 0);
}

#[test]
fn traits_fold_to_literals() {
    let r = resolve(
        r#"struct S { int a; int get() { return a; } }
         enum integral = __traits(isIntegral, int);
         enum floating = __traits(isIntegral, double);
         enum member = __traits(hasMember, S, "get");
         enum missing = __traits(hasMember, S, "set");"#,
    );
    r.assert_clean();
    assert_eq!(r.int("integral"), 1);
    assert_eq!(r.int("floating"), 0);
    assert_eq!(r.int("member"), 1);
    assert_eq!(r.int("missing"), 0);
}

#[test]
fn unknown_trait_is_unsupported() {
    let r = resolve("enum t = __traits(isNested, int);");
    assert_eq!(r.errors(), vec![ErrorCode::E2016]);
}

#[test]
fn assignment_to_rvalue() {
    let r = resolve("void f() { 1 = 2; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2004]);
}

#[test]
fn assignment_to_const() {
    let r = resolve("void f() { const int c = 1; c = 2; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2005]);
}

#[test]
fn manifest_constant_is_not_an_lvalue_target() {
    let r = resolve("enum N = 3; void f() { N = 4; }");
    assert!(!r.errors().is_empty());
}

#[test]
fn incompatible_operands() {
    let r = resolve(r#"void f() { auto x = 1 + "s"; }"#);
    assert!(r.errors().contains(&ErrorCode::E2011), "{:?}", r.diagnostics);
}

#[test]
fn array_operations_need_a_slice_assignment() {
    let ok = resolve("void f(int[] a, int[] b, int[] c) { a[] = b[] + c[]; }");
    ok.assert_clean();

    let bad = resolve("void f(int[] a, int[] b) { auto c = a + b; }");
    assert_eq!(bad.errors(), vec![ErrorCode::E2011]);
    assert!(!bad.diagnostics[0].notes.is_empty());
}

#[test]
fn operator_overloading_rewrites_to_calls() {
    let r = resolve(
        r#"struct V {
             int x;
             V opBinary(string op, V rhs) { return V(x + rhs.x); }
             bool opEquals(V rhs) { return x == rhs.x; }
         }
         V add(V a, V b) { return a + b; }
         bool same(V a, V b) { return a == b; }"#,
    );
    r.assert_clean();
}

#[test]
fn membership_yields_bool() {
    let r = resolve("bool has(int[int] aa) { return 3 in aa; }");
    r.assert_clean();
}

#[test]
fn index_out_of_bounds_is_caught_early() {
    let r = resolve("int[3] arr; int f() { return arr[5]; }");
    assert_eq!(r.errors(), vec![ErrorCode::E6002]);
}

#[test]
fn out_of_bounds_store_names_index_and_length() {
    let r = resolve("void f() { int[3] a; a[10] = 1; }");
    assert_eq!(r.errors(), vec![ErrorCode::E6002]);
    let Some(diag) = r.diagnostics.iter().find(|d| d.code == ErrorCode::E6002) else {
        panic!("no bounds error: {:#?}", r.diagnostics);
    };
    let message = &diag.message;
    assert!(message.contains("index 10"), "{message}");
    assert!(message.contains("[0 .. 3]"), "{message}");
}

#[test]
fn slice_bounds_are_checked() {
    let r = resolve("int[3] arr; int[] f() { return arr[2 .. 1]; }");
    assert_eq!(r.errors(), vec![ErrorCode::E6002]);
}

#[test]
fn dollar_is_the_length() {
    let r = resolve("int[4] arr; int last() { return arr[$ - 1]; }");
    r.assert_clean();

    let outside = resolve("int f() { return $; }");
    assert_eq!(outside.errors(), vec![ErrorCode::E2001]);
}

#[test]
fn overload_resolution() {
    let r = resolve(
        r#"int h(int x) { return 1; }
         int h(string s) { return 2; }
         void ok() { h(1); h("s"); }
         void bad() { h(1.5); }"#,
    );
    assert_eq!(r.errors(), vec![ErrorCode::E2002]);
}

#[test]
fn argument_count_mismatch() {
    let r = resolve("int g(int a, int b) { return a; } void f() { g(1); }");
    assert_eq!(r.errors(), vec![ErrorCode::E2013]);
}

#[test]
fn default_arguments_fill_missing_parameters() {
    let r = resolve("int g(int a, int b = 2) { return a + b; } void f() { g(1); }");
    r.assert_clean();
}

#[test]
fn calling_a_non_function() {
    let r = resolve("int x; void f() { x(1); }");
    assert_eq!(r.errors(), vec![ErrorCode::E2014]);
}

#[test]
fn missing_member() {
    let r = resolve("struct S { int alpha; } int f(S s) { return s.alpah; }");
    assert_eq!(r.errors(), vec![ErrorCode::E2010]);
    assert!(r.diagnostics[0].notes.iter().any(|n| n.contains("alpha")));
}

#[test]
fn alias_this_forwards_members() {
    let r = resolve(
        "struct Inner { int value; }
         struct Outer { Inner inner; alias inner this; }
         int f(Outer o) { return o.value; }",
    );
    r.assert_clean();
}

#[test]
fn uniform_function_call_syntax() {
    let r = resolve("int twice(int x) { return x * 2; } int f(int y) { return y.twice; }");
    r.assert_clean();
}

#[test]
fn special_tokens_become_literals() {
    let r = resolve(
        "enum line = __LINE__;
         enum file = __FILE__;
         enum module_name = __MODULE__;",
    );
    r.assert_clean();
    assert_eq!(r.int("line"), 1);
    assert_eq!(r.string("file"), "test.d");
    assert_eq!(r.string("module_name"), "test");
}

#[test]
fn assert_false_without_message_halts() {
    let r = resolve("void f() { assert(0); } void g(int x) { assert(x > 0, \"positive\"); }");
    r.assert_clean();
}

#[test]
fn circular_global_initialization() {
    let r = resolve("int a = b; int b = a;");
    assert!(r.errors().contains(&ErrorCode::E6001), "{:?}", r.diagnostics);
}
