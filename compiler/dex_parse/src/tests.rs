use dex_ir::{
    AggKind, BinaryOp, ExprId, ExprKind, FuncAttrs, Item, Program, Span, StmtKind, StorageClass, TypeId,
    TypeKind, UnaryOp,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn expr(text: &str) -> (Program, ExprId) {
    let mut program = Program::new("test", "test.d", text);
    let id = match parse_expression(&mut program, text, None) {
        Ok(id) => id,
        Err(errors) => panic!("failed to parse `{text}`: {errors:?}"),
    };
    (program, id)
}

fn module(source: &str) -> Program {
    let mut program = Program::new("test", "test.d", source);
    let errors = parse_module(&mut program, source);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    program
}

fn reprint(text: &str) -> String {
    let (program, id) = expr(text);
    program.expr_to_string(id)
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let (program, id) = expr("1 + 2 * 3");
    let ExprKind::Binary { op, right, .. } = program.arena.kind(id) else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(program.arena.kind(right), ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn power_binds_tighter_than_prefix_minus() {
    let (program, id) = expr("-2 ^^ 2");
    let ExprKind::Unary { op, operand } = program.arena.kind(id) else {
        panic!("expected a unary expression");
    };
    assert_eq!(op, UnaryOp::Neg);
    assert!(matches!(program.arena.kind(operand), ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn power_is_right_associative() {
    let (program, id) = expr("2 ^^ 3 ^^ 2");
    let ExprKind::Binary { left, right, .. } = program.arena.kind(id) else {
        panic!("expected a binary expression");
    };
    assert!(matches!(program.arena.kind(left), ExprKind::Int(2)));
    assert!(matches!(program.arena.kind(right), ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn negated_in_wraps_the_lookup() {
    let (program, id) = expr("k !in aa");
    let ExprKind::Unary { op, operand } = program.arena.kind(id) else {
        panic!("expected a negation");
    };
    assert_eq!(op, UnaryOp::Not);
    assert!(matches!(program.arena.kind(operand), ExprKind::Binary { op: BinaryOp::In, .. }));

    let (program, id) = expr("a !is null");
    assert!(matches!(program.arena.kind(id), ExprKind::Binary { op: BinaryOp::NotIs, .. }));
}

#[test]
fn assignment_is_right_associative() {
    let (program, id) = expr("a = b += 1");
    let ExprKind::Assign { value, .. } = program.arena.kind(id) else {
        panic!("expected an assignment");
    };
    assert!(matches!(program.arena.kind(value), ExprKind::Assign { .. }));
}

#[test]
fn conditional_else_branch_nests() {
    let (program, id) = expr("a ? 1 : b ? 2 : 3");
    let ExprKind::Cond { else_expr, .. } = program.arena.kind(id) else {
        panic!("expected a conditional");
    };
    assert!(matches!(program.arena.kind(else_expr), ExprKind::Cond { .. }));
}

#[test]
fn integer_literal_types_follow_magnitude_and_suffix() {
    let cases = [
        ("1", TypeId::INT),
        ("2147483648", TypeId::LONG),
        ("0xFFFFFFFF", TypeId::UINT),
        ("0x1_0000_0000", TypeId::LONG),
        ("18446744073709551615", TypeId::ULONG),
        ("1u", TypeId::UINT),
        ("5000000000u", TypeId::ULONG),
        ("1L", TypeId::LONG),
        ("1UL", TypeId::ULONG),
    ];
    for (text, ty) in cases {
        let (program, id) = expr(text);
        assert_eq!(program.arena.expr(id).ty, Some(ty), "type of {text}");
    }
}

#[test]
fn character_literals_take_the_narrowest_type() {
    for (text, ty) in [("'a'", TypeId::CHAR), ("'\\u00e9'", TypeId::WCHAR), ("'\u{1F600}'", TypeId::DCHAR)] {
        let (program, id) = expr(text);
        assert_eq!(program.arena.expr(id).ty, Some(ty), "type of {text}");
    }
}

#[test]
fn imaginary_literals_are_complex() {
    let (program, id) = expr("2.0i");
    assert_eq!(program.arena.expr(id).ty, Some(TypeId::CDOUBLE));
    assert!(matches!(program.arena.kind(id), ExprKind::Complex { .. }));
}

#[test]
fn string_postfix_commits_the_width() {
    let (program, id) = expr(r#""abc"w"#);
    let ExprKind::String { width, committed, .. } = program.arena.kind(id) else {
        panic!("expected a string");
    };
    assert_eq!(width, dex_ir::CharWidth::Two);
    assert!(committed);

    let (program, id) = expr(r#""abc""#);
    assert!(matches!(program.arena.kind(id), ExprKind::String { committed: false, .. }));
    assert_eq!(program.arena.expr(id).ty, None);
}

#[test]
fn postfix_forms() {
    let (program, id) = expr("a[1 .. 2]");
    assert!(matches!(program.arena.kind(id), ExprKind::Slice { .. }));
    let (program, id) = expr("a[]");
    let ExprKind::Slice { lower, upper, .. } = program.arena.kind(id) else {
        panic!("expected a slice");
    };
    assert!(!lower.is_valid() && !upper.is_valid());
    let (program, id) = expr("m[1, 2]");
    assert!(matches!(program.arena.kind(id), ExprKind::MultiIndex { .. }));
    let (program, id) = expr("s.f(1, 2)++");
    let ExprKind::PostIncDec { operand, .. } = program.arena.kind(id) else {
        panic!("expected a postfix increment");
    };
    let ExprKind::Call { callee, args } = program.arena.kind(operand) else {
        panic!("expected a call");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(program.arena.kind(callee), ExprKind::DotId { .. }));
}

#[test]
fn casts_to_bool_get_their_own_node() {
    let (program, id) = expr("cast(bool) x");
    assert!(matches!(program.arena.kind(id), ExprKind::BoolCast(_)));
    let (program, id) = expr("cast(ubyte) x");
    assert!(matches!(program.arena.kind(id), ExprKind::Cast { to: TypeId::UBYTE, .. }));
}

#[test]
fn associative_array_literal() {
    let (program, id) = expr(r#"["a": 1, "b": 2]"#);
    let ExprKind::AssocArrayLiteral { keys, values } = program.arena.kind(id) else {
        panic!("expected an associative array literal");
    };
    assert_eq!(keys.len(), 2);
    assert_eq!(values.len(), 2);
}

#[test]
fn is_expression_captures_identifier() {
    let (program, id) = expr("is(int[] T == U)");
    let ExprKind::IsType { id: name, relation, .. } = program.arena.kind(id) else {
        panic!("expected an is expression");
    };
    assert_eq!(program.text(name), "T");
    assert_eq!(relation, dex_ir::IsRelation::Equals);
}

#[test]
fn new_array_takes_its_length_as_argument() {
    let (program, id) = expr("new int[5]");
    let ExprKind::New { ty, args } = program.arena.kind(id) else {
        panic!("expected new");
    };
    assert_eq!(program.type_name(ty), "int[]");
    assert_eq!(args.len(), 1);
}

#[test]
fn function_literal_is_registered() {
    let (program, id) = expr("function int(int x) { return x * 2; }");
    let ExprKind::FuncLiteral(func) = program.arena.kind(id) else {
        panic!("expected a function literal");
    };
    let decl = program.decls.func(func);
    assert!(decl.is_literal);
    assert_eq!(decl.ret, TypeId::INT);
    assert_eq!(decl.params.len(), 1);
    assert!(decl.has_body());
}

#[test]
fn origin_span_replaces_text_positions() {
    let origin = Span::new(100, 120);
    let mut program = Program::new("test", "test.d", "");
    let id = match parse_expression(&mut program, "1 + x", Some(origin)) {
        Ok(id) => id,
        Err(errors) => panic!("{errors:?}"),
    };
    assert_eq!(program.arena.span(id), origin);

    let errors = match parse_expression(&mut program, "1 +", Some(origin)) {
        Ok(_) => panic!("expected an error"),
        Err(errors) => errors,
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].span(), origin);
}

#[test]
fn trailing_tokens_are_rejected() {
    let mut program = Program::new("test", "test.d", "");
    assert!(parse_expression(&mut program, "1 2", None).is_err());
}

#[test]
fn unclosed_paren_points_at_opener() {
    let mut program = Program::new("test", "test.d", "");
    let errors = match parse_expression(&mut program, "(1 + 2", None) {
        Ok(_) => panic!("expected an error"),
        Err(errors) => errors,
    };
    let ParseError::Unclosed { open_span, .. } = &errors[0] else {
        panic!("expected an unclosed error, got {errors:?}");
    };
    assert_eq!(*open_span, Span::new(0, 1));
}

#[test]
fn module_items() {
    let program = module(
        "module app.main;
         import std.stdio;
         enum N = 3;
         immutable int[] table = [1, 2, 3];
         alias Index = size_t;
         int square(int x) { return x * x; }
         static assert(N == 3);",
    );
    assert_eq!(program.text(program.module.name), "app.main");
    assert_eq!(program.items.len(), 5);
    let Item::Var(n) = program.items[0] else {
        panic!("expected a variable");
    };
    assert!(program.decls.var(n).is_manifest());
    let Item::Var(table) = program.items[1] else {
        panic!("expected a variable");
    };
    assert_eq!(program.type_name(program.decls.var(table).ty), "immutable(int[])");
    assert!(matches!(program.items[2], Item::Alias { ty: TypeId::SIZE_T, .. }));
    assert!(matches!(program.items[4], Item::StaticAssert(_)));
    assert!(program.globals.is_empty(), "the parser does not declare symbols");
}

#[test]
fn aggregates_collect_members() {
    let program = module(
        "struct S {
             int a;
             int b = 2;
             static int count;
             this(int a) { this.a = a; }
             int sum() { return a + b; }
             alias a this;
         }",
    );
    // The static member is a module-level variable, registered before
    // the aggregate itself.
    assert!(matches!(program.items[0], Item::Var(_)));
    let Item::Agg(agg) = program.items[1] else {
        panic!("expected an aggregate");
    };
    let decl = program.decls.agg(agg);
    assert_eq!(decl.kind, AggKind::Struct);
    assert_eq!(decl.fields.len(), 2);
    assert_eq!(decl.ctors.len(), 1);
    assert_eq!(decl.methods.len(), 1);
    assert_eq!(program.text(decl.alias_this), "a");
    assert!(matches!(program.types.kind(decl.ty), TypeKind::Aggregate { .. }));
    assert!(program.decls.var(decl.fields[0]).storage.contains(StorageClass::FIELD));
    assert!(program.decls.func(decl.ctors[0]).attrs.contains(FuncAttrs::CONSTRUCTOR));
}

#[test]
fn function_signature_and_attributes() {
    let program = module("pure @safe int f(ref int a, int b = 3) nothrow { return a; }");
    let Item::Func(func) = program.items[0] else {
        panic!("expected a function");
    };
    let decl = program.decls.func(func);
    assert!(decl.attrs.contains(FuncAttrs::PURE | FuncAttrs::SAFE | FuncAttrs::NOTHROW));
    assert!(program.decls.var(decl.params[0]).is_ref());
    assert!(program.decls.var(decl.params[1]).init.is_valid());
}

#[test]
fn auto_declarations_leave_the_type_open() {
    let program = module("auto f() { auto x = 1; return x; }");
    let Item::Func(func) = program.items[0] else {
        panic!("expected a function");
    };
    let decl = program.decls.func(func);
    assert!(decl.attrs.contains(FuncAttrs::AUTO_RETURN));
    let StmtKind::Block(stmts) = program.arena.stmt(decl.body).kind else {
        panic!("expected a block body");
    };
    let StmtKind::Decl(x) = program.arena.stmt(program.arena.stmt_list(stmts)[0]).kind else {
        panic!("expected a declaration");
    };
    assert_eq!(program.decls.var(x).ty, TypeId::ERROR);
    assert!(program.decls.var(x).storage.contains(StorageClass::AUTO));
}

#[test]
fn statements_parse() {
    let program = module(
        "void f(int[] a) {
             int total = 0, i;
             foreach (k, v; a) total += v;
             foreach (j; 0 .. 10) { if (j == 3) continue; else break; }
             for (int n = 0; n < 3; ++n) {}
             while (i < 3) i++;
             do { i--; } while (i > 0);
             outer: switch (total) {
                 case 1, 2: goto outer;
                 default: break outer;
             }
             static if (true) { total = 1; }
             return;
         }",
    );
    let Item::Func(func) = program.items[0] else {
        panic!("expected a function");
    };
    let StmtKind::Block(stmts) = program.arena.stmt(program.decls.func(func).body).kind else {
        panic!("expected a block body");
    };
    let stmts = program.arena.stmt_list(stmts);
    assert_eq!(stmts.len(), 10);
    assert!(matches!(program.arena.stmt(stmts[1]).kind, StmtKind::Decl(_)));
    assert!(matches!(program.arena.stmt(stmts[2]).kind, StmtKind::Foreach { .. }));
    assert!(matches!(program.arena.stmt(stmts[3]).kind, StmtKind::ForeachRange { .. }));
    assert!(matches!(program.arena.stmt(stmts[7]).kind, StmtKind::Labeled { .. }));
    assert!(matches!(program.arena.stmt(stmts[8]).kind, StmtKind::StaticIf { .. }));
}

#[test]
fn errors_are_recovered_per_statement() {
    let source = "void f() { int x = ; x = 1; y = ) ; }";
    let mut program = Program::new("test", "test.d", source);
    let errors = parse_module(&mut program, source);
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert_eq!(program.items.len(), 1);
}

#[test]
fn lexical_errors_stop_parsing() {
    let source = "int x = 1 # 2;";
    let mut program = Program::new("test", "test.d", source);
    let errors = parse_module(&mut program, source);
    assert!(matches!(errors.as_slice(), [ParseError::InvalidChar { .. }]));
    assert!(program.items.is_empty());
}

#[test]
fn printed_expressions_reparse_to_the_same_text() {
    for text in [
        "a + b * c",
        "(a + b) * c",
        "-x ^^ 2",
        "a ? b : c ? d : e",
        "a[1 .. $]",
        "f(1, \"s\")[0].g",
        "cast(long) x << 3",
        "a !is null && !b",
        "[1, 2, 3]",
        "typeid(int)",
        "x = y ~= z",
        "1.5f + 2.0",
        "'c' - 'a'",
        "new S(1, 2)",
    ] {
        let once = reprint(text);
        assert_eq!(reprint(&once), once, "reprinting `{text}`");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn arithmetic_trees_survive_a_print_cycle(
        leaves in prop::collection::vec(0u32..1000, 2..8),
        ops in prop::collection::vec(prop::sample::select(vec!["+", "-", "*", "/", "%", "&", "|", "^", "<<", "==", "<", "&&", "||"]), 7),
    ) {
        let mut text = leaves[0].to_string();
        for (leaf, op) in leaves[1..].iter().zip(&ops) {
            text = format!("{text} {op} {leaf}");
        }
        let once = reprint(&text);
        prop_assert_eq!(reprint(&once), once);
    }
}
