use dex_diagnostic::DiagnosticQueue;
use dex_fold::{optimize, OptimizeFlags};
use dex_ir::{ExprId, Program};
use dex_parse::parse_expression;
use proptest::prelude::*;

use crate::{FoldEvaluator, Resolver, ResolverConfig};

/// Resolve `text` as a standalone expression; `None` if it has errors.
fn resolved(text: &str) -> Option<(Program, ExprId)> {
    let mut program = Program::new("test", "test.d", text);
    let id = parse_expression(&mut program, text, None).ok()?;
    let mut diags = DiagnosticQueue::new();
    let mut evaluator = FoldEvaluator;
    let config = ResolverConfig::default();
    let resolved = Resolver::new(&mut program, &mut diags, &config, &mut evaluator).resolve_expression(id);
    (diags.error_count() == 0).then_some((program, resolved))
}

fn leaf() -> impl Strategy<Value = String> {
    (
        0u32..300,
        prop::sample::select(vec!["", "L", "u", "UL"]),
        prop::sample::select(vec!["", "cast(byte) ", "cast(ushort) ", "cast(long) "]),
    )
        .prop_map(|(v, suffix, cast)| format!("{cast}{v}{suffix}"))
}

fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (
                prop::sample::select(vec!["+", "-", "*", "&", "|", "^"]),
                inner.clone(),
                inner.clone(),
            )
                .prop_map(|(op, l, r)| format!("({l} {op} {r})")),
            (prop::sample::select(vec!["-", "~"]), inner).prop_map(|(op, e)| format!("{op}({e})")),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A resolved expression prints as source that resolves to the same
    /// type and folds to the same value.
    #[test]
    fn printed_resolution_resolves_the_same(text in expression()) {
        let Some((mut first, id)) = resolved(&text) else {
            return Err(TestCaseError::fail(format!("`{text}` did not resolve")));
        };
        let printed = first.expr_to_string(id);
        let Some((mut second, again)) = resolved(&printed) else {
            return Err(TestCaseError::fail(format!("`{printed}` (from `{text}`) did not resolve")));
        };
        prop_assert_eq!(
            first.type_name(first.arena.ty(id)),
            second.type_name(second.arena.ty(again)),
            "`{}` printed as `{}`", text, printed
        );
        let a = optimize(&mut first, id, OptimizeFlags::WANT_VALUE);
        let b = optimize(&mut second, again, OptimizeFlags::WANT_VALUE);
        prop_assert_eq!(first.scalar_of(a), second.scalar_of(b), "`{}` printed as `{}`", text, printed);
    }
}
