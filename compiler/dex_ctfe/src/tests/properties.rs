use dex_diagnostic::ErrorCode;
use proptest::prelude::*;

use super::evaluate;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Folding a constant expression and interpreting the same expression
    /// inside a function agree.
    #[test]
    fn interpreter_agrees_with_folding(
        a in -10_000i32..10_000,
        b in -10_000i32..10_000,
        op in prop::sample::select(vec!["+", "-", "*", "&", "|", "^", "<", "==", ">="]),
    ) {
        let source = format!(
            "int calc(int x, int y) {{ return x {op} y; }}
             enum folded = ({a}) {op} ({b});
             enum run = calc({a}, {b});"
        );
        let r = evaluate(&source);
        r.assert_clean();
        prop_assert_eq!(r.int("folded"), r.int("run"), "{}", source);
    }

    /// Every index at or past the length faults, and the message carries
    /// both numbers.
    #[test]
    fn indexing_past_the_length_faults(n in 0u32..16, past in 0u32..40) {
        let i = n + past;
        let source = format!(
            "int at(int n, int i) {{ int[] a; a.length = n; return a[i]; }}
             enum x = at({n}, {i});"
        );
        let r = evaluate(&source);
        prop_assert_eq!(r.errors(), vec![ErrorCode::E6002], "{}", source);
        let message = &r.diagnostic(ErrorCode::E6002).message;
        prop_assert!(message.contains(&format!("index {i} ")), "{}", message);
        prop_assert!(message.contains(&format!("[0 .. {n}]")), "{}", message);
    }

    #[test]
    fn indexes_below_the_length_read_the_default(n in 1u32..16, i in 0u32..16) {
        let i = i % n;
        let source = format!(
            "int at(int n, int i) {{ int[] a; a.length = n; return a[i]; }}
             enum x = at({n}, {i});"
        );
        let r = evaluate(&source);
        r.assert_clean();
        prop_assert_eq!(r.int("x"), 0);
    }

    #[test]
    fn loops_sum_like_the_closed_form(n in 0u64..200) {
        let source = format!(
            "ulong sum(ulong n) {{ ulong total = 0; foreach (i; 0 .. n + 1) total += i; return total; }}
             enum s = sum({n});"
        );
        let r = evaluate(&source);
        r.assert_clean();
        prop_assert_eq!(r.int("s"), n * (n + 1) / 2);
    }
}
