//! Reference backend that renders fragments as source text.

use dex_ctfe::{try_interpret, CtfeConfig};
use dex_fold::{optimize, OptimizeFlags};
use dex_ir::{ExprId, Program, VarId};

use super::CodeGen;

/// Storage and initial value of one global.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticData {
    pub symbol: String,
    pub ty: String,
    pub value: String,
}

/// Prints folded expressions; side-effect-free expressions that the
/// interpreter can reduce are printed as their value.
#[derive(Copy, Clone, Debug, Default)]
pub struct TextBackend {
    config: CtfeConfig,
}

impl TextBackend {
    pub fn new(config: CtfeConfig) -> Self {
        TextBackend { config }
    }
}

impl CodeGen for TextBackend {
    type Fragment = String;
    type StaticData = StaticData;

    fn emit_expression(&mut self, program: &mut Program, expr: ExprId) -> String {
        let folded = optimize(program, expr, OptimizeFlags::WANT_VALUE);
        if !program.has_side_effects(folded) {
            match try_interpret(program, folded, &self.config) {
                Ok(Some(literal)) => return program.expr_to_string(literal),
                Ok(None) => {}
                // The fault happens again at run time.
                Err(err) => tracing::debug!(%err, "compile-time evaluation failed, emitting run-time code"),
            }
        }
        program.expr_to_string(folded)
    }

    fn emit_static_init(&mut self, program: &mut Program, var: VarId) -> StaticData {
        let decl = program.decls.var(var);
        let (ty, init, span) = (decl.ty, decl.init, decl.span);
        let init = if init.is_valid() {
            optimize(program, init, OptimizeFlags::WANT_VALUE | OptimizeFlags::EXPAND_VARS)
        } else {
            program.default_init(ty, span)
        };
        StaticData {
            symbol: program.mangle_var(var),
            ty: program.type_name(ty),
            value: program.expr_to_string(init),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::backend::{lower_module, TextBackend};
    use crate::{Options, Session};

    fn lower(source: &str) -> (Vec<(String, String, String)>, Vec<(String, Vec<String>)>) {
        let mut session = Session::compile("m.d", source, &Options::default());
        assert!(!session.has_errors(), "{:#?}", session.diagnostics);
        let mut backend = TextBackend::default();
        let lowered = lower_module(&mut session.program, &mut backend);
        let globals = lowered
            .globals
            .into_iter()
            .map(|g| (g.symbol, g.ty, g.value))
            .collect();
        (globals, lowered.functions)
    }

    #[test]
    fn globals_become_static_data() {
        let (globals, _) = lower(
            "int sq(int x) { return x * x; }
             immutable int area = sq(6);
             int counter;
             enum skipped = 1;",
        );
        assert_eq!(globals.len(), 2);
        assert_eq!(globals[0].1, "immutable(int)");
        assert_eq!(globals[0].2, "36");
        assert!(globals[0].0.starts_with("_D1m4area"), "{}", globals[0].0);
        assert_eq!(globals[1].2, "0");
    }

    #[test]
    fn constant_calls_are_evaluated_and_the_rest_is_kept() {
        let (_, functions) = lower(
            "pure nothrow int sq(int x) { return x * x; }
             int f(int y) { int a = sq(4); return a + y; }",
        );
        let f = functions.iter().find(|(name, _)| name.ends_with("f")).unwrap();
        assert_eq!(f.1[0], "16");
        assert!(f.1[1].contains('y'), "{:?}", f.1);
    }
}
