//! Resolver tests over parsed modules.
//!
//! Each test parses a small module, resolves it with the folding-only
//! evaluator and inspects the diagnostics or the resolved declarations.

mod attributes;
mod escape;
mod expressions;
mod properties;
mod statements;

use dex_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, Severity};
use dex_ir::{ExprId, FuncId, Program, Scalar, Symbol, VarId};
use dex_parse::parse_module;

use crate::{FoldEvaluator, Resolver, ResolverConfig};

pub(super) struct Resolved {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolved {
    /// Codes of the reported errors, in order.
    pub fn errors(&self) -> Vec<ErrorCode> {
        self.diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.code)
            .collect()
    }

    pub fn warnings(&self) -> Vec<ErrorCode> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .map(|d| d.code)
            .collect()
    }

    #[track_caller]
    pub fn assert_clean(&self) {
        assert!(
            self.errors().is_empty(),
            "unexpected errors: {:#?}",
            self.diagnostics
        );
    }

    pub fn var(&self, name: &str) -> VarId {
        match self.program.globals.get(&self.program.intern(name)) {
            Some(Symbol::Var(var)) => *var,
            other => panic!("`{name}` is not a global variable: {other:?}"),
        }
    }

    pub fn func(&self, name: &str) -> FuncId {
        match self.program.globals.get(&self.program.intern(name)) {
            Some(Symbol::Func(func)) => *func,
            other => panic!("`{name}` is not a single function: {other:?}"),
        }
    }

    pub fn init(&self, name: &str) -> ExprId {
        self.program.decls.var(self.var(name)).init
    }

    pub fn type_of(&self, name: &str) -> String {
        self.program.type_name(self.program.decls.var(self.var(name)).ty)
    }

    /// Integer value of the folded initializer of `name`.
    #[track_caller]
    pub fn int(&self, name: &str) -> u64 {
        match self.program.scalar_of(self.init(name)) {
            Some((Scalar::Int(v), _)) => v,
            other => panic!(
                "`{name}` is not an integer constant: {other:?} from `{}`",
                self.program.expr_to_string(self.init(name))
            ),
        }
    }

    #[track_caller]
    pub fn string(&self, name: &str) -> &'static str {
        match self.program.string_of(self.init(name)) {
            Some((text, _)) => text,
            None => panic!(
                "`{name}` is not a string constant: `{}`",
                self.program.expr_to_string(self.init(name))
            ),
        }
    }
}

pub(super) fn resolve_with(source: &str, config: &ResolverConfig) -> Resolved {
    let mut program = Program::new("test", "test.d", source);
    let errors = parse_module(&mut program, source);
    assert!(errors.is_empty(), "parse errors: {errors:?}");
    let mut diags = DiagnosticQueue::new();
    let mut evaluator = FoldEvaluator;
    // The result only summarizes the queue.
    let _ = Resolver::new(&mut program, &mut diags, config, &mut evaluator).resolve_module();
    Resolved {
        program,
        diagnostics: diags.flush(),
    }
}

pub(super) fn resolve(source: &str) -> Resolved {
    resolve_with(source, &ResolverConfig::default())
}
