//! Interpreter tests over parsed modules.
//!
//! Each test resolves a small module with [`CtfeEvaluator`], so every
//! manifest constant and global initializer that folding cannot reduce goes
//! through the interpreter.

mod calls;
mod expressions;
mod properties;
mod statements;

use dex_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use dex_ir::{ExprId, Program, Scalar, Symbol, VarId};
use dex_parse::parse_module;
use dex_sema::{Resolver, ResolverConfig};

use crate::{CtfeConfig, CtfeEvaluator};

pub(super) struct Evaluated {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluated {
    pub fn errors(&self) -> Vec<ErrorCode> {
        self.diagnostics
            .iter()
            .filter(|d| d.is_error())
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

    /// The only diagnostic with `code`.
    #[track_caller]
    pub fn diagnostic(&self, code: ErrorCode) -> &Diagnostic {
        let mut matching = self.diagnostics.iter().filter(|d| d.code == code);
        match (matching.next(), matching.next()) {
            (Some(diag), None) => diag,
            _ => panic!("expected exactly one {code:?}: {:#?}", self.diagnostics),
        }
    }

    pub fn var(&self, name: &str) -> VarId {
        match self.program.globals.get(&self.program.intern(name)) {
            Some(Symbol::Var(var)) => *var,
            other => panic!("`{name}` is not a global variable: {other:?}"),
        }
    }

    pub fn init(&self, name: &str) -> ExprId {
        self.program.decls.var(self.var(name)).init
    }

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
    pub fn signed(&self, name: &str) -> i64 {
        self.int(name) as i64
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

    /// The initializer of `name`, printed.
    pub fn printed(&self, name: &str) -> String {
        self.program.expr_to_string(self.init(name))
    }
}

pub(super) fn evaluate_with(source: &str, config: CtfeConfig) -> Evaluated {
    let mut program = Program::new("test", "test.d", source);
    let errors = parse_module(&mut program, source);
    assert!(errors.is_empty(), "parse errors: {errors:?}");
    let mut diags = DiagnosticQueue::new();
    let mut evaluator = CtfeEvaluator::new(config);
    let resolver_config = ResolverConfig::default();
    // The result only summarizes the queue.
    let _ = Resolver::new(&mut program, &mut diags, &resolver_config, &mut evaluator).resolve_module();
    Evaluated {
        program,
        diagnostics: diags.flush(),
    }
}

pub(super) fn evaluate(source: &str) -> Evaluated {
    evaluate_with(source, CtfeConfig::default())
}
