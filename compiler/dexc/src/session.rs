//! One compilation: parse, resolve with compile-time evaluation, collect
//! diagnostics.

use std::path::Path;

use dex_ctfe::CtfeEvaluator;
use dex_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use dex_diagnostic::{Diagnostic, DiagnosticQueue, Severity};
use dex_ir::{ExprId, Program, Span};
use dex_parse::{parse_expression, parse_module};
use dex_sema::Resolver;

use crate::{CliError, Options, ParserMixin};

/// A compiled module and everything reported while compiling it.
pub struct Session {
    pub path: String,
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
    /// Literal value of the expression passed to [`Session::evaluate`].
    pub result: Option<ExprId>,
}

impl Session {
    pub fn read(path: &str) -> Result<String, CliError> {
        std::fs::read_to_string(path).map_err(|err| CliError::read(path, err))
    }

    /// Parse and resolve `source`.
    pub fn compile(path: &str, source: &str, options: &Options) -> Session {
        Session::run(path, source, None, options)
    }

    /// Compile `source`, then evaluate `expression` in its module scope.
    ///
    /// Diagnostics inside `expression` are placed at the start of the file;
    /// the text has no location of its own.
    pub fn evaluate(path: &str, source: &str, expression: &str, options: &Options) -> Session {
        Session::run(path, source, Some(expression), options)
    }

    #[tracing::instrument(level = "debug", skip(source, expression, options))]
    fn run(path: &str, source: &str, expression: Option<&str>, options: &Options) -> Session {
        let module = Path::new(path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("main");
        let mut program = Program::new(module, path, source);
        let mut diags = DiagnosticQueue::with_config(options.diagnostics.clone());

        let mut parse_errors = parse_module(&mut program, source);
        let expr = match expression {
            Some(text) => match parse_expression(&mut program, text, Some(Span::DUMMY)) {
                Ok(expr) => Some(expr),
                Err(errors) => {
                    parse_errors.extend(errors);
                    None
                }
            },
            None => None,
        };
        if !parse_errors.is_empty() {
            for err in &parse_errors {
                diags.add(err.to_diagnostic(), &program.module.lines);
            }
            return Session {
                path: path.to_string(),
                program,
                diagnostics: diags.flush(),
                result: None,
            };
        }

        let mut evaluator = CtfeEvaluator::new(options.ctfe);
        let mut mixin = ParserMixin;
        let mut resolver =
            Resolver::new(&mut program, &mut diags, &options.resolver, &mut evaluator).with_mixin_parser(&mut mixin);
        let resolved = resolver.resolve_module();
        let result = match (expr, resolved) {
            (Some(expr), Ok(())) => resolver.evaluate_expression(expr).ok(),
            _ => None,
        };

        Session {
            path: path.to_string(),
            program,
            diagnostics: diags.flush(),
            result,
        }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Print every diagnostic, and the summary line when something failed.
    pub fn report<W: std::io::Write>(&self, emitter: &mut TerminalEmitter<W>) {
        emitter.emit_all(&self.diagnostics);
        if self.has_errors() {
            emitter.emit_summary(self.error_count(), self.warning_count());
        }
        emitter.flush();
    }

    /// Stderr emitter that prints positions within this session's file.
    pub fn stderr_emitter(&self, options: &Options) -> TerminalEmitter<std::io::Stderr> {
        let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
        TerminalEmitter::<std::io::Stderr>::stderr(options.color, is_tty).with_source(self.path.clone(), self.program.module.lines.clone())
    }
}

#[cfg(test)]
mod tests {
    use dex_diagnostic::emitter::ColorMode;
    use dex_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;

    use super::*;

    fn codes(session: &Session) -> Vec<ErrorCode> {
        session.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn clean_module() {
        let session = Session::compile(
            "sum.d",
            "int add(int a, int b) { return a + b; }
             enum three = add(1, 2);",
            &Options::default(),
        );
        assert!(!session.has_errors(), "{:#?}", session.diagnostics);
        assert_eq!(session.program.text(session.program.module.name), "sum");
    }

    #[test]
    fn parse_errors_stop_before_resolution() {
        let session = Session::compile("bad.d", "int x = ;", &Options::default());
        assert_eq!(session.error_count(), 1);
        assert!(codes(&session)[0].is_parser_error(), "{:?}", codes(&session));
    }

    #[test]
    fn evaluate_in_module_scope() {
        let session = Session::evaluate(
            "m.d",
            "int twice(int x) { return x * 2; }",
            "twice(21) + 1",
            &Options::default(),
        );
        assert!(!session.has_errors(), "{:#?}", session.diagnostics);
        let result = session.result.unwrap();
        assert_eq!(session.program.expr_to_string(result), "43");
    }

    #[test]
    fn evaluation_respects_the_step_budget() {
        let mut options = Options::default();
        options.ctfe = options.ctfe.with_step_budget(100);
        let session = Session::evaluate(
            "m.d",
            "int spin() { int i = 0; while (i >= 0) i++; return i; }",
            "spin()",
            &options,
        );
        assert_eq!(codes(&session), vec![ErrorCode::E6008]);
        assert_eq!(session.result, None);
    }

    #[test]
    fn mixins_are_parsed() {
        let session = Session::evaluate("m.d", "enum n = mixin(\"3 * 4\");", "n", &Options::default());
        assert!(!session.has_errors(), "{:#?}", session.diagnostics);
        assert_eq!(session.program.expr_to_string(session.result.unwrap()), "12");
    }

    #[test]
    fn report_prints_the_summary() {
        let session = Session::compile("m.d", "enum x = y;", &Options::default());
        let mut out = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut out, ColorMode::Never, false)
            .with_source("m.d", session.program.module.lines.clone());
        session.report(&mut emitter);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("m.d:1:10"), "{text}");
        assert!(text.contains("aborting due to previous error"), "{text}");
    }
}
