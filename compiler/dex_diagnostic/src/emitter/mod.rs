//! Diagnostic emitters.
//!
//! Each emitter implements [`DiagnosticEmitter`]; the terminal emitter is
//! the only output format the driver needs.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Closing line, e.g. "aborting due to 2 previous errors".
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
