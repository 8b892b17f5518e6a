//! Human-readable output with optional ANSI colors.

use std::io::{self, Write};

use dex_ir::LineIndex;

use super::DiagnosticEmitter;
use crate::{Diagnostic, Severity};

mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Source a label's span is resolved against.
struct SourceFile {
    path: String,
    lines: LineIndex,
}

pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceFile>,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Print label positions as `path:line:col` instead of byte ranges.
    #[must_use]
    pub fn with_source(mut self, path: impl Into<String>, lines: LineIndex) -> Self {
        self.source = Some(SourceFile {
            path: path.into(),
            lines,
        });
        self
    }

    pub fn stderr(mode: ColorMode, is_tty: bool) -> TerminalEmitter<io::Stderr> {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(&severity.to_string(), color);
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.write_severity(diagnostic.severity);
        let code = format!("[{}]", diagnostic.code);
        self.write_colored(&code, colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let location = match &self.source {
                Some(src) => {
                    let (line, col) = src.lines.line_col(label.span.start);
                    format!("{}:{line}:{col}", src.path)
                }
                None => format!("{:?}", label.span),
            };
            let _ = write!(self.writer, "  {marker} {location}: ");
            let color = if label.is_primary { colors::ERROR } else { colors::SECONDARY };
            self.write_colored(&label.message, color);
            let _ = writeln!(self.writer);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }
        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;
    use dex_ir::Span;

    fn sample() -> Diagnostic {
        Diagnostic::error(ErrorCode::E6003)
            .with_message("division by zero")
            .with_label(Span::new(12, 17), "evaluated here")
            .with_note("called from here")
    }

    #[test]
    fn plain_output_with_source_positions() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false)
            .with_source("app.d", LineIndex::new("int x = 1;\nint y = 1 / 0;\n"));
        emitter.emit(&sample());
        emitter.flush();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "error[E6003]: division by zero\n  --> app.d:2:2: evaluated here\n  = note: called from here\n\n"
        );
    }

    #[test]
    fn colors_wrap_severity() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Always, false);
        emitter.emit(&sample());
        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with(colors::ERROR));
        assert!(text.contains("12..17"));
    }

    #[test]
    fn summary_counts() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false);
        emitter.emit_summary(2, 1);
        emitter.emit_summary(0, 3);
        emitter.emit_summary(0, 0);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "error: aborting due to 2 previous errors; 1 warning emitted\nwarning: 3 warnings emitted\n"
        );
    }
}
