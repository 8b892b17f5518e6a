//! Diagnostic queue for collecting, deduplicating and sorting diagnostics.
//!
//! Features:
//! - Error limit so a cascade does not flood the terminal
//! - Deduplication of same-line errors with the same message prefix
//! - Follow-on filtering: errors that mention the error type are caused by
//!   an earlier error and add nothing
//! - `ErrorGuaranteed` proof that errors were emitted

use std::hash::{Hash, Hasher};

use dex_ir::{LineIndex, Span};

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Number of leading characters compared when deduplicating.
const MESSAGE_PREFIX_LEN: usize = 30;

fn message_prefix_hash(msg: &str) -> u64 {
    let byte_end = msg
        .char_indices()
        .nth(MESSAGE_PREFIX_LEN)
        .map_or(msg.len(), |(idx, _)| idx);
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    msg[..byte_end].hash(&mut hasher);
    hasher.finish()
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum errors before further ones are dropped (0 = unlimited).
    pub error_limit: usize,
    pub filter_follow_on: bool,
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            filter_follow_on: true,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Keep everything; used by tests that count diagnostics.
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            filter_follow_on: false,
            deduplicate: false,
        }
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct QueuedDiagnostic {
    diagnostic: Diagnostic,
    line: u32,
    column: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct DiagnosticQueue {
    diagnostics: Vec<QueuedDiagnostic>,
    error_count: usize,
    warning_count: usize,
    last_error: Option<(u32, u64)>,
    limit_hit: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Queue `diag`, positioned through `lines`. Returns whether it was kept.
    pub fn add(&mut self, diag: Diagnostic, lines: &LineIndex) -> bool {
        let (line, column) = diag.primary_span().map_or((1, 1), |span| lines.line_col(span.start));
        self.add_at(diag, line, column)
    }

    pub fn add_at(&mut self, diag: Diagnostic, line: u32, column: u32) -> bool {
        let is_error = diag.is_error();
        if is_error && self.limit_reached() {
            self.limit_hit = true;
            return false;
        }
        if self.config.filter_follow_on && Self::is_follow_on(&diag) {
            return false;
        }
        if self.config.deduplicate && self.is_duplicate(&diag, line) {
            return false;
        }
        if is_error {
            self.last_error = Some((line, message_prefix_hash(&diag.message)));
            self.error_count += 1;
        } else {
            self.warning_count += 1;
        }
        self.diagnostics.push(QueuedDiagnostic {
            diagnostic: diag,
            line,
            column,
        });
        true
    }

    /// Queue an error and return the proof that it was reported. The proof
    /// holds even when the limit drops it: an earlier error was kept.
    pub fn emit_error(&mut self, diag: Diagnostic, lines: &LineIndex) -> ErrorGuaranteed {
        self.add(diag, lines);
        ErrorGuaranteed::new()
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Whether errors were dropped because of the limit.
    pub fn limit_hit(&self) -> bool {
        self.limit_hit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Drain diagnostics in source order and reset the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| (d.line, d.column));
        let result = self.diagnostics.drain(..).map(|d| d.diagnostic).collect();
        self.error_count = 0;
        self.warning_count = 0;
        self.last_error = None;
        self.limit_hit = false;
        result
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().map(|d| &d.diagnostic)
    }

    fn is_follow_on(diag: &Diagnostic) -> bool {
        diag.is_error() && diag.message.contains("__error")
    }

    fn is_duplicate(&self, diag: &Diagnostic, line: u32) -> bool {
        if !diag.is_error() {
            return false;
        }
        self.last_error
            .is_some_and(|(last_line, last_hash)| last_line == line && message_prefix_hash(&diag.message) == last_hash)
    }
}

#[cold]
pub fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .with_label(span, "error limit reached here")
        .with_note("use --error-limit to increase the limit")
}

#[cfg(test)]
mod tests;
