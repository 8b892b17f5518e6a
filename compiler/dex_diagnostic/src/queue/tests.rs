use super::*;
use pretty_assertions::assert_eq;

fn err(message: &str, start: u32) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003)
        .with_message(message)
        .with_label(Span::new(start, start + 1), "here")
}

#[test]
fn flush_sorts_by_position() {
    let lines = LineIndex::new("a\nb\nc\n");
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(err("third", 4), &lines);
    queue.add(err("first", 0), &lines);
    queue.add(err("second", 2), &lines);
    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, ["first", "second", "third"]);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn error_limit_drops_extra_errors() {
    let lines = LineIndex::new("x\ny\nz\n");
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::default().with_error_limit(2));
    assert!(queue.add(err("one", 0), &lines));
    assert!(queue.add(err("two", 2), &lines));
    assert!(!queue.add(err("three", 4), &lines));
    assert!(queue.limit_hit());
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn same_line_duplicates_are_merged() {
    let lines = LineIndex::new("abcdef\n");
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err("type mismatch: expected `int`", 0), &lines));
    assert!(!queue.add(err("type mismatch: expected `int`", 3), &lines));
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn follow_on_errors_mentioning_the_error_type_are_dropped() {
    let lines = LineIndex::new("x");
    let mut queue = DiagnosticQueue::new();
    assert!(!queue.add(err("type mismatch: expected `int`, found `__error`", 0), &lines));
    assert!(queue.has_errors().is_none());
}

#[test]
fn warnings_do_not_count_as_errors() {
    let lines = LineIndex::new("x");
    let mut queue = DiagnosticQueue::new();
    queue.add(
        Diagnostic::warning(ErrorCode::E2009).with_message("`old` is deprecated"),
        &lines,
    );
    assert_eq!(queue.warning_count(), 1);
    assert!(queue.has_errors().is_none());
    assert!(!queue.is_empty());
}
