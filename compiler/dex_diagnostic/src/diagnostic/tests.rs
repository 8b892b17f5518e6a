use super::*;
use pretty_assertions::assert_eq;

#[test]
fn builder_collects_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E6002)
        .with_message("array index 10 is out of bounds")
        .with_label(Span::new(4, 9), "index here")
        .with_secondary_label(Span::new(0, 1), "array declared here")
        .with_note("called from here");
    assert!(diag.is_error());
    assert_eq!(diag.primary_span(), Some(Span::new(4, 9)));
    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.notes, vec!["called from here".to_string()]);
}

#[test]
fn display_includes_code_and_labels() {
    let diag = type_mismatch(Span::new(1, 3), "int", "string", "in initializer");
    assert_eq!(
        diag.to_string(),
        "error [E2003]: type mismatch: expected `int`, found `string`\n  --> 1..3: in initializer"
    );
}

#[test]
fn warnings_can_be_escalated() {
    let diag = Diagnostic::warning(ErrorCode::E2009).with_message("deprecated");
    assert!(!diag.is_error());
    assert!(diag.into_error().is_error());
}

#[test]
fn undefined_identifier_names_the_symbol() {
    let diag = undefined_identifier(Span::new(0, 3), "foo");
    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(diag.message, "undefined identifier `foo`");
}
