//! The ParseError type for wrapping parsing diagnostics.
//!
//! [`ParseError`] wraps one or more [`Diagnostic`]s raised while reading a
//! layout result (lexing, parsing or building the graph).

use thiserror::Error;

use crate::error::{Diagnostic, DiagnosticKind};

/// Error type for the parsing lifecycle.
///
/// Always holds at least one diagnostic when produced by the parser.
#[derive(Debug, Clone, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    /// Create a new parse error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Kind of the first diagnostic.
    ///
    /// Parsing stops after the phase that reported errors, so every
    /// diagnostic in one error shares the phase of the first.
    pub fn kind(&self) -> Option<DiagnosticKind> {
        self.diagnostics.first().map(Diagnostic::kind)
    }

    /// Returns true when the error reports malformed text.
    pub fn is_syntax(&self) -> bool {
        self.kind() == Some(DiagnosticKind::Syntax)
    }

    /// Returns true when the error reports inconsistent but well-formed text.
    pub fn is_semantic(&self) -> bool {
        self.kind() == Some(DiagnosticKind::Semantic)
    }

    pub(crate) fn locate(self, source: &str) -> Self {
        Self {
            diagnostics: self
                .diagnostics
                .into_iter()
                .map(|diag| diag.locate(source))
                .collect(),
        }
    }
}

/// The first diagnostic followed by a count of the remaining ones.
fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_parse_error_from_diagnostic() {
        let err: ParseError = Diagnostic::new(ErrorCode::E100, "test error").into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].message(), "test error");
        assert!(err.is_syntax());
        assert!(!err.is_semantic());
    }

    #[test]
    fn test_parse_error_display_multiple() {
        let err: ParseError = vec![
            Diagnostic::new(ErrorCode::E200, "first"),
            Diagnostic::new(ErrorCode::E200, "second"),
            Diagnostic::new(ErrorCode::E201, "third"),
        ]
        .into();

        assert!(err.is_semantic());
        assert_eq!(err.to_string(), "error[E200]: first (+2 more)");
    }

    #[test]
    fn test_parse_error_locate_all() {
        let err: ParseError = vec![
            Diagnostic::new(ErrorCode::E002, "a").with_label(Span::new(0..1), "here"),
            Diagnostic::new(ErrorCode::E002, "b").with_label(Span::new(3..4), "here"),
        ]
        .into();
        let located = err.locate("x\nyz");

        let lines: Vec<_> = located
            .diagnostics()
            .iter()
            .map(|d| d.location().unwrap().line)
            .collect();
        assert_eq!(lines, [1, 2]);
    }

    #[test]
    fn test_empty_parse_error_has_no_kind() {
        let err = ParseError::new(Vec::new());
        assert_eq!(err.kind(), None);
        assert_eq!(err.to_string(), "");
    }
}
