//! The core diagnostic type.
//!
//! A [`Diagnostic`] represents a single error with its code, a labelled
//! source span, an optional resolved line/column and optional help text.

use std::fmt;

use crate::{
    error::error_code::ErrorCode,
    span::{Location, Span},
};

/// Whether a diagnostic reports malformed or inconsistent input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Malformed text: lexer, grammar or attribute value errors.
    Syntax,
    /// Well-formed text that references undeclared vertices or lacks a
    /// required bounding box.
    Semantic,
}

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E200]: edge references undeclared vertex `Wrld`
///   --> layout.dot:7:30
///    |
///  7 |     Hello -> Wrld [pos="e,37,38 37,73 37,66 37,56 37,48"];
///    |              ^^^^ not declared
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    code: ErrorCode,
    message: String,
    span: Span,
    label: Option<String>,
    location: Option<Location>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with a code and message.
    ///
    /// # Example
    ///
    /// ```
    /// # use dotweave_parser::error::{Diagnostic, ErrorCode};
    /// # use dotweave_parser::Span;
    /// let diag = Diagnostic::new(ErrorCode::E102, "invalid position `1,x`")
    ///     .with_label(Span::new(12..17), "expected `x,y`");
    /// assert_eq!(diag.to_string(), "error[E102]: invalid position `1,x`");
    /// ```
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span: Span::default(),
            label: None,
            location: None,
            help: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn kind(&self) -> DiagnosticKind {
        if self.code.is_semantic() {
            DiagnosticKind::Semantic
        } else {
            DiagnosticKind::Syntax
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label attached to the span, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the resolved line and column of the span start, once known.
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Attach a labelled span.
    pub fn with_label(mut self, span: Span, label: impl Into<String>) -> Self {
        self.span = span;
        self.label = Some(label.into());
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Resolve the span start against the source text.
    pub(crate) fn locate(mut self, source: &str) -> Self {
        self.location = Some(Location::from_offset(source, self.span.start()));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}]: {}", self.code, self.message)?;
        if let Some(location) = self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(ErrorCode::E100, "test error");

        assert_eq!(diag.code(), ErrorCode::E100);
        assert_eq!(diag.message(), "test error");
        assert!(diag.label().is_none());
        assert!(diag.help().is_none());
        assert!(diag.location().is_none());
    }

    #[test]
    fn test_diagnostic_kind() {
        assert_eq!(
            Diagnostic::new(ErrorCode::E001, "x").kind(),
            DiagnosticKind::Syntax
        );
        assert_eq!(
            Diagnostic::new(ErrorCode::E201, "x").kind(),
            DiagnosticKind::Semantic
        );
    }

    #[test]
    fn test_diagnostic_with_label_and_help() {
        let diag = Diagnostic::new(ErrorCode::E200, "undeclared vertex `a`")
            .with_label(Span::new(10..11), "not declared")
            .with_help("declare it");

        assert_eq!(diag.span(), Span::new(10..11));
        assert_eq!(diag.label(), Some("not declared"));
        assert_eq!(diag.help(), Some("declare it"));
    }

    #[test]
    fn test_diagnostic_locate() {
        let source = "digraph {\n  a -> b;\n}";
        let diag = Diagnostic::new(ErrorCode::E200, "undeclared vertex `b`")
            .with_label(Span::new(17..18), "not declared")
            .locate(source);

        assert_eq!(diag.location(), Some(Location { line: 2, column: 8 }));
        assert_eq!(
            diag.to_string(),
            "error[E200]: undeclared vertex `b` at 2:8"
        );
    }
}
