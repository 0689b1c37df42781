//! Error adapter for converting LayoutError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! When a [`dotweave_parser::error::ParseError`] contains multiple
//! diagnostics, each diagnostic is rendered independently against the engine
//! output it was found in.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use dotweave::LayoutError;
use dotweave_parser::error::Diagnostic;

/// Adapter for a single engine-output diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Engine output for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.diag.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.diag.span();
        let label = LabeledSpan::new_primary_with_span(
            self.diag.label().map(str::to_owned),
            SourceSpan::new(span.start().into(), span.len()),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for [`LayoutError`] variants without source locations.
pub struct ErrorAdapter<'a>(pub &'a LayoutError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            LayoutError::Io(_) => "dotweave::io",
            LayoutError::Parse { .. } => return None,
            LayoutError::UnmatchedVertex { .. }
            | LayoutError::UnmatchedSubGraph { .. }
            | LayoutError::UnmatchedEdge { .. } => "dotweave::match",
            LayoutError::Engine(_) => "dotweave::engine",
            LayoutError::InvalidSize { .. } => "dotweave::size",
            LayoutError::Graph(_) => "dotweave::graph",
            LayoutError::Config(_) => "dotweave::config",
            LayoutError::InvalidState { .. } => "dotweave::state",
            LayoutError::Builder(_) => "dotweave::builder",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            LayoutError::Engine(_) => {
                "is Graphviz installed? Point --dot-path at the `dot` executable"
            }
            LayoutError::UnmatchedVertex { .. }
            | LayoutError::UnmatchedSubGraph { .. }
            | LayoutError::UnmatchedEdge { .. } => {
                "the layout does not belong to this graph; a replayed layout must come from the same graph file"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A rich diagnostic with source location information.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => std::error::Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`LayoutError`] into a list of reportable errors.
///
/// [`LayoutError::Parse`] yields one [`Reportable`] per diagnostic. Every
/// other variant yields a single one.
pub fn to_reportables(err: &LayoutError) -> Vec<Reportable<'_>> {
    match err {
        LayoutError::Parse {
            err: parse_err,
            src,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d, src)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use dotweave::runner::EngineError;
    use dotweave_parser::{
        ParseError, Span,
        error::ErrorCode,
    };

    use super::*;

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::new(ErrorCode::E200, "edge references undeclared vertex `b`")
            .with_label(Span::new(12..13), "not declared")
            .with_help("declare the vertex");
        let err = LayoutError::new_parse_error(ParseError::new(vec![diag]), "digraph { a -> b }");

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "edge references undeclared vertex `b`");
                assert_eq!(d.code().unwrap().to_string(), "E200");
                assert_eq!(d.help().unwrap().to_string(), "declare the vertex");
                let labels: Vec<_> = d.labels().unwrap().collect();
                assert_eq!(labels.len(), 1);
                assert!(labels[0].primary());
                assert_eq!(labels[0].label(), Some("not declared"));
                assert_eq!(labels[0].offset(), 12);
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_multiple_diagnostics() {
        let diags = vec![
            Diagnostic::new(ErrorCode::E102, "first error").with_label(Span::new(0..5), "first"),
            Diagnostic::new(ErrorCode::E202, "second error"),
        ];
        let err = LayoutError::new_parse_error(ParseError::new(diags), "source code here...");

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 2);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
    }

    #[test]
    fn test_non_parse_error() {
        let err = LayoutError::Graph("graph error".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Graph error: graph error");
                assert_eq!(e.code().unwrap().to_string(), "dotweave::graph");
                assert!(e.help().is_none());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_engine_error_has_help() {
        let err = LayoutError::Engine(EngineError::NoOutput);
        let reportables = to_reportables(&err);
        assert!(reportables[0].help().is_some());
        assert_eq!(reportables[0].code().unwrap().to_string(), "dotweave::engine");
    }
}
