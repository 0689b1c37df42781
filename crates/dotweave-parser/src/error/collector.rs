//! Collector for accumulating diagnostics during a processing phase.
//!
//! The [`DiagnosticCollector`] lets the lexer and the graph builder report
//! every problem in one pass instead of stopping at the first.

use crate::error::{Diagnostic, ParseError};

/// A collector for accumulating diagnostics during a processing phase.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Emits the error of a failed result and returns its value otherwise.
    pub fn check<T>(&mut self, result: Result<T, Diagnostic>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(diagnostic) => {
                self.emit(diagnostic);
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Finish collection and return a result.
    ///
    /// Returns `Err(ParseError)` with all diagnostics if any were emitted.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors() {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(!collector.has_errors());
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_collector_keeps_emission_order() {
        let mut collector = DiagnosticCollector::new();

        collector.emit(
            Diagnostic::new(ErrorCode::E200, "undeclared vertex `a`")
                .with_label(Span::new(10..11), "not declared"),
        );
        collector.emit(Diagnostic::new(ErrorCode::E200, "undeclared vertex `b`"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert_eq!(err.diagnostics()[0].message(), "undeclared vertex `a`");
    }

    #[test]
    fn test_collector_check() {
        let mut collector = DiagnosticCollector::new();

        assert_eq!(collector.check(Ok::<_, Diagnostic>(3)), Some(3));
        assert!(!collector.has_errors());

        let failed: Result<i32, _> = Err(Diagnostic::new(ErrorCode::E102, "bad"));
        assert_eq!(collector.check(failed), None);
        assert!(collector.has_errors());
    }
}
