//! Collector for accumulating diagnostics during a processing phase.
//!
//! Each pipeline phase reports every problem it can find in one pass
//! instead of stopping at the first; the [`DiagnosticCollector`] is the
//! accumulation point.

use crate::error::{Diagnostic, ParseError};

/// A collector for accumulating diagnostics during a processing phase.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Whether any error-severity diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(ParseError)` with all
    ///   diagnostics.
    /// - If there are no errors, returns `Ok(())`. Warnings are
    ///   discarded in the success case.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }

    /// Finish collection, returning `value` on success.
    pub fn finish_with<T>(self, value: T) -> Result<T, ParseError> {
        self.finish().map(|()| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_empty_collector_is_ok() {
        let collector = DiagnosticCollector::new();
        assert!(!collector.has_errors());
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_error_makes_finish_err() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::error("boom"));
        assert!(collector.has_errors());
        assert!(collector.finish().is_err());
    }

    #[test]
    fn test_warnings_alone_are_ok() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("questionable"));
        assert!(collector.finish().is_ok());
    }

    #[test]
    fn test_all_errors_are_kept() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(
            Diagnostic::error("first")
                .with_code(ErrorCode::E201)
                .with_label(Span::new(0..2), "here"),
        );
        collector.emit(Diagnostic::warning("middle"));
        collector.emit(Diagnostic::error("second"));

        let err = collector.finish().unwrap_err();
        assert_eq!(err.diagnostics().len(), 3);
    }

    #[test]
    fn test_finish_with_passes_value() {
        let collector = DiagnosticCollector::new();
        assert_eq!(collector.finish_with(42).unwrap(), 42);
    }
}
