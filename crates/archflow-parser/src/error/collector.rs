use crate::error::{Diagnostic, ParseError};

/// Accumulates diagnostics so a phase can report every problem at once.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.has_errors |= diagnostic.severity().is_error();
        self.diagnostics.push(diagnostic);
    }

    /// `Err` with every collected diagnostic if any of them is an error.
    ///
    /// Warnings alone are dropped.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors {
            Err(ParseError::new(self.diagnostics))
        } else {
            Ok(())
        }
    }
}
