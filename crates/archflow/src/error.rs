//! Error types for Archflow operations.
//!
//! This module provides the main error type [`ArchflowError`] which wraps
//! the failures that can occur while compiling and exporting a model.

use std::io;

use thiserror::Error;

use archflow_parser::error::ParseError;

/// The main error type for Archflow operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the front end's diagnostics together with the
/// source text they point into, so callers can render labeled reports.
/// Assembling a parsed program never fails, so there is no semantic variant.
#[derive(Debug, Error)]
pub enum ArchflowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for ArchflowError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl ArchflowError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
