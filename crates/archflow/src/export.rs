//! Export of assembled models.
//!
//! This module provides the [`Exporter`] trait that turns an
//! [`ArchitectureModel`] into text. It is the last stage of the pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ parse
//! Declarations
//!     ↓ assemble
//! ArchitectureModel
//!     ↓ export (this module)
//! Output File
//! ```
//!
//! # Available Backends
//!
//! - [`json`]: the whole model as JSON via `serde_json`
//! - [`flows`]: a plain listing of the resolved edges, one scenario at a time

pub mod flows;
pub mod json;

use archflow_core::semantic::ArchitectureModel;

/// Abstraction for model export backends.
pub trait Exporter {
    /// Exports the model to the backend's text format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if the model cannot be encoded.
    fn export_model(&self, model: &ArchitectureModel) -> Result<String, Error>;
}

/// Errors that can occur during model export.
///
/// Converted into [`ArchflowError::Export`] at the crate boundary.
///
/// [`ArchflowError::Export`]: crate::ArchflowError::Export
#[derive(Debug)]
pub enum Error {
    /// The model could not be serialized.
    Serialize(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "Serialization error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}
