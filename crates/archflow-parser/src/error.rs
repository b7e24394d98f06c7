//! Diagnostics reported by the Archflow front end.
//!
//! Only structural problems are diagnostics: characters the lexer cannot
//! read and token sequences the parser cannot shape into declarations. Once
//! the declarations exist, the assembly engine resolves every ambiguity by
//! policy and never reports.
//!
//! ```
//! # use archflow_parser::error::{Diagnostic, ErrorCode};
//! # use archflow_parser::Span;
//! let diag = Diagnostic::error("unterminated string literal")
//!     .with_code(ErrorCode::E001)
//!     .with_label(Span::new(12..30), "string starts here")
//!     .with_help("add closing `\"`");
//!
//! assert_eq!(diag.to_string(), "error[E001]: unterminated string literal");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
