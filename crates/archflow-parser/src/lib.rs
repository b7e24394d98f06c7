//! # Archflow Parser
//!
//! Front end and model assembly engine for the Archflow architecture
//! language. This crate turns source text into a fully cross-referenced
//! [`ArchitectureModel`].
//!
//! ## Usage
//!
//! ```
//! # use archflow_parser::{parse, AssembleConfig, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         domain Orders { Cart }
//!         service Shop {
//!           domains: Orders, Payments
//!         }
//!
//!         use_case "Checkout" {
//!           when Customer places order
//!             Orders asks Payments to charge the card
//!             Payments returns receipt
//!         }
//!     "#;
//!
//!     let model = parse(source, AssembleConfig::default())?;
//!     assert_eq!(model.flows()[0].edges().len(), 3);
//!     Ok(())
//! }
//! ```
//!
//! Callers with their own front end can skip the text stage and feed
//! [`declarations::Declaration`] records to [`assemble`] directly.

mod assemble;
mod correlate;
pub mod declarations;
pub mod error;
mod lexer;
mod merge;
mod normalize;
mod parser;
mod resolve;
mod span;
mod tokens;

pub use assemble::{AssembleConfig, assemble};
pub use merge::{merge_domains, merge_services};
pub use span::{Span, Spanned};

use archflow_core::semantic::ArchitectureModel;

use error::ParseError;

/// Parse source text into an assembled architecture model.
///
/// The pipeline runs in three steps:
///
/// 1. **Tokenize** - Convert source text to tokens
/// 2. **Parse** - Build declaration records from tokens
/// 3. **Assemble** - Normalize and merge entities, resolve scenarios,
///    correlate events
///
/// Lexer errors are all reported together. A parse error stops at the first
/// structural failure. Assembly itself never fails.
///
/// # Example
///
/// ```
/// # use archflow_parser::{parse, AssembleConfig, error::ParseError};
///
/// fn main() -> Result<(), ParseError> {
///     let model = parse("actor user Customer", AssembleConfig::default())?;
///     assert_eq!(model.actors().len(), 1);
///     Ok(())
/// }
/// ```
pub fn parse(source: &str, config: AssembleConfig) -> Result<ArchitectureModel, ParseError> {
    // Step 1: Tokenize
    let tokens = lexer::tokenize(source)?;

    // Step 2: Parse
    let declarations = parser::build_declarations(&tokens)?;

    // Step 3: Assemble
    Ok(assemble(
        declarations.into_iter().map(Spanned::into_inner),
        config,
    ))
}
