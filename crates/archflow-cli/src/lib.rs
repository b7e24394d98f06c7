//! CLI logic for the Archflow model compiler.
//!
//! This module contains the core CLI logic: load configuration, compile the
//! input file, and write the requested output.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, OutputFormat};

use std::fs;

use log::info;

use archflow::{ArchflowError, ModelBuilder};

/// Run the Archflow CLI application
///
/// This function compiles the input file into an architecture model and
/// writes it to the output file in the requested format.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ArchflowError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Lexing and parsing errors
/// - Export errors
pub fn run(args: &Args) -> Result<(), ArchflowError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        format:? = args.format;
        "Processing model"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    // Compile and export using the ModelBuilder API
    let builder = ModelBuilder::new(app_config);
    let model = builder.parse(&source)?;
    let output = match args.format {
        OutputFormat::Json => builder.render_json(&model)?,
        OutputFormat::Flows => builder.render_flows(&model)?,
    };

    // Write output file
    fs::write(&args.output, output)?;

    info!(output_file = args.output; "Model exported successfully");

    Ok(())
}
