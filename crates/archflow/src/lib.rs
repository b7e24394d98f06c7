//! Archflow - an architecture description language compiled into a
//! cross-referenced model.
//!
//! Source text declaring actors, domains, services, exposures, architecture
//! layers, and use cases is parsed and assembled into an
//! [`ArchitectureModel`](semantic::ArchitectureModel): merged entities plus
//! the resolved flow of every scenario. The model can be exported as JSON or
//! as a plain flow listing.

pub mod config;

mod error;
mod export;

pub use archflow_core::{identifier, policy, semantic};

pub use error::ArchflowError;

use log::{debug, info, trace};

use config::AppConfig;
use export::{Exporter, flows::FlowListing, json::JsonExporter};

/// Builder for compiling Archflow sources.
///
/// # Examples
///
/// ```rust
/// use archflow::{ModelBuilder, config::AppConfig};
///
/// let source = "domain Orders { Cart }";
///
/// let builder = ModelBuilder::new(AppConfig::default());
/// let model = builder.parse(source).expect("Failed to parse");
///
/// let json = builder.render_json(&model).expect("Failed to export");
/// assert!(json.contains("Orders"));
///
/// // Or use default config
/// let builder = ModelBuilder::default();
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    config: AppConfig,
}

impl ModelBuilder {
    /// Create a new model builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including conflict policies
    ///   and output settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into an assembled architecture model.
    ///
    /// This performs lexing and parsing, then merges entities, resolves every
    /// scenario's flow, and correlates events across use cases.
    ///
    /// # Errors
    ///
    /// Returns `ArchflowError::Parse` for lexical or syntax errors. Nothing
    /// after parsing can fail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use archflow::{ModelBuilder, config::AppConfig};
    ///
    /// let builder = ModelBuilder::new(AppConfig::default());
    /// let model = builder.parse("actor user Customer")
    ///     .expect("Failed to parse");
    /// assert_eq!(model.actors().len(), 1);
    /// ```
    pub fn parse(&self, source: &str) -> Result<semantic::ArchitectureModel, ArchflowError> {
        info!("Parsing model");

        let assemble_config = self.config.policies().assemble_config();

        let model = archflow_parser::parse(source, assemble_config)
            .map_err(|err| ArchflowError::new_parse_error(err, source))?;

        debug!(
            use_cases = model.use_cases().len(),
            flows = model.flows().len();
            "Model parsed successfully"
        );
        trace!(model:?; "Parsed model");

        Ok(model)
    }

    /// Export a model as JSON, pretty-printed unless the configuration says
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ArchflowError::Export` if serialization fails.
    pub fn render_json(&self, model: &semantic::ArchitectureModel) -> Result<String, ArchflowError> {
        let json = JsonExporter::new(self.config.output().pretty()).export_model(model)?;
        info!("JSON rendered successfully");
        Ok(json)
    }

    /// Export the resolved flows as a plain listing, one line per edge.
    ///
    /// # Errors
    ///
    /// Returns `ArchflowError::Export` if the listing cannot be produced.
    pub fn render_flows(
        &self,
        model: &semantic::ArchitectureModel,
    ) -> Result<String, ArchflowError> {
        let listing = FlowListing.export_model(model)?;
        info!(flows = model.flows().len(); "Flow listing rendered successfully");
        Ok(listing)
    }
}
