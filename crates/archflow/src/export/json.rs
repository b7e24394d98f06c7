//! JSON export backend.

use log::debug;

use archflow_core::semantic::ArchitectureModel;

use super::{Error, Exporter};

/// Serializes the whole model with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    pretty: bool,
}

impl JsonExporter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Exporter for JsonExporter {
    fn export_model(&self, model: &ArchitectureModel) -> Result<String, Error> {
        let json = if self.pretty {
            serde_json::to_string_pretty(model)?
        } else {
            serde_json::to_string(model)?
        };
        debug!(bytes = json.len(), pretty = self.pretty; "Model serialized to JSON");
        Ok(json)
    }
}
