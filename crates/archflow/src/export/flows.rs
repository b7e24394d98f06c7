//! Plain-text flow listing.
//!
//! One block per scenario, one line per resolved edge:
//!
//! ```text
//! Checkout / scenario_1
//!   [trigger] Customer -> Orders: places order
//!   [sync] Orders -> Payments: to charge the card
//!   [return] Payments -> Orders: receipt
//! ```

use archflow_core::semantic::ArchitectureModel;

use super::{Error, Exporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct FlowListing;

impl Exporter for FlowListing {
    fn export_model(&self, model: &ArchitectureModel) -> Result<String, Error> {
        let blocks: Vec<String> = model
            .flows()
            .iter()
            .map(|flow| {
                let mut block = format!("{} / {}\n", flow.use_case(), flow.scenario_id());
                if flow.edges().is_empty() {
                    block.push_str("  (no edges)\n");
                }
                for edge in flow.edges() {
                    block.push_str(&format!("  [{}] {edge}\n", edge.kind()));
                }
                block
            })
            .collect();

        Ok(blocks.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use archflow_core::{
        identifier::Id,
        semantic::{EdgeKind, FlowEdge, FlowEndpoint, ScenarioFlow},
    };
    use indexmap::IndexSet;

    use super::*;

    #[test]
    fn test_listing_groups_edges_by_scenario() {
        let checkout = ScenarioFlow::new(
            "Checkout",
            "scenario_1",
            vec![
                FlowEdge::new(
                    FlowEndpoint::Actor(Id::new("Customer")),
                    FlowEndpoint::Domain(Id::new("Orders")),
                    "places order",
                    EdgeKind::Trigger,
                ),
                FlowEdge::new(
                    FlowEndpoint::Domain(Id::new("Orders")),
                    FlowEndpoint::External,
                    "",
                    EdgeKind::Return,
                ),
            ],
            IndexSet::new(),
            IndexSet::new(),
        );
        let idle = ScenarioFlow::new("Idle", "scenario_4", vec![], IndexSet::new(), IndexSet::new());
        let model = ArchitectureModel::default().with_flows(vec![checkout, idle]);

        let listing = FlowListing.export_model(&model).unwrap();
        assert_eq!(
            listing,
            "Checkout / scenario_1\n  \
             [trigger] Customer -> Orders: places order\n  \
             [return] Orders -> External\n\
             \n\
             Idle / scenario_4\n  (no edges)\n"
        );
    }

    #[test]
    fn test_empty_model_lists_nothing() {
        let listing = FlowListing.export_model(&ArchitectureModel::default()).unwrap();
        assert_eq!(listing, "");
    }
}
