//! Entity merging.
//!
//! Domains and services may be declared in several blocks. Merging folds the
//! declarations, in source order, into one entity per name:
//!
//! - set-valued fields (subdomains, service domains, data stores) are unioned,
//!   keeping first-seen order;
//! - the language keeps the first non-empty value, or the last one under
//!   [`ConflictPolicy::LastWins`];
//! - deployment strategies of the same kind union their rules. Strategies of
//!   different kinds never mix: the policy picks one of them whole.

use indexmap::{IndexMap, map::Entry};
use log::debug;

use archflow_core::{
    identifier::Id,
    policy::ConflictPolicy,
    semantic::{DeploymentStrategy, Domain, Service},
};

/// Merge same-named domains. Output keeps the first-seen order of names.
pub fn merge_domains(domains: impl IntoIterator<Item = Domain>) -> Vec<Domain> {
    let merged = domains
        .into_iter()
        .fold(IndexMap::<Id, Domain>::new(), |mut merged, domain| {
            match merged.entry(domain.name()) {
                Entry::Occupied(mut slot) => {
                    let sub_domains = slot
                        .get()
                        .sub_domains()
                        .iter()
                        .chain(domain.sub_domains())
                        .copied()
                        .collect::<Vec<_>>();
                    slot.insert(Domain::new(domain.name(), sub_domains));
                }
                Entry::Vacant(slot) => {
                    slot.insert(domain);
                }
            }
            merged
        });

    merged.into_values().collect()
}

/// Merge same-named services. Output keeps the first-seen order of names.
pub fn merge_services(
    services: impl IntoIterator<Item = Service>,
    policy: ConflictPolicy,
) -> Vec<Service> {
    let merged =
        services
            .into_iter()
            .fold(IndexMap::<Id, Service>::new(), |mut merged, service| {
                match merged.entry(service.name()) {
                    Entry::Occupied(mut slot) => {
                        let combined = merge_service(slot.get(), service, policy);
                        slot.insert(combined);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(service);
                    }
                }
                merged
            });

    merged.into_values().collect()
}

/// Merge `incoming` into `existing`. Both must carry the same name.
pub(crate) fn merge_service(
    existing: &Service,
    incoming: Service,
    policy: ConflictPolicy,
) -> Service {
    let domains = existing
        .domains()
        .iter()
        .chain(incoming.domains())
        .copied()
        .collect::<Vec<_>>();
    let data_stores = existing
        .data_stores()
        .iter()
        .chain(incoming.data_stores())
        .copied()
        .collect::<Vec<_>>();

    let language = match (existing.language(), incoming.language()) {
        (Some(current), Some(other)) => {
            if current != other {
                debug!(
                    service = existing.name().to_string(),
                    kept = policy.pick(current, other),
                    dropped = policy.pick(other, current);
                    "Conflicting service language"
                );
            }
            Some(policy.pick(current, other))
        }
        (current, other) => current.or(other),
    }
    .map(str::to_string);

    let deployment = merge_deployment(existing.deployment(), incoming.deployment(), policy);

    Service::new(existing.name())
        .with_domains(domains)
        .with_data_stores(data_stores)
        .with_language(language)
        .with_deployment(deployment)
}

/// Merge two deployment strategies.
pub(crate) fn merge_deployment(
    existing: &DeploymentStrategy,
    incoming: &DeploymentStrategy,
    policy: ConflictPolicy,
) -> DeploymentStrategy {
    match (existing.kind(), incoming.kind()) {
        (_, None) => existing.clone(),
        (None, Some(_)) => incoming.clone(),
        (Some(current), Some(other)) if current == other => DeploymentStrategy::new(
            current,
            existing.rules().iter().chain(incoming.rules()).cloned(),
        ),
        (Some(current), Some(other)) => {
            debug!(
                kept = policy.pick(current, other),
                dropped = policy.pick(other, current);
                "Conflicting deployment kinds, rules of the dropped strategy are discarded"
            );
            policy.pick(existing, incoming).clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use archflow_core::semantic::DeploymentRule;

    use super::*;

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    fn canary(rules: &[(&str, &str)]) -> DeploymentStrategy {
        DeploymentStrategy::new(
            "canary",
            rules
                .iter()
                .map(|(pct, target)| DeploymentRule::new(*pct, Id::new(target))),
        )
    }

    #[test]
    fn test_domains_merge_to_one_entry_per_name() {
        let merged = merge_domains(vec![
            Domain::new(Id::new("Payment"), ids(&["Invoicing"])),
            Domain::new(Id::new("Orders"), []),
            Domain::new(Id::new("Payment"), ids(&["Refunds", "Invoicing"])),
            Domain::new(Id::new("Payment"), []),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name(), "Payment");
        assert_eq!(
            merged[0].sub_domains().iter().copied().collect::<Vec<_>>(),
            ids(&["Invoicing", "Refunds"])
        );
        assert_eq!(merged[1].name(), "Orders");
    }

    #[test]
    fn test_service_union_preserves_first_seen_order() {
        let merged = merge_services(
            vec![
                Service::new(Id::new("ServiceA")).with_domains(ids(&["X", "Y"])),
                Service::new(Id::new("ServiceA")).with_domains(ids(&["Y", "Z"])),
            ],
            ConflictPolicy::FirstWins,
        );

        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].domains().iter().copied().collect::<Vec<_>>(),
            ids(&["X", "Y", "Z"])
        );
    }

    #[test]
    fn test_service_names_are_case_sensitive() {
        let merged = merge_services(
            vec![
                Service::new(Id::new("billing")),
                Service::new(Id::new("Billing")),
            ],
            ConflictPolicy::FirstWins,
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_language_first_non_empty_wins() {
        let merged = merge_services(
            vec![
                Service::new(Id::new("Billing")),
                Service::new(Id::new("Billing")).with_language(Some("golang".to_string())),
                Service::new(Id::new("Billing")).with_language(Some("rust".to_string())),
            ],
            ConflictPolicy::FirstWins,
        );
        assert_eq!(merged[0].language(), Some("golang"));
    }

    #[test]
    fn test_language_last_wins_policy() {
        let merged = merge_services(
            vec![
                Service::new(Id::new("Billing")).with_language(Some("golang".to_string())),
                Service::new(Id::new("Billing")).with_language(Some("rust".to_string())),
                Service::new(Id::new("Billing")),
            ],
            ConflictPolicy::LastWins,
        );
        assert_eq!(merged[0].language(), Some("rust"));
    }

    #[test]
    fn test_deployment_rules_dedup_by_pair() {
        let merged = merge_deployment(
            &canary(&[("10%", "staging")]),
            &canary(&[("10%", "staging"), ("90%", "production")]),
            ConflictPolicy::FirstWins,
        );

        assert_eq!(merged.kind(), Some("canary"));
        let rules: Vec<_> = merged.rules().iter().map(ToString::to_string).collect();
        assert_eq!(rules, vec!["10% -> staging", "90% -> production"]);
    }

    #[test]
    fn test_deployment_adopted_when_unset() {
        let merged = merge_deployment(
            &DeploymentStrategy::default(),
            &canary(&[("5%", "beta")]),
            ConflictPolicy::FirstWins,
        );
        assert_eq!(merged, canary(&[("5%", "beta")]));

        let kept = merge_deployment(
            &canary(&[("5%", "beta")]),
            &DeploymentStrategy::default(),
            ConflictPolicy::LastWins,
        );
        assert_eq!(kept, canary(&[("5%", "beta")]));
    }

    #[test]
    fn test_deployment_kind_mismatch_drops_incoming_rules() {
        let blue_green = DeploymentStrategy::new("blue_green", []);
        let merged = merge_deployment(
            &blue_green,
            &canary(&[("10%", "staging")]),
            ConflictPolicy::FirstWins,
        );

        assert_eq!(merged.kind(), Some("blue_green"));
        assert!(merged.rules().is_empty());
    }

    #[test]
    fn test_deployment_kind_mismatch_last_wins_replaces() {
        let blue_green = DeploymentStrategy::new("blue_green", []);
        let merged = merge_deployment(
            &blue_green,
            &canary(&[("10%", "staging")]),
            ConflictPolicy::LastWins,
        );
        assert_eq!(merged, canary(&[("10%", "staging")]));
    }
}
