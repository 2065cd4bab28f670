//! Shared fixtures for control-plane test cases.

use crate::model::{
    Activation, DataCenterEntry, LoadBalancerConfiguration, MatchRule, Network, Policy, PolicyId,
    PolicyVersionDocument,
};

pub(super) const LOAD_ID: &str = "alb_example";

pub(super) fn configuration(version: u64, weights: &[(&str, f64)]) -> LoadBalancerConfiguration {
    LoadBalancerConfiguration::new(
        LOAD_ID,
        version,
        weights
            .iter()
            .map(|(name, percent)| DataCenterEntry::new(*name, *percent))
            .collect(),
    )
}

pub(super) fn three_data_centers(version: u64) -> LoadBalancerConfiguration {
    configuration(
        version,
        &[("Dallas", 40.0), ("Fairfield", 30.0), ("Alpharetta", 30.0)],
    )
}

pub(super) fn policy(id: &str, name: &str, activations: Vec<Activation>) -> Policy {
    Policy::new(PolicyId::new(id), name, activations)
}

pub(super) fn activation(network: Network, version: u64, property: &str) -> Activation {
    Activation::new(network, Some(version), property)
}

pub(super) fn forwarding(origin_ids: &[&str]) -> PolicyVersionDocument {
    PolicyVersionDocument::new(Some(
        origin_ids
            .iter()
            .map(|origin_id| MatchRule::forwarding_to(*origin_id))
            .collect(),
    ))
}
