//! Association graph resolution against the in-memory control plane.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use super::support::{activation, configuration, forwarding, policy};
use crate::associations::{AssociationResolver, LoadBalancerLinks, PolicyVersion, ResolveError};
use crate::model::{Activation, Network, PolicyId, PolicyVersionDocument};
use crate::testing::FakeControlPlane;

const CLOUDLET: u32 = 9;

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

#[fixture]
fn control_plane() -> FakeControlPlane {
    FakeControlPlane::new()
        .with_policy(policy(
            "101",
            "www_alb",
            vec![
                activation(Network::Staging, 4, "www.example.com"),
                activation(Network::Production, 3, "shop.example.com"),
            ],
        ))
        .with_policy(policy("102", "idle_alb", Vec::new()))
        .with_policy(policy(
            "103",
            "api_alb",
            vec![activation(Network::Production, 2, "api.example.com")],
        ))
        .with_rules(PolicyId::new("101"), 4, forwarding(&["alb_www", "alb_shared"]))
        .with_rules(PolicyId::new("103"), 2, forwarding(&["alb_shared"]))
        .with_active(
            Network::Staging,
            configuration(6, &[("Dallas", 50.0), ("Fairfield", 50.0)]),
        )
}

#[rstest]
fn resolve_one_collects_properties_from_every_network(control_plane: FakeControlPlane) {
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let association = resolver.resolve_one("www_alb").expect("resolve policy");
    assert_eq!(association.policy_id, PolicyId::new("101"));
    assert_eq!(association.version, PolicyVersion::Resolved(4));
    assert_eq!(
        association.properties,
        names(&["shop.example.com", "www.example.com"])
    );
    assert_eq!(control_plane.calls(), vec![String::from("policies 9")]);
}

#[rstest]
#[case("NoSuchPolicy")]
#[case("www")]
#[case("WWW_ALB")]
fn resolve_one_requires_exact_name(control_plane: FakeControlPlane, #[case] name: &str) {
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let error = resolver.resolve_one(name).unwrap_err();
    assert!(matches!(error, ResolveError::PolicyNotFound { name: missing } if missing == name));
}

#[rstest]
fn policy_without_activations_is_unresolved(control_plane: FakeControlPlane) {
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let association = resolver.resolve_one("idle_alb").expect("resolve policy");
    assert_eq!(association.version, PolicyVersion::Unresolved);
    assert!(association.properties.is_empty());
}

#[test]
fn version_comes_from_first_activation_reporting_one() {
    let activations = vec![
        Activation::new(Network::Staging, None, "a.example.com"),
        Activation::new(Network::Production, Some(8), "b.example.com"),
        Activation::new(Network::Staging, Some(9), "c.example.com"),
    ];
    assert_eq!(
        PolicyVersion::from_activations(&activations),
        PolicyVersion::Resolved(8)
    );
    assert_eq!(PolicyVersion::Resolved(8).to_string(), "8");
    assert_eq!(PolicyVersion::Unresolved.number(), None);
}

#[rstest]
fn resolve_all_lists_every_policy_pending(control_plane: FakeControlPlane) {
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let table = resolver.resolve_all().expect("resolve table");
    assert_eq!(table.len(), 3);
    let names: Vec<&str> = table.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["api_alb", "idle_alb", "www_alb"]);
    assert!(
        table
            .iter()
            .all(|(_, entry)| entry.load_balancer_ids == LoadBalancerLinks::Pending)
    );
}

#[rstest]
fn linking_fills_ids_and_marks_unresolved(control_plane: FakeControlPlane) {
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let mut table = resolver.resolve_all().expect("resolve table");
    resolver
        .link_load_balancers(&mut table)
        .expect("link load balancers");

    let www = table.get("www_alb").expect("www_alb row");
    assert_eq!(
        www.load_balancer_ids,
        LoadBalancerLinks::Linked(names(&["alb_shared", "alb_www"]))
    );
    let idle = table.get("idle_alb").expect("idle_alb row");
    assert_eq!(idle.load_balancer_ids, LoadBalancerLinks::Unresolved);

    let shared: Vec<&str> = table
        .policies_linked_to("alb_shared")
        .map(|(name, _)| name)
        .collect();
    assert_eq!(shared, vec!["api_alb", "www_alb"]);
    assert_eq!(table.policies_linked_to("alb_missing").count(), 0);
}

#[rstest]
fn linking_issues_one_rule_fetch_per_resolved_policy(control_plane: FakeControlPlane) {
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let mut table = resolver.resolve_all().expect("resolve table");
    resolver
        .link_load_balancers(&mut table)
        .expect("link load balancers");
    let rule_fetches = control_plane
        .calls()
        .iter()
        .filter(|call| call.starts_with("policy_version"))
        .count();
    assert_eq!(rule_fetches, 2);
}

#[rstest]
fn refused_rule_set_skips_policy(control_plane: FakeControlPlane) {
    let control_plane = control_plane.with_refused_rules(PolicyId::new("103"), 2, 403);
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let mut table = resolver.resolve_all().expect("resolve table");
    resolver
        .link_load_balancers(&mut table)
        .expect("refusals are skipped");
    let api = table.get("api_alb").expect("api_alb row");
    assert!(matches!(api.load_balancer_ids, LoadBalancerLinks::Skipped { .. }));
    assert!(!api.load_balancer_ids.contains("alb_shared"));
}

#[test]
fn null_match_rules_yield_no_ids() {
    let control_plane = FakeControlPlane::new().with_rules(
        PolicyId::new("7"),
        1,
        PolicyVersionDocument::new(None),
    );
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let ids = resolver
        .resolve_load_balancer_ids(&PolicyId::new("7"), 1)
        .expect("resolve ids");
    assert!(ids.is_empty());
}

#[rstest]
fn origins_come_from_staging_version(control_plane: FakeControlPlane) {
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let origins = resolver
        .resolve_origins("alb_example")
        .expect("resolve origins");
    assert_eq!(origins, Some(names(&["Dallas", "Fairfield"])));
}

#[test]
fn origins_are_absent_without_staging_version() {
    let control_plane = FakeControlPlane::new().with_active(
        Network::Production,
        configuration(2, &[("Dallas", 100.0)]),
    );
    let resolver = AssociationResolver::new(&control_plane, CLOUDLET);
    let origins = resolver
        .resolve_origins("alb_example")
        .expect("resolve origins");
    assert_eq!(origins, None);
}
