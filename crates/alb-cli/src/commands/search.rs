//! `search`: show what a policy or a load balancing ID is linked to.

use std::collections::BTreeSet;
use std::io::Write;

use alb_cloudlets::{AssociationResolver, ControlPlane, PolicyVersion};

use crate::cli::{SearchArgs, SearchType};
use crate::errors::AppError;
use crate::output::{AssociationTree, OriginLeaves, render_tree};

pub(super) fn run<W: Write>(
    client: &dyn ControlPlane,
    cloudlet_id: u32,
    args: &SearchArgs,
    out: &mut W,
) -> Result<(), AppError> {
    let resolver = AssociationResolver::new(client, cloudlet_id);
    match args.search_type {
        SearchType::Policy => search_policy(&resolver, &args.name, out),
        SearchType::Loadid => search_load_id(&resolver, &args.name, out),
    }
}

fn search_policy<W: Write>(
    resolver: &AssociationResolver<&dyn ControlPlane>,
    name: &str,
    out: &mut W,
) -> Result<(), AppError> {
    writeln!(out, "INFO: searching for policy {name}")?;
    let association = resolver.resolve_one(name)?;
    let load_ids = match association.version {
        PolicyVersion::Resolved(version) => {
            resolver.resolve_load_balancer_ids(&association.policy_id, version)?
        }
        PolicyVersion::Unresolved => BTreeSet::new(),
    };
    let tree = build_tree(resolver, association.name, association.properties, &load_ids)?;
    render_tree(out, &tree)?;
    Ok(())
}

fn search_load_id<W: Write>(
    resolver: &AssociationResolver<&dyn ControlPlane>,
    load_id: &str,
    out: &mut W,
) -> Result<(), AppError> {
    writeln!(out, "INFO: searching for load balancing ID {load_id}")?;
    let mut table = resolver.resolve_all()?;
    resolver.link_load_balancers(&mut table)?;

    let mut found = false;
    for (policy, entry) in table.policies_linked_to(load_id) {
        found = true;
        let load_ids = entry.load_balancer_ids.ids().cloned().unwrap_or_default();
        let tree = build_tree(resolver, policy.to_owned(), entry.properties.clone(), &load_ids)?;
        render_tree(out, &tree)?;
    }
    if !found {
        writeln!(out, "ERROR: load balancing ID not found or has no associations")?;
    }
    Ok(())
}

fn build_tree(
    resolver: &AssociationResolver<&dyn ControlPlane>,
    policy: String,
    properties: BTreeSet<String>,
    load_ids: &BTreeSet<String>,
) -> Result<AssociationTree, AppError> {
    let load_balancers = load_ids
        .iter()
        .map(|load_id| {
            let origins = resolver
                .resolve_origins(load_id)?
                .map_or(OriginLeaves::NoActiveVersion, OriginLeaves::Active);
            Ok((load_id.clone(), origins))
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(AssociationTree {
        policy,
        properties,
        load_balancers,
    })
}
