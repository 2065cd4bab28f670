//! Property → policy → load-balancer ID → origin resolution.
//!
//! Every traversal goes back to the control plane; nothing is cached between
//! calls. Resolving the whole cloudlet therefore costs one policy listing,
//! one rule-set fetch per policy with a resolved version, and two calls per
//! load-balancer ID whose origins are expanded.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::client::ControlPlane;
use crate::error::ApiError;
use crate::model::{Activation, Network, Policy, PolicyId};
use crate::versions::VersionResolver;

/// Errors raised while resolving a single policy.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No policy of the cloudlet type carries the requested name.
    #[error("Policy Not Found: {name}")]
    PolicyNotFound {
        /// Name that was searched for.
        name: String,
    },
    /// The control plane could not be queried.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Policy version used for rule lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyVersion {
    /// A version reported by one of the policy's activations.
    Resolved(u64),
    /// The policy has no activation reporting a version.
    Unresolved,
}

impl PolicyVersion {
    /// Takes the version of the first activation that reports one.
    #[must_use]
    pub fn from_activations(activations: &[Activation]) -> Self {
        activations
            .iter()
            .find_map(|activation| activation.policy_version)
            .map_or(Self::Unresolved, Self::Resolved)
    }

    /// The version number, when resolved.
    #[must_use]
    pub const fn number(self) -> Option<u64> {
        match self {
            Self::Resolved(version) => Some(version),
            Self::Unresolved => None,
        }
    }
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(version) => write!(formatter, "{version}"),
            Self::Unresolved => formatter.write_str("unresolved"),
        }
    }
}

/// A policy together with every property that activates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyAssociation {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Policy name.
    pub name: String,
    /// Version used for rule lookups.
    pub version: PolicyVersion,
    /// Properties named by any activation, on any network.
    pub properties: BTreeSet<String>,
}

impl PolicyAssociation {
    fn from_policy(policy: &Policy) -> Self {
        Self {
            policy_id: policy.policy_id.clone(),
            name: policy.name.clone(),
            version: PolicyVersion::from_activations(&policy.activations),
            properties: policy
                .activations
                .iter()
                .map(|activation| activation.property_name.clone())
                .collect(),
        }
    }
}

/// Load-balancer IDs linked to a policy, or why there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadBalancerLinks {
    /// The rule set has not been examined yet.
    Pending,
    /// The policy has no resolved version, so it has no associations.
    Unresolved,
    /// The rule set could not be fetched; the policy was skipped.
    Skipped {
        /// Reason reported by the control plane.
        reason: String,
    },
    /// IDs referenced by the rule set; may be empty.
    Linked(BTreeSet<String>),
}

impl LoadBalancerLinks {
    /// Linked IDs, when the rule set was examined.
    #[must_use]
    pub const fn ids(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Linked(ids) => Some(ids),
            Self::Pending | Self::Unresolved | Self::Skipped { .. } => None,
        }
    }

    /// Returns true when `load_id` is among the linked IDs.
    #[must_use]
    pub fn contains(&self, load_id: &str) -> bool {
        self.ids().is_some_and(|ids| ids.contains(load_id))
    }
}

/// One row of an [`AssociationTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationEntry {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Version used for rule lookups.
    pub version: PolicyVersion,
    /// Properties activating the policy.
    pub properties: BTreeSet<String>,
    /// Load-balancer IDs the policy forwards to.
    pub load_balancer_ids: LoadBalancerLinks,
}

/// Associations of every policy of a cloudlet type, keyed by policy name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationTable {
    entries: BTreeMap<String, AssociationEntry>,
}

impl AssociationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the row for `name`.
    pub fn insert(&mut self, name: impl Into<String>, entry: AssociationEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Row for `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AssociationEntry> {
        self.entries.get(name)
    }

    /// Iterates rows in policy-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssociationEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Rows whose linked IDs include `load_id`.
    pub fn policies_linked_to<'a>(
        &'a self,
        load_id: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a AssociationEntry)> + 'a {
        self.iter()
            .filter(move |(_, entry)| entry.load_balancer_ids.contains(load_id))
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks the policy graph of one cloudlet type.
pub struct AssociationResolver<C> {
    client: C,
    cloudlet_id: u32,
}

impl<C> AssociationResolver<C> {
    /// Creates a resolver for the cloudlet type `cloudlet_id`.
    #[must_use]
    pub const fn new(client: C, cloudlet_id: u32) -> Self {
        Self {
            client,
            cloudlet_id,
        }
    }
}

impl<C: ControlPlane> AssociationResolver<C> {
    /// Resolves the policy named exactly `name`.
    ///
    /// # Errors
    /// Returns [`ResolveError::PolicyNotFound`] when no policy matches and
    /// [`ResolveError::Api`] when the listing fails.
    pub fn resolve_one(&self, name: &str) -> Result<PolicyAssociation, ResolveError> {
        let policies = self.client.policies(self.cloudlet_id)?;
        debug!(cloudlet_id = self.cloudlet_id, count = policies.len(), "policies listed");
        policies
            .iter()
            .find(|policy| policy.name == name)
            .map(PolicyAssociation::from_policy)
            .ok_or_else(|| ResolveError::PolicyNotFound {
                name: name.to_owned(),
            })
    }

    /// Builds a table row for every policy of the cloudlet type.
    ///
    /// Load-balancer IDs are left [`LoadBalancerLinks::Pending`]; see
    /// [`Self::link_load_balancers`].
    ///
    /// # Errors
    /// Returns [`ApiError`] when the listing fails.
    pub fn resolve_all(&self) -> Result<AssociationTable, ApiError> {
        let policies = self.client.policies(self.cloudlet_id)?;
        let mut table = AssociationTable::new();
        for policy in &policies {
            let association = PolicyAssociation::from_policy(policy);
            if table.get(&association.name).is_some() {
                warn!(policy = %association.name, "duplicate policy name; keeping the later entry");
            }
            table.insert(
                association.name,
                AssociationEntry {
                    policy_id: association.policy_id,
                    version: association.version,
                    properties: association.properties,
                    load_balancer_ids: LoadBalancerLinks::Pending,
                },
            );
        }
        Ok(table)
    }

    /// Fills in the load-balancer IDs of every pending row.
    ///
    /// Rows without a resolved version become
    /// [`LoadBalancerLinks::Unresolved`]. A rule set the control plane
    /// refuses to return marks its row [`LoadBalancerLinks::Skipped`].
    ///
    /// # Errors
    /// Returns [`ApiError`] for failures other than a refused rule set.
    pub fn link_load_balancers(&self, table: &mut AssociationTable) -> Result<(), ApiError> {
        for (name, entry) in &mut table.entries {
            if entry.load_balancer_ids != LoadBalancerLinks::Pending {
                continue;
            }
            entry.load_balancer_ids = match entry.version {
                PolicyVersion::Unresolved => LoadBalancerLinks::Unresolved,
                PolicyVersion::Resolved(version) => {
                    match self.resolve_load_balancer_ids(&entry.policy_id, version) {
                        Ok(ids) => LoadBalancerLinks::Linked(ids),
                        Err(error) if error.is_remote_rejection() => {
                            warn!(policy = %name, %error, "skipping policy");
                            LoadBalancerLinks::Skipped {
                                reason: error.to_string(),
                            }
                        }
                        Err(error) => return Err(error),
                    }
                }
            };
        }
        Ok(())
    }

    /// Load-balancer IDs referenced by the match rules of one policy version.
    ///
    /// A rule set with no match rules yields an empty set.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the rule set cannot be fetched.
    pub fn resolve_load_balancer_ids(
        &self,
        policy_id: &PolicyId,
        version: u64,
    ) -> Result<BTreeSet<String>, ApiError> {
        let document = self.client.policy_version(policy_id, version)?;
        let ids = document.forwarded_origin_ids();
        debug!(policy_id = %policy_id, version, count = ids.len(), "load balancing IDs resolved");
        Ok(ids)
    }

    /// Origins configured on the staging-active version of `load_id`.
    ///
    /// Staging is used regardless of what is live in production. Returns
    /// `Ok(None)` when nothing is active on staging.
    ///
    /// # Errors
    /// Returns [`ApiError`] when either remote call fails.
    pub fn resolve_origins(&self, load_id: &str) -> Result<Option<BTreeSet<String>>, ApiError> {
        let versions = VersionResolver::new(&self.client);
        Ok(versions
            .fetch_active(Network::Staging, load_id)?
            .map(|config| config.origin_ids()))
    }
}
