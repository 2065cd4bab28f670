//! Schema types for the documents exchanged with the control plane.
//!
//! Every remote response is decoded into one of these types at the boundary,
//! so a document missing a required field is rejected before any of the
//! editing or traversal logic sees it. Fields the tool does not interpret are
//! carried through `extra` maps and written back unchanged on publish.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Network a version can be activated on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Network {
    /// The staging network.
    Staging,
    /// The production network.
    Production,
}

/// One weighted destination inside a load-balancer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCenterEntry {
    /// Origin identifier, unique within one configuration.
    pub origin_id: String,
    /// Share of traffic, in percent.
    pub percent: f64,
    /// Fields not interpreted by this tool.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataCenterEntry {
    /// Creates an entry with no additional fields.
    #[must_use]
    pub fn new(origin_id: impl Into<String>, percent: f64) -> Self {
        Self {
            origin_id: origin_id.into(),
            percent,
            extra: Map::new(),
        }
    }
}

/// A versioned origin-weight configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerConfiguration {
    /// Load-balancer identifier (`originId` on the wire).
    #[serde(rename = "originId")]
    pub load_id: String,
    /// Version number assigned by the remote system.
    pub version: u64,
    /// Free-text description of this version.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Weighted destinations, in remote order.
    pub data_centers: Vec<DataCenterEntry>,
    /// Fields not interpreted by this tool.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LoadBalancerConfiguration {
    /// Creates a configuration with an empty description.
    #[must_use]
    pub fn new(load_id: impl Into<String>, version: u64, data_centers: Vec<DataCenterEntry>) -> Self {
        Self {
            load_id: load_id.into(),
            version,
            description: String::new(),
            data_centers,
            extra: Map::new(),
        }
    }

    /// Returns the origin identifiers of every data center.
    #[must_use]
    pub fn origin_ids(&self) -> BTreeSet<String> {
        self.data_centers
            .iter()
            .map(|entry| entry.origin_id.clone())
            .collect()
    }
}

/// Policy identifier; numeric on the wire, kept as text here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PolicyId(String);

impl PolicyId {
    /// Wraps an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PolicyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(number) => Ok(Self(number.to_string())),
            Raw::Text(text) if !text.trim().is_empty() => Ok(Self(text)),
            Raw::Text(_) => Err(de::Error::custom("policyId must not be empty")),
        }
    }
}

/// A named cloudlet policy and its per-network activation state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Policy name, unique per cloudlet type.
    pub name: String,
    /// Activations in remote order; may be empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub activations: Vec<Activation>,
}

impl Policy {
    /// Creates a policy record.
    #[must_use]
    pub fn new(policy_id: PolicyId, name: impl Into<String>, activations: Vec<Activation>) -> Self {
        Self {
            policy_id,
            name: name.into(),
            activations,
        }
    }
}

/// Binding of a policy version to a network through a property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ActivationRecord")]
pub struct Activation {
    /// Network the activation applies to; `None` when the listing reports a
    /// network name this tool does not recognise.
    pub network: Option<Network>,
    /// Active policy version, when the remote system reports one.
    pub policy_version: Option<u64>,
    /// Property that references the policy.
    pub property_name: String,
}

impl Activation {
    /// Creates an activation record.
    #[must_use]
    pub fn new(network: Network, policy_version: Option<u64>, property_name: impl Into<String>) -> Self {
        Self {
            network: Some(network),
            policy_version,
            property_name: property_name.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivationRecord {
    #[serde(default, deserialize_with = "listed_network")]
    network: Option<Network>,
    #[serde(default)]
    policy_info: Option<PolicyInfo>,
    property_info: PropertyInfo,
}

#[derive(Deserialize)]
struct PolicyInfo {
    #[serde(default)]
    version: Option<u64>,
}

#[derive(Deserialize)]
struct PropertyInfo {
    name: String,
}

impl From<ActivationRecord> for Activation {
    fn from(record: ActivationRecord) -> Self {
        Self {
            network: record.network,
            policy_version: record.policy_info.and_then(|info| info.version),
            property_name: record.property_info.name,
        }
    }
}

/// Rule set of one policy version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyVersionDocument {
    /// Match rules; `None` when the remote system reports `null`.
    #[serde(default)]
    pub match_rules: Option<Vec<MatchRule>>,
}

impl PolicyVersionDocument {
    /// Creates a document from its match rules.
    #[must_use]
    pub const fn new(match_rules: Option<Vec<MatchRule>>) -> Self {
        Self { match_rules }
    }

    /// Returns every load-balancer ID a match rule forwards to.
    #[must_use]
    pub fn forwarded_origin_ids(&self) -> BTreeSet<String> {
        self.match_rules
            .iter()
            .flatten()
            .filter_map(MatchRule::origin_id)
            .map(str::to_owned)
            .collect()
    }
}

/// A single match rule of a policy version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRule {
    /// Rule name, when set.
    #[serde(default)]
    pub name: Option<String>,
    /// Forwarding target of the rule.
    #[serde(default)]
    pub forward_settings: Option<ForwardSettings>,
}

impl MatchRule {
    /// Creates a rule forwarding to `origin_id`.
    #[must_use]
    pub fn forwarding_to(origin_id: impl Into<String>) -> Self {
        Self {
            name: None,
            forward_settings: Some(ForwardSettings {
                origin_id: Some(origin_id.into()),
            }),
        }
    }

    /// Load-balancer ID this rule forwards to, if any.
    #[must_use]
    pub fn origin_id(&self) -> Option<&str> {
        self.forward_settings
            .as_ref()
            .and_then(|settings| settings.origin_id.as_deref())
    }
}

/// Forwarding target of a match rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardSettings {
    /// Load-balancer ID receiving the traffic.
    #[serde(default)]
    pub origin_id: Option<String>,
}

/// Currently active load-balancer versions, keyed by load-balancer ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CurrentActivations(HashMap<String, HashMap<String, Option<ActiveVersionInfo>>>);

/// Activation details for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ActiveVersionInfo {
    /// Active version number.
    pub version: u64,
}

impl CurrentActivations {
    /// Records `version` as active on `network` for `load_id`.
    pub fn insert(&mut self, load_id: impl Into<String>, network: Network, version: u64) {
        self.0
            .entry(load_id.into())
            .or_default()
            .insert(network.to_string(), Some(ActiveVersionInfo { version }));
    }

    /// Version of `load_id` active on `network`, if any.
    #[must_use]
    pub fn version_on(&self, load_id: &str, network: Network) -> Option<u64> {
        self.0
            .get(load_id)
            .and_then(|networks| networks.get(&network.to_string()))
            .and_then(|entry| entry.map(|info| info.version))
    }
}

/// Response to a version creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NewVersion {
    /// Version number assigned by the remote system.
    pub version: u64,
}

/// Body of an activation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    /// Network to activate on.
    pub network: Network,
    /// Load-balancer identifier.
    pub origin_id: String,
    /// Version to activate.
    pub version: u64,
}

/// Status the remote system returned for an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationStatus {
    /// HTTP status code.
    pub status: u16,
}

impl ActivationStatus {
    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Policy listings name networks `staging` and `prod` rather than using the
/// activation request spelling.
fn listed_network<'de, D>(deserializer: D) -> Result<Option<Network>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(|name| {
        if name.eq_ignore_ascii_case("prod") {
            Some(Network::Production)
        } else {
            name.parse().ok()
        }
    }))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
