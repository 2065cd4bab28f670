//! In-memory [`ControlPlane`] for tests.
//!
//! Clones share their recorded calls, so a test can hand one clone to the
//! code under test and inspect another afterwards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::client::ControlPlane;
use crate::error::ApiError;
use crate::model::{
    ActivationRequest, ActivationStatus, CurrentActivations, LoadBalancerConfiguration, Network,
    NewVersion, Policy, PolicyId, PolicyVersionDocument,
};

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<String>,
    created: Vec<LoadBalancerConfiguration>,
    activations: Vec<ActivationRequest>,
}

/// Control plane backed by fixed documents.
///
/// Unknown objects answer with HTTP 404, the way the real API does.
#[derive(Debug, Clone)]
pub struct FakeControlPlane {
    activations: CurrentActivations,
    versions: HashMap<(String, u64), LoadBalancerConfiguration>,
    policies: Vec<Policy>,
    rules: HashMap<(PolicyId, u64), PolicyVersionDocument>,
    refused_rules: HashMap<(PolicyId, u64), u16>,
    activation_status: u16,
    recorded: Rc<RefCell<Recorded>>,
}

impl Default for FakeControlPlane {
    fn default() -> Self {
        Self {
            activations: CurrentActivations::default(),
            versions: HashMap::new(),
            policies: Vec::new(),
            rules: HashMap::new(),
            refused_rules: HashMap::new(),
            activation_status: 200,
            recorded: Rc::default(),
        }
    }
}

impl FakeControlPlane {
    /// Creates an empty control plane that accepts every activation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `config` and marks it active on `network`.
    #[must_use]
    pub fn with_active(mut self, network: Network, config: LoadBalancerConfiguration) -> Self {
        self.activations
            .insert(config.load_id.clone(), network, config.version);
        self.with_version(config)
    }

    /// Adds `config` without activating it.
    #[must_use]
    pub fn with_version(mut self, config: LoadBalancerConfiguration) -> Self {
        self.versions
            .insert((config.load_id.clone(), config.version), config);
        self
    }

    /// Adds a policy to the listing.
    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Sets the rule set of one policy version.
    #[must_use]
    pub fn with_rules(
        mut self,
        policy_id: PolicyId,
        version: u64,
        document: PolicyVersionDocument,
    ) -> Self {
        self.rules.insert((policy_id, version), document);
        self
    }

    /// Makes the rule set of one policy version answer with `status`.
    #[must_use]
    pub fn with_refused_rules(mut self, policy_id: PolicyId, version: u64, status: u16) -> Self {
        self.refused_rules.insert((policy_id, version), status);
        self
    }

    /// Sets the status returned for every activation request.
    #[must_use]
    pub const fn with_activation_status(mut self, status: u16) -> Self {
        self.activation_status = status;
        self
    }

    /// Names of the remote operations invoked so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.recorded.borrow().calls.clone()
    }

    /// Configurations submitted as new versions, in order.
    #[must_use]
    pub fn created_versions(&self) -> Vec<LoadBalancerConfiguration> {
        self.recorded.borrow().created.clone()
    }

    /// Activation requests received, in order.
    #[must_use]
    pub fn activation_requests(&self) -> Vec<ActivationRequest> {
        self.recorded.borrow().activations.clone()
    }

    fn record(&self, call: String) {
        self.recorded.borrow_mut().calls.push(call);
    }

    fn next_version(&self, load_id: &str) -> u64 {
        let latest = self
            .versions
            .keys()
            .filter(|(id, _)| id == load_id)
            .map(|(_, version)| *version)
            .max()
            .unwrap_or_default();
        let created = self
            .recorded
            .borrow()
            .created
            .iter()
            .filter(|config| config.load_id == load_id)
            .count();
        latest + u64::try_from(created).unwrap_or(u64::MAX - latest) + 1
    }
}

fn not_found(endpoint: String) -> ApiError {
    ApiError::status(endpoint, 404, "not found")
}

impl ControlPlane for FakeControlPlane {
    fn current_activations(&self) -> Result<CurrentActivations, ApiError> {
        self.record(String::from("current_activations"));
        Ok(self.activations.clone())
    }

    fn load_balancer_version(
        &self,
        load_id: &str,
        version: u64,
    ) -> Result<LoadBalancerConfiguration, ApiError> {
        let call = format!("load_balancer_version {load_id} {version}");
        self.record(call.clone());
        self.versions
            .get(&(load_id.to_owned(), version))
            .cloned()
            .ok_or_else(|| not_found(call))
    }

    fn create_load_balancer_version(
        &self,
        load_id: &str,
        config: &LoadBalancerConfiguration,
    ) -> Result<NewVersion, ApiError> {
        self.record(format!("create_load_balancer_version {load_id}"));
        let version = self.next_version(load_id);
        self.recorded.borrow_mut().created.push(config.clone());
        Ok(NewVersion { version })
    }

    fn activate_load_balancer(
        &self,
        request: &ActivationRequest,
    ) -> Result<ActivationStatus, ApiError> {
        self.record(format!(
            "activate_load_balancer {} {} {}",
            request.origin_id, request.version, request.network
        ));
        self.recorded.borrow_mut().activations.push(request.clone());
        Ok(ActivationStatus {
            status: self.activation_status,
        })
    }

    fn policies(&self, cloudlet_id: u32) -> Result<Vec<Policy>, ApiError> {
        self.record(format!("policies {cloudlet_id}"));
        Ok(self.policies.clone())
    }

    fn policy_version(
        &self,
        policy_id: &PolicyId,
        version: u64,
    ) -> Result<PolicyVersionDocument, ApiError> {
        let call = format!("policy_version {policy_id} {version}");
        self.record(call.clone());
        let key = (policy_id.clone(), version);
        if let Some(status) = self.refused_rules.get(&key) {
            return Err(ApiError::status(call, *status, "refused"));
        }
        self.rules.get(&key).cloned().ok_or_else(|| not_found(call))
    }
}
