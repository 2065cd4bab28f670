//! Client abstraction over the cloudlets control-plane API.

use crate::error::ApiError;
use crate::model::{
    ActivationRequest, ActivationStatus, CurrentActivations, LoadBalancerConfiguration,
    NewVersion, Policy, PolicyId, PolicyVersionDocument,
};

/// Remote operations consumed by the resolvers and the publisher.
///
/// [`EdgeGridClient`](crate::EdgeGridClient) talks to the real API; tests
/// substitute in-memory implementations. Calls are blocking and are never
/// retried.
pub trait ControlPlane {
    /// Fetches the active versions of every load-balancer ID.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    fn current_activations(&self) -> Result<CurrentActivations, ApiError>;

    /// Fetches one version of a load-balancer configuration, unvalidated.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    fn load_balancer_version(
        &self,
        load_id: &str,
        version: u64,
    ) -> Result<LoadBalancerConfiguration, ApiError>;

    /// Submits `config` as a new version of `load_id`.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    fn create_load_balancer_version(
        &self,
        load_id: &str,
        config: &LoadBalancerConfiguration,
    ) -> Result<NewVersion, ApiError>;

    /// Requests activation of a load-balancer version.
    ///
    /// A refusal by the remote system is reported through the returned
    /// status rather than as an error.
    ///
    /// # Errors
    /// Returns an error only if no response was obtained.
    fn activate_load_balancer(
        &self,
        request: &ActivationRequest,
    ) -> Result<ActivationStatus, ApiError>;

    /// Lists every policy of a cloudlet type.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    fn policies(&self, cloudlet_id: u32) -> Result<Vec<Policy>, ApiError>;

    /// Fetches the rule set of one policy version.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    fn policy_version(
        &self,
        policy_id: &PolicyId,
        version: u64,
    ) -> Result<PolicyVersionDocument, ApiError>;
}

impl<T: ControlPlane + ?Sized> ControlPlane for &T {
    fn current_activations(&self) -> Result<CurrentActivations, ApiError> {
        (**self).current_activations()
    }

    fn load_balancer_version(
        &self,
        load_id: &str,
        version: u64,
    ) -> Result<LoadBalancerConfiguration, ApiError> {
        (**self).load_balancer_version(load_id, version)
    }

    fn create_load_balancer_version(
        &self,
        load_id: &str,
        config: &LoadBalancerConfiguration,
    ) -> Result<NewVersion, ApiError> {
        (**self).create_load_balancer_version(load_id, config)
    }

    fn activate_load_balancer(
        &self,
        request: &ActivationRequest,
    ) -> Result<ActivationStatus, ApiError> {
        (**self).activate_load_balancer(request)
    }

    fn policies(&self, cloudlet_id: u32) -> Result<Vec<Policy>, ApiError> {
        (**self).policies(cloudlet_id)
    }

    fn policy_version(
        &self,
        policy_id: &PolicyId,
        version: u64,
    ) -> Result<PolicyVersionDocument, ApiError> {
        (**self).policy_version(policy_id, version)
    }
}

impl<T: ControlPlane + ?Sized> ControlPlane for Box<T> {
    fn current_activations(&self) -> Result<CurrentActivations, ApiError> {
        (**self).current_activations()
    }

    fn load_balancer_version(
        &self,
        load_id: &str,
        version: u64,
    ) -> Result<LoadBalancerConfiguration, ApiError> {
        (**self).load_balancer_version(load_id, version)
    }

    fn create_load_balancer_version(
        &self,
        load_id: &str,
        config: &LoadBalancerConfiguration,
    ) -> Result<NewVersion, ApiError> {
        (**self).create_load_balancer_version(load_id, config)
    }

    fn activate_load_balancer(
        &self,
        request: &ActivationRequest,
    ) -> Result<ActivationStatus, ApiError> {
        (**self).activate_load_balancer(request)
    }

    fn policies(&self, cloudlet_id: u32) -> Result<Vec<Policy>, ApiError> {
        (**self).policies(cloudlet_id)
    }

    fn policy_version(
        &self,
        policy_id: &PolicyId,
        version: u64,
    ) -> Result<PolicyVersionDocument, ApiError> {
        (**self).policy_version(policy_id, version)
    }
}
