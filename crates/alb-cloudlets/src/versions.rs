//! Active-version lookup and configuration retrieval.

use tracing::{debug, warn};

use crate::client::ControlPlane;
use crate::error::ApiError;
use crate::model::{LoadBalancerConfiguration, Network};

/// Resolves which load-balancer version is live and fetches its contents.
pub struct VersionResolver<C> {
    client: C,
}

impl<C> VersionResolver<C> {
    /// Creates a resolver over `client`.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: ControlPlane> VersionResolver<C> {
    /// Version of `load_id` currently active on `network`.
    ///
    /// Returns `Ok(None)` when the ID is unknown or has nothing active on
    /// that network; callers must not continue with a missing version.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the activation record cannot be fetched.
    pub fn resolve_active_version(
        &self,
        network: Network,
        load_id: &str,
    ) -> Result<Option<u64>, ApiError> {
        let activations = self.client.current_activations()?;
        match activations.version_on(load_id, network) {
            Some(version) => {
                debug!(load_id, %network, version, "active version resolved");
                Ok(Some(version))
            }
            None => {
                warn!(load_id, %network, "load balancing ID or active version not found");
                Ok(None)
            }
        }
    }

    /// Fetches the full configuration document of one version.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the document cannot be fetched or decoded.
    pub fn fetch_version(
        &self,
        load_id: &str,
        version: u64,
    ) -> Result<LoadBalancerConfiguration, ApiError> {
        let config = self.client.load_balancer_version(load_id, version)?;
        debug!(
            load_id,
            version,
            data_centers = config.data_centers.len(),
            "configuration fetched"
        );
        Ok(config)
    }

    /// Fetches the configuration active on `network`, if there is one.
    ///
    /// # Errors
    /// Returns [`ApiError`] when either remote call fails.
    pub fn fetch_active(
        &self,
        network: Network,
        load_id: &str,
    ) -> Result<Option<LoadBalancerConfiguration>, ApiError> {
        self.resolve_active_version(network, load_id)?
            .map(|version| self.fetch_version(load_id, version))
            .transpose()
    }
}
