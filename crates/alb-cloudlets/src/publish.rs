//! Version creation and activation.

use thiserror::Error;
use tracing::{info, warn};

use crate::client::ControlPlane;
use crate::error::ApiError;
use crate::model::{ActivationRequest, LoadBalancerConfiguration, Network};

/// Errors raised while activating a version.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The remote system refused the activation.
    #[error("load balancing ID {load_id} or version {version} not found")]
    ActivationFailed {
        /// Load-balancer identifier.
        load_id: String,
        /// Version that was submitted.
        version: u64,
        /// HTTP status returned.
        status: u16,
    },
    /// No response was obtained.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Persists edited configurations and activates versions.
pub struct Publisher<C> {
    client: C,
}

impl<C> Publisher<C> {
    /// Creates a publisher over `client`.
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: ControlPlane> Publisher<C> {
    /// Submits `config` as a new version and returns its number.
    ///
    /// Every call creates another version; nothing is deduplicated.
    ///
    /// # Errors
    /// Returns [`ApiError`] when the submission fails.
    pub fn publish(&self, config: &LoadBalancerConfiguration) -> Result<u64, ApiError> {
        info!(load_id = %config.load_id, "uploading new version");
        let created = self
            .client
            .create_load_balancer_version(&config.load_id, config)?;
        info!(load_id = %config.load_id, version = created.version, "version created");
        Ok(created.version)
    }

    /// Activates `version` of `load_id` on `network`.
    ///
    /// # Errors
    /// Returns [`PublishError::ActivationFailed`] for a non-success status and
    /// [`PublishError::Api`] when no response was obtained.
    pub fn activate(&self, load_id: &str, version: u64, network: Network) -> Result<(), PublishError> {
        let request = ActivationRequest {
            network,
            origin_id: load_id.to_owned(),
            version,
        };
        info!(load_id, version, %network, "activating load balancing version");
        let status = self.client.activate_load_balancer(&request)?;
        if status.is_success() {
            Ok(())
        } else {
            warn!(load_id, version, status = status.status, "activation refused");
            Err(PublishError::ActivationFailed {
                load_id: load_id.to_owned(),
                version,
                status: status.status,
            })
        }
    }
}
