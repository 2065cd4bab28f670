//! The fetch → index → edit → publish → activate pipeline.

use thiserror::Error;
use tracing::info;

use crate::client::ControlPlane;
use crate::error::ApiError;
use crate::index::OriginIndex;
use crate::model::Network;
use crate::publish::{PublishError, Publisher};
use crate::versions::VersionResolver;
use crate::weights::{self, WeightError, WeightOverrides};

/// A request to reweight the data centers of one load-balancer ID.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightUpdate {
    /// Load-balancer identifier.
    pub load_id: String,
    /// Weights to replace.
    pub overrides: WeightOverrides,
    /// Network whose active version is used as the starting point.
    pub base_network: Network,
    /// Network to activate the new version on, if any.
    pub activate: Option<Network>,
}

impl WeightUpdate {
    /// Creates an update based on the production version, without activation.
    #[must_use]
    pub fn new(load_id: impl Into<String>, overrides: WeightOverrides) -> Self {
        Self {
            load_id: load_id.into(),
            overrides,
            base_network: Network::Production,
            activate: None,
        }
    }

    /// Starts from the version active on `network`.
    #[must_use]
    pub const fn based_on(mut self, network: Network) -> Self {
        self.base_network = network;
        self
    }

    /// Activates the new version on `network` once created.
    #[must_use]
    pub const fn activating_on(mut self, network: Network) -> Self {
        self.activate = Some(network);
        self
    }
}

/// Result of activating a freshly published version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The control plane accepted the activation.
    Activated {
        /// Target network.
        network: Network,
    },
    /// The control plane refused the activation.
    Failed {
        /// Target network.
        network: Network,
        /// HTTP status returned.
        status: u16,
    },
}

/// How an update run ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing is active on the base network, so there is nothing to clone.
    NoActiveVersion {
        /// Network that was queried.
        network: Network,
    },
    /// A new version was created.
    Published {
        /// Version the edit started from.
        source_version: u64,
        /// Version assigned by the control plane.
        new_version: u64,
        /// Activation result, when activation was requested.
        activation: Option<ActivationOutcome>,
    },
}

/// Failures that stop an update before anything is published.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The override batch was rejected.
    #[error(transparent)]
    Weights(#[from] WeightError),
}

/// Description given to versions produced by the editor.
#[must_use]
pub fn clone_description(source_version: u64) -> String {
    format!("cloned from version {source_version}")
}

/// Runs one weight update against `client`.
///
/// Weights are validated before anything is submitted; a rejected batch
/// creates no version. A refused activation is reported in the outcome
/// rather than as an error, since the version already exists by then.
///
/// # Errors
/// Returns [`UpdateError::Weights`] for a rejected batch and
/// [`UpdateError::Api`] when a remote call fails.
pub fn run_update<C: ControlPlane>(
    client: C,
    request: &WeightUpdate,
) -> Result<UpdateOutcome, UpdateError> {
    let versions = VersionResolver::new(&client);
    let Some(source_version) =
        versions.resolve_active_version(request.base_network, &request.load_id)?
    else {
        return Ok(UpdateOutcome::NoActiveVersion {
            network: request.base_network,
        });
    };
    info!(
        load_id = %request.load_id,
        network = %request.base_network,
        version = source_version,
        "retrieving active version"
    );
    let source = versions.fetch_version(&request.load_id, source_version)?;
    let index = OriginIndex::build(&source.data_centers);
    let mut edited = weights::apply(&source, &index, &request.overrides)?;
    edited.description = clone_description(source_version);

    let publisher = Publisher::new(&client);
    let new_version = publisher.publish(&edited)?;
    let activation = request
        .activate
        .map(|network| activate(&publisher, &request.load_id, new_version, network))
        .transpose()?;
    Ok(UpdateOutcome::Published {
        source_version,
        new_version,
        activation,
    })
}

fn activate<C: ControlPlane>(
    publisher: &Publisher<C>,
    load_id: &str,
    version: u64,
    network: Network,
) -> Result<ActivationOutcome, ApiError> {
    match publisher.activate(load_id, version, network) {
        Ok(()) => Ok(ActivationOutcome::Activated { network }),
        Err(PublishError::ActivationFailed { status, .. }) => {
            Ok(ActivationOutcome::Failed { network, status })
        }
        Err(PublishError::Api(error)) => Err(error),
    }
}
