//! Construction of the control-plane client used by commands.

use alb_cloudlets::{ControlPlane, EdgeGridClient};
use alb_config::{Config, CredentialOverrides, CredentialSource};
use tracing::debug;

use crate::errors::AppError;

/// Builds a connected control plane for one command run.
pub(crate) trait ClientFactory {
    /// Resolves credentials and returns a ready client.
    fn connect(
        &self,
        overrides: &CredentialOverrides,
        config: &Config,
    ) -> Result<Box<dyn ControlPlane>, AppError>;
}

/// Signs requests with the credentials found in the `.edgerc` file.
pub(crate) struct EdgeGridFactory;

impl ClientFactory for EdgeGridFactory {
    fn connect(
        &self,
        overrides: &CredentialOverrides,
        config: &Config,
    ) -> Result<Box<dyn ControlPlane>, AppError> {
        let source = CredentialSource::resolve(overrides, config);
        debug!(path = %source.path, section = %source.section, "loading credentials");
        let credentials = source.load()?;
        let client = EdgeGridClient::new(&credentials, config.request_timeout())?;
        Ok(Box::new(client))
    }
}
