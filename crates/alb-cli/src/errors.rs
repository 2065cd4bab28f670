//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use alb_cloudlets::{ApiError, ResolveError};
use alb_config::CredentialsError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Failures that terminate the process with a non-zero status.
///
/// Recoverable conditions (rejected weights, refused activations, unknown
/// load balancing IDs) are reported on stdout and never become an
/// `AppError`.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Policy Not Found: {name}")]
    PolicyNotFound { name: String },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<ResolveError> for AppError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::PolicyNotFound { name } => Self::PolicyNotFound { name },
            ResolveError::Api(source) => Self::Api(source),
        }
    }
}
