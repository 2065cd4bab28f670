//! Error types for control-plane calls and the editing pipeline.

use thiserror::Error;

/// Errors returned by [`ControlPlane`](crate::ControlPlane) implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Endpoint that was called.
        endpoint: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// The remote system answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// The response body did not match the expected document schema.
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        /// Endpoint that was called.
        endpoint: String,
        /// Schema mismatch detail.
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialised.
    #[error("failed to serialise request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A request path could not be joined onto the base URL.
    #[error("invalid request URL {path}: {source}")]
    Url {
        /// Path that failed to resolve.
        path: String,
        /// URL parser detail.
        #[source]
        source: url::ParseError,
    },

    /// Request signing failed.
    #[error("failed to sign request: {message}")]
    Signing {
        /// Description of the failure.
        message: String,
    },
}

impl ApiError {
    /// Creates a new `Status` error.
    #[must_use]
    pub fn status(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Returns true when the remote system answered but refused the request.
    ///
    /// Such failures concern a single object and may be skipped during bulk
    /// traversals; everything else points at transport or credentials.
    #[must_use]
    pub const fn is_remote_rejection(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}
