//! Shared configuration for the Application Load Balancer operator tool.
//!
//! [`Config`] is layered by `ortho_config`: built-in defaults, an optional
//! configuration file, `ALB_*` environment variables, and finally the
//! configuration flags that precede the command on the command line. The
//! [`credentials`] module resolves and parses the `.edgerc` file that holds
//! the control-plane host and API client tokens.

pub mod credentials;
mod defaults;
mod logging;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use credentials::{CredentialOverrides, CredentialSource, Credentials, CredentialsError, EdgeRc};
pub use defaults::{
    DEFAULT_CLOUDLET_ID, DEFAULT_EDGERC_FILE, DEFAULT_EDGERC_SECTION, DEFAULT_LOG_FILTER,
    DEFAULT_REQUEST_TIMEOUT_SECS, EDGERC_ENV, EDGERC_SECTION_ENV, VERBOSE_LOG_FILTER,
    default_cloudlet_id, default_log_filter, default_log_filter_string, default_log_format,
    default_request_timeout_secs,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for the `alb` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "ALB")]
pub struct Config {
    /// Credentials file to read instead of the default lookup chain.
    #[serde(default)]
    pub edgerc: Option<Utf8PathBuf>,
    /// Section of the credentials file holding the API client.
    #[serde(default)]
    pub section: Option<String>,
    /// Tracing filter expression, for example `info` or `alb_cloudlets=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for diagnostic logs.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Cloudlet type whose policies are searched.
    #[serde(default = "default_cloudlet_id")]
    #[ortho_config(default = default_cloudlet_id())]
    pub cloudlet_id: u32,
    /// Per-request timeout for control-plane calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    #[ortho_config(default = default_request_timeout_secs())]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edgerc: None,
            section: None,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            cloudlet_id: default_cloudlet_id(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Diagnostic log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Cloudlet type identifier used for policy listings.
    #[must_use]
    pub const fn cloudlet_id(&self) -> u32 {
        self.cloudlet_id
    }

    /// Request timeout as a [`std::time::Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
