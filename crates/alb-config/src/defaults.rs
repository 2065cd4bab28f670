//! Default values shared by the configuration loader and the CLI.

use crate::logging::LogFormat;

/// Cloudlet type identifier of the Application Load Balancer.
pub const DEFAULT_CLOUDLET_ID: u32 = 9;

/// Default log filter expression used by the binary.
///
/// Warnings only, so operator-facing report lines are not drowned out.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Log filter applied when an operator asks for verbose output.
pub const VERBOSE_LOG_FILTER: &str = "debug";

/// Seconds to wait for a single control-plane request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Credentials file section consulted when none is configured.
pub const DEFAULT_EDGERC_SECTION: &str = "cloudlets";

/// Credentials file name looked up in the home directory.
pub const DEFAULT_EDGERC_FILE: &str = ".edgerc";

/// Environment variable naming an alternative credentials file.
pub const EDGERC_ENV: &str = "AKAMAI_EDGERC";

/// Environment variable naming an alternative credentials section.
pub const EDGERC_SECTION_ENV: &str = "AKAMAI_EDGERC_SECTION";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default cloudlet identifier for policy lookups.
#[must_use]
pub const fn default_cloudlet_id() -> u32 {
    DEFAULT_CLOUDLET_ID
}

/// Default per-request timeout in seconds.
#[must_use]
pub const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
