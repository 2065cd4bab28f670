//! Diagnostic log format selection.
//!
//! Logs never share a stream with command output: report lines such as
//! `INFO: new version is 4` are written to stdout, while tracing events go to
//! stderr in the format chosen here. Operators usually read the compact form
//! alongside the report; the JSON form is for shipping runs to a log store.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How tracing events are rendered on stderr.
///
/// Accepted spellings are case-insensitive, so `ALB_LOG_FORMAT=JSON` and
/// `--log-format json` select the same format.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with fields flattened to the top level.
    Json,
    /// Short single-line events for an interactive terminal.
    #[default]
    Compact,
}

impl LogFormat {
    /// Returns true when events carry their originating module path.
    ///
    /// Compact lines stay short enough to read next to the report; JSON
    /// records keep the target for filtering downstream.
    #[must_use]
    pub const fn includes_target(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned when a [`LogFormat`] name is not recognised.
pub type LogFormatParseError = strum::ParseError;
