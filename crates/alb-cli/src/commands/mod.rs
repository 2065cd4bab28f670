//! Command handlers.
//!
//! Each handler writes its report lines to `out` and returns `Err` only for
//! failures that should end the process unsuccessfully.

mod activate;
mod search;
mod update;

use std::io::Write;

use alb_cloudlets::ControlPlane;
use alb_config::Config;

use crate::cli::CliCommand;
use crate::errors::AppError;

/// Runs an API-backed command against `client`.
pub(crate) fn dispatch<W: Write>(
    command: &CliCommand,
    client: &dyn ControlPlane,
    config: &Config,
    out: &mut W,
) -> Result<(), AppError> {
    match command {
        CliCommand::Update(args) => update::run(client, args, out),
        CliCommand::Activate(args) => activate::run(client, args, out),
        CliCommand::Search(args) => search::run(client, config.cloudlet_id(), args, out),
        CliCommand::Help { .. } => Ok(()),
    }
}
