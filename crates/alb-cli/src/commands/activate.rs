//! `activate`: put an existing version live on a network.

use std::io::Write;

use alb_cloudlets::{ControlPlane, PublishError, Publisher};

use crate::cli::ActivateArgs;
use crate::errors::AppError;

pub(super) fn run<W: Write>(
    client: &dyn ControlPlane,
    args: &ActivateArgs,
    out: &mut W,
) -> Result<(), AppError> {
    writeln!(
        out,
        "INFO: activating version {} of {} on {}",
        args.version_number, args.load_id, args.network
    )?;
    match Publisher::new(client).activate(&args.load_id, args.version_number, args.network) {
        Ok(()) => writeln!(
            out,
            "INFO: version {} activated on {}",
            args.version_number, args.network
        )?,
        Err(error @ PublishError::ActivationFailed { .. }) => writeln!(out, "ERROR: {error}")?,
        Err(PublishError::Api(error)) => return Err(error.into()),
    }
    Ok(())
}
