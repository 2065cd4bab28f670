//! `update`: reweight data centers and publish a new version.

use std::io::Write;

use alb_cloudlets::{
    ActivationOutcome, ControlPlane, Network, UpdateError, UpdateOutcome, WeightError,
    WeightUpdate, run_update,
};

use crate::cli::UpdateArgs;
use crate::errors::AppError;

pub(super) fn run<W: Write>(
    client: &dyn ControlPlane,
    args: &UpdateArgs,
    out: &mut W,
) -> Result<(), AppError> {
    let request = build_request(args);
    writeln!(
        out,
        "INFO: getting the latest active version in {}",
        request.base_network
    )?;

    match run_update(client, &request) {
        Ok(UpdateOutcome::NoActiveVersion { .. }) => {
            writeln!(out, "ERROR: load balancing ID or active version(s) not found")?;
        }
        Ok(UpdateOutcome::Published {
            new_version,
            activation,
            ..
        }) => {
            writeln!(out, "INFO: new version is {new_version}")?;
            if let Some(outcome) = activation {
                report_activation(out, &request.load_id, new_version, outcome)?;
            }
        }
        Err(UpdateError::Weights(error)) => report_rejection(out, &error)?,
        Err(UpdateError::Api(error)) => return Err(error.into()),
    }
    Ok(())
}

fn build_request(args: &UpdateArgs) -> WeightUpdate {
    let base = if args.stage {
        Network::Staging
    } else {
        Network::Production
    };
    WeightUpdate {
        activate: args.activate,
        ..WeightUpdate::new(args.load_id.clone(), args.data_centers.clone()).based_on(base)
    }
}

fn report_rejection<W: Write>(out: &mut W, error: &WeightError) -> std::io::Result<()> {
    writeln!(out, "ERROR: {error}")?;
    match error {
        WeightError::UnknownDataCenter { .. } => writeln!(out, "ERROR: data center(s) not found"),
        WeightError::WeightSum { .. } => writeln!(
            out,
            "ERROR: weights sum doesn't add to 100.0. Please check the weights."
        ),
    }
}

fn report_activation<W: Write>(
    out: &mut W,
    load_id: &str,
    version: u64,
    outcome: ActivationOutcome,
) -> std::io::Result<()> {
    writeln!(out, "INFO: activating the new load balancing version")?;
    match outcome {
        ActivationOutcome::Activated { network } => {
            writeln!(out, "INFO: version {version} activated on {network}")
        }
        ActivationOutcome::Failed { .. } => writeln!(
            out,
            "ERROR: load balancing ID {load_id} or version {version} not found"
        ),
    }
}
