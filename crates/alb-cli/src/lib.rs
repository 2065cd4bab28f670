//! Command-line runtime for the Application Load Balancer cloudlet tool.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! set-up, and command dispatch. Configuration loading and client
//! construction sit behind traits so tests can run whole commands against an
//! in-memory control plane.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use alb_config::VERBOSE_LOG_FILTER;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

mod cli;
mod commands;
mod config;
mod errors;
mod factory;
mod output;
mod telemetry;

use cli::{Cli, CliCommand};
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use errors::AppError;
pub(crate) use factory::{ClientFactory, EdgeGridFactory};

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader, F: ClientFactory> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    factory: &'a F,
}

impl<'a, W, E, L, F> CliRunner<'a, W, E, L, F>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
    F: ClientFactory,
{
    const fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L, factory: &'a F) -> Self {
        Self {
            io,
            loader,
            factory,
        }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let cli = match Cli::try_parse_from(&split.command_arguments) {
            Ok(cli) => cli,
            Err(error) => return self.report_usage(&error),
        };

        match self.execute(&cli.command, &split.config_arguments) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                let _ = writeln!(self.io.stderr, "ERROR: {error}");
                ExitCode::FAILURE
            }
        }
    }

    /// Prints clap's rendering of a parse outcome.
    ///
    /// Malformed arguments exit successfully after printing usage, matching
    /// help and version requests.
    fn report_usage(&mut self, error: &clap::Error) -> ExitCode {
        let rendered = error.render();
        match error.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                let _ = write!(self.io.stdout, "{rendered}");
            }
            _ => {
                let _ = write!(self.io.stderr, "{rendered}");
            }
        }
        ExitCode::SUCCESS
    }

    fn execute(
        &mut self,
        command: &CliCommand,
        config_arguments: &[OsString],
    ) -> Result<(), AppError> {
        if let CliCommand::Help { topic } = command {
            return write_help(&mut *self.io.stdout, topic.as_deref()).map_err(AppError::from);
        }

        let mut config = self.loader.load(config_arguments)?;
        if command.verbose() {
            VERBOSE_LOG_FILTER.clone_into(&mut config.log_filter);
        }
        telemetry::initialise(&config)?;

        let overrides = command.credentials().unwrap_or_default();
        let client = self.factory.connect(&overrides, &config)?;
        commands::dispatch(command, &*client, &config, &mut *self.io.stdout)
    }
}

fn write_help<W: Write>(out: &mut W, topic: Option<&str>) -> std::io::Result<()> {
    let mut command = Cli::command();
    if let Some(subcommand) = topic.and_then(|name| command.find_subcommand_mut(name)) {
        return write!(out, "{}", subcommand.render_long_help());
    }
    if let Some(name) = topic {
        writeln!(out, "ERROR: unknown command {name}")?;
    }
    write!(out, "{}", command.render_long_help())
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with(args, &mut io, &OrthoConfigLoader, &EdgeGridFactory)
}

/// Runs the CLI with a custom configuration loader and client factory.
pub(crate) fn run_with<'a, I, W, E, L, F>(
    args: I,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
    factory: &'a F,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    F: ClientFactory,
{
    CliRunner::new(io, loader, factory).run(args)
}

#[cfg(test)]
mod tests;
