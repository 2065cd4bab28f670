//! CLI argument definitions for the `alb` tool.

use alb_cloudlets::{Network, WeightOverrides};
use alb_config::CredentialOverrides;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Application Load Balancer cloudlet weights updater.
#[derive(Parser, Debug)]
#[command(
    name = "alb",
    version,
    about = "Application Load Balancer cloudlet weights updater",
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Shows help for the tool or for one command.
    Help {
        /// Command to describe.
        #[arg(value_name = "COMMAND")]
        topic: Option<String>,
    },
    /// Reweights the data centers of a load balancing ID and publishes a new version.
    Update(UpdateArgs),
    /// Activates a load balancing ID version on staging or production.
    Activate(ActivateArgs),
    /// Searches for policies and load balancing IDs.
    Search(SearchArgs),
}

impl CliCommand {
    /// Credential overrides given to the command, if it talks to the API.
    pub(crate) fn credentials(&self) -> Option<CredentialOverrides> {
        match self {
            Self::Help { .. } => None,
            Self::Update(args) => Some(args.credentials.overrides()),
            Self::Activate(args) => Some(args.credentials.overrides()),
            Self::Search(args) => Some(args.credentials.overrides()),
        }
    }

    /// Returns true when `--verbose` was given.
    pub(crate) const fn verbose(&self) -> bool {
        match self {
            Self::Update(args) => args.verbose,
            Self::Activate(args) => args.verbose,
            Self::Help { .. } | Self::Search(_) => false,
        }
    }
}

/// Location of the API credentials.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct CredentialArgs {
    /// Credentials file [default: ~/.edgerc].
    #[arg(long, value_name = "PATH")]
    pub(crate) edgerc: Option<Utf8PathBuf>,
    /// Section of the credentials file [default: cloudlets].
    #[arg(long, value_name = "NAME")]
    pub(crate) section: Option<String>,
}

impl CredentialArgs {
    fn overrides(&self) -> CredentialOverrides {
        CredentialOverrides {
            edgerc: self.edgerc.clone(),
            section: self.section.clone(),
        }
    }
}

/// Arguments of `update`.
#[derive(Args, Debug, Clone)]
pub(crate) struct UpdateArgs {
    /// Load balancing ID name.
    #[arg(long = "loadid", value_name = "NAME")]
    pub(crate) load_id: String,
    /// Data center weights, for example 'DC1:20,DC2:35,DC3:45'.
    #[arg(long = "datacenters", value_name = "NAME:PERCENT,...")]
    pub(crate) data_centers: WeightOverrides,
    /// Start from the version active in staging instead of production.
    #[arg(long)]
    pub(crate) stage: bool,
    /// Activate the new version on this network.
    #[arg(long, value_name = "NETWORK")]
    pub(crate) activate: Option<Network>,
    /// Log every endpoint and response.
    #[arg(long)]
    pub(crate) verbose: bool,
    #[command(flatten)]
    pub(crate) credentials: CredentialArgs,
}

/// Arguments of `activate`.
#[derive(Args, Debug, Clone)]
pub(crate) struct ActivateArgs {
    /// Load balancing ID name.
    #[arg(long = "loadid", value_name = "NAME")]
    pub(crate) load_id: String,
    /// Version of the load balancing ID to activate.
    #[arg(long = "version", value_name = "N")]
    pub(crate) version_number: u64,
    /// Network to activate on.
    #[arg(long, value_name = "NETWORK", default_value_t = Network::Production)]
    pub(crate) network: Network,
    /// Log every endpoint and response.
    #[arg(long)]
    pub(crate) verbose: bool,
    #[command(flatten)]
    pub(crate) credentials: CredentialArgs,
}

/// What `search` looks for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum SearchType {
    /// A policy, by exact name.
    Policy,
    /// A load balancing ID.
    Loadid,
}

/// Arguments of `search`.
#[derive(Args, Debug, Clone)]
pub(crate) struct SearchArgs {
    /// Search for a policy or a load balancing ID.
    #[arg(long = "type", value_enum, value_name = "TYPE")]
    pub(crate) search_type: SearchType,
    /// Name to search for.
    #[arg(long, value_name = "NAME")]
    pub(crate) name: String,
    #[command(flatten)]
    pub(crate) credentials: CredentialArgs,
}
