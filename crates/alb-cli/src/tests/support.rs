//! Harness types for running CLI commands against an in-memory control plane.
//!
//! Supplies a static configuration loader, a client factory that hands out
//! clones of a [`FakeControlPlane`], and the shared behaviour-test world.

use std::cell::RefCell;
use std::ffi::OsString;
use std::process::ExitCode;

use alb_cloudlets::testing::FakeControlPlane;
use alb_cloudlets::{
    Activation, ControlPlane, DataCenterEntry, LoadBalancerConfiguration, MatchRule, Network,
    Policy, PolicyId, PolicyVersionDocument,
};
use alb_config::{Config, CredentialOverrides, CredentialsError};
use anyhow::{Context, Result, ensure};
use camino::Utf8PathBuf;

use crate::{AppError, ClientFactory, ConfigLoader, IoStreams, run_with};

pub(super) const LOAD_ID: &str = "alb_example";
pub(super) const POLICY_NAME: &str = "alb_policy";
pub(super) const POLICY_ID: &str = "101";

pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Hands out the same fake control plane to every command.
pub(super) struct FakeFactory {
    plane: FakeControlPlane,
    refuse_credentials: bool,
    connections: RefCell<Vec<CredentialOverrides>>,
}

impl FakeFactory {
    pub(super) fn new(plane: FakeControlPlane, refuse_credentials: bool) -> Self {
        Self {
            plane,
            refuse_credentials,
            connections: RefCell::new(Vec::new()),
        }
    }

    pub(super) fn connections(&self) -> Vec<CredentialOverrides> {
        self.connections.borrow().clone()
    }
}

impl ClientFactory for FakeFactory {
    fn connect(
        &self,
        overrides: &CredentialOverrides,
        _config: &Config,
    ) -> Result<Box<dyn ControlPlane>, AppError> {
        self.connections.borrow_mut().push(overrides.clone());
        if self.refuse_credentials {
            return Err(AppError::Credentials(CredentialsError::MissingSection {
                section: String::from("cloudlets"),
                path: Utf8PathBuf::from("/nonexistent/.edgerc"),
            }));
        }
        Ok(Box::new(self.plane.clone()))
    }
}

/// Output of one CLI run.
pub(super) struct Outcome {
    pub(super) exit_code: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

pub(super) fn build_args(command: &str) -> Vec<OsString> {
    let mut args = vec![OsString::from("alb")];
    args.extend(
        command
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .map(|token| OsString::from(token.trim_matches('"'))),
    );
    args
}

/// Runs `command` with default configuration against `factory`.
pub(super) fn run_command(factory: &FakeFactory, command: &str) -> Result<Outcome> {
    let loader = StaticConfigLoader::new(Config::default());
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        run_with(build_args(command), &mut io, &loader, factory)
    };
    Ok(Outcome {
        exit_code,
        stdout: String::from_utf8(stdout).context("stdout utf8")?,
        stderr: String::from_utf8(stderr).context("stderr utf8")?,
    })
}

fn weighted(version: u64, weights: &[(&str, f64)]) -> LoadBalancerConfiguration {
    LoadBalancerConfiguration::new(
        LOAD_ID,
        version,
        weights
            .iter()
            .map(|(name, percent)| DataCenterEntry::new(*name, *percent))
            .collect(),
    )
}

/// Version 3 live in production and version 2 live on staging.
pub(super) fn active_load_balancer() -> FakeControlPlane {
    FakeControlPlane::new()
        .with_active(
            Network::Production,
            weighted(3, &[("Dallas", 40.0), ("Fairfield", 30.0), ("Alpharetta", 30.0)]),
        )
        .with_active(Network::Staging, weighted(2, &[("Dallas", 50.0), ("Fairfield", 50.0)]))
}

/// A policy at version 7, activated by one property, forwarding to
/// [`LOAD_ID`].
pub(super) fn linked_policy(plane: FakeControlPlane) -> FakeControlPlane {
    plane
        .with_policy(Policy::new(
            PolicyId::new(POLICY_ID),
            POLICY_NAME,
            vec![Activation::new(Network::Production, Some(7), "www.example.com")],
        ))
        .with_rules(
            PolicyId::new(POLICY_ID),
            7,
            PolicyVersionDocument::new(Some(vec![MatchRule::forwarding_to(LOAD_ID)])),
        )
}

#[derive(Default)]
pub(super) struct TestWorld {
    pub plane: FakeControlPlane,
    pub refuse_credentials: bool,
    pub outcome: Option<Outcome>,
}

impl TestWorld {
    pub fn run(&mut self, command: &str) -> Result<()> {
        let factory = FakeFactory::new(self.plane.clone(), self.refuse_credentials);
        self.outcome = Some(run_command(&factory, command)?);
        Ok(())
    }

    fn outcome(&self) -> Result<&Outcome> {
        self.outcome.as_ref().context("command has not run")
    }

    pub fn assert_stdout_contains(&self, snippet: &str) -> Result<()> {
        let stdout = &self.outcome()?.stdout;
        ensure!(
            stdout.contains(snippet),
            "stdout {stdout:?} did not contain {snippet:?}"
        );
        Ok(())
    }

    pub fn assert_stderr_contains(&self, snippet: &str) -> Result<()> {
        let stderr = &self.outcome()?.stderr;
        ensure!(
            stderr.contains(snippet),
            "stderr {stderr:?} did not contain {snippet:?}"
        );
        Ok(())
    }

    pub fn assert_exit(&self, expected: ExitCode) -> Result<()> {
        let exit = self.outcome()?.exit_code;
        ensure!(exit == expected, "expected {expected:?}, got {exit:?}");
        Ok(())
    }
}
