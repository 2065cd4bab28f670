//! Layering tests for [`Config::load_from_iter`].

use std::ffi::OsString;
use std::fs;

use ortho_config::OrthoConfig;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use alb_config::{Config, LogFormat};

struct Harness {
    temp_dir: TempDir,
    args: Vec<OsString>,
    env_overrides: Vec<(String, Option<OsString>)>,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            args: vec![OsString::from("alb")],
            env_overrides: Vec::new(),
        }
    }

    fn write_config(&mut self, body: &str) {
        let path = self.temp_dir.path().join("alb.toml");
        if let Err(error) = fs::write(&path, body) {
            panic!("failed to write configuration: {error}");
        }
        self.args.push(OsString::from("--config-path"));
        self.args.push(path.into_os_string());
    }

    fn set_env(&mut self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` in edition 2024; `Drop` restores it.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides.push((key.to_owned(), previous));
    }

    fn push_arg(&mut self, arg: &str) {
        self.args.push(OsString::from(arg));
    }

    fn load(&self) -> Config {
        match Config::load_from_iter(self.args.clone()) {
            Ok(config) => config,
            Err(error) => panic!("configuration failed to load: {error}"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        while let Some((key, value)) = self.env_overrides.pop() {
            if let Some(os_value) = value {
                unsafe { std::env::set_var(&key, os_value) };
            } else {
                unsafe { std::env::remove_var(&key) };
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
fn defaults_apply_without_sources(harness: Harness) {
    let config = harness.load();
    assert_eq!(config.cloudlet_id, 9);
    assert_eq!(config.log_format, LogFormat::Compact);
}

#[rstest]
fn configuration_file_overrides_defaults(mut harness: Harness) {
    harness.write_config("cloudlet_id = 12\nsection = \"alb-ops\"\nlog_format = \"json\"\n");
    let config = harness.load();
    assert_eq!(config.cloudlet_id, 12);
    assert_eq!(config.section.as_deref(), Some("alb-ops"));
    assert_eq!(config.log_format, LogFormat::Json);
}

#[rstest]
fn command_line_overrides_configuration_file(mut harness: Harness) {
    harness.write_config("cloudlet_id = 12\n");
    harness.push_arg("--cloudlet-id");
    harness.push_arg("15");
    let config = harness.load();
    assert_eq!(config.cloudlet_id, 15);
}

#[rstest]
fn environment_overrides_configuration_file(mut harness: Harness) {
    harness.write_config("request_timeout_secs = 5\n");
    harness.set_env("ALB_REQUEST_TIMEOUT_SECS", "45");
    let config = harness.load();
    assert_eq!(config.request_timeout_secs, 45);
}
