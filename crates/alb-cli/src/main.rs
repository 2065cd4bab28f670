//! CLI entrypoint for the Application Load Balancer cloudlet tool.
//!
//! The binary delegates to [`alb_cli::run`], which loads configuration,
//! parses the command line, and talks to the cloudlets API.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    alb_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
