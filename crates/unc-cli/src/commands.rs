//! Argument parsing and the launch command.

use anyhow::Context;
use clap::Parser;
use unc_common::constants::{NETWORK_HELPER, NETWORK_HELPER_ENV, SHELL_ENV};
use unc_common::types::ContainerRequest;
use unc_runtime::helper::NetworkHelper;
use unc_runtime::launcher::Launcher;

/// unc — run a program inside new user, PID, UTS, mount, and network
/// namespaces, rooted at the current directory.
#[derive(Parser, Debug)]
#[command(name = "unc", version, about, long_about = None)]
pub struct Cli {
    /// Privileged helper that attaches the container to the host bridge.
    #[arg(long, env = NETWORK_HELPER_ENV, default_value = NETWORK_HELPER)]
    pub network_helper: String,

    /// Program to run and its arguments. Defaults to `$SHELL`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Launches the container and returns the exit code to mirror.
///
/// # Errors
///
/// Returns an error if the request is invalid or any setup step fails
/// before the target program starts.
pub fn execute(cli: Cli) -> anyhow::Result<i32> {
    let request = ContainerRequest::from_invocation(
        cli.command,
        std::env::var(SHELL_ENV).ok(),
        nix::unistd::getuid().as_raw(),
        nix::unistd::getgid().as_raw(),
    )?;
    let launcher = Launcher::new(NetworkHelper::new(cli.network_helper))?;
    let exit = launcher
        .run(&request)
        .context("container start failed")?;
    Ok(exit.code())
}
