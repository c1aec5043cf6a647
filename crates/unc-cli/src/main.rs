//! # unc — run a program in fresh Linux namespaces
//!
//! Daemon-less, single-container runtime. The same binary is both the
//! launcher the user runs and the init stage re-executed inside the new
//! namespaces; the role is decided from `argv[0]` before any parsing.

mod commands;

use clap::Parser;
use unc_runtime::role::{self, Role};

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match role::detect(std::env::args()) {
        Role::Init(command) => match unc_runtime::init::run(&command) {
            Ok(never) => match never {},
            Err(e) => Err(anyhow::Error::new(e).context("container init failed")),
        },
        Role::Launcher => {
            let cli = Cli::parse();
            let code = commands::execute(cli)?;
            std::process::exit(code)
        }
    }
}
