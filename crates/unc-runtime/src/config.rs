//! Per-process configuration of the init stage.
//!
//! Built once inside the init process from its own arguments and working
//! directory, then passed by reference to every setup step. Nothing here
//! is shared with, or received from, the launcher.

use std::path::PathBuf;

use unc_common::constants::HOSTNAME;
use unc_common::error::{Result, UncError};
use unc_core::filesystem::mount::{MountSpec, default_mount_table};
use unc_core::network::address::random_container_cidr;

/// Everything the init stage needs to turn itself into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Absolute path of the program to exec.
    pub path: PathBuf,
    /// Argument vector passed to the program, `argv[0]` included.
    pub args: Vec<String>,
    /// UTS hostname.
    pub hostname: String,
    /// Mount table, applied in order under `rootfs`.
    pub mounts: Vec<MountSpec>,
    /// Directory that becomes `/`.
    pub rootfs: PathBuf,
    /// Container address in CIDR form, parsed only when it is assigned.
    pub ip: String,
}

impl Config {
    /// Resolves `command` on `PATH`, captures the working directory as the
    /// root filesystem, and samples a container address.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty, the program cannot be
    /// found, or the working directory cannot be read.
    pub fn resolve(command: &[String]) -> Result<Self> {
        let program = command.first().ok_or_else(|| UncError::Config {
            message: "init started without a command".into(),
        })?;
        let path = which::which(program).map_err(|e| UncError::NotFound {
            kind: "program",
            id: format!("{program}: {e}"),
        })?;
        let rootfs = std::env::current_dir().map_err(|e| UncError::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        Ok(Self::with_parts(
            path,
            command.to_vec(),
            rootfs,
            random_container_cidr(),
        ))
    }

    /// Assembles a config with the default hostname and mount table.
    pub fn with_parts(path: PathBuf, args: Vec<String>, rootfs: PathBuf, ip: String) -> Self {
        Self {
            path,
            args,
            hostname: HOSTNAME.to_string(),
            mounts: default_mount_table(),
            rootfs,
            ip,
        }
    }
}
