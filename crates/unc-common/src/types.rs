//! Domain primitive types used across the unc workspace.

use std::fmt;

use crate::constants::SHELL_ENV;
use crate::error::{Result, UncError};

/// A single request to run one program inside a new container.
///
/// Built once per invocation and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRequest {
    command: Vec<String>,
    uid: u32,
    gid: u32,
}

impl ContainerRequest {
    /// Creates a request for `command` on behalf of the given host identity.
    ///
    /// # Errors
    ///
    /// Returns an error if `command` is empty.
    pub fn new(command: Vec<String>, uid: u32, gid: u32) -> Result<Self> {
        if command.is_empty() || command[0].is_empty() {
            return Err(UncError::Config {
                message: "container command is empty".into(),
            });
        }
        Ok(Self { command, uid, gid })
    }

    /// Creates a request from raw CLI arguments, falling back to `shell`
    /// when no arguments were given.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no arguments and no shell is known.
    pub fn from_invocation(
        args: Vec<String>,
        shell: Option<String>,
        uid: u32,
        gid: u32,
    ) -> Result<Self> {
        if !args.is_empty() {
            return Self::new(args, uid, gid);
        }
        let shell = shell
            .filter(|s| !s.is_empty())
            .ok_or_else(|| UncError::Config {
                message: format!("no command given and ${SHELL_ENV} is not set"),
            })?;
        Self::new(vec![shell], uid, gid)
    }

    /// Target program as given by the user (not yet resolved on `PATH`).
    pub fn program(&self) -> &str {
        &self.command[0]
    }

    /// Full command line, program first.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Invoking host user id.
    pub const fn uid(&self) -> u32 {
        self.uid
    }

    /// Invoking host group id.
    pub const fn gid(&self) -> u32 {
        self.gid
    }

    /// The identity mapping installed for this request's container.
    pub const fn identity_mapping(&self) -> IdentityMapping {
        IdentityMapping {
            uid: IdMap::root_to(self.uid),
            gid: IdMap::root_to(self.gid),
        }
    }
}

/// One line of a `uid_map` / `gid_map` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMap {
    /// First id inside the namespace.
    pub container_id: u32,
    /// First id on the host.
    pub host_id: u32,
    /// Number of consecutive ids mapped.
    pub size: u32,
}

impl IdMap {
    /// Maps container root (0) to a single host id.
    pub const fn root_to(host_id: u32) -> Self {
        Self {
            container_id: 0,
            host_id,
            size: 1,
        }
    }
}

impl fmt::Display for IdMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.container_id, self.host_id, self.size)
    }
}

/// User and group mapping for one container. Exactly one entry each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityMapping {
    /// Entry written to `uid_map`.
    pub uid: IdMap,
    /// Entry written to `gid_map`.
    pub gid: IdMap,
}

/// How the container's init process terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerExit {
    /// Exited normally with the given status.
    Exited(i32),
    /// Killed by the given signal number.
    Signaled(i32),
}

impl ContainerExit {
    /// Shell-style exit code: the status itself, or `128 + signal`.
    pub const fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signal) => 128 + signal,
        }
    }
}

impl fmt::Display for ContainerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled(signal) => write!(f, "killed by signal {signal}"),
        }
    }
}
