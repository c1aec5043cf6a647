//! Unified error types for the unc workspace.
//!
//! Every stage of the container lifecycle fails fast with one of these
//! variants, naming the operation and the object it acted on.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum UncError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Creating the namespaced child process failed.
    #[error("namespace setup failed: {message}")]
    Namespace {
        /// Description of the failed operation.
        message: String,
    },

    /// Writing a user or group id map failed.
    #[error("failed to write identity map {path}: {source}")]
    IdMapping {
        /// The `/proc/<pid>/...` file being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Mounting one entry of the mount table failed.
    #[error("failed to mount {device} to {target}: {source}")]
    Mount {
        /// Mount source descriptor (e.g. `proc`).
        device: String,
        /// Absolute mount target.
        target: PathBuf,
        /// Underlying kernel error.
        source: std::io::Error,
    },

    /// One step of the root pivot failed.
    #[error("pivot root failed during {step} ({path}): {source}")]
    Pivot {
        /// Step that failed (`bind mount`, `mkdir`, `pivot_root`, ...).
        step: &'static str,
        /// Path the step operated on.
        path: PathBuf,
        /// Underlying kernel error.
        source: std::io::Error,
    },

    /// Setting the UTS hostname failed.
    #[error("failed to set hostname {hostname}: {source}")]
    Hostname {
        /// Requested hostname.
        hostname: String,
        /// Underlying kernel error.
        source: std::io::Error,
    },

    /// The network helper could not be started.
    #[error("failed to run network helper {program}: {source}")]
    HelperSpawn {
        /// Helper program that was invoked.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The network helper ran but reported failure.
    #[error("network helper {program} failed ({status}): {output}")]
    NetworkHelper {
        /// Helper program that was invoked.
        program: String,
        /// Exit status description.
        status: String,
        /// Combined stdout and stderr of the helper.
        output: String,
    },

    /// No link of the expected kind appeared before the deadline.
    #[error("failed to find {kind} interface in {timeout:?}")]
    LinkTimeout {
        /// Link kind that was awaited.
        kind: String,
        /// How long the poller waited.
        timeout: Duration,
    },

    /// A netlink request failed.
    #[error("netlink {operation} failed: {message}")]
    Netlink {
        /// Operation that failed (`list links`, `add address`, ...).
        operation: String,
        /// Error reported by the kernel or the netlink transport.
        message: String,
    },

    /// An address string could not be parsed.
    #[error("invalid address {address}: {message}")]
    Address {
        /// The offending address string.
        address: String,
        /// Parse failure description.
        message: String,
    },

    /// Replacing the process image with the target program failed.
    #[error("failed to exec {path}: {source}")]
    Exec {
        /// Program that could not be executed.
        path: PathBuf,
        /// Underlying kernel error.
        source: std::io::Error,
    },
}

impl UncError {
    /// Returns `true` for the distinguished link-discovery timeout.
    pub const fn is_link_timeout(&self) -> bool {
        matches!(self, Self::LinkTimeout { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, UncError>;
