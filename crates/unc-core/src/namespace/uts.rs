//! UTS namespace isolation.
//!
//! Allows the container to have its own hostname.

use unc_common::error::{Result, UncError};

/// Sets the hostname inside the UTS namespace.
///
/// # Errors
///
/// Returns an error if `sethostname(2)` fails.
pub fn set_hostname(hostname: &str) -> Result<()> {
    nix::unistd::sethostname(hostname).map_err(|e| UncError::Hostname {
        hostname: hostname.to_string(),
        source: e.into(),
    })?;
    tracing::debug!(hostname, "container hostname set");
    Ok(())
}
