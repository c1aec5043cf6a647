//! The in-namespace init stage.
//!
//! Runs once, top to bottom, as PID 1 of the new PID namespace:
//!
//! 1. resolve the target program, root filesystem, and address;
//! 2. apply the mount table under the root filesystem;
//! 3. pivot into the root filesystem;
//! 4. set the hostname;
//! 5. wait for the veth peer pushed in by the helper;
//! 6. bring up loopback and the veth, assign the address, add the route;
//! 7. `execv` the target program.
//!
//! Any failure returns before step 7 and the process exits. Because it is
//! PID 1, its exit tears down the namespaces, mounts, and network devices;
//! there is no other cleanup.

use std::convert::Infallible;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;

use unc_common::constants::LOOPBACK;
use unc_common::error::{Result, UncError};
use unc_core::filesystem::mount::apply_mounts;
use unc_core::filesystem::pivot_root::pivot_root;
use unc_core::namespace::uts::set_hostname;
use unc_core::network::address::{Cidr, bridge_gateway};
use unc_core::network::poller::{LinkWait, wait_for_link};
use unc_core::network::{Link, Netlink};

use crate::config::Config;

/// Turns this process into the container running `command`.
///
/// Only returns on failure.
///
/// # Errors
///
/// Returns the first error of any setup step, or the `execv` failure.
pub fn run(command: &[String]) -> Result<Infallible> {
    tracing::debug!(?command, "start init");
    let config = Config::resolve(command)?;
    prepare_rootfs(&config)?;
    let _ = attach_network(&config, &LinkWait::default())?;
    exec(&config)
}

/// Mounts the table, pivots into the root filesystem, and sets the hostname.
///
/// Must run at most once per process: the pivot is not restartable.
///
/// # Errors
///
/// Returns the first mount, pivot, or hostname failure.
pub fn prepare_rootfs(config: &Config) -> Result<()> {
    apply_mounts(&config.rootfs, &config.mounts)?;
    pivot_root(&config.rootfs)?;
    set_hostname(&config.hostname)
}

/// Waits for the veth peer and configures it with `config.ip`.
///
/// # Errors
///
/// Returns [`UncError::LinkTimeout`] if no veth shows up in time, or the
/// first netlink or address failure.
pub fn attach_network(config: &Config, wait: &LinkWait) -> Result<Link> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| UncError::Netlink {
            operation: "start runtime".into(),
            message: e.to_string(),
        })?;
    runtime.block_on(async {
        let nl = Netlink::connect()?;
        let link = wait_for_link(&nl, wait).await?;
        configure_link(&nl, &link, &config.ip).await?;
        Ok::<_, UncError>(link)
    })
}

async fn configure_link(nl: &Netlink, link: &Link, ip: &str) -> Result<()> {
    let lo = nl
        .link_by_name(LOOPBACK)
        .await?
        .ok_or_else(|| UncError::NotFound {
            kind: "link",
            id: LOOPBACK.into(),
        })?;
    nl.set_up(&lo).await?;

    let cidr: Cidr = ip.parse()?;
    nl.add_address(link, &cidr).await?;
    nl.set_up(link).await?;
    nl.add_default_route(bridge_gateway()?.addr).await?;
    tracing::info!(link = %link.name, address = %cidr, "container network configured");
    Ok(())
}

/// Replaces this process with the configured program, keeping the
/// environment as inherited.
///
/// # Errors
///
/// Returns [`UncError::Exec`] if `execv(2)` fails.
pub fn exec(config: &Config) -> Result<Infallible> {
    tracing::debug!(path = %config.path.display(), args = ?config.args, "execute");
    let exec_error = |source: std::io::Error| UncError::Exec {
        path: config.path.clone(),
        source,
    };
    let path = CString::new(config.path.as_os_str().as_bytes())
        .map_err(|e| exec_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
    let args = config
        .args
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| exec_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
    nix::unistd::execv(&path, &args).map_err(|e| exec_error(e.into()))
}
