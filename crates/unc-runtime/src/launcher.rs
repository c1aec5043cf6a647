//! The launcher: the process the user started.
//!
//! Creates the namespaced child, hands its PID to the network helper,
//! and waits for it. The child's exit status is returned unchanged.

use std::path::PathBuf;

use unc_common::error::{Result, UncError};
use unc_common::types::{ContainerExit, ContainerRequest};
use unc_core::filesystem::pivot_root::remove_stale_staging_dir;
use unc_core::namespace::NamespaceConfig;

use crate::helper::NetworkHelper;
use crate::process::spawn_namespaced;
use crate::role::init_argv;

/// Launches one container per [`Launcher::run`] call.
#[derive(Debug, Clone)]
pub struct Launcher {
    exe: PathBuf,
    namespaces: NamespaceConfig,
    helper: NetworkHelper,
}

impl Launcher {
    /// Creates a launcher that re-executes the current binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the current executable cannot be determined.
    pub fn new(helper: NetworkHelper) -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| UncError::Io {
            path: PathBuf::from("/proc/self/exe"),
            source: e,
        })?;
        Ok(Self::with_exe(exe, helper))
    }

    /// Creates a launcher that re-executes `exe` as the init stage.
    pub fn with_exe(exe: PathBuf, helper: NetworkHelper) -> Self {
        Self {
            exe,
            namespaces: NamespaceConfig::default(),
            helper,
        }
    }

    /// Runs `request` to completion.
    ///
    /// Clones the init process with all five namespaces and the request's
    /// identity mapping, runs the network helper against it, then waits.
    /// If the helper fails, the container is killed and reaped, and any
    /// pivot staging directory it left in the rootfs is removed, before the
    /// helper's error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the child cannot be created, the helper fails,
    /// or waiting for the child fails.
    pub fn run(&self, request: &ContainerRequest) -> Result<ContainerExit> {
        let argv = init_argv(request.command());
        let child = spawn_namespaced(
            &self.exe,
            &argv,
            self.namespaces.clone_flags(),
            &request.identity_mapping(),
        )?;
        let pid = child.pid();
        tracing::debug!(pid = %pid, uid = request.uid(), gid = request.gid(), "container PID");

        if let Err(e) = self.helper.attach(pid.as_raw()) {
            tracing::warn!(pid = %pid, error = %e, "network setup failed, killing container");
            child.kill();
            clean_up_after_kill();
            return Err(e);
        }

        let exit = child.wait()?;
        tracing::info!(pid = %pid, %exit, "container finished");
        Ok(exit)
    }
}

/// Drops the pivot staging directory a killed init may have left in its
/// rootfs, which is the directory it inherited from the launcher.
fn clean_up_after_kill() {
    let rootfs = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, "cannot locate container rootfs for cleanup");
            return;
        }
    };
    match remove_stale_staging_dir(&rootfs) {
        Ok(true) => {
            tracing::debug!(rootfs = %rootfs.display(), "removed leftover staging directory");
        }
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "failed to remove leftover staging directory"),
    }
}
