//! Secure root filesystem switching via `pivot_root(2)`.
//!
//! More secure than `chroot` because it actually changes the root mount
//! point rather than just the process's view of `/`.
//!
//! The sequence is not restartable. Running it a second time on an
//! already pivoted root is undefined; callers run it exactly once.

use std::path::{Path, PathBuf};

use nix::mount::{MntFlags, MsFlags};
use unc_common::constants::PIVOT_DIR_NAME;
use unc_common::error::{Result, UncError};

/// Path of the staging directory that receives the old root.
pub fn staging_dir(new_root: &Path) -> PathBuf {
    new_root.join(PIVOT_DIR_NAME)
}

/// Switches the root filesystem to `new_root` and drops the old root.
///
/// Bind-mounts `new_root` onto itself so it becomes a mount point distinct
/// from the current root, pivots into it, changes directory to `/`, then
/// lazily unmounts and removes the staging directory.
///
/// # Errors
///
/// Returns [`UncError::Pivot`] naming the step that failed.
pub fn pivot_root(new_root: &Path) -> Result<()> {
    nix::mount::mount(
        Some(new_root),
        new_root,
        None::<&str>,
        MsFlags::MS_BIND | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(|e| pivot_error("bind mount", new_root, e.into()))?;

    let put_old = staging_dir(new_root);
    prepare_staging_dir(&put_old)?;
    tracing::debug!(
        new_root = %new_root.display(),
        put_old = %put_old.display(),
        "performing pivot_root"
    );

    nix::unistd::pivot_root(new_root, &put_old)
        .map_err(|e| pivot_error("pivot_root", new_root, e.into()))?;

    let root = Path::new("/");
    nix::unistd::chdir(root).map_err(|e| pivot_error("chdir", root, e.into()))?;

    // The staging directory now lives directly under the new root.
    let put_old = staging_dir(root);
    nix::mount::umount2(&put_old, MntFlags::MNT_DETACH)
        .map_err(|e| pivot_error("unmount old root", &put_old, e.into()))?;
    std::fs::remove_dir(&put_old).map_err(|e| pivot_error("cleanup", &put_old, e))?;

    tracing::info!(new_root = %new_root.display(), "root filesystem pivoted");
    Ok(())
}

/// Creates the staging directory, reusing one left by a container that
/// was killed mid-pivot.
fn prepare_staging_dir(put_old: &Path) -> Result<()> {
    match std::fs::create_dir(put_old) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && put_old.is_dir() => {
            tracing::debug!(path = %put_old.display(), "reusing leftover staging directory");
            Ok(())
        }
        Err(e) => Err(pivot_error("mkdir", put_old, e)),
    }
}

/// Removes a staging directory left under `rootfs` by an init stage that
/// died before finishing its pivot. Returns whether one was removed.
///
/// Only call this once the init process has been reaped; while it runs,
/// the directory may be its live `put_old`.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be removed.
pub fn remove_stale_staging_dir(rootfs: &Path) -> Result<bool> {
    let put_old = staging_dir(rootfs);
    match std::fs::remove_dir(&put_old) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(pivot_error("cleanup", &put_old, e)),
    }
}

fn pivot_error(step: &'static str, path: &Path, source: std::io::Error) -> UncError {
    UncError::Pivot {
        step,
        path: path.to_path_buf(),
        source,
    }
}
