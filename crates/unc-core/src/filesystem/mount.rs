//! Mount utilities for container filesystem setup.
//!
//! Mounts `/proc` and `/dev` (and whatever else the table lists) under
//! the container root, in table order, before the root is pivoted.

use std::path::{Path, PathBuf};

use nix::mount::MsFlags;
use unc_common::error::{Result, UncError};

/// One entry of the container mount table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    /// Mount source descriptor (device, or pseudo-filesystem name).
    pub source: String,
    /// Target path, relative to the container root.
    pub target: PathBuf,
    /// Filesystem type passed to `mount(2)`.
    pub fstype: String,
    /// Mount flags.
    pub flags: MsFlags,
    /// Filesystem-specific options.
    pub data: Option<String>,
}

impl MountSpec {
    /// Absolute mount point of this entry under `rootfs`.
    pub fn target_in(&self, rootfs: &Path) -> PathBuf {
        let relative = self.target.strip_prefix("/").unwrap_or(&self.target);
        rootfs.join(relative)
    }
}

/// Returns the default mount table: `proc` at `/proc`, then a `tmpfs` at `/dev`.
pub fn default_mount_table() -> Vec<MountSpec> {
    vec![
        MountSpec {
            source: "proc".into(),
            target: PathBuf::from("/proc"),
            fstype: "proc".into(),
            flags: MsFlags::MS_NOEXEC | MsFlags::MS_NOSUID | MsFlags::MS_NODEV,
            data: None,
        },
        MountSpec {
            source: "tmpfs".into(),
            target: PathBuf::from("/dev"),
            fstype: "tmpfs".into(),
            flags: MsFlags::MS_NOSUID | MsFlags::MS_STRICTATIME,
            data: Some("mode=755".into()),
        },
    ]
}

/// Mounts every entry of `table` under `rootfs`, stopping at the first failure.
///
/// # Errors
///
/// Returns [`UncError::Mount`] naming the source and target that failed.
pub fn apply_mounts(rootfs: &Path, table: &[MountSpec]) -> Result<()> {
    apply_mounts_with(rootfs, table, |spec, target| {
        nix::mount::mount(
            Some(spec.source.as_str()),
            target,
            Some(spec.fstype.as_str()),
            spec.flags,
            spec.data.as_deref(),
        )
    })
}

/// Same as [`apply_mounts`], with the `mount(2)` call supplied by the caller.
///
/// # Errors
///
/// Returns [`UncError::Mount`] for the first entry whose mount fails.
pub fn apply_mounts_with<F>(rootfs: &Path, table: &[MountSpec], mut mount: F) -> Result<()>
where
    F: FnMut(&MountSpec, &Path) -> nix::Result<()>,
{
    for spec in table {
        let target = spec.target_in(rootfs);
        tracing::debug!(source = %spec.source, target = %target.display(), "mounting");
        mount(spec, &target).map_err(|e| UncError::Mount {
            device: spec.source.clone(),
            target: target.clone(),
            source: e.into(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use nix::errno::Errno;

    #[test]
    fn default_table_is_proc_then_dev() {
        let table = default_mount_table();
        let targets: Vec<_> = table.iter().map(|m| m.target.clone()).collect();
        assert_eq!(targets, [PathBuf::from("/proc"), PathBuf::from("/dev")]);
        assert_eq!(table[1].data.as_deref(), Some("mode=755"));
        assert!(table[0].flags.contains(MsFlags::MS_NOEXEC));
    }

    #[test]
    fn targets_are_joined_under_rootfs() {
        let rootfs = Path::new("/srv/busybox");
        let mut seen = Vec::new();
        apply_mounts_with(rootfs, &default_mount_table(), |spec, target| {
            seen.push((spec.fstype.clone(), target.to_path_buf()));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            [
                ("proc".to_string(), PathBuf::from("/srv/busybox/proc")),
                ("tmpfs".to_string(), PathBuf::from("/srv/busybox/dev")),
            ]
        );
    }

    #[test]
    fn first_failure_stops_the_table() {
        let rootfs = Path::new("/rootfs");
        let mut attempts = 0;
        let err = apply_mounts_with(rootfs, &default_mount_table(), |_, _| {
            attempts += 1;
            Err(Errno::EPERM)
        })
        .unwrap_err();
        assert_eq!(attempts, 1);
        match err {
            UncError::Mount { device, target, .. } => {
                assert_eq!(device, "proc");
                assert_eq!(target, PathBuf::from("/rootfs/proc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn relative_targets_are_accepted() {
        let spec = MountSpec {
            source: "tmpfs".into(),
            target: PathBuf::from("tmp"),
            fstype: "tmpfs".into(),
            flags: MsFlags::empty(),
            data: None,
        };
        assert_eq!(spec.target_in(Path::new("/r")), PathBuf::from("/r/tmp"));
    }
}
