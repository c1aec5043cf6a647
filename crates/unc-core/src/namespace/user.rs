//! User namespace identity mapping.
//!
//! Maps container root onto the invoking host user, enabling rootless
//! containers. The launcher writes the maps for its child from the
//! parent namespace.

use std::path::{Path, PathBuf};

use unc_common::error::{Result, UncError};
use unc_common::types::IdentityMapping;

/// Writes `setgroups`, `uid_map`, and `gid_map` for process `pid`.
///
/// `setgroups` is set to `deny` first, which the kernel requires before an
/// unprivileged writer may install a `gid_map`.
///
/// # Errors
///
/// Returns an error if any of the `/proc/<pid>/...` files cannot be written.
pub fn write_id_maps(pid: i32, mapping: &IdentityMapping) -> Result<()> {
    write_id_maps_in(&PathBuf::from(format!("/proc/{pid}")), mapping)?;
    tracing::debug!(
        pid,
        uid = mapping.uid.host_id,
        gid = mapping.gid.host_id,
        "wrote UID/GID map"
    );
    Ok(())
}

/// Writes the identity maps into an explicit `/proc/<pid>`-shaped directory.
///
/// # Errors
///
/// Returns an error if any of the map files cannot be written.
pub fn write_id_maps_in(proc_dir: &Path, mapping: &IdentityMapping) -> Result<()> {
    let setgroups = proc_dir.join("setgroups");
    if setgroups.exists() {
        write_map(&setgroups, "deny")?;
    }
    write_map(&proc_dir.join("uid_map"), &mapping.uid.to_string())?;
    write_map(&proc_dir.join("gid_map"), &mapping.gid.to_string())
}

fn write_map(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| UncError::IdMapping {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use unc_common::types::IdMap;

    fn mapping(uid: u32, gid: u32) -> IdentityMapping {
        IdentityMapping {
            uid: IdMap::root_to(uid),
            gid: IdMap::root_to(gid),
        }
    }

    #[test]
    fn writes_single_entry_maps() {
        let dir = tempfile::tempdir().unwrap();
        write_id_maps_in(dir.path(), &mapping(1000, 1000)).unwrap();

        let uid_map = std::fs::read_to_string(dir.path().join("uid_map")).unwrap();
        let gid_map = std::fs::read_to_string(dir.path().join("gid_map")).unwrap();
        assert_eq!(uid_map, "0 1000 1\n");
        assert_eq!(gid_map, "0 1000 1\n");
        assert_eq!(uid_map.lines().count(), 1);
        assert_eq!(gid_map.lines().count(), 1);
    }

    #[test]
    fn denies_setgroups_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("setgroups"), "allow").unwrap();
        write_id_maps_in(dir.path(), &mapping(1000, 100)).unwrap();

        let setgroups = std::fs::read_to_string(dir.path().join("setgroups")).unwrap();
        assert_eq!(setgroups, "deny");
        let gid_map = std::fs::read_to_string(dir.path().join("gid_map")).unwrap();
        assert_eq!(gid_map, "0 100 1\n");
    }

    #[test]
    fn skips_setgroups_on_old_kernels() {
        let dir = tempfile::tempdir().unwrap();
        write_id_maps_in(dir.path(), &mapping(1, 1)).unwrap();
        assert!(!dir.path().join("setgroups").exists());
    }

    #[test]
    fn missing_proc_dir_names_the_map_file() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("no-such-pid");
        let err = write_id_maps_in(&gone, &mapping(1, 1)).unwrap_err();
        match err {
            UncError::IdMapping { path, .. } => assert_eq!(path, gone.join("uid_map")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
