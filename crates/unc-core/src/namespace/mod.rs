//! Linux namespace management for container isolation.
//!
//! The launcher requests every namespace at `clone(2)` time; nothing
//! here joins or unshares namespaces after the fact.

pub mod user;
pub mod uts;

use nix::sched::CloneFlags;

/// Configuration for which namespaces to create.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Isolate user namespace.
    pub user: bool,
    /// Isolate PID namespace.
    pub pid: bool,
    /// Isolate UTS (hostname) namespace.
    pub uts: bool,
    /// Isolate mount namespace.
    pub mount: bool,
    /// Isolate network namespace.
    pub network: bool,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            user: true,
            pid: true,
            uts: true,
            mount: true,
            network: true,
        }
    }
}

impl NamespaceConfig {
    /// Returns the `clone(2)` flags for the configured namespaces.
    pub fn clone_flags(&self) -> CloneFlags {
        let mut flags = CloneFlags::empty();
        flags.set(CloneFlags::CLONE_NEWUSER, self.user);
        flags.set(CloneFlags::CLONE_NEWPID, self.pid);
        flags.set(CloneFlags::CLONE_NEWUTS, self.uts);
        flags.set(CloneFlags::CLONE_NEWNS, self.mount);
        flags.set(CloneFlags::CLONE_NEWNET, self.network);
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_requests_all_five_namespaces() {
        let flags = NamespaceConfig::default().clone_flags();
        assert_eq!(
            flags,
            CloneFlags::CLONE_NEWUSER
                | CloneFlags::CLONE_NEWPID
                | CloneFlags::CLONE_NEWUTS
                | CloneFlags::CLONE_NEWNS
                | CloneFlags::CLONE_NEWNET
        );
    }

    #[test]
    fn disabled_namespaces_are_left_out() {
        let config = NamespaceConfig {
            network: false,
            ..NamespaceConfig::default()
        };
        let flags = config.clone_flags();
        assert!(!flags.contains(CloneFlags::CLONE_NEWNET));
        assert!(flags.contains(CloneFlags::CLONE_NEWUSER));
    }
}
