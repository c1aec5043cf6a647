//! Container-side network plumbing.
//!
//! The host side (bridge, veth pair, namespace move) lives in the
//! privileged `unet` helper. This module covers what the init stage needs
//! inside the new network namespace: listing links, waiting for the veth
//! peer, and assigning the container address.

pub mod address;
#[cfg(target_os = "linux")]
mod netlink;
pub mod poller;

#[cfg(target_os = "linux")]
pub use netlink::{Netlink, netlink_errno};

/// A network device as seen through netlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Kernel interface index.
    pub index: u32,
    /// Interface name.
    pub name: String,
    /// Link kind (`veth`, `bridge`, ...). `None` for devices without link
    /// info, such as loopback.
    pub kind: Option<String>,
}

impl Link {
    /// Whether this link is of the given kind.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_match_requires_link_info() {
        let lo = Link {
            index: 1,
            name: "lo".into(),
            kind: None,
        };
        let veth = Link {
            index: 7,
            name: "uv42".into(),
            kind: Some("veth".into()),
        };
        assert!(!lo.is_kind("veth"));
        assert!(veth.is_kind("veth"));
        assert!(!veth.is_kind("bridge"));
    }
}
