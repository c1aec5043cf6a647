//! # unc-net
//!
//! The privileged half of unc networking. Runs as the separately installed
//! `unet` executable (setuid root or with `CAP_NET_ADMIN`) and does exactly
//! three things for a given container PID:
//!
//! 1. make sure the host bridge exists, has its gateway address, and is up;
//! 2. create a veth pair with one end enslaved to that bridge;
//! 3. move the other end into the network namespace of the PID.
//!
//! Nothing else in the workspace needs elevated privileges.

#[cfg(target_os = "linux")]
pub mod bridge;
#[cfg(target_os = "linux")]
pub mod veth;

#[cfg(target_os = "linux")]
pub use attach::attach;

#[cfg(target_os = "linux")]
mod attach {
    use unc_common::error::Result;
    use unc_core::network::Netlink;

    use crate::veth::{self, VethPair};

    /// Connects the network namespace of `pid` to the host bridge.
    ///
    /// Must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the first netlink failure. Partially created devices
    /// (bridge, host-side veth) are left in place.
    pub async fn attach(pid: u32) -> Result<VethPair> {
        let nl = Netlink::connect()?;
        let bridge = crate::bridge::ensure_bridge(&nl).await?;
        let pair = veth::random_pair(&mut rand::thread_rng());
        veth::create_and_move(&nl, &bridge, &pair, pid).await?;
        tracing::info!(pid, host = %pair.host, peer = %pair.peer, "veth peer moved into container");
        Ok(pair)
    }
}
