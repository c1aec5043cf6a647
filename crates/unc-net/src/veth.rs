//! Veth pair creation and the move into the container's namespace.

use netlink_packet_route::link::LinkAttribute;
use rand::Rng;
use unc_common::constants::{VETH_PREFIX, VETH_SUFFIX_RANGE};
use unc_common::error::{Result, UncError};
use unc_core::network::{Link, Netlink};

/// Names of the two ends of a veth pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VethPair {
    /// End that stays on the host, enslaved to the bridge.
    pub host: String,
    /// End that is moved into the container.
    pub peer: String,
}

/// Generates two random `uv<N>` names.
///
/// Existing devices are not consulted. A clash surfaces as a netlink
/// error from [`create_and_move`].
pub fn random_pair<R: Rng + ?Sized>(rng: &mut R) -> VethPair {
    VethPair {
        host: format!("{VETH_PREFIX}{}", rng.gen_range(0..VETH_SUFFIX_RANGE)),
        peer: format!("{VETH_PREFIX}{}", rng.gen_range(0..VETH_SUFFIX_RANGE)),
    }
}

/// Creates `pair` with its host end enslaved to `bridge`, brings the host
/// end up, and moves the peer into the network namespace of `pid`.
///
/// # Errors
///
/// Returns an error naming the netlink operation that failed.
pub async fn create_and_move(nl: &Netlink, bridge: &Link, pair: &VethPair, pid: u32) -> Result<()> {
    let mut request = nl
        .handle()
        .link()
        .add()
        .veth(pair.host.clone(), pair.peer.clone());
    request
        .message_mut()
        .attributes
        .push(LinkAttribute::Controller(bridge.index));
    request.execute().await.map_err(|e| UncError::Netlink {
        operation: format!("create veth pair {} <-> {}", pair.host, pair.peer),
        message: e.to_string(),
    })?;
    tracing::debug!(host = %pair.host, peer = %pair.peer, bridge = %bridge.name, "veth pair created");

    let host = lookup(nl, &pair.host).await?;
    nl.set_up(&host).await?;

    let peer = lookup(nl, &pair.peer).await?;
    nl.handle()
        .link()
        .set(peer.index)
        .setns_by_pid(pid)
        .execute()
        .await
        .map_err(|e| UncError::Netlink {
            operation: format!("move {} to ns of {pid}", pair.peer),
            message: e.to_string(),
        })
}

async fn lookup(nl: &Netlink, name: &str) -> Result<Link> {
    nl.link_by_name(name).await?.ok_or_else(|| UncError::NotFound {
        kind: "link",
        id: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn names_carry_prefix_and_bounded_suffix() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let pair = random_pair(&mut rng);
            for name in [&pair.host, &pair.peer] {
                let suffix: u32 = name
                    .strip_prefix("uv")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(u32::MAX);
                assert!(suffix < 10_000, "bad veth name {name}");
                assert!(name.len() <= 15, "{name} exceeds IFNAMSIZ");
            }
        }
    }
}
