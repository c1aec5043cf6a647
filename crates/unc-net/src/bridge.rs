//! Host bridge that every container's veth pair plugs into.

use nix::errno::Errno;
use unc_common::constants::BRIDGE_NAME;
use unc_common::error::{Result, UncError};
use unc_core::network::address::bridge_gateway;
use unc_core::network::{Link, Netlink, netlink_errno};

/// Returns the host bridge, creating and configuring it on first use.
///
/// An existing bridge is reused as-is. If another helper creates the
/// bridge between our lookup and our create call, the `EEXIST` is treated
/// as success and the other helper's bridge is reused.
///
/// # Errors
///
/// Returns an error if the bridge cannot be created, addressed, or brought up.
pub async fn ensure_bridge(nl: &Netlink) -> Result<Link> {
    if let Some(bridge) = nl.link_by_name(BRIDGE_NAME).await? {
        tracing::debug!(name = BRIDGE_NAME, index = bridge.index, "bridge already exists");
        return Ok(bridge);
    }

    match nl
        .handle()
        .link()
        .add()
        .bridge(BRIDGE_NAME.to_string())
        .execute()
        .await
    {
        Ok(()) => {}
        Err(e) if netlink_errno(&e) == Some(Errno::EEXIST as i32) => {
            tracing::debug!(name = BRIDGE_NAME, "bridge created concurrently, reusing");
            return lookup_bridge(nl).await;
        }
        Err(e) => {
            return Err(UncError::Netlink {
                operation: format!("create bridge {BRIDGE_NAME}"),
                message: e.to_string(),
            });
        }
    }

    let bridge = lookup_bridge(nl).await?;
    let gateway = bridge_gateway()?;
    nl.add_address(&bridge, &gateway).await?;
    nl.set_up(&bridge).await?;
    tracing::info!(name = BRIDGE_NAME, address = %gateway, "bridge created");
    Ok(bridge)
}

async fn lookup_bridge(nl: &Netlink) -> Result<Link> {
    nl.link_by_name(BRIDGE_NAME)
        .await?
        .ok_or_else(|| UncError::NotFound {
            kind: "bridge",
            id: BRIDGE_NAME.to_string(),
        })
}
