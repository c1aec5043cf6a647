//! Thin wrapper over an `rtnetlink` handle for the current namespace.

use std::net::{IpAddr, Ipv4Addr};

use futures::TryStreamExt;
use netlink_packet_route::link::{InfoKind, LinkAttribute, LinkInfo, LinkMessage};
use rtnetlink::Handle;
use unc_common::error::{Result, UncError};

use super::Link;
use super::address::Cidr;

/// Netlink connection bound to the network namespace it was opened in.
#[derive(Debug, Clone)]
pub struct Netlink {
    handle: Handle,
}

impl Netlink {
    /// Opens a netlink route socket and drives it on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be created.
    pub fn connect() -> Result<Self> {
        let (connection, handle, _) = rtnetlink::new_connection().map_err(|e| UncError::Netlink {
            operation: "connect".into(),
            message: e.to_string(),
        })?;
        let _ = tokio::spawn(connection);
        Ok(Self { handle })
    }

    /// Raw handle, for requests this wrapper does not cover.
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Lists every link in the namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump request fails.
    pub async fn list_links(&self) -> Result<Vec<Link>> {
        let mut stream = self.handle.link().get().execute();
        let mut links = Vec::new();
        while let Some(msg) = stream
            .try_next()
            .await
            .map_err(|e| netlink_error("list links", &e))?
        {
            links.push(link_from_message(&msg));
        }
        Ok(links)
    }

    /// Looks up a link by name, returning `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than "no such device".
    pub async fn link_by_name(&self, name: &str) -> Result<Option<Link>> {
        let mut stream = self.handle.link().get().match_name(name.to_string()).execute();
        match stream.try_next().await {
            Ok(msg) => Ok(msg.as_ref().map(link_from_message)),
            Err(e) if netlink_errno(&e) == Some(libc::ENODEV) => Ok(None),
            Err(e) => Err(netlink_error(&format!("get link {name}"), &e)),
        }
    }

    /// Brings a link administratively up.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the request.
    pub async fn set_up(&self, link: &Link) -> Result<()> {
        self.handle
            .link()
            .set(link.index)
            .up()
            .execute()
            .await
            .map_err(|e| netlink_error(&format!("set {} up", link.name), &e))
    }

    /// Assigns `cidr` to `link`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the address.
    pub async fn add_address(&self, link: &Link, cidr: &Cidr) -> Result<()> {
        self.handle
            .address()
            .add(link.index, IpAddr::V4(cidr.addr), cidr.prefix_len)
            .execute()
            .await
            .map_err(|e| netlink_error(&format!("add address {cidr} to {}", link.name), &e))
    }

    /// Installs an IPv4 default route through `gateway`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the route.
    pub async fn add_default_route(&self, gateway: Ipv4Addr) -> Result<()> {
        self.handle
            .route()
            .add()
            .v4()
            .gateway(gateway)
            .execute()
            .await
            .map_err(|e| netlink_error(&format!("add default route via {gateway}"), &e))
    }
}

/// Positive errno carried by a kernel netlink error, if any.
pub fn netlink_errno(err: &rtnetlink::Error) -> Option<i32> {
    match err {
        rtnetlink::Error::NetlinkError(msg) => msg.code.map(|code| -code.get()),
        _ => None,
    }
}

fn netlink_error(operation: &str, err: &rtnetlink::Error) -> UncError {
    UncError::Netlink {
        operation: operation.to_string(),
        message: err.to_string(),
    }
}

fn link_from_message(msg: &LinkMessage) -> Link {
    let mut name = String::new();
    let mut kind = None;
    for attr in &msg.attributes {
        match attr {
            LinkAttribute::IfName(n) => name.clone_from(n),
            LinkAttribute::LinkInfo(infos) => {
                kind = infos.iter().find_map(|info| match info {
                    LinkInfo::Kind(k) => Some(kind_name(k)),
                    _ => None,
                });
            }
            _ => {}
        }
    }
    Link {
        index: msg.header.index,
        name,
        kind,
    }
}

fn kind_name(kind: &InfoKind) -> String {
    match kind {
        InfoKind::Veth => "veth".into(),
        InfoKind::Bridge => "bridge".into(),
        InfoKind::Other(other) => other.clone(),
        other => format!("{other:?}").to_lowercase(),
    }
}
