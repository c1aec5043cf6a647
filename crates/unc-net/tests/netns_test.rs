//! Netlink tests for the helper, each run inside a private network
//! namespace so the host's devices are never touched.
//!
//! They need `CAP_NET_ADMIN` and are ignored by default:
//! `sudo -E cargo test -p unc-net -- --ignored`.

#![cfg(target_os = "linux")]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};

use futures::TryStreamExt;
use netlink_packet_route::address::AddressAttribute;
use nix::sched::{CloneFlags, unshare};
use unc_common::constants::BRIDGE_NAME;
use unc_core::network::Netlink;
use unc_net::bridge::ensure_bridge;
use unc_net::veth::{VethPair, create_and_move};

/// Moves this test thread into a fresh network namespace and runs `f` there.
fn in_private_netns<F, Fut>(f: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    unshare(CloneFlags::CLONE_NEWNET).expect("unshare(CLONE_NEWNET)");
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    rt.block_on(f());
}

#[test]
#[ignore = "requires CAP_NET_ADMIN"]
fn ensure_bridge_twice_leaves_one_addressed_bridge() {
    in_private_netns(|| async {
        let nl = Netlink::connect().unwrap();
        let first = ensure_bridge(&nl).await.expect("first ensure");
        let second = ensure_bridge(&nl).await.expect("second ensure");
        assert_eq!(first.index, second.index);

        let bridges: Vec<_> = nl
            .list_links()
            .await
            .unwrap()
            .into_iter()
            .filter(|l| l.name == BRIDGE_NAME)
            .collect();
        assert_eq!(bridges.len(), 1);
        assert!(bridges[0].is_kind("bridge"));

        let addresses: Vec<_> = nl
            .handle()
            .address()
            .get()
            .set_link_index_filter(first.index)
            .execute()
            .try_collect()
            .await
            .unwrap();
        let v4: Vec<_> = addresses
            .iter()
            .filter_map(|msg| {
                msg.attributes.iter().find_map(|attr| match attr {
                    AddressAttribute::Address(IpAddr::V4(ip)) => {
                        Some((*ip, msg.header.prefix_len))
                    }
                    _ => None,
                })
            })
            .collect();
        assert_eq!(v4, [(Ipv4Addr::new(10, 100, 42, 1), 24)]);
    });
}

#[test]
#[ignore = "requires CAP_NET_ADMIN"]
fn veth_pair_is_enslaved_and_moved() {
    in_private_netns(|| async {
        let nl = Netlink::connect().unwrap();
        let bridge = ensure_bridge(&nl).await.unwrap();
        let pair = VethPair {
            host: "uvtest0".into(),
            peer: "uvtest1".into(),
        };
        // Target this thread, which owns the private namespace, so both
        // ends stay observable.
        let tid = u32::try_from(nix::unistd::gettid().as_raw()).unwrap();
        create_and_move(&nl, &bridge, &pair, tid)
            .await
            .expect("create and move");

        let links = nl.list_links().await.unwrap();
        for name in [&pair.host, &pair.peer] {
            let link = links.iter().find(|l| &l.name == name).expect("veth end");
            assert!(link.is_kind("veth"));
        }
    });
}
