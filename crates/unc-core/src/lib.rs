//! # unc-core
//!
//! Low-level Linux isolation primitives for the unc runtime.
//!
//! This crate provides safe abstractions over:
//! - **Namespaces**: clone flags for user, PID, UTS, mount, and network
//!   isolation, plus single-entry identity maps.
//! - **Filesystem**: the default mount table and `pivot_root`.
//! - **Network**: netlink link listing, address assignment, and the
//!   bounded poller that waits for a veth peer to arrive.
//!
//! All kernel errors are converted into [`unc_common::error::UncError`]
//! with the failing operation and its target attached.

pub mod filesystem;
pub mod namespace;
pub mod network;
