//! Container lifecycle management for the unc runtime.
//!
//! One `unc` invocation runs as two processes built from the same binary:
//!
//! - the **launcher** ([`launcher`]) clones a child into new user, PID, UTS,
//!   mount, and network namespaces, maps container root onto the invoking
//!   user, asks the privileged helper ([`helper`]) to plug the child into
//!   the host bridge, and waits for the child to exit;
//! - the child re-executes `unc` with a sentinel `argv[0]` ([`role`]) and
//!   runs the **init** stage ([`init`]): mounts, pivot root, hostname,
//!   network discovery, address assignment, and finally `execv` of the
//!   user's program as PID 1 of the new PID namespace.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod helper;
pub mod init;
pub mod launcher;
pub mod process;
pub mod role;
