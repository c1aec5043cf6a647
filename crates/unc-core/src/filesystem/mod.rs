//! Filesystem management for container isolation.
//!
//! Provides the default mount table and `pivot_root` for secure root
//! filesystem switching.

pub mod mount;
pub mod pivot_root;
