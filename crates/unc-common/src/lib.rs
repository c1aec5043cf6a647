//! # unc-common
//!
//! Shared types, error definitions, and constants used across the
//! entire unc workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and deliberately stays free of `nix` so that every
//! other crate can share its error taxonomy.

pub mod constants;
pub mod error;
pub mod types;
