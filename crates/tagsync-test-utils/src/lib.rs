//! Shared test utilities for the tagsync workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each grow their own temp-dir helpers. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`root`]: fake logical-root markers
//! - [`tree`]: [`TestTree`] builder for files containing sync tags

pub mod root;
pub mod tree;

pub use tree::{TestTree, block, checksum_of};
