//! Command implementations for tagsync-cli

pub mod check;

pub use check::{run_check, run_fix};
