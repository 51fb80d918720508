//! Filesystem layer for tagsync
//!
//! Provides lexical path normalization, streaming line I/O with atomic
//! replacement, marker checksums and format-agnostic config loading.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
pub use path::NormalizedPath;
