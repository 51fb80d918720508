//! JSON persistence of the marker cache

use tagsync_fs::NormalizedPath;
use tagsync_fs::io::{read_text, write_atomic};

use crate::model::MarkerCache;
use crate::{Error, Result};

/// Write `cache` to `path` as pretty-printed JSON.
pub fn save(cache: &MarkerCache, path: &NormalizedPath) -> Result<()> {
    let json = serde_json::to_string_pretty(cache)?;
    write_atomic(path, json.as_bytes())?;
    tracing::debug!(path = %path, entries = cache.len(), "Wrote cache");
    Ok(())
}

/// Read a cache written by [`save`].
///
/// Unknown target kinds or a malformed document are fatal.
pub fn load(path: &NormalizedPath) -> Result<MarkerCache> {
    let json = read_text(path)?;
    let cache: MarkerCache = serde_json::from_str(&json).map_err(|e| Error::CachePersist {
        path: path.to_native(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path, entries = cache.len(), "Loaded cache");
    Ok(cache)
}
