// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{BuildManifest, RawManifest};
use crate::errors::Result;

/// Load a manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (unknown dependencies, cycles, etc.). Use [`load_and_validate`]
/// for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let manifest: RawManifest = toml::from_str(&contents)?;
    debug!(path = %path.display(), tasks = manifest.task.len(), "manifest parsed");

    Ok(manifest)
}

/// Load a manifest from path and validate it into a [`BuildManifest`].
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown `after` references,
///   - a zero worker count,
///   - dependency cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildManifest> {
    let raw = load_from_path(&path)?;
    BuildManifest::try_from(raw)
}
