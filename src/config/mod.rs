// src/config/mod.rs

//! Build input: the validated [`BuildPlan`] and the TOML manifest it can be
//! loaded from.
//!
//! - `model.rs` defines the TOML-backed data model and `BuildPlan`.
//! - `loader.rs` reads a manifest from disk.
//! - `validate.rs` rejects unknown dependencies, zero workers and cycles
//!   before anything is scheduled.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{BuildManifest, BuildPlan, RawManifest, SettingsSection, TaskSection};
