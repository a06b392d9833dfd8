// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{DescriptorFile, ProcessSpec};
use crate::config::validate::validate;
use crate::errors::Result;

/// Load a run descriptor from a given path and return the raw
/// `DescriptorFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<DescriptorFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let descriptor: DescriptorFile = toml::from_str(&contents)?;

    Ok(descriptor)
}

/// Load a run descriptor from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks node-path shape, uniqueness of owned nodes, and dependency
///   path shape.
/// - Derives the per-process dependency-state paths.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Vec<ProcessSpec>> {
    let raw = load_from_path(&path)?;
    validate(&raw)
}
