// src/config/mod.rs

//! Run-descriptor loading, model and validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{DescriptorFile, ProcessEntry, ProcessSpec, ProcessType};
