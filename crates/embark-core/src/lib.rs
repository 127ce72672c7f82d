//! Core domain types and traits for the Embark component build orchestrator.
//!
//! This crate contains:
//! - Component definitions (platform and application kinds, configs, states)
//! - Artifact records and fingerprint tokens
//! - The external build/clean executor and file importer traits
//! - The shared error taxonomy

pub mod artifact;
pub mod component;
pub mod error;
pub mod executor;
pub mod id;
pub mod name;

pub use error::{Error, Result};
pub use id::RunId;
pub use name::ComponentName;
