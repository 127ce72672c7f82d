//! CLI command implementations.

mod build;
mod component;
mod definition;

pub use build::{build, clean, regen_linker};
pub use component::{create_app, create_platform, delete, import, status, update_hw};
pub use definition::{apply, validate};
