//! External toolchain backends for Embark.
//!
//! Provides the collaborator implementations the orchestration core drives:
//! - `ProcessExecutor`: runs the embedded toolchain as a local process
//! - `LocalImporter`: copies source files into component source trees

pub mod importer;
pub mod process;

pub use embark_core::executor::{BuildExecutor, BuildOutcome, CleanOutcome, FileImporter};
pub use importer::LocalImporter;
pub use process::ProcessExecutor;
