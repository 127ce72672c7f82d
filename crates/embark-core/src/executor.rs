//! External collaborator traits.
//!
//! The actual toolchain (source compiler/linker, hardware-description
//! processing, file copying) lives behind these traits; the orchestration
//! core only sees pass/fail outcomes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Result;
use crate::component::Component;

/// Outcome of one external build invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BuildOutcome {
    Success { output_path: PathBuf },
    Failure { diagnostic: String },
}

/// Outcome of one external clean invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CleanOutcome {
    Success,
    Failure { diagnostic: String },
}

/// Trait for the external build/clean toolchain.
///
/// Invocations are long-running and blocking from the orchestrator's point
/// of view; the executor's own success/failure signal is authoritative and
/// no internal timeout is imposed.
#[async_trait]
pub trait BuildExecutor: Send + Sync {
    /// Name of this executor, for logs.
    fn name(&self) -> &'static str;

    /// Build the component from its current configuration and source set.
    async fn execute_build(&self, component: &Component) -> Result<BuildOutcome>;

    /// Remove the component's build outputs.
    async fn execute_clean(&self, component: &Component) -> Result<CleanOutcome>;

    /// Regenerate the linker script for an application component.
    async fn regenerate_linker_script(&self, component: &Component) -> Result<()>;
}

/// Trait for the file import mechanism.
///
/// The core only records SourceFileSet membership; the physical copy into
/// the component's source tree happens here.
#[async_trait]
pub trait FileImporter: Send + Sync {
    async fn copy_into(
        &self,
        component: &Component,
        source: &Path,
        dest_name: &str,
    ) -> Result<()>;
}
