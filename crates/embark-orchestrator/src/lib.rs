//! Build orchestration for Embark.
//!
//! Drives build/clean/import/delete operations over a workspace, enforcing
//! dependency-first ordering, skip-when-current builds, halt-on-failure
//! chain cancellation, and per-component mutual exclusion.

pub mod orchestrator;
pub mod report;

pub use orchestrator::BuildOrchestrator;
pub use report::{BuildReport, ComponentStatus, StepResult, StepStatus};
