//! Per-run result reporting.

use chrono::{DateTime, Utc};
use embark_core::component::{ComponentKind, ComponentState};
use embark_core::{ComponentName, RunId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one component within a build chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepStatus {
    /// Fingerprint matched the stored record; the executor was not called.
    AlreadyCurrent,
    /// The external build ran and succeeded.
    Built { output_path: PathBuf },
    /// The external build ran and failed.
    Failed { diagnostic: String },
    /// A queued step abandoned because an upstream step failed.
    Cancelled,
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::AlreadyCurrent | StepStatus::Built { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub component: ComponentName,
    pub status: StepStatus,
}

/// The per-component result list of one `build` call, dependency-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub run_id: RunId,
    pub steps: Vec<StepResult>,
}

impl BuildReport {
    pub fn success(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_success())
    }

    pub fn status_of(&self, component: &ComponentName) -> Option<&StepStatus> {
        self.steps
            .iter()
            .find(|s| &s.component == component)
            .map(|s| &s.status)
    }
}

/// Point-in-time summary of one component, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub name: ComponentName,
    pub kind: ComponentKind,
    pub state: ComponentState,
    pub last_built: Option<DateTime<Utc>>,
    pub output_path: Option<PathBuf>,
}
