//! JSON snapshot persistence of workspace state.
//!
//! The persisted layout is two maps: component name → component and
//! component name → artifact record. The snapshot is written to a temporary
//! file first and renamed into place so a crash never leaves a torn state
//! file behind.

use std::path::{Path, PathBuf};

use embark_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::registry::ComponentRegistry;
use crate::store::ArtifactStore;

pub const STATE_FILE: &str = "embark-state.json";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub registry: ComponentRegistry,
    pub store: ArtifactStore,
}

#[derive(Serialize)]
struct StateRef<'a> {
    registry: &'a ComponentRegistry,
    store: &'a ArtifactStore,
}

fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

/// Loads the snapshot under `root`, or an empty state if none exists yet.
pub async fn load(root: &Path) -> Result<WorkspaceState> {
    let path = state_path(root);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            debug!(path = %path.display(), "Loading workspace state");
            serde_json::from_slice(&bytes)
                .map_err(|e| Error::State(format!("corrupt state file {}: {e}", path.display())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(WorkspaceState::default()),
        Err(e) => Err(e.into()),
    }
}

/// Writes the snapshot under `root`, replacing any previous one.
pub async fn save(root: &Path, registry: &ComponentRegistry, store: &ArtifactStore) -> Result<()> {
    let path = state_path(root);
    let bytes = serde_json::to_vec_pretty(&StateRef { registry, store })
        .map_err(|e| Error::State(format!("serializing workspace state: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, &path).await?;
    debug!(path = %path.display(), "Saved workspace state");
    Ok(())
}
