//! The artifact store: last-known input fingerprints and build outputs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use embark_core::artifact::{ArtifactRecord, Fingerprint};
use embark_core::component::{Component, ComponentConfig};
use embark_core::ComponentName;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// One record per component, replaced wholesale on each successful build.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArtifactStore {
    records: BTreeMap<ComponentName, ArtifactRecord>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the fingerprint of a component's current declared inputs.
    ///
    /// Pure and recomputed on every call, never cached, so a change anywhere
    /// upstream is visible the next time it is queried. Application
    /// fingerprints fold in the upstream platform's *stored* fingerprint,
    /// which is how staleness chains through the dependency edge without an
    /// explicit graph walk.
    pub fn fingerprint_of(&self, component: &Component) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(component.name.as_str());
        hasher.update([0]);

        match &component.config {
            ComponentConfig::Platform(config) => {
                hasher.update(b"platform\0");
                hasher.update(config.hw_design.as_str());
                hasher.update([0]);
                hasher.update(&config.os);
                hasher.update([0]);
                hasher.update(&config.cpu);
                hasher.update([0]);
                hasher.update(&config.domain);
                hasher.update([0]);
                hasher.update(&config.compiler);
                hasher.update([0]);
                hasher.update([u8::from(config.generate_dtb)]);
                for (key, value) in &config.advanced {
                    hasher.update(key);
                    hasher.update([0]);
                    hasher.update(value);
                    hasher.update([0]);
                }
            }
            ComponentConfig::Application(config) => {
                hasher.update(b"application\0");
                hasher.update(config.platform.as_str());
                hasher.update([0]);
                hasher.update(&config.domain);
                hasher.update([0]);
                for file in &config.sources {
                    hasher.update(file.source.to_string_lossy().as_bytes());
                    hasher.update([0]);
                    hasher.update(&file.dest);
                    hasher.update([0]);
                }
                match self.last_fingerprint(&config.platform) {
                    Some(upstream) => hasher.update(upstream.as_str()),
                    None => hasher.update(b"<unbuilt>"),
                }
            }
        }

        Fingerprint::from_digest(hasher.finalize())
    }

    /// Atomically replaces the component's artifact record.
    pub fn record_success(
        &mut self,
        name: &ComponentName,
        fingerprint: Fingerprint,
        output_path: PathBuf,
    ) {
        debug!(component = %name, %fingerprint, "Recording build artifact");
        self.records
            .insert(name.clone(), ArtifactRecord::new(fingerprint, output_path));
    }

    /// The fingerprint recorded by the last successful build, if any.
    pub fn last_fingerprint(&self, name: &ComponentName) -> Option<&Fingerprint> {
        self.records.get(name).map(|r| &r.fingerprint)
    }

    pub fn record(&self, name: &ComponentName) -> Option<&ArtifactRecord> {
        self.records.get(name)
    }

    pub fn clear(&mut self, name: &ComponentName) {
        self.records.remove(name);
    }
}
