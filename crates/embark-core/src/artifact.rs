//! Artifact records and fingerprint tokens.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Deterministic identity token over a component's declared inputs.
///
/// Fingerprints are compared for equality only; the encoding (hex SHA-256)
/// is an implementation detail of the store that computes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_digest(digest: impl AsRef<[u8]>) -> Self {
        Self(hex::encode(digest.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The last successful build of a component: the fingerprint of the exact
/// input set that produced the output, and where the output landed.
/// Replaced wholesale on every successful build, never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub fingerprint: Fingerprint,
    pub output_path: PathBuf,
    pub built_at: DateTime<Utc>,
}

impl ArtifactRecord {
    pub fn new(fingerprint: Fingerprint, output_path: PathBuf) -> Self {
        Self {
            fingerprint,
            output_path,
            built_at: Utc::now(),
        }
    }
}
