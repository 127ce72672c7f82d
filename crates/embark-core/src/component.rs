//! Component definitions: kinds, configuration, lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::name::ComponentName;
use crate::{Error, Result};

/// The two component kinds. Platforms never depend on applications, so the
/// dependency graph is acyclic by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Platform,
    Application,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Platform => "platform",
            ComponentKind::Application => "application",
        }
    }
}

/// Lifecycle state of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentState {
    /// Declared but not yet configured.
    Unconfigured,
    /// Configured, no current build artifact.
    Configured,
    /// An external build is in flight.
    Building,
    /// Last build succeeded and inputs were unchanged since.
    Built,
    /// Last build failed.
    Failed,
    /// An upstream, config, or source change invalidated the cached build.
    Stale,
}

impl ComponentState {
    /// Whether the next build call must run the external executor regardless
    /// of fingerprints. `Stale` still consults the fingerprint comparison,
    /// which is the source of truth.
    pub fn forces_rebuild(&self) -> bool {
        matches!(self, ComponentState::Configured | ComponentState::Failed)
    }
}

/// An opaque reference to a compiled hardware design (e.g. an exported
/// `.xsa` path). The orchestrator only compares it for identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HwDesignRef(String);

impl HwDesignRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Configuration of a platform component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Reference to the compiled hardware design this platform wraps.
    pub hw_design: HwDesignRef,
    /// Target operating system (e.g. "standalone").
    pub os: String,
    /// Target CPU (e.g. "ps7_cortexa9_0").
    pub cpu: String,
    /// Domain name within the platform.
    pub domain: String,
    /// Compiler toolchain identifier.
    pub compiler: String,
    /// Whether to generate a device tree blob.
    pub generate_dtb: bool,
    /// Free-form generation options (e.g. dt_overlay). BTreeMap keeps the
    /// fingerprint input ordering stable.
    pub advanced: BTreeMap<String, String>,
}

/// Configuration of an application component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the platform component this application builds against.
    pub platform: ComponentName,
    /// Domain within that platform.
    pub domain: String,
    /// Source files imported into the component's source tree.
    pub sources: SourceFileSet,
}

/// Kind-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentConfig {
    Platform(PlatformConfig),
    Application(AppConfig),
}

impl ComponentConfig {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentConfig::Platform(_) => ComponentKind::Platform,
            ComponentConfig::Application(_) => ComponentKind::Application,
        }
    }

    pub fn as_platform(&self) -> Option<&PlatformConfig> {
        match self {
            ComponentConfig::Platform(config) => Some(config),
            ComponentConfig::Application(_) => None,
        }
    }

    pub fn as_application(&self) -> Option<&AppConfig> {
        match self {
            ComponentConfig::Application(config) => Some(config),
            ComponentConfig::Platform(_) => None,
        }
    }
}

/// A single imported source file: where it came from and the file name it
/// takes inside the component source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub source: PathBuf,
    pub dest: String,
}

impl SourceFile {
    /// Destination name defaults to the source file name.
    pub fn from_source(source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let dest = source
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::ImportFailure(format!("{} has no usable file name", source.display()))
            })?;
        Ok(Self { source, dest })
    }
}

/// Ordered collection of imported source files, unique by destination name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFileSet(Vec<SourceFile>);

impl SourceFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.0.iter()
    }

    pub fn contains_dest(&self, dest: &str) -> bool {
        self.0.iter().any(|f| f.dest == dest)
    }

    /// Adds a file. A duplicate destination is rejected unless `overwrite`
    /// is set, in which case the existing entry is replaced in place so the
    /// set order is preserved.
    pub fn insert(&mut self, file: SourceFile, overwrite: bool) -> Result<()> {
        if let Some(existing) = self.0.iter_mut().find(|f| f.dest == file.dest) {
            if !overwrite {
                return Err(Error::DuplicateSource(file.dest));
            }
            *existing = file;
            return Ok(());
        }
        self.0.push(file);
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SourceFileSet {
    type Item = &'a SourceFile;
    type IntoIter = std::slice::Iter<'a, SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A named, persistent build target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Unique name within the workspace.
    pub name: ComponentName,
    /// Kind-specific configuration.
    pub config: ComponentConfig,
    /// Current lifecycle state.
    pub state: ComponentState,
    /// When the component was created.
    pub created_at: DateTime<Utc>,
}

impl Component {
    pub fn new(name: ComponentName, config: ComponentConfig) -> Self {
        Self {
            name,
            config,
            state: ComponentState::Configured,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.config.kind()
    }

    /// The platform this component depends on, if it is an application.
    pub fn platform_dependency(&self) -> Option<&ComponentName> {
        self.config.as_application().map(|app| &app.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(dest: &str) -> SourceFile {
        SourceFile {
            source: PathBuf::from(format!("/backups/{dest}")),
            dest: dest.to_string(),
        }
    }

    #[test]
    fn test_source_set_rejects_duplicate_dest() {
        let mut sources = SourceFileSet::new();
        sources.insert(file("main.c"), false).unwrap();
        let result = sources.insert(file("main.c"), false);
        assert!(matches!(result, Err(Error::DuplicateSource(_))));
        assert_eq!(sources.len(), 1);
    }

    #[test]
    fn test_source_set_overwrite_replaces_in_place() {
        let mut sources = SourceFileSet::new();
        sources.insert(file("main.c"), false).unwrap();
        sources.insert(file("driver.c"), false).unwrap();

        let replacement = SourceFile {
            source: PathBuf::from("/elsewhere/main.c"),
            dest: "main.c".to_string(),
        };
        sources.insert(replacement, true).unwrap();

        assert_eq!(sources.len(), 2);
        let first = sources.iter().next().unwrap();
        assert_eq!(first.dest, "main.c");
        assert_eq!(first.source, PathBuf::from("/elsewhere/main.c"));
    }

    #[test]
    fn test_dest_defaults_to_file_name() {
        let file = SourceFile::from_source("/backups/zynq_lcd_st7789.c").unwrap();
        assert_eq!(file.dest, "zynq_lcd_st7789.c");
    }
}
