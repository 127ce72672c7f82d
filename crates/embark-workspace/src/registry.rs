//! The component registry: named components and their lifecycle state.

use std::collections::BTreeMap;

use embark_core::component::{
    Component, ComponentConfig, ComponentKind, ComponentState, HwDesignRef, SourceFile,
};
use embark_core::{ComponentName, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Owns the set of named components in a workspace.
///
/// Referential integrity of the application→platform edge is checked at
/// creation; builds re-check it through the resolver, since a platform may
/// be deleted out from under its dependents at any time.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ComponentRegistry {
    components: BTreeMap<ComponentName, Component>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a component in state `Configured`.
    pub fn create(&mut self, name: ComponentName, config: ComponentConfig) -> Result<&Component> {
        if self.components.contains_key(&name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        if let Some(app) = config.as_application() {
            match self.components.get(&app.platform) {
                Some(platform) if platform.kind() == ComponentKind::Platform => {}
                Some(other) => {
                    return Err(Error::InvalidReference(format!(
                        "{} is a {} component, not a platform",
                        other.name,
                        other.kind().as_str()
                    )));
                }
                None => {
                    return Err(Error::InvalidReference(format!(
                        "platform {} does not exist",
                        app.platform
                    )));
                }
            }
        }

        info!(component = %name, kind = config.kind().as_str(), "Creating component");
        let component = Component::new(name.clone(), config);
        self.components.insert(name.clone(), component);
        Ok(&self.components[&name])
    }

    pub fn get(&self, name: &ComponentName) -> Result<&Component> {
        self.components
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &ComponentName) -> bool {
        self.components.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Removes a component. Remaining applications that depend on it are
    /// marked `Stale`, not deleted: their imported sources stay meaningful
    /// once a replacement platform of the same name is created.
    pub fn delete(&mut self, name: &ComponentName) -> Result<Component> {
        let removed = self
            .components
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        if removed.kind() == ComponentKind::Platform {
            for dependent in self.dependents_of(name) {
                debug!(component = %dependent, platform = %name, "Marking dependent stale");
                self.mark_stale(&dependent);
            }
        }

        info!(component = %name, "Deleted component");
        Ok(removed)
    }

    /// Replaces a platform's hardware-description reference and cascades
    /// staleness to the platform and every dependent application.
    pub fn update_hw_design(&mut self, name: &ComponentName, new_ref: HwDesignRef) -> Result<()> {
        let component = self
            .components
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let ComponentConfig::Platform(config) = &mut component.config else {
            return Err(Error::WrongKind {
                name: name.to_string(),
                expected: ComponentKind::Platform.as_str(),
                actual: component.kind().as_str(),
            });
        };

        info!(component = %name, hw_design = new_ref.as_str(), "Updating hardware design");
        config.hw_design = new_ref;
        component.state = ComponentState::Stale;

        for dependent in self.dependents_of(name) {
            self.mark_stale(&dependent);
        }
        Ok(())
    }

    /// Appends a batch of files to an application's source set and marks it
    /// `Stale`. The whole batch is validated against the current set (and
    /// itself) before anything is committed.
    pub fn import_source_files(
        &mut self,
        name: &ComponentName,
        files: Vec<SourceFile>,
        overwrite: bool,
    ) -> Result<()> {
        let component = self
            .components
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let ComponentConfig::Application(config) = &mut component.config else {
            return Err(Error::WrongKind {
                name: name.to_string(),
                expected: ComponentKind::Application.as_str(),
                actual: component.kind().as_str(),
            });
        };

        let mut staged = config.sources.clone();
        for file in files {
            staged.insert(file, overwrite)?;
        }

        info!(component = %name, files = staged.len(), "Imported source files");
        config.sources = staged;
        component.state = ComponentState::Stale;
        Ok(())
    }

    /// Names of all applications whose platform reference equals `platform`.
    pub fn dependents_of(&self, platform: &ComponentName) -> Vec<ComponentName> {
        self.components
            .values()
            .filter(|c| c.platform_dependency() == Some(platform))
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn set_state(&mut self, name: &ComponentName, state: ComponentState) -> Result<()> {
        let component = self
            .components
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        debug!(component = %name, ?state, "State transition");
        component.state = state;
        Ok(())
    }

    fn mark_stale(&mut self, name: &ComponentName) {
        if let Some(component) = self.components.get_mut(name) {
            component.state = ComponentState::Stale;
        }
    }
}
