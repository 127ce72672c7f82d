//! Dependency resolution over the platform→application edge.

use embark_core::component::{Component, ComponentKind, ComponentState};
use embark_core::{ComponentName, Error, Result};

use crate::registry::ComponentRegistry;
use crate::store::ArtifactStore;

/// Read-only view over the registry and store answering staleness and
/// build-order questions.
pub struct DependencyResolver<'a> {
    registry: &'a ComponentRegistry,
    store: &'a ArtifactStore,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(registry: &'a ComponentRegistry, store: &'a ArtifactStore) -> Self {
        Self { registry, store }
    }

    /// Whether the component's cached artifact no longer matches its current
    /// inputs.
    ///
    /// The `Stale` state flag is a fast-path cache; the fingerprint
    /// comparison is the source of truth and also covers state bookkeeping
    /// that was bypassed (e.g. a crash-recovery reload). A never-built
    /// component is stale by definition.
    pub fn is_stale(&self, component: &Component) -> bool {
        if component.state == ComponentState::Stale {
            return true;
        }
        self.store.last_fingerprint(&component.name)
            != Some(&self.store.fingerprint_of(component))
    }

    /// The ordered list of components to build for `component`, dependency
    /// first.
    ///
    /// For an application whose platform is stale the order is
    /// `[platform, app]`; otherwise `[app]`. A platform resolves to itself.
    /// An application is never built against a stale platform artifact.
    pub fn resolve_build_order(&self, component: &Component) -> Result<Vec<ComponentName>> {
        let Some(platform_name) = component.platform_dependency() else {
            return Ok(vec![component.name.clone()]);
        };

        let platform = match self.registry.get(platform_name) {
            Ok(platform) => platform,
            Err(Error::NotFound(_)) => {
                return Err(Error::DanglingDependency {
                    app: component.name.to_string(),
                    platform: platform_name.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if platform.kind() != ComponentKind::Platform {
            return Err(Error::WrongKind {
                name: platform_name.to_string(),
                expected: ComponentKind::Platform.as_str(),
                actual: platform.kind().as_str(),
            });
        }

        if self.is_stale(platform) {
            Ok(vec![platform_name.clone(), component.name.clone()])
        } else {
            Ok(vec![component.name.clone()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embark_core::component::{
        AppConfig, ComponentConfig, HwDesignRef, PlatformConfig,
    };

    fn name(s: &str) -> ComponentName {
        ComponentName::new(s).unwrap()
    }

    fn platform_config(hw: &str) -> ComponentConfig {
        ComponentConfig::Platform(PlatformConfig {
            hw_design: HwDesignRef::new(hw),
            os: "standalone".to_string(),
            cpu: "ps7_cortexa9_0".to_string(),
            domain: "standalone_ps7_cortexa9_0".to_string(),
            compiler: "gcc".to_string(),
            generate_dtb: false,
            advanced: Default::default(),
        })
    }

    fn app_config(platform: &str) -> ComponentConfig {
        ComponentConfig::Application(AppConfig {
            platform: name(platform),
            domain: "standalone_ps7_cortexa9_0".to_string(),
            sources: Default::default(),
        })
    }

    /// Registry with `base` platform and `app` application, neither built.
    fn fixture() -> (ComponentRegistry, ArtifactStore) {
        let mut registry = ComponentRegistry::new();
        registry
            .create(name("base"), platform_config("boards/base.xsa"))
            .unwrap();
        registry.create(name("app"), app_config("base")).unwrap();
        (registry, ArtifactStore::new())
    }

    fn build(registry: &mut ComponentRegistry, store: &mut ArtifactStore, n: &str) {
        let fp = store.fingerprint_of(registry.get(&name(n)).unwrap());
        store.record_success(&name(n), fp, format!("{n}/out").into());
        registry
            .set_state(&name(n), ComponentState::Built)
            .unwrap();
    }

    #[test]
    fn test_never_built_is_stale() {
        let (registry, store) = fixture();
        let resolver = DependencyResolver::new(&registry, &store);
        assert!(resolver.is_stale(registry.get(&name("base")).unwrap()));
    }

    #[test]
    fn test_built_component_is_current() {
        let (mut registry, mut store) = fixture();
        build(&mut registry, &mut store, "base");

        let resolver = DependencyResolver::new(&registry, &store);
        assert!(!resolver.is_stale(registry.get(&name("base")).unwrap()));
    }

    #[test]
    fn test_stale_platform_orders_platform_first() {
        let (registry, store) = fixture();
        let resolver = DependencyResolver::new(&registry, &store);
        let order = resolver
            .resolve_build_order(registry.get(&name("app")).unwrap())
            .unwrap();
        assert_eq!(order, vec![name("base"), name("app")]);
    }

    #[test]
    fn test_current_platform_orders_app_alone() {
        let (mut registry, mut store) = fixture();
        build(&mut registry, &mut store, "base");

        let resolver = DependencyResolver::new(&registry, &store);
        let order = resolver
            .resolve_build_order(registry.get(&name("app")).unwrap())
            .unwrap();
        assert_eq!(order, vec![name("app")]);
    }

    #[test]
    fn test_hw_update_cascades_through_fingerprints() {
        let (mut registry, mut store) = fixture();
        build(&mut registry, &mut store, "base");
        build(&mut registry, &mut store, "app");

        registry
            .update_hw_design(&name("base"), HwDesignRef::new("boards/rev2.xsa"))
            .unwrap();

        let resolver = DependencyResolver::new(&registry, &store);
        assert!(resolver.is_stale(registry.get(&name("base")).unwrap()));
        assert!(resolver.is_stale(registry.get(&name("app")).unwrap()));
    }

    #[test]
    fn test_deleted_platform_is_dangling() {
        let (mut registry, store) = fixture();
        registry.delete(&name("base")).unwrap();

        let resolver = DependencyResolver::new(&registry, &store);
        let result = resolver.resolve_build_order(registry.get(&name("app")).unwrap());
        assert!(matches!(result, Err(Error::DanglingDependency { .. })));
    }

    #[test]
    fn test_recreated_platform_restores_resolution() {
        let (mut registry, store) = fixture();
        registry.delete(&name("base")).unwrap();
        // Different config is fine: the name is what the edge points at.
        registry
            .create(name("base"), platform_config("boards/rev2.xsa"))
            .unwrap();

        let resolver = DependencyResolver::new(&registry, &store);
        let order = resolver
            .resolve_build_order(registry.get(&name("app")).unwrap())
            .unwrap();
        assert_eq!(order, vec![name("base"), name("app")]);
    }
}
