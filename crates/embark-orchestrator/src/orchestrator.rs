//! The build orchestrator: dependency-ordered chains over a workspace.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use embark_core::component::{
    Component, ComponentConfig, ComponentKind, ComponentState, HwDesignRef, SourceFile,
};
use embark_core::executor::{BuildExecutor, BuildOutcome, CleanOutcome, FileImporter};
use embark_core::{ComponentName, Error, Result, RunId};
use embark_workspace::Workspace;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{error, info, warn};

use crate::report::{BuildReport, ComponentStatus, StepResult, StepStatus};

/// Top-level driver for one workspace.
///
/// All state changes funnel through here. Operations on the same component
/// are serialized by a per-name lock; components with no dependency
/// relationship can run concurrently. A dependency-ordered chain holds the
/// locks of every component in the chain for its whole duration, so a
/// platform cannot be deleted or reconfigured while a dependent build is in
/// flight.
pub struct BuildOrchestrator {
    workspace: Arc<RwLock<Workspace>>,
    executor: Arc<dyn BuildExecutor>,
    importer: Arc<dyn FileImporter>,
    locks: Mutex<HashMap<ComponentName, Arc<Mutex<()>>>>,
}

impl BuildOrchestrator {
    pub fn new(
        workspace: Workspace,
        executor: Arc<dyn BuildExecutor>,
        importer: Arc<dyn FileImporter>,
    ) -> Self {
        Self {
            workspace: Arc::new(RwLock::new(workspace)),
            executor,
            importer,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, name: &ComponentName) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(name.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Creates a component in the registry and persists the workspace.
    pub async fn create(&self, name: ComponentName, config: ComponentConfig) -> Result<()> {
        let _guard = self.lock_for(&name).await;
        let mut ws = self.workspace.write().await;
        ws.registry.create(name, config)?;
        ws.save().await
    }

    /// Deletes a component. Dependent applications are marked stale, never
    /// deleted; their artifact records are kept for when a platform of the
    /// same name reappears.
    pub async fn delete(&self, name: &ComponentName) -> Result<()> {
        let _guard = self.lock_for(name).await;
        let mut ws = self.workspace.write().await;
        ws.registry.delete(name)?;
        ws.store.clear(name);
        ws.save().await
    }

    /// Replaces a platform's hardware-description reference, cascading
    /// staleness to its dependents.
    pub async fn update_hw_design(&self, name: &ComponentName, new_ref: HwDesignRef) -> Result<()> {
        let _guard = self.lock_for(name).await;
        let mut ws = self.workspace.write().await;
        ws.registry.update_hw_design(name, new_ref)?;
        ws.save().await
    }

    /// Builds a component, rebuilding a stale platform dependency first.
    ///
    /// Steps whose fingerprint already matches the stored record skip the
    /// executor and report [`StepStatus::AlreadyCurrent`]. A failed step
    /// halts the chain; queued steps are reported cancelled with their state
    /// untouched. Configuration errors (`NotFound`, `DanglingDependency`)
    /// surface as `Err` before any external call.
    pub async fn build(&self, name: &ComponentName) -> Result<BuildReport> {
        let run_id = RunId::new();

        let order = {
            let ws = self.workspace.read().await;
            let component = ws.registry.get(name)?;
            ws.resolver().resolve_build_order(component)?
        };

        // Dependency-first lock order; every chain that includes a platform
        // locks it before its application, so two chains cannot deadlock.
        let mut guards = Vec::with_capacity(order.len());
        for step in &order {
            guards.push(self.lock_for(step).await);
        }

        info!(%run_id, component = %name, steps = order.len(), "Starting build chain");

        let mut steps = Vec::with_capacity(order.len());
        let mut halted = false;
        for step in order {
            if halted {
                warn!(%run_id, component = %step, "Cancelling queued step after upstream failure");
                steps.push(StepResult {
                    component: step,
                    status: StepStatus::Cancelled,
                });
                continue;
            }
            let status = self.build_step(&step).await?;
            if let StepStatus::Failed { .. } = status {
                halted = true;
            }
            steps.push(StepResult {
                component: step,
                status,
            });
        }

        Ok(BuildReport { run_id, steps })
    }

    /// Runs one step of a chain. The caller holds the component's lock.
    async fn build_step(&self, name: &ComponentName) -> Result<StepStatus> {
        let (component, fingerprint) = {
            let mut ws = self.workspace.write().await;
            let component = ws.registry.get(name)?.clone();
            let current = ws.store.fingerprint_of(&component);

            if ws.store.last_fingerprint(name) == Some(&current) {
                // The state flag may lag the fingerprint truth (e.g. after a
                // reload); the record says the artifact is current.
                ws.registry.set_state(name, ComponentState::Built)?;
                ws.save().await?;
                info!(component = %name, "Artifact already current, skipping build");
                return Ok(StepStatus::AlreadyCurrent);
            }

            ws.registry.set_state(name, ComponentState::Building)?;
            ws.save().await?;
            (component, current)
        };

        info!(component = %name, executor = self.executor.name(), "Invoking external build");
        let outcome = self.executor.execute_build(&component).await;

        let mut ws = self.workspace.write().await;
        match outcome {
            Ok(BuildOutcome::Success { output_path }) => {
                ws.store
                    .record_success(name, fingerprint, output_path.clone());
                ws.registry.set_state(name, ComponentState::Built)?;
                ws.save().await?;
                info!(component = %name, output = %output_path.display(), "Build succeeded");
                Ok(StepStatus::Built { output_path })
            }
            Ok(BuildOutcome::Failure { diagnostic }) => {
                ws.registry.set_state(name, ComponentState::Failed)?;
                ws.save().await?;
                error!(component = %name, %diagnostic, "Build failed");
                Ok(StepStatus::Failed { diagnostic })
            }
            Err(e) => {
                // An executor that could not run at all leaves the same
                // footprint as a failed build: Failed state, no record.
                ws.registry.set_state(name, ComponentState::Failed)?;
                ws.save().await?;
                error!(component = %name, error = %e, "Build executor error");
                Ok(StepStatus::Failed {
                    diagnostic: e.to_string(),
                })
            }
        }
    }

    /// Cleans the named component only; never cascades to dependents or
    /// dependencies. On success the artifact record is cleared and the state
    /// returns to `Configured`, forcing the next build to run.
    pub async fn clean(&self, name: &ComponentName) -> Result<()> {
        let _guard = self.lock_for(name).await;

        let component = {
            let ws = self.workspace.read().await;
            ws.registry.get(name)?.clone()
        };

        info!(component = %name, "Invoking external clean");
        match self.executor.execute_clean(&component).await? {
            CleanOutcome::Success => {
                let mut ws = self.workspace.write().await;
                ws.store.clear(name);
                ws.registry.set_state(name, ComponentState::Configured)?;
                ws.save().await
            }
            CleanOutcome::Failure { diagnostic } => {
                error!(component = %name, %diagnostic, "Clean failed");
                Err(Error::CleanFailure(diagnostic))
            }
        }
    }

    /// Imports a batch of source files into an application component.
    ///
    /// The batch is validated against the current source set before any file
    /// is copied, so a duplicate destination rejects the whole batch. On
    /// success the component is marked stale.
    pub async fn import_files(
        &self,
        name: &ComponentName,
        paths: Vec<PathBuf>,
        overwrite: bool,
    ) -> Result<()> {
        let _guard = self.lock_for(name).await;

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(SourceFile::from_source(path)?);
        }

        let component = {
            let ws = self.workspace.read().await;
            let component = ws.registry.get(name)?.clone();
            let Some(app) = component.config.as_application() else {
                return Err(Error::WrongKind {
                    name: name.to_string(),
                    expected: ComponentKind::Application.as_str(),
                    actual: component.kind().as_str(),
                });
            };

            // Stage the whole batch against the current set (and itself)
            // before touching the filesystem.
            let mut staged = app.sources.clone();
            for file in &files {
                staged.insert(file.clone(), overwrite)?;
            }
            component
        };

        for file in &files {
            self.importer
                .copy_into(&component, &file.source, &file.dest)
                .await?;
        }

        let mut ws = self.workspace.write().await;
        ws.registry.import_source_files(name, files, overwrite)?;
        ws.save().await
    }

    /// Regenerates the linker script of an application component. Does not
    /// change build state; callers typically follow with a `build`.
    pub async fn regenerate_linker_script(&self, name: &ComponentName) -> Result<()> {
        let component = {
            let ws = self.workspace.read().await;
            let component = ws.registry.get(name)?.clone();
            if component.kind() != ComponentKind::Application {
                return Err(Error::WrongKind {
                    name: name.to_string(),
                    expected: ComponentKind::Application.as_str(),
                    actual: component.kind().as_str(),
                });
            }
            component
        };
        info!(component = %name, "Regenerating linker script");
        self.executor.regenerate_linker_script(&component).await
    }

    /// Summaries of every component in the workspace.
    pub async fn status(&self) -> Vec<ComponentStatus> {
        let ws = self.workspace.read().await;
        ws.registry
            .iter()
            .map(|component| {
                let record = ws.store.record(&component.name);
                ComponentStatus {
                    name: component.name.clone(),
                    kind: component.kind(),
                    state: component.state,
                    last_built: record.map(|r| r.built_at),
                    output_path: record.map(|r| r.output_path.clone()),
                }
            })
            .collect()
    }

    /// Snapshot of a single component.
    pub async fn get(&self, name: &ComponentName) -> Result<Component> {
        let ws = self.workspace.read().await;
        ws.registry.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use embark_core::component::{AppConfig, PlatformConfig};
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex as StdMutex;

    /// Executor that records every invocation and fails on demand.
    #[derive(Default)]
    struct RecordingExecutor {
        builds: StdMutex<Vec<String>>,
        cleans: StdMutex<Vec<String>>,
        fail_builds: StdMutex<HashSet<String>>,
    }

    impl RecordingExecutor {
        fn fail_build_of(&self, name: &str) {
            self.fail_builds.lock().unwrap().insert(name.to_string());
        }

        fn builds(&self) -> Vec<String> {
            self.builds.lock().unwrap().clone()
        }

        fn cleans(&self) -> Vec<String> {
            self.cleans.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BuildExecutor for RecordingExecutor {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn execute_build(&self, component: &Component) -> Result<BuildOutcome> {
            let name = component.name.to_string();
            self.builds.lock().unwrap().push(name.clone());
            if self.fail_builds.lock().unwrap().contains(&name) {
                Ok(BuildOutcome::Failure {
                    diagnostic: format!("compilation of {name} failed"),
                })
            } else {
                Ok(BuildOutcome::Success {
                    output_path: PathBuf::from(format!("{name}/build/{name}.elf")),
                })
            }
        }

        async fn execute_clean(&self, component: &Component) -> Result<CleanOutcome> {
            self.cleans.lock().unwrap().push(component.name.to_string());
            Ok(CleanOutcome::Success)
        }

        async fn regenerate_linker_script(&self, _component: &Component) -> Result<()> {
            Ok(())
        }
    }

    /// Importer that records copies without touching the filesystem.
    #[derive(Default)]
    struct RecordingImporter {
        copies: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl FileImporter for RecordingImporter {
        async fn copy_into(
            &self,
            component: &Component,
            _source: &Path,
            dest_name: &str,
        ) -> Result<()> {
            self.copies
                .lock()
                .unwrap()
                .push(format!("{}/{}", component.name, dest_name));
            Ok(())
        }
    }

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

    async fn setup() -> (
        BuildOrchestrator,
        Arc<RecordingExecutor>,
        Arc<RecordingImporter>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::open(dir.path()).await.unwrap();
        let executor = Arc::new(RecordingExecutor::default());
        let importer = Arc::new(RecordingImporter::default());
        let orchestrator =
            BuildOrchestrator::new(workspace, executor.clone(), importer.clone());

        orchestrator
            .create(name("base"), platform_config("boards/base.xsa"))
            .await
            .unwrap();
        orchestrator
            .create(name("app"), app_config("base"))
            .await
            .unwrap();

        (orchestrator, executor, importer, dir)
    }

    #[tokio::test]
    async fn test_chain_builds_platform_first() {
        let (orchestrator, executor, _, _dir) = setup().await;

        let report = orchestrator.build(&name("app")).await.unwrap();

        assert!(report.success());
        assert_eq!(executor.builds(), vec!["base", "app"]);
        assert!(matches!(
            report.status_of(&name("base")),
            Some(StepStatus::Built { .. })
        ));
        assert!(matches!(
            report.status_of(&name("app")),
            Some(StepStatus::Built { .. })
        ));
    }

    #[tokio::test]
    async fn test_second_build_skips_executor() {
        let (orchestrator, executor, _, _dir) = setup().await;

        orchestrator.build(&name("app")).await.unwrap();
        let report = orchestrator.build(&name("app")).await.unwrap();

        // Still exactly one external invocation per component.
        assert_eq!(executor.builds(), vec!["base", "app"]);
        assert!(matches!(
            report.status_of(&name("app")),
            Some(StepStatus::AlreadyCurrent)
        ));
    }

    #[tokio::test]
    async fn test_platform_failure_cancels_app_step() {
        let (orchestrator, executor, _, _dir) = setup().await;
        executor.fail_build_of("base");

        let report = orchestrator.build(&name("app")).await.unwrap();

        assert!(!report.success());
        assert!(matches!(
            report.status_of(&name("base")),
            Some(StepStatus::Failed { .. })
        ));
        assert!(matches!(
            report.status_of(&name("app")),
            Some(StepStatus::Cancelled)
        ));
        // No external call was made for the application.
        assert_eq!(executor.builds(), vec!["base"]);

        // The application's state was never touched.
        let app = orchestrator.get(&name("app")).await.unwrap();
        assert_eq!(app.state, ComponentState::Configured);
        let base = orchestrator.get(&name("base")).await.unwrap();
        assert_eq!(base.state, ComponentState::Failed);
    }

    #[tokio::test]
    async fn test_deleted_platform_is_dangling_until_recreated() {
        let (orchestrator, executor, _, _dir) = setup().await;
        orchestrator.delete(&name("base")).await.unwrap();

        let result = orchestrator.build(&name("app")).await;
        assert!(matches!(result, Err(Error::DanglingDependency { .. })));
        assert!(executor.builds().is_empty());

        // Recreating under the same name, even with different config,
        // restores the edge.
        orchestrator
            .create(name("base"), platform_config("boards/rev2.xsa"))
            .await
            .unwrap();
        let report = orchestrator.build(&name("app")).await.unwrap();
        assert!(report.success());
        assert_eq!(executor.builds(), vec!["base", "app"]);
    }

    #[tokio::test]
    async fn test_clean_forces_rebuild_without_cascading() {
        let (orchestrator, executor, _, _dir) = setup().await;
        orchestrator.build(&name("app")).await.unwrap();

        orchestrator.clean(&name("base")).await.unwrap();
        assert_eq!(executor.cleans(), vec!["base"]);

        let base = orchestrator.get(&name("base")).await.unwrap();
        assert_eq!(base.state, ComponentState::Configured);
        // The application keeps its record and state.
        let app = orchestrator.get(&name("app")).await.unwrap();
        assert_eq!(app.state, ComponentState::Built);

        // Same platform config hashes to the same fingerprint, so only the
        // platform actually rebuilds.
        let report = orchestrator.build(&name("app")).await.unwrap();
        assert_eq!(executor.builds(), vec!["base", "app", "base"]);
        assert!(matches!(
            report.status_of(&name("app")),
            Some(StepStatus::AlreadyCurrent)
        ));
    }

    #[tokio::test]
    async fn test_import_triggers_app_rebuild_only() {
        let (orchestrator, executor, importer, _dir) = setup().await;
        orchestrator.build(&name("app")).await.unwrap();

        orchestrator
            .import_files(&name("app"), vec![PathBuf::from("/backups/main.c")], false)
            .await
            .unwrap();
        assert_eq!(
            importer.copies.lock().unwrap().clone(),
            vec!["app/main.c"]
        );

        let app = orchestrator.get(&name("app")).await.unwrap();
        assert_eq!(app.state, ComponentState::Stale);

        let report = orchestrator.build(&name("app")).await.unwrap();
        // The platform is untouched and not even part of the chain.
        assert_eq!(executor.builds(), vec!["base", "app", "app"]);
        assert!(report.status_of(&name("base")).is_none());
    }

    #[tokio::test]
    async fn test_duplicate_import_rejects_batch_before_copying() {
        let (orchestrator, _, importer, _dir) = setup().await;

        let result = orchestrator
            .import_files(
                &name("app"),
                vec![
                    PathBuf::from("/backups/main.c"),
                    PathBuf::from("/elsewhere/main.c"),
                ],
                false,
            )
            .await;

        assert!(matches!(result, Err(Error::DuplicateSource(_))));
        assert!(importer.copies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hw_update_invalidates_whole_chain() {
        let (orchestrator, executor, _, _dir) = setup().await;
        orchestrator.build(&name("app")).await.unwrap();

        orchestrator
            .update_hw_design(&name("base"), HwDesignRef::new("boards/rev2.xsa"))
            .await
            .unwrap();

        let report = orchestrator.build(&name("app")).await.unwrap();
        assert!(report.success());
        assert_eq!(executor.builds(), vec!["base", "app", "base", "app"]);
    }

    #[tokio::test]
    async fn test_build_unknown_component() {
        let (orchestrator, _, _, _dir) = setup().await;
        let result = orchestrator.build(&name("ghost")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_regenerate_linker_script_is_application_only() {
        let (orchestrator, _, _, _dir) = setup().await;
        let result = orchestrator.regenerate_linker_script(&name("base")).await;
        assert!(matches!(result, Err(Error::WrongKind { .. })));
        orchestrator
            .regenerate_linker_script(&name("app"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_platform_build_standalone() {
        let (orchestrator, executor, _, _dir) = setup().await;

        let report = orchestrator.build(&name("base")).await.unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(executor.builds(), vec!["base"]);

        // The application chain now only needs the application itself.
        orchestrator.build(&name("app")).await.unwrap();
        assert_eq!(executor.builds(), vec!["base", "app"]);
    }
}
