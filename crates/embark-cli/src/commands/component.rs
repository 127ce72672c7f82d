//! Component management commands.

use std::path::PathBuf;

use anyhow::Result;
use embark_core::component::{
    AppConfig, ComponentConfig, ComponentState, HwDesignRef, PlatformConfig,
};
use embark_core::ComponentName;
use embark_orchestrator::BuildOrchestrator;

#[allow(clippy::too_many_arguments)]
pub async fn create_platform(
    orchestrator: &BuildOrchestrator,
    name: &str,
    hw_design: String,
    cpu: String,
    os: String,
    domain: Option<String>,
    compiler: String,
    generate_dtb: bool,
    options: Vec<(String, String)>,
) -> Result<()> {
    let name = ComponentName::new(name)?;
    let domain = domain.unwrap_or_else(|| format!("{os}_{cpu}"));
    let config = ComponentConfig::Platform(PlatformConfig {
        hw_design: HwDesignRef::new(hw_design),
        os,
        cpu,
        domain,
        compiler,
        generate_dtb,
        advanced: options.into_iter().collect(),
    });

    orchestrator.create(name.clone(), config).await?;
    println!("✓ Created platform '{name}'");
    Ok(())
}

pub async fn create_app(
    orchestrator: &BuildOrchestrator,
    name: &str,
    platform: &str,
    domain: String,
) -> Result<()> {
    let name = ComponentName::new(name)?;
    let config = ComponentConfig::Application(AppConfig {
        platform: ComponentName::new(platform)?,
        domain,
        sources: Default::default(),
    });

    orchestrator.create(name.clone(), config).await?;
    println!("✓ Created application '{name}'");
    Ok(())
}

pub async fn delete(orchestrator: &BuildOrchestrator, name: &str) -> Result<()> {
    let name = ComponentName::new(name)?;
    orchestrator.delete(&name).await?;
    println!("✓ Deleted '{name}'");
    Ok(())
}

pub async fn import(
    orchestrator: &BuildOrchestrator,
    name: &str,
    files: Vec<PathBuf>,
    overwrite: bool,
) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("no files to import");
    }
    let name = ComponentName::new(name)?;
    let count = files.len();
    orchestrator.import_files(&name, files, overwrite).await?;
    println!("✓ Imported {count} file(s) into '{name}'");
    Ok(())
}

pub async fn update_hw(
    orchestrator: &BuildOrchestrator,
    name: &str,
    hw_design: String,
) -> Result<()> {
    let name = ComponentName::new(name)?;
    orchestrator
        .update_hw_design(&name, HwDesignRef::new(hw_design))
        .await?;
    println!("✓ Updated hardware design of '{name}' (dependents invalidated)");
    Ok(())
}

pub async fn status(orchestrator: &BuildOrchestrator) {
    let statuses = orchestrator.status().await;
    if statuses.is_empty() {
        println!("No components");
        return;
    }

    for status in statuses {
        let state = match status.state {
            ComponentState::Unconfigured => "unconfigured",
            ComponentState::Configured => "configured",
            ComponentState::Building => "building",
            ComponentState::Built => "built",
            ComponentState::Failed => "failed",
            ComponentState::Stale => "stale",
        };
        let built = status
            .last_built
            .map(|t| format!(", last built {}", t.format("%Y-%m-%d %H:%M:%S")))
            .unwrap_or_default();
        println!(
            "  {} [{}] - {}{}",
            status.name,
            status.kind.as_str(),
            state,
            built
        );
    }
}
