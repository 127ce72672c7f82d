//! Build, clean, and linker-script commands.

use anyhow::Result;
use embark_core::ComponentName;
use embark_orchestrator::{BuildOrchestrator, StepStatus};

/// Build a component, printing the per-step results of the chain.
pub async fn build(orchestrator: &BuildOrchestrator, name: &str) -> Result<()> {
    let name = ComponentName::new(name)?;
    let report = orchestrator.build(&name).await?;

    println!("Build run {}", report.run_id);
    for step in &report.steps {
        match &step.status {
            StepStatus::AlreadyCurrent => {
                println!("  ○ {} - already current", step.component);
            }
            StepStatus::Built { output_path } => {
                println!("  ✓ {} - built ({})", step.component, output_path.display());
            }
            StepStatus::Failed { diagnostic } => {
                println!("  ✗ {} - failed: {}", step.component, diagnostic);
            }
            StepStatus::Cancelled => {
                println!("  ⊘ {} - cancelled", step.component);
            }
        }
    }

    if report.success() {
        Ok(())
    } else {
        anyhow::bail!("build failed");
    }
}

pub async fn clean(orchestrator: &BuildOrchestrator, name: &str) -> Result<()> {
    let name = ComponentName::new(name)?;
    orchestrator.clean(&name).await?;
    println!("✓ Cleaned '{name}'");
    Ok(())
}

pub async fn regen_linker(orchestrator: &BuildOrchestrator, name: &str) -> Result<()> {
    let name = ComponentName::new(name)?;
    orchestrator.regenerate_linker_script(&name).await?;
    println!("✓ Regenerated linker script for '{name}'");
    Ok(())
}
