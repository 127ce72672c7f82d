//! Workspace definition commands.

use std::path::Path;

use anyhow::{Context, Result};
use embark_config::parse_workspace;
use embark_core::Error;
use embark_orchestrator::BuildOrchestrator;

/// Parse and validate a definition file without touching the workspace.
pub fn validate(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading definition file {}", path.display()))?;
    let def = parse_workspace(&content)
        .with_context(|| format!("parsing definition file {}", path.display()))?;

    println!(
        "✓ '{}' is valid: {} component(s)",
        def.name,
        def.components.len()
    );
    for component in &def.components {
        println!("  {} [{}]", component.name, component.config.kind().as_str());
    }
    Ok(())
}

/// Create every component the definition declares that does not already
/// exist. Existing components are left untouched.
pub async fn apply(orchestrator: &BuildOrchestrator, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading definition file {}", path.display()))?;
    let def = parse_workspace(&content)
        .with_context(|| format!("parsing definition file {}", path.display()))?;

    let mut created = 0usize;
    for component in def.components {
        match orchestrator
            .create(component.name.clone(), component.config)
            .await
        {
            Ok(()) => {
                println!("✓ Created '{}'", component.name);
                created += 1;
            }
            Err(Error::DuplicateName(_)) => {
                println!("○ '{}' already exists, skipping", component.name);
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("Applied '{}': {created} component(s) created", def.name);
    Ok(())
}
