//! Process-based build executor.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, info};

use embark_core::component::Component;
use embark_core::executor::{BuildExecutor, BuildOutcome, CleanOutcome};
use embark_core::{Error, Result};

/// Runs the external embedded toolchain as a local process.
///
/// The toolchain binary is handed the operation, the component name, and its
/// kind; it reads the component's configuration and sources from the
/// workspace itself. Its exit status is authoritative, stderr is the
/// diagnostic. No timeout is imposed here.
pub struct ProcessExecutor {
    program: PathBuf,
    workspace_root: PathBuf,
}

impl ProcessExecutor {
    pub fn new(program: impl Into<PathBuf>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workspace_root: workspace_root.into(),
        }
    }

    async fn run(&self, operation: &str, component: &Component) -> Result<Output> {
        debug!(
            program = %self.program.display(),
            operation,
            component = %component.name,
            "Spawning toolchain process"
        );
        let output = Command::new(&self.program)
            .arg(operation)
            .arg("--component")
            .arg(component.name.as_str())
            .arg("--kind")
            .arg(component.kind().as_str())
            .current_dir(&self.workspace_root)
            .output()
            .await?;
        Ok(output)
    }

    fn diagnostic(output: &Output) -> String {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let trimmed = stderr.trim();
        if trimmed.is_empty() {
            format!("toolchain exited with {}", output.status)
        } else {
            trimmed.to_string()
        }
    }
}

#[async_trait]
impl BuildExecutor for ProcessExecutor {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn execute_build(&self, component: &Component) -> Result<BuildOutcome> {
        let output_dir = self
            .workspace_root
            .join(component.name.as_str())
            .join("build");
        tokio::fs::create_dir_all(&output_dir).await?;

        let output = self.run("build", component).await?;
        if output.status.success() {
            info!(component = %component.name, "Toolchain build finished");
            Ok(BuildOutcome::Success {
                output_path: output_dir,
            })
        } else {
            Ok(BuildOutcome::Failure {
                diagnostic: Self::diagnostic(&output),
            })
        }
    }

    async fn execute_clean(&self, component: &Component) -> Result<CleanOutcome> {
        let output = self.run("clean", component).await?;
        if output.status.success() {
            Ok(CleanOutcome::Success)
        } else {
            Ok(CleanOutcome::Failure {
                diagnostic: Self::diagnostic(&output),
            })
        }
    }

    async fn regenerate_linker_script(&self, component: &Component) -> Result<()> {
        let output = self.run("regen-linker", component).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::BuildFailure(Self::diagnostic(&output)))
        }
    }
}
