//! Embark CLI tool.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use embark_executor::{LocalImporter, ProcessExecutor};
use embark_orchestrator::BuildOrchestrator;
use embark_workspace::Workspace;

mod commands;

#[derive(Parser)]
#[command(name = "embark")]
#[command(about = "Component build orchestrator for embedded workspaces", long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(long, env = "EMBARK_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// External toolchain binary invoked for build/clean operations
    #[arg(long, env = "EMBARK_TOOLCHAIN", default_value = "embark-toolchain")]
    toolchain: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a platform component bound to a hardware design
    CreatePlatform {
        /// Component name
        name: String,
        /// Hardware design reference (e.g. an exported .xsa path)
        #[arg(long)]
        hw_design: String,
        /// Target CPU
        #[arg(long)]
        cpu: String,
        /// Target operating system
        #[arg(long, default_value = "standalone")]
        os: String,
        /// Domain name (defaults to "<os>_<cpu>")
        #[arg(long)]
        domain: Option<String>,
        /// Compiler toolchain
        #[arg(long, default_value = "gcc")]
        compiler: String,
        /// Generate a device tree blob
        #[arg(long)]
        generate_dtb: bool,
        /// Advanced generation option, key=value (repeatable)
        #[arg(long = "option", value_parser = parse_key_val)]
        options: Vec<(String, String)>,
    },
    /// Create an application component targeting a platform
    CreateApp {
        /// Component name
        name: String,
        /// Platform component to build against
        #[arg(long)]
        platform: String,
        /// Domain within the platform
        #[arg(long)]
        domain: String,
    },
    /// Build a component (and its stale platform dependency first)
    Build {
        /// Component name
        name: String,
    },
    /// Clean a component's build outputs
    Clean {
        /// Component name
        name: String,
    },
    /// Import source files into an application component
    Import {
        /// Component name
        name: String,
        /// Files to import
        files: Vec<PathBuf>,
        /// Replace existing files with the same destination name
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete a component (dependents are invalidated, not deleted)
    Delete {
        /// Component name
        name: String,
    },
    /// Replace a platform's hardware design reference
    UpdateHw {
        /// Platform component name
        name: String,
        /// New hardware design reference
        #[arg(long)]
        hw_design: String,
    },
    /// Regenerate an application's linker script
    RegenLinker {
        /// Application component name
        name: String,
    },
    /// List all components and their state
    Status,
    /// Validate a workspace definition file
    Validate {
        /// Path to the definition file
        #[arg(default_value = "embark.kdl")]
        path: PathBuf,
    },
    /// Create the components a workspace definition declares
    Apply {
        /// Path to the definition file
        #[arg(default_value = "embark.kdl")]
        path: PathBuf,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Validation works on the file alone, before any workspace is touched.
    if let Commands::Validate { path } = &cli.command {
        return commands::validate(path);
    }

    let workspace = Workspace::open(&cli.workspace).await?;
    let executor = Arc::new(ProcessExecutor::new(&cli.toolchain, &cli.workspace));
    let importer = Arc::new(LocalImporter::new(&cli.workspace));
    let orchestrator = BuildOrchestrator::new(workspace, executor, importer);

    match cli.command {
        Commands::CreatePlatform {
            name,
            hw_design,
            cpu,
            os,
            domain,
            compiler,
            generate_dtb,
            options,
        } => {
            commands::create_platform(
                &orchestrator,
                &name,
                hw_design,
                cpu,
                os,
                domain,
                compiler,
                generate_dtb,
                options,
            )
            .await?;
        }
        Commands::CreateApp {
            name,
            platform,
            domain,
        } => {
            commands::create_app(&orchestrator, &name, &platform, domain).await?;
        }
        Commands::Build { name } => {
            commands::build(&orchestrator, &name).await?;
        }
        Commands::Clean { name } => {
            commands::clean(&orchestrator, &name).await?;
        }
        Commands::Import {
            name,
            files,
            overwrite,
        } => {
            commands::import(&orchestrator, &name, files, overwrite).await?;
        }
        Commands::Delete { name } => {
            commands::delete(&orchestrator, &name).await?;
        }
        Commands::UpdateHw { name, hw_design } => {
            commands::update_hw(&orchestrator, &name, hw_design).await?;
        }
        Commands::RegenLinker { name } => {
            commands::regen_linker(&orchestrator, &name).await?;
        }
        Commands::Status => {
            commands::status(&orchestrator).await;
        }
        Commands::Apply { path } => {
            commands::apply(&orchestrator, &path).await?;
        }
        Commands::Validate { .. } => unreachable!("handled above"),
    }

    Ok(())
}
