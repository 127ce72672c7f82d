//! KDL workspace definition parsing for Embark.
//!
//! A workspace definition file (`embark.kdl`) declares the platform and
//! application components a workspace should contain; the CLI applies it
//! against the registry.

pub mod error;
pub mod workspace;

pub use error::{ConfigError, ConfigResult};
pub use workspace::{parse_workspace, ComponentDef, WorkspaceDef};
