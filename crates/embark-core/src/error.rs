//! Error types for Embark.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate component name: {0}")]
    DuplicateName(String),

    #[error("component not found: {0}")]
    NotFound(String),

    #[error("component {name} is a {actual} component, expected {expected}")]
    WrongKind {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("application {app} depends on missing platform {platform}")]
    DanglingDependency { app: String, platform: String },

    #[error("build failed: {0}")]
    BuildFailure(String),

    #[error("clean failed: {0}")]
    CleanFailure(String),

    #[error("invalid component name: {0}")]
    InvalidName(String),

    #[error("duplicate source destination: {0}")]
    DuplicateSource(String),

    #[error("import failed: {0}")]
    ImportFailure(String),

    #[error("workspace state error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
