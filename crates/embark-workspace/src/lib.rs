//! Workspace state for Embark.
//!
//! Owns the component registry, the artifact store, and dependency
//! resolution over the platform→application edge. One [`Workspace`] handle
//! per on-disk workspace; all orchestrator operations go through it.

pub mod persist;
pub mod registry;
pub mod resolver;
pub mod store;
mod workspace;

pub use registry::ComponentRegistry;
pub use resolver::DependencyResolver;
pub use store::ArtifactStore;
pub use workspace::Workspace;
