//! Workspace and manifest handling: parses `daisy.toml` and resolves it
//! into the packages and search paths the rest of the compiler consumes.

pub mod manifest;
pub mod workspace;

pub use manifest::{DependencySpec, Manifest, ManifestError, PackageSection, WorkspaceSection};
pub use workspace::{Package, Workspace};
