//! Wires every phase into the `daisyc` binary: pipeline orchestration,
//! the `clap`-derived CLI surface, and ambient configuration.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod pipeline;

pub use config::{CompilerConfig, FeatureFlags};
pub use pipeline::{compile, CompiledModule, PipelineError, PipelineReport};
