//! The `daisyc` CLI surface: `build`, `test`, `bench`, the self-hosting
//! bootstrap subcommands, and an `lsp` stub.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::cache::BuildCache;
use crate::driver::config::FeatureFlags;
use crate::driver::pipeline;
use crate::project::Workspace;
use crate::resolve::SearchPaths;

#[derive(Debug, Parser)]
#[command(name = "daisyc", version, about = "The DAISY compiler front/middle end")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Dump each compiled module's IR to `<module>.ir.txt`.
    #[arg(long, global = true)]
    pub emit_ir: bool,

    /// Write per-phase timings to `build/profile.json`.
    #[arg(long, global = true)]
    pub profile: bool,

    /// Enable runtime bounds/null/socket-validity guards in emitted C.
    #[arg(long = "rt-checks", global = true)]
    pub rt_checks: bool,

    /// Sanitizer to link the build against; only `address` is recognized.
    #[arg(long, global = true)]
    pub sanitize: Option<String>,

    /// Enable link-time optimization.
    #[arg(long, global = true)]
    pub lto: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile one file and the modules it imports.
    Build { path: PathBuf },
    /// Run the test harness.
    Test {
        #[arg(long)]
        long: bool,
    },
    /// Compile with optimizations and run benches.
    Bench {
        #[arg(long)]
        json: bool,
    },
    /// Bootstrap: build the stage-1 compiler.
    BuildStage1,
    /// Bootstrap: build the self-hosted compiler.
    BuildCompiler,
    /// Start the language server.
    Lsp,
}

impl Cli {
    fn flags(&self) -> FeatureFlags {
        FeatureFlags {
            runtime_checks: self.rt_checks,
            lto: self.lto,
            sanitize_address: self.sanitize.as_deref() == Some("address"),
            emit_ir: self.emit_ir,
            profile: self.profile,
        }
    }
}

/// Exit codes per the CLI contract: 0 success, 1 diagnostics, 2 internal
/// error.
pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Build { ref path } => run_build(&cli, path),
        Command::Test { long } => {
            tracing::info!(long, "test harness is an out-of-scope collaborator");
            ExitCode::from(2)
        }
        Command::Bench { json } => {
            tracing::info!(json, "bench harness is an out-of-scope collaborator");
            ExitCode::from(2)
        }
        Command::BuildStage1 | Command::BuildCompiler => {
            tracing::info!("self-hosting bootstrap is an out-of-scope collaborator");
            ExitCode::from(2)
        }
        Command::Lsp => {
            println!("lsp: not implemented here; the language server is an out-of-scope collaborator");
            ExitCode::SUCCESS
        }
    }
}

fn run_build(cli: &Cli, path: &std::path::Path) -> ExitCode {
    let root = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let workspace = match Workspace::load(root) {
        Ok(ws) => ws,
        Err(err) => {
            tracing::error!(error = %err, "failed to load workspace manifest");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = workspace.check_abi() {
        eprintln!("{err}");
        return ExitCode::from(1);
    }

    let search_paths = workspace.search_paths();
    let cache = match BuildCache::new(root.join(crate::base::constants::BUILD_DIR)) {
        Ok(cache) => cache,
        Err(err) => {
            tracing::error!(error = %err, "failed to initialize build cache");
            return ExitCode::from(2);
        }
    };

    let report = match pipeline::compile(path, &search_paths, cli.flags(), &cache) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "internal compiler error");
            return ExitCode::from(2);
        }
    };

    for module in &report.modules {
        for diagnostic in &module.diagnostics {
            eprintln!(
                "{}: {} ({})",
                module.name,
                diagnostic.message,
                diagnostic.kind.code()
            );
        }
    }

    if report.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Initializes the `tracing` subscriber once, honoring `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rt_checks_flag_maps_to_runtime_checks() {
        let cli = Cli::parse_from(["daisyc", "--rt-checks", "build", "main.dsy"]);
        assert!(cli.flags().runtime_checks);
    }

    #[test]
    fn sanitize_address_is_recognized() {
        let cli = Cli::parse_from(["daisyc", "--sanitize", "address", "build", "main.dsy"]);
        assert!(cli.flags().sanitize_address);
    }
}
