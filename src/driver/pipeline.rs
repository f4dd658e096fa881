//! Wires `resolve -> hir -> borrowck -> ir -> emit -> cache` into the one
//! entry point the CLI and tests both call.

use std::path::Path;

use thiserror::Error;

use crate::base::FileTable;
use crate::borrowck::BorrowChecker;
use crate::cache::{AbiManifest, BuildCache, CacheError, CacheKey, CacheStatus};
use crate::driver::config::FeatureFlags;
use crate::emit::{CEmitter, EmitConfig, EmittedModule};
use crate::hir::check::Checker;
use crate::hir::diagnostics::Diagnostic;
use crate::ir::lower_module;
use crate::parser::ast::Item;
use crate::resolve::{resolve, ModuleGraph, ResolveError, SearchPaths};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub struct CompiledModule {
    pub name: String,
    pub diagnostics: Vec<Diagnostic>,
    pub cached: bool,
    pub emitted: Option<EmittedModule>,
}

pub struct PipelineReport {
    pub modules: Vec<CompiledModule>,
}

impl PipelineReport {
    pub fn has_errors(&self) -> bool {
        self.modules.iter().any(|m| !m.diagnostics.is_empty())
    }
}

fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string())
}

fn exported_functions(items: &[Item]) -> Vec<String> {
    let mut names = Vec::new();
    for item in items {
        if let Item::Function(def) = item {
            if def.is_public {
                names.push(def.name.clone());
            }
        }
    }
    names
}

/// Resolves `entry`'s import graph and compiles every module it reaches,
/// reusing the [`BuildCache`] entry for any module whose source and
/// active flags have not changed since the last run.
pub fn compile(
    entry: &Path,
    search_paths: &SearchPaths,
    flags: FeatureFlags,
    cache: &BuildCache,
) -> Result<PipelineReport, PipelineError> {
    let mut files = FileTable::new();
    let (graph, _entry_id) = resolve(&mut files, search_paths, entry)?;
    compile_graph(&graph, flags, cache)
}

fn compile_graph(
    graph: &ModuleGraph,
    flags: FeatureFlags,
    cache: &BuildCache,
) -> Result<PipelineReport, PipelineError> {
    let cache_flags = flags.cache_flags();
    let mut modules = Vec::new();

    for node in graph.iter() {
        let name = module_name(&node.path);
        let _span = tracing::debug_span!("compile_module", module = %name).entered();

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        for err in &node.syntax_errors {
            diagnostics.push(Diagnostic::new(
                crate::hir::diagnostics::DiagnosticKind::SyntaxError,
                err.span,
                err.to_string(),
            ));
        }

        let key = CacheKey::new(&node.file.text, &cache_flags);
        if diagnostics.is_empty() {
            if let CacheStatus::Hit = cache.check(&name, &key) {
                tracing::debug!(module = %name, "build cache hit");
                modules.push(CompiledModule {
                    name,
                    diagnostics,
                    cached: true,
                    emitted: None,
                });
                continue;
            }
        }

        let mut checker = Checker::new();
        checker.check_module(&node.ast, node.id);
        diagnostics.extend(checker.diagnostics);

        let mut borrow_checker = BorrowChecker::new();
        borrow_checker.check_module(&node.ast);
        diagnostics.extend(borrow_checker.diagnostics);

        if !diagnostics.is_empty() {
            tracing::debug!(module = %name, count = diagnostics.len(), "module has diagnostics, skipping codegen");
            modules.push(CompiledModule {
                name,
                diagnostics,
                cached: false,
                emitted: None,
            });
            continue;
        }

        let ir = lower_module(&node.ast);
        let emit_config = EmitConfig::new(flags.runtime_checks, flags.lto);
        let emitted = CEmitter::new(emit_config).emit_module(&name, &ir);

        let abi = AbiManifest {
            module: name.clone(),
            abi_major: crate::base::constants::ABI_MAJOR,
            exported_functions: exported_functions(&node.ast.items),
        };
        let ir_dump = if flags.emit_ir {
            Some(format!("{:#?}", ir))
        } else {
            None
        };
        cache.store(&name, &key, &emitted.source, ir_dump.as_deref(), &abi)?;
        cache.write_unsafe_log(&name, &borrow_checker.unsafe_log)?;

        modules.push(CompiledModule {
            name,
            diagnostics,
            cached: false,
            emitted: Some(emitted),
        });
    }

    Ok(PipelineReport { modules })
}
