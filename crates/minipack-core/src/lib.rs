pub mod ast;
pub mod codegen;
pub mod config;
pub mod emit;
pub mod errors;
pub mod graph;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod resolver;
pub mod span;
pub mod store;

pub use codegen::CodeGenerator;
pub use config::{BundlerConfig, ModuleOptions, OutputOptions, RuleConfig};
pub use emit::RuntimeEmitter;
pub use errors::{BundleError, LoaderError, ParseError, ResolutionError};
pub use graph::{BuildContext, DependencyGraphBuilder, ModuleRecord, ModuleRegistry};
pub use loader::{apply_loaders, resolve_rules, LoaderFn, LoaderRegistry, ResolvedRule};
pub use resolver::{canonical_identifier, ModuleResolver, RUNTIME_REQUIRE};
pub use span::Span;
pub use store::{BackingStore, DirStore, MemoryStore};

/// Bundle the graph reachable from `entry` into one artifact string.
///
/// Composes the graph builder and runtime emitter; any error aborts the
/// build with no partial output.
pub fn bundle(
    entry: &str,
    rules: &[ResolvedRule],
    store: &dyn BackingStore,
) -> Result<String, BundleError> {
    let entry = canonical_identifier(entry);
    let registry = DependencyGraphBuilder::new(BuildContext {
        entry: entry.clone(),
        rules,
        store,
    })
    .build()?;
    Ok(RuntimeEmitter::emit(&registry, &entry))
}
