use crate::errors::{BundleError, ResolutionError};
use crate::loader::{apply_loaders, ResolvedRule};
use crate::resolver::{canonical_identifier, ModuleResolver};
use crate::store::BackingStore;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::debug;

/// One module's finalized content and dependency edges.
/// Created once on discovery, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    pub identifier: String,
    pub content: String,
    pub dependencies: Vec<String>,
}

/// Flat registry keyed by canonical identifier.
/// Insertion order is the traversal's depth-first pre-order; execution
/// order at runtime is determined by the entry's own import order.
pub type ModuleRegistry = IndexMap<String, ModuleRecord>;

/// Everything one build invocation needs, threaded explicitly instead of
/// held as ambient state.
pub struct BuildContext<'a> {
    pub entry: String,
    pub rules: &'a [ResolvedRule],
    pub store: &'a dyn BackingStore,
}

/// Walks the import graph from the entry into a flat registry.
pub struct DependencyGraphBuilder<'a> {
    ctx: BuildContext<'a>,
    registry: ModuleRegistry,
    visited: FxHashSet<String>,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        DependencyGraphBuilder {
            ctx,
            registry: ModuleRegistry::new(),
            visited: FxHashSet::default(),
        }
    }

    /// Depth-first pre-order traversal over an explicit work stack.
    ///
    /// The visited set guarantees termination on cyclic graphs and that
    /// each distinct identifier is read, transformed and resolved exactly
    /// once; the explicit stack keeps deep graphs from growing the call
    /// stack.
    pub fn build(mut self) -> Result<ModuleRegistry, BundleError> {
        let entry = canonical_identifier(&self.ctx.entry);
        debug!(entry = %entry, "building module graph");

        // (identifier, importing module) in DFS order; children are
        // pushed in reverse so pop order matches source order
        let mut stack: Vec<(String, Option<String>)> = vec![(entry, None)];

        while let Some((identifier, importer)) = stack.pop() {
            if !self.visited.insert(identifier.clone()) {
                continue;
            }

            let raw = self
                .ctx
                .store
                .read(&identifier)
                .map_err(|source| match &importer {
                    Some(importer) => ResolutionError::ModuleNotFound {
                        identifier: identifier.clone(),
                        importer: importer.clone(),
                        source,
                    },
                    None => ResolutionError::EntryNotFound {
                        identifier: identifier.clone(),
                        source,
                    },
                })?;

            let content = apply_loaders(&identifier, raw, self.ctx.rules)?;
            let resolved = ModuleResolver::resolve(&identifier, content)?;
            debug!(
                module = %identifier,
                dependencies = resolved.dependencies.len(),
                "registered module"
            );

            for dependency in resolved.dependencies.iter().rev() {
                if !self.visited.contains(dependency) {
                    stack.push((dependency.clone(), Some(identifier.clone())));
                }
            }

            self.registry.insert(
                identifier.clone(),
                ModuleRecord {
                    identifier,
                    content: resolved.content,
                    dependencies: resolved.dependencies,
                },
            );
        }

        Ok(self.registry)
    }
}
