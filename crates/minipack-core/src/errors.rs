use crate::span::Span;
use thiserror::Error;

/// Failure while parsing a module's source into an AST.
///
/// Parse failures are fatal at build time: a malformed module invalidates
/// the registry's closure property, so there is no per-module recovery.
#[derive(Debug, Clone, Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

/// Top-level build error taxonomy.
///
/// Every variant aborts the whole build: no partial artifact is emitted.
#[derive(Debug, Error)]
pub enum BundleError {
    /// An import target could not be statically determined or located
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A configured loader could not be located or failed while running
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Structural parsing of a module's content failed
    #[error("failed to parse module '{identifier}': {source}")]
    Parse {
        identifier: String,
        #[source]
        source: ParseError,
    },

    /// The build configuration is malformed
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The argument to an import call is not a single literal string,
    /// so its target cannot be statically determined
    #[error("dynamic import argument in '{importer}' at {span}: the target of a require call must be a single string literal")]
    NonLiteralArgument { importer: String, span: Span },

    /// An identifier resolved from an import has no backing content
    #[error("module not found: '{identifier}' (imported from '{importer}')")]
    ModuleNotFound {
        identifier: String,
        importer: String,
        #[source]
        source: std::io::Error,
    },

    /// The entry identifier itself has no backing content
    #[error("entry module not found: '{identifier}'")]
    EntryNotFound {
        identifier: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LoaderError {
    /// A rule references a loader name absent from the registry.
    /// Surfaced when rules are resolved, before traversal begins.
    #[error("unknown loader '{name}' referenced by rule '{rule}'")]
    Unknown { name: String, rule: String },

    /// A rule's test is not a valid glob pattern
    #[error("invalid rule pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A loader invocation failed; the underlying failure is passed
    /// through as the source, not rewrapped
    #[error("loader '{name}' failed on '{identifier}'")]
    Failed {
        name: String,
        identifier: String,
        #[source]
        source: anyhow::Error,
    },
}
