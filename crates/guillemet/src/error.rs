// File: src/error.rs
// Purpose: Error taxonomy for resolution, coercion and rendering

use guillemet_resolve::{ResolveError, SourceError};
use thiserror::Error;

use crate::engine::EngineError;

/// Which phase of a render a template-engine failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Execute,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "parse"),
            Phase::Execute => write!(f, "execute"),
        }
    }
}

/// Everything a public `Templater` call can fail with.
///
/// Nothing is retried or recovered internally; each error carries the
/// name, directory or phase needed to act on it and bubbles to the
/// caller synchronously. The one sanctioned fallback lives in
/// [`Templater::execute`](crate::Templater::execute), gated strictly
/// on [`Error::is_not_found`].
#[derive(Debug, Error)]
pub enum Error {
    /// Resolution failure: no matching file, or an ambiguous wildcard
    /// configuration.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A captured path segment could not be coerced to its declared
    /// wildcard type. Chains the underlying parse failure.
    #[error("invalid wildcard value {value:?} of type {ty}: {source}")]
    InvalidWildcardValue {
        value: String,
        ty: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A wildcard declared a type outside the recognized vocabulary.
    #[error("unrecognized wildcard type {ty:?} in wildcard {{{spec}}}")]
    UnknownWildcardType { spec: String, ty: String },

    /// A key/value argument list had an odd number of entries.
    #[error(
        "expected an even number of arguments, key-value pairs: \
         received {count} arguments"
    )]
    PropsNotPaired { count: usize },

    /// A key position in a key/value argument list held a non-string.
    #[error("expected odd arguments to be key strings: argument {index} was a {kind}")]
    PropKeyNotString { index: usize, kind: &'static str },

    /// A composition function received a non-string template name.
    #[error("{func} expects a template name string as its first argument, got {kind}")]
    NameNotString {
        func: &'static str,
        kind: &'static str,
    },

    /// Reading a template file failed.
    #[error("failed to read template file {file}")]
    Read {
        file: String,
        #[source]
        source: SourceError,
    },

    /// The template engine failed to parse or execute a file.
    #[error("failed to {phase} {file}: {source}")]
    Engine {
        phase: Phase,
        file: String,
        #[source]
        source: EngineError,
    },

    /// A slot was invoked without its content definition prop.
    #[error("slot content not defined: slot {slot:?} requires the {key:?} prop")]
    SlotNotDefined { slot: String, key: String },

    /// A slot's content definition prop held a non-string.
    #[error("slot definition name for slot {slot:?} is not a string (got {kind})")]
    SlotNotString { slot: String, kind: &'static str },

    /// `slot` was called outside a component render. Internal
    /// invariant violation: slots are only reachable from inside a
    /// component's template.
    #[error("slot {slot:?} invoked outside a component render")]
    SlotOutsideRender { slot: String },

    /// `execute` found neither a page nor a component for the name.
    #[error("{name:?} matched no page ({page}) and no component ({component})")]
    NoMatch {
        name: String,
        page: Box<Error>,
        component: Box<Error>,
    },
}

impl Error {
    /// Whether this is the resolver's "no template file found" error,
    /// the only error kind the page→component fallback may swallow.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Resolve(ResolveError::NotFound { .. }))
    }
}
