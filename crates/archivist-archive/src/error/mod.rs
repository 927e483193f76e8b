//! Errors raised while opening archives and instantiating plugin types.
//!
//! All errors use `thiserror`-derived enums with structured context. I/O
//! errors are wrapped in `Arc` to satisfy the `result_large_err` Clippy lint.

use std::sync::Arc;

use thiserror::Error;

/// Errors arising from reading a plugin archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive could not be read from its backing file or stream.
    #[error("failed to read archive '{origin}': {source}")]
    Io {
        /// Path or stream label the archive was read from.
        origin: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// A required container entry is absent.
    #[error("archive '{origin}' has no '{entry}' entry")]
    MissingEntry {
        /// Path or stream label the archive was read from.
        origin: String,
        /// Name of the missing entry.
        entry: &'static str,
    },

    /// The archive index is not valid JSON or misses required fields.
    #[error("archive '{origin}' has a malformed index: {source}")]
    MalformedIndex {
        /// Path or stream label the archive was read from.
        origin: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The payload entry is present but unusable.
    #[error("archive '{origin}' has an invalid payload: {message}")]
    InvalidPayload {
        /// Path or stream label the archive was read from.
        origin: String,
        /// Description of the problem.
        message: String,
    },

    /// The payload names a module the host does not provide.
    #[error("no plugin module named '{key}' is linked into this host")]
    UnknownModule {
        /// Module key found in the payload.
        key: String,
    },
}

impl ArchiveError {
    /// Wraps an I/O error raised while reading `origin`.
    #[must_use]
    pub fn io(origin: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            origin: origin.into(),
            source: Arc::new(source),
        }
    }
}

/// Errors arising from instantiating a type exported by a plugin module.
#[derive(Debug, Error)]
pub enum InstantiateError {
    /// The type exists but does not export the requested capability.
    #[error("type '{type_name}' does not implement capability '{capability}'")]
    NotImplemented {
        /// Fully qualified type name.
        type_name: String,
        /// Capability that was requested.
        capability: &'static str,
    },

    /// The exported constructor produced an instance of another capability.
    #[error("type '{type_name}' produced an instance that is not a '{capability}'")]
    TypeMismatch {
        /// Fully qualified type name.
        type_name: String,
        /// Capability that was requested.
        capability: &'static str,
    },

    /// The plugin's constructor reported a failure.
    #[error("constructor of '{type_name}' failed: {source}")]
    Constructor {
        /// Fully qualified type name.
        type_name: String,
        /// Error reported by the plugin.
        #[source]
        source: crate::module::ActivationError,
    },
}

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid plugin version (expected major.minor[.patch[.build]])")]
pub struct VersionParseError {
    /// Text that failed to parse.
    pub input: String,
}
