//! Plugin archive discovery, version selection, and activation.
//!
//! This crate turns a directory of plugin archives into the set of plugins a
//! host should use. Every archive found becomes a [`PluginDescription`],
//! including archives that cannot be read; those are kept as degraded
//! descriptions carrying an error message so hosts can explain what went
//! wrong instead of silently dropping them.
//!
//! # Architecture
//!
//! - [`PluginArchiveLoader`] owns registrations and drives discovery through
//!   a [`FileEnumerator`] and an [`archivist_archive::ArchiveOpener`].
//! - [`FormatWindow`] decides whether an archive's format version is usable.
//! - [`select_visible`] picks the highest usable version per plugin id.
//! - Activation resolves declared type names in the archive's
//!   [`archivist_archive::PluginModule`] and instantiates them as a
//!   [`archivist_archive::Capability`].
//! - Events are reported to a [`LoaderReporter`]; [`TracingReporter`] emits
//!   them through `tracing`.
//!
//! Discovery is synchronous and cannot be cancelled.

pub mod compat;
pub mod description;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod reporter;
pub mod selection;
pub mod status;

pub use self::compat::{Compatibility, FormatWindow};
pub use self::description::{PluginDescription, PluginHandle, identity_from_file_name};
pub use self::discovery::{FileEnumerator, StdFileEnumerator};
pub use self::error::{LoadError, LoadErrorKind, RegistrationError};
pub use self::loader::{PluginArchiveLoader, ResolvedType};
pub use self::reporter::{LoaderReporter, TracingReporter};
pub use self::selection::{Candidate, select_visible};
pub use self::status::PluginStatus;

#[cfg(test)]
mod tests;
