//! Plugin archive contract for the Archivist plugin host.
//!
//! A plugin archive is a versioned container that carries an index (the
//! plugin's identity, the capabilities it implements, and the types it can
//! serialise), an optional icon, and a payload naming the module that holds
//! the plugin's code. This crate defines that contract and ships one
//! concrete container, the tar-based [`PackedArchive`].
//!
//! # Architecture
//!
//! The loader in `archivist-loader` never touches the container layout
//! directly. It talks to an [`ArchiveOpener`] which yields boxed
//! [`PluginArchive`] handles. Payload materialisation produces a
//! [`PluginModule`]: a capability registry mapping type names to
//! zero-argument constructors, built from a host-side [`ModuleCatalog`] of
//! statically linked modules.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use archivist_archive::{ArchiveOpener, ModuleCatalog, PackedArchiveOpener};
//!
//! let opener = PackedArchiveOpener::new(Arc::new(ModuleCatalog::new()));
//! let mut garbage: &[u8] = b"definitely not a tar container";
//! assert!(opener.open_reader(&mut garbage).is_err());
//! ```

pub mod contract;
pub mod error;
pub mod identity;
pub mod index;
pub mod module;
pub mod packed;

#[cfg(any(test, feature = "test-support"))]
pub mod fixture;

pub use self::contract::{ArchiveOpener, PluginArchive};
pub use self::error::{ArchiveError, InstantiateError, VersionParseError};
pub use self::identity::{PluginId, PluginVersion};
pub use self::index::{
    ArchiveIndex, CURRENT_ARCHIVE_VERSION, CapabilityImplementation,
    MINIMUM_SUPPORTED_ARCHIVE_VERSION, PLUGIN_EXTENSION, SerializableTypeDescription,
};
pub use self::module::{
    ActivationError, Capability, ModuleBuilder, ModuleCatalog, ModuleType, PluginModule,
    TypeDescriptor,
};
pub use self::packed::{PackedArchive, PackedArchiveOpener};
