//! The versioned manifest stored inside every plugin archive.
//!
//! An [`ArchiveIndex`] is read once when an archive is opened and is
//! read-only afterwards. It declares the plugin's identity, the container
//! format revision it was packed with, the capabilities it implements, and
//! the serialisable types it contributes.

use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;
use crate::identity::{PluginId, PluginVersion};

/// Oldest archive format revision this host can still read.
pub const MINIMUM_SUPPORTED_ARCHIVE_VERSION: u32 = 1;

/// Newest archive format revision this host understands.
pub const CURRENT_ARCHIVE_VERSION: u32 = 2;

/// File extension identifying plugin archives on disk.
pub const PLUGIN_EXTENSION: &str = "plugin";

/// Declares that a plugin type implements a named capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityImplementation {
    interface: String,
    implementation: String,
}

impl CapabilityImplementation {
    /// Pairs a capability name with the type implementing it.
    #[must_use]
    pub fn new(interface: impl Into<String>, implementation: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            implementation: implementation.into(),
        }
    }

    /// Returns the capability name.
    #[must_use]
    pub const fn interface(&self) -> &str {
        self.interface.as_str()
    }

    /// Returns the fully qualified name of the implementing type.
    #[must_use]
    pub const fn implementation(&self) -> &str {
        self.implementation.as_str()
    }
}

/// Declares a type the plugin contributes to the host's serialiser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableTypeDescription {
    name: String,
    full_name: String,
}

impl SerializableTypeDescription {
    /// Pairs a friendly name with a fully qualified type name.
    #[must_use]
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
        }
    }

    /// Returns the friendly name used in serialised documents.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the fully qualified type name inside the plugin module.
    #[must_use]
    pub const fn full_name(&self) -> &str {
        self.full_name.as_str()
    }
}

/// Manifest read from an opened plugin archive.
///
/// # Example
///
/// ```
/// use archivist_archive::{ArchiveIndex, CapabilityImplementation, PluginVersion};
///
/// let index = ArchiveIndex::new("Acme.Events", "Events", PluginVersion::new(1, 0, 0), 2)
///     .with_capabilities(vec![CapabilityImplementation::new(
///         "LogAnalyser",
///         "Acme.Events.Analyser",
///     )]);
///
/// let json = index.to_json().unwrap();
/// let back = ArchiveIndex::from_json(&json, "<memory>").unwrap();
/// assert_eq!(back, index);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveIndex {
    id: PluginId,
    name: String,
    version: PluginVersion,
    #[serde(default)]
    author: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    website: String,
    archive_format_version: u32,
    #[serde(default)]
    implemented_capabilities: Vec<CapabilityImplementation>,
    #[serde(default)]
    serializable_types: Vec<SerializableTypeDescription>,
}

impl ArchiveIndex {
    /// Creates an index with no capabilities, types, or descriptive text.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: PluginVersion,
        archive_format_version: u32,
    ) -> Self {
        Self {
            id: PluginId::new(id),
            name: name.into(),
            version,
            author: String::new(),
            description: String::new(),
            website: String::new(),
            archive_format_version,
            implemented_capabilities: Vec::new(),
            serializable_types: Vec::new(),
        }
    }

    /// Sets the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Sets the free-form description text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the website string. It is stored verbatim and parsed by readers.
    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    /// Declares implemented capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<CapabilityImplementation>) -> Self {
        self.implemented_capabilities = capabilities;
        self
    }

    /// Declares serialisable types.
    #[must_use]
    pub fn with_serializable_types(mut self, types: Vec<SerializableTypeDescription>) -> Self {
        self.serializable_types = types;
        self
    }

    /// Parses an index from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MalformedIndex`] when the bytes are not a
    /// valid index document.
    pub fn from_json(bytes: &[u8], origin: &str) -> Result<Self, ArchiveError> {
        serde_json::from_slice(bytes).map_err(|source| ArchiveError::MalformedIndex {
            origin: origin.to_owned(),
            source,
        })
    }

    /// Serialises the index to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serialiser's error; this only happens for exotic writers.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Returns the logical plugin id.
    #[must_use]
    pub const fn id(&self) -> &PluginId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the plugin version.
    #[must_use]
    pub const fn version(&self) -> PluginVersion {
        self.version
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> &str {
        self.author.as_str()
    }

    /// Returns the description text.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the unparsed website string.
    #[must_use]
    pub const fn website(&self) -> &str {
        self.website.as_str()
    }

    /// Returns the container format revision the archive was packed with.
    #[must_use]
    pub const fn archive_format_version(&self) -> u32 {
        self.archive_format_version
    }

    /// Returns the declared capability implementations.
    #[must_use]
    pub fn implemented_capabilities(&self) -> &[CapabilityImplementation] {
        &self.implemented_capabilities
    }

    /// Returns the declared serialisable types.
    #[must_use]
    pub fn serializable_types(&self) -> &[SerializableTypeDescription] {
        &self.serializable_types
    }
}
