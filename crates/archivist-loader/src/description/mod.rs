//! Metadata records produced for every discovered archive.
//!
//! A [`PluginDescription`] exists for each registered archive, whether it
//! could be read or not. Descriptions of unreadable archives are *degraded*:
//! they carry an error message, whatever identity the file name revealed, and
//! no capabilities.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use archivist_archive::{ArchiveIndex, PluginId, PluginVersion};
use url::Url;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one registration.
///
/// Handles are unique for the lifetime of the process, so a description
/// cannot be confused with one issued by another loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginHandle(u64);

impl PluginHandle {
    pub(crate) fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata describing one registered plugin archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescription {
    handle: PluginHandle,
    id: PluginId,
    version: PluginVersion,
    name: String,
    author: String,
    description: String,
    website: Option<Url>,
    file_path: Option<PathBuf>,
    icon: Option<Vec<u8>>,
    capabilities: BTreeMap<String, String>,
    serializable_types: BTreeMap<String, String>,
    error: Option<String>,
}

impl PluginDescription {
    /// Describes a successfully opened archive.
    pub(crate) fn from_index(
        handle: PluginHandle,
        index: &ArchiveIndex,
        file_path: Option<&Path>,
        icon: Option<Vec<u8>>,
    ) -> Self {
        let capabilities = index
            .implemented_capabilities()
            .iter()
            .map(|c| (c.interface().to_owned(), c.implementation().to_owned()))
            .collect();
        let serializable_types = index
            .serializable_types()
            .iter()
            .map(|t| (t.name().to_owned(), t.full_name().to_owned()))
            .collect();

        Self {
            handle,
            id: index.id().clone(),
            version: index.version(),
            name: index.name().to_owned(),
            author: index.author().to_owned(),
            description: index.description().to_owned(),
            website: Url::parse(index.website()).ok(),
            file_path: file_path.map(Path::to_path_buf),
            icon,
            capabilities,
            serializable_types,
            error: None,
        }
    }

    /// Describes an archive that could not be read.
    ///
    /// Identity is inferred from the file name where one is available.
    pub(crate) fn degraded(
        handle: PluginHandle,
        file_path: Option<&Path>,
        cause: &dyn fmt::Display,
    ) -> Self {
        let (id, version) = file_path.map_or_else(
            || (PluginId::unknown(), PluginVersion::ZERO),
            identity_from_file_name,
        );
        Self::rejected(handle, id, version, file_path, cause)
    }

    /// Describes a readable archive that was turned away, keeping the
    /// identity its index declares.
    pub(crate) fn rejected(
        handle: PluginHandle,
        id: PluginId,
        version: PluginVersion,
        file_path: Option<&Path>,
        cause: &dyn fmt::Display,
    ) -> Self {
        Self {
            handle,
            id,
            version,
            name: String::new(),
            author: String::new(),
            description: String::new(),
            website: None,
            file_path: file_path.map(Path::to_path_buf),
            icon: None,
            capabilities: BTreeMap::new(),
            serializable_types: BTreeMap::new(),
            error: Some(format!("The plugin couldn't be loaded: {cause}")),
        }
    }

    /// Handle of the registration this description belongs to.
    #[must_use]
    pub const fn handle(&self) -> PluginHandle {
        self.handle
    }

    /// Logical plugin id.
    #[must_use]
    pub const fn id(&self) -> &PluginId {
        &self.id
    }

    /// Plugin version.
    #[must_use]
    pub const fn version(&self) -> PluginVersion {
        self.version
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Author.
    #[must_use]
    pub const fn author(&self) -> &str {
        self.author.as_str()
    }

    /// Free-text description.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Project website, absent when the index held no parsable URL.
    #[must_use]
    pub const fn website(&self) -> Option<&Url> {
        self.website.as_ref()
    }

    /// Path the archive was read from; `None` for streams.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Raw icon bytes.
    #[must_use]
    pub fn icon(&self) -> Option<&[u8]> {
        self.icon.as_deref()
    }

    /// Declared capabilities: capability name to implementing type name.
    #[must_use]
    pub const fn capabilities(&self) -> &BTreeMap<String, String> {
        &self.capabilities
    }

    /// Declared serialisable types: friendly name to full type name.
    #[must_use]
    pub const fn serializable_types(&self) -> &BTreeMap<String, String> {
        &self.serializable_types
    }

    /// Reason the archive could not be read.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` for descriptions of unreadable archives.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Infers `(id, version)` from a file name of the form `<id>.<version>.<ext>`.
///
/// The extension is dropped and the remainder split at its first `.`. An
/// unparsable version becomes [`PluginVersion::ZERO`]; a name without a
/// separator yields [`PluginId::unknown`].
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use archivist_archive::{PluginId, PluginVersion};
/// use archivist_loader::identity_from_file_name;
///
/// let (id, version) = identity_from_file_name(Path::new("/plugins/Acme.1.2.plugin"));
/// assert_eq!(id, PluginId::new("Acme"));
/// assert_eq!(version, PluginVersion::new(1, 2, 0));
/// ```
#[must_use]
pub fn identity_from_file_name(path: &Path) -> (PluginId, PluginVersion) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.split_once('.') {
        Some((id, version)) => (
            PluginId::new(id),
            version.parse().unwrap_or(PluginVersion::ZERO),
        ),
        None => (PluginId::unknown(), PluginVersion::ZERO),
    }
}
