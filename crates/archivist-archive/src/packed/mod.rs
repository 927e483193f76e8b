//! Tar-backed plugin archive container.
//!
//! A packed archive is a tar stream holding three entries:
//!
//! - `index.json`: the [`ArchiveIndex`] (required),
//! - `icon.png`: raw icon bytes (optional),
//! - `payload`: the UTF-8 key of the module implementing the plugin.
//!
//! The index is parsed when the archive is opened. The icon and payload are
//! located on demand by rescanning the retained reader, so an archive opened
//! from a file keeps its file handle until it is dropped.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use crate::contract::{ArchiveOpener, PluginArchive};
use crate::error::ArchiveError;
use crate::index::ArchiveIndex;
use crate::module::{ModuleCatalog, PluginModule};

/// Name of the index entry.
pub const INDEX_ENTRY: &str = "index.json";
/// Name of the optional icon entry.
pub const ICON_ENTRY: &str = "icon.png";
/// Name of the payload entry.
pub const PAYLOAD_ENTRY: &str = "payload";

const STREAM_ORIGIN: &str = "<stream>";

/// A plugin archive read from a tar container.
pub struct PackedArchive<R> {
    origin: String,
    reader: R,
    index: ArchiveIndex,
    catalog: Arc<ModuleCatalog>,
}

impl<R: Read + Seek> PackedArchive<R> {
    /// Opens a packed archive, reading its index eagerly.
    ///
    /// `origin` labels the archive in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MissingEntry`] when the container has no
    /// index, [`ArchiveError::MalformedIndex`] when the index does not parse,
    /// and [`ArchiveError::Io`] when the container itself is unreadable.
    pub fn open(
        mut reader: R,
        origin: impl Into<String>,
        catalog: Arc<ModuleCatalog>,
    ) -> Result<Self, ArchiveError> {
        let label = origin.into();
        let bytes = read_entry(&mut reader, &label, INDEX_ENTRY)?.ok_or_else(|| {
            ArchiveError::MissingEntry {
                origin: label.clone(),
                entry: INDEX_ENTRY,
            }
        })?;
        let index = ArchiveIndex::from_json(&bytes, &label)?;
        Ok(Self {
            origin: label,
            reader,
            index,
            catalog,
        })
    }

    /// Returns the label used for this archive in error messages.
    #[must_use]
    pub const fn origin(&self) -> &str {
        self.origin.as_str()
    }
}

impl<R: Read + Seek + Send> PluginArchive for PackedArchive<R> {
    fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    fn read_icon(&mut self) -> Result<Option<Vec<u8>>, ArchiveError> {
        read_entry(&mut self.reader, &self.origin, ICON_ENTRY)
    }

    fn load_payload(&mut self) -> Result<PluginModule, ArchiveError> {
        let bytes = read_entry(&mut self.reader, &self.origin, PAYLOAD_ENTRY)?.ok_or_else(
            || ArchiveError::MissingEntry {
                origin: self.origin.clone(),
                entry: PAYLOAD_ENTRY,
            },
        )?;
        let key = String::from_utf8(bytes).map_err(|_| ArchiveError::InvalidPayload {
            origin: self.origin.clone(),
            message: String::from("payload is not UTF-8"),
        })?;
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(ArchiveError::InvalidPayload {
                origin: self.origin.clone(),
                message: String::from("payload names no module"),
            });
        }
        self.catalog.materialize(trimmed)
    }
}

/// Opens [`PackedArchive`]s, resolving payloads against a module catalog.
#[derive(Debug, Clone)]
pub struct PackedArchiveOpener {
    catalog: Arc<ModuleCatalog>,
}

impl PackedArchiveOpener {
    /// Creates an opener backed by `catalog`.
    #[must_use]
    pub const fn new(catalog: Arc<ModuleCatalog>) -> Self {
        Self { catalog }
    }

    /// Returns the module catalog payloads are resolved against.
    #[must_use]
    pub const fn catalog(&self) -> &Arc<ModuleCatalog> {
        &self.catalog
    }
}

impl ArchiveOpener for PackedArchiveOpener {
    fn open_path(&self, path: &Path) -> Result<Box<dyn PluginArchive>, ArchiveError> {
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|source| ArchiveError::io(origin.clone(), source))?;
        let archive = PackedArchive::open(file, origin, Arc::clone(&self.catalog))?;
        Ok(Box::new(archive))
    }

    fn open_reader(&self, reader: &mut dyn Read) -> Result<Box<dyn PluginArchive>, ArchiveError> {
        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .map_err(|source| ArchiveError::io(STREAM_ORIGIN, source))?;
        let archive = PackedArchive::open(
            Cursor::new(buffer),
            STREAM_ORIGIN,
            Arc::clone(&self.catalog),
        )?;
        Ok(Box::new(archive))
    }
}

/// Scans the container from the start for `name`, returning its bytes.
fn read_entry<R: Read + Seek>(
    reader: &mut R,
    origin: &str,
    name: &str,
) -> Result<Option<Vec<u8>>, ArchiveError> {
    let io_error = |source| ArchiveError::io(origin, source);

    reader.seek(SeekFrom::Start(0)).map_err(io_error)?;
    let mut container = tar::Archive::new(reader);
    for candidate in container.entries().map_err(io_error)? {
        let mut entry = candidate.map_err(io_error)?;
        let matches = entry.path().map_err(io_error)?.as_os_str() == name;
        if matches {
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).map_err(io_error)?;
            return Ok(Some(bytes));
        }
    }
    Ok(None)
}
