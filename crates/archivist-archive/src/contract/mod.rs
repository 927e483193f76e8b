//! Traits through which the loader consumes plugin archives.
//!
//! The loader only ever sees archives through [`PluginArchive`] handles
//! produced by an [`ArchiveOpener`]. This keeps the container layout out of
//! the loader and lets tests substitute in-memory archives.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::error::ArchiveError;
use crate::index::ArchiveIndex;
use crate::module::PluginModule;

/// An opened plugin archive.
///
/// The handle owns the underlying file or buffered stream until it is
/// dropped. Icons and payloads are read lazily through the retained handle.
pub trait PluginArchive: Send {
    /// Returns the index read when the archive was opened.
    fn index(&self) -> &ArchiveIndex;

    /// Reads the archive's icon, if it has one.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] when the container cannot be read.
    fn read_icon(&mut self) -> Result<Option<Vec<u8>>, ArchiveError>;

    /// Materialises the module named by the archive's payload.
    ///
    /// Materialisation is expensive; callers are expected to cache the
    /// result for the lifetime of the handle.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] when the payload is missing, malformed, or
    /// names a module the host does not provide.
    fn load_payload(&mut self) -> Result<PluginModule, ArchiveError>;
}

/// Opens plugin archives from files or streams.
pub trait ArchiveOpener {
    /// Opens the archive stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] when the file cannot be read or is not a
    /// valid archive.
    fn open_path(&self, path: &Path) -> Result<Box<dyn PluginArchive>, ArchiveError>;

    /// Opens an archive from `reader`.
    ///
    /// The reader stays owned by the caller: pass `&mut reader` to keep it
    /// open afterwards, or hand over an owned reader to have it closed when
    /// the call returns. Implementations buffer whatever they need.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] when the stream cannot be read or is not a
    /// valid archive.
    fn open_reader(&self, reader: &mut dyn Read) -> Result<Box<dyn PluginArchive>, ArchiveError>;
}

impl<T> ArchiveOpener for Arc<T>
where
    T: ArchiveOpener + ?Sized,
{
    fn open_path(&self, path: &Path) -> Result<Box<dyn PluginArchive>, ArchiveError> {
        (**self).open_path(path)
    }

    fn open_reader(&self, reader: &mut dyn Read) -> Result<Box<dyn PluginArchive>, ArchiveError> {
        (**self).open_reader(reader)
    }
}
