//! Writer for packed archives, used to build fixtures in tests.

use std::io;
use std::path::Path;

use crate::index::ArchiveIndex;
use crate::packed::{ICON_ENTRY, INDEX_ENTRY, PAYLOAD_ENTRY};

/// Assembles a packed archive in memory.
///
/// Each piece is optional so tests can produce deliberately broken
/// containers: omit the payload, supply raw index bytes, and so on.
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    index: Option<Vec<u8>>,
    icon: Option<Vec<u8>>,
    payload: Option<Vec<u8>>,
}

impl ArchiveWriter {
    /// Starts an archive with the serialised `index`.
    ///
    /// # Errors
    ///
    /// Returns the serialisation error if the index cannot be encoded.
    pub fn new(index: &ArchiveIndex) -> Result<Self, serde_json::Error> {
        Ok(Self::default().with_raw_index(index.to_json()?))
    }

    /// Replaces the index entry with arbitrary bytes.
    #[must_use]
    pub fn with_raw_index(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.index = Some(bytes.into());
        self
    }

    /// Adds an icon entry.
    #[must_use]
    pub fn with_icon(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.icon = Some(bytes.into());
        self
    }

    /// Adds a payload entry naming the module `key`.
    #[must_use]
    pub fn with_payload(self, key: &str) -> Self {
        self.with_raw_payload(key.as_bytes().to_vec())
    }

    /// Adds a payload entry with arbitrary bytes.
    #[must_use]
    pub fn with_raw_payload(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(bytes.into());
        self
    }

    /// Renders the container as tar bytes.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the tar builder.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut builder = tar::Builder::new(Vec::new());
        let entries = [
            (INDEX_ENTRY, self.index.as_deref()),
            (ICON_ENTRY, self.icon.as_deref()),
            (PAYLOAD_ENTRY, self.payload.as_deref()),
        ];
        for (name, contents) in entries {
            if let Some(data) = contents {
                let mut header = tar::Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append_data(&mut header, name, data)?;
            }
        }
        builder.into_inner()
    }

    /// Writes the container to `path`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while rendering or writing.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes()?)
    }
}
