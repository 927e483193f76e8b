//! Archive format compatibility window.
//!
//! The host accepts archives whose declared format version lies in the closed
//! range `[minimum, current]`. Archives written for an older generation than
//! `minimum` or a newer one than `current` are never used.

use std::fmt;

use archivist_archive::{CURRENT_ARCHIVE_VERSION, MINIMUM_SUPPORTED_ARCHIVE_VERSION};

/// Outcome of checking an archive format version against a [`FormatWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// The version lies inside the window.
    Usable,
    /// The version predates the oldest supported format.
    TooOld,
    /// The version was written by a newer host generation.
    TooNew,
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Usable => "usable",
            Self::TooOld => "too old",
            Self::TooNew => "too new",
        };
        f.write_str(label)
    }
}

/// Closed range of archive format versions the host can read.
///
/// # Example
///
/// ```
/// use archivist_loader::{Compatibility, FormatWindow};
///
/// let window = FormatWindow::new(1, 2);
/// assert!(window.is_usable(2));
/// assert_eq!(window.classify(3), Compatibility::TooNew);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatWindow {
    minimum: u32,
    current: u32,
}

impl FormatWindow {
    /// Creates a window accepting `minimum..=current`.
    #[must_use]
    pub const fn new(minimum: u32, current: u32) -> Self {
        Self { minimum, current }
    }

    /// Oldest accepted format version.
    #[must_use]
    pub const fn minimum(self) -> u32 {
        self.minimum
    }

    /// Newest accepted format version.
    #[must_use]
    pub const fn current(self) -> u32 {
        self.current
    }

    /// Classifies `format_version` against the window.
    #[must_use]
    pub const fn classify(self, format_version: u32) -> Compatibility {
        if format_version < self.minimum {
            Compatibility::TooOld
        } else if format_version > self.current {
            Compatibility::TooNew
        } else {
            Compatibility::Usable
        }
    }

    /// Returns `true` when archives of `format_version` may be used.
    #[must_use]
    pub const fn is_usable(self, format_version: u32) -> bool {
        matches!(self.classify(format_version), Compatibility::Usable)
    }
}

impl Default for FormatWindow {
    fn default() -> Self {
        Self::new(MINIMUM_SUPPORTED_ARCHIVE_VERSION, CURRENT_ARCHIVE_VERSION)
    }
}
